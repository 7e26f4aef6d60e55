//! MIME structure traversal.
//!
//! MHTML archives are `multipart/related` messages. The parser walks the
//! part tree depth-first, in the order the parts appear in the file, drops
//! container parts and returns every leaf as a [`Part`] with its headers
//! already picked apart and its payload still transfer-encoded.

use mailparse::body::Body;
use mailparse::{MailHeaderMap, ParsedMail};

use crate::error::{Error, Result};

use super::structures::{ContentType, Part, TransferEncoding};

const CONTENT_TYPE: &str = "Content-Type";
const CONTENT_LOCATION: &str = "Content-Location";
const CONTENT_TRANSFER_ENCODING: &str = "Content-Transfer-Encoding";

/// Parser over the raw bytes of an archive.
///
/// ## Example
///
/// ```ignore
/// let parser = MhtmlParser::new(&bytes);
/// for part in parser.leaf_parts()? {
///     println!("{} {:?}", part.content_type, part.location);
/// }
/// ```
pub struct MhtmlParser<'a> {
    data: &'a [u8],
}

impl<'a> MhtmlParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Parse the archive and return its leaf parts in document order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the MIME structure cannot be read and
    /// [`Error::MissingHeader`] if a leaf part has no `Content-Type`.
    pub fn leaf_parts(&self) -> Result<Vec<Part>> {
        let root = mailparse::parse_mail(self.data)?;
        let mut leaves = Vec::new();
        let mut index = 0;
        walk(&root, false, &mut index, &mut leaves)?;
        Ok(leaves)
    }
}

fn walk(
    part: &ParsedMail<'_>,
    in_multipart: bool,
    index: &mut usize,
    leaves: &mut Vec<Part>,
) -> Result<()> {
    let current = *index;
    *index += 1;

    let content_type = ContentType::parse(&part.ctype.mimetype);
    if content_type.is_multipart() || !part.subparts.is_empty() {
        for subpart in &part.subparts {
            walk(subpart, true, index, leaves)?;
        }
        return Ok(());
    }

    let headers = part.get_headers();
    if headers.get_first_value(CONTENT_TYPE).is_none() {
        return Err(Error::MissingHeader {
            index: current,
            header: CONTENT_TYPE,
        });
    }

    let location = headers
        .get_first_value(CONTENT_LOCATION)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());
    let encoding = headers.get_first_value(CONTENT_TRANSFER_ENCODING);

    let mut raw_payload = raw_body(&part.get_body_encoded());
    if in_multipart {
        strip_delimiter_break(&mut raw_payload);
    }

    leaves.push(Part {
        index: current,
        content_type,
        location,
        transfer_encoding: TransferEncoding::from_header(encoding.as_deref()),
        raw_payload,
    });
    Ok(())
}

/// Body bytes exactly as stored in the archive, before transfer decoding.
fn raw_body(body: &Body<'_>) -> Vec<u8> {
    let raw = match body {
        Body::Base64(encoded) | Body::QuotedPrintable(encoded) => encoded.get_raw(),
        Body::SevenBit(text) | Body::EightBit(text) => text.get_raw(),
        Body::Binary(binary) => binary.get_raw(),
    };
    raw.to_vec()
}

/// Drop the line break preceding the next `--boundary` line.
///
/// It belongs to the boundary delimiter (RFC 2046 5.1.1), not to the body,
/// but mailparse leaves it in every subpart. Only one break is removed.
fn strip_delimiter_break(payload: &mut Vec<u8>) {
    if payload.ends_with(b"\r\n") {
        payload.truncate(payload.len() - 2);
    } else if payload.ends_with(b"\n") {
        payload.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARCHIVE: &str = "From: <Saved by Blink>\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/related;\r\n\
\ttype=\"text/html\";\r\n\
\tboundary=\"----MultipartBoundary--abc\"\r\n\
\r\n\
------MultipartBoundary--abc\r\n\
Content-Type: text/html\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
Content-Location: http://x/page.html\r\n\
\r\n\
<html><body><img src=3D\"http://x/img.png\"></body></html>\r\n\
------MultipartBoundary--abc\r\n\
Content-Type: image/png\r\n\
Content-Transfer-Encoding: binary\r\n\
Content-Location: http://x/img.png\r\n\
\r\n\
PNGDATA\r\n\
------MultipartBoundary--abc--\r\n";

    #[test]
    fn flattens_leaves_in_order() {
        let parts = MhtmlParser::new(ARCHIVE.as_bytes()).leaf_parts().unwrap();
        assert_eq!(parts.len(), 2);

        assert!(parts[0].content_type.is_html());
        assert_eq!(parts[0].location.as_deref(), Some("http://x/page.html"));
        assert_eq!(parts[0].transfer_encoding, TransferEncoding::QuotedPrintable);
        assert_eq!(parts[0].index, 1);

        assert_eq!(parts[1].content_type.to_string(), "image/png");
        assert_eq!(parts[1].transfer_encoding, TransferEncoding::Identity);
        assert_eq!(parts[1].raw_payload, b"PNGDATA");
        assert_eq!(parts[1].index, 2);
    }

    #[test]
    fn payload_stays_encoded() {
        let parts = MhtmlParser::new(ARCHIVE.as_bytes()).leaf_parts().unwrap();
        let html = String::from_utf8_lossy(&parts[0].raw_payload);
        assert!(html.contains("src=3D"));
    }

    #[test]
    fn leaf_without_content_type_is_rejected() {
        let err = MhtmlParser::new(b"Subject: hi\r\n\r\nplain body")
            .leaf_parts()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingHeader {
                index: 0,
                header: "Content-Type"
            }
        ));
    }

    #[test]
    fn only_the_delimiter_break_is_removed() {
        let archive = "Content-Type: multipart/related; boundary=\"B\"\r\n\
\r\n\
--B\r\n\
Content-Type: text/plain\r\n\
Content-Location: http://x/notes.txt\r\n\
\r\n\
line one\n\r\n\
--B\r\n\
Content-Type: text/css\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
Content-Location: http://x/a.css\r\n\
\r\n\
p{}\r\n\
--B--\r\n";
        let parts = MhtmlParser::new(archive.as_bytes()).leaf_parts().unwrap();
        assert_eq!(parts[0].raw_payload, b"line one\n");
        assert_eq!(parts[1].raw_payload, b"p{}");
    }

    #[test]
    fn single_part_message_keeps_its_body() {
        let parts = MhtmlParser::new(b"Content-Type: text/html\r\n\r\n<p>hi</p>\n")
            .leaf_parts()
            .unwrap();
        assert_eq!(parts[0].raw_payload, b"<p>hi</p>\n");
    }
}
