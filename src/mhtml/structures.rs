use std::fmt;
use std::path::PathBuf;

/// MIME content type split into its two tokens
///
/// Parameters such as `charset` are not part of either token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    pub kind: String,
    pub subtype: String,
}

impl ContentType {
    /// Split a `type/subtype` string. A value without `/` uses the single
    /// token for both halves so that `subtype` is always meaningful.
    pub fn parse(mimetype: &str) -> Self {
        let mimetype = mimetype.split(';').next().unwrap_or_default().trim();
        match mimetype.split_once('/') {
            Some((kind, subtype)) => Self {
                kind: kind.to_string(),
                subtype: subtype.to_string(),
            },
            None => Self {
                kind: mimetype.to_string(),
                subtype: mimetype.to_string(),
            },
        }
    }

    pub fn is_multipart(&self) -> bool {
        self.kind.eq_ignore_ascii_case("multipart")
    }

    pub fn is_html(&self) -> bool {
        self.subtype.eq_ignore_ascii_case("html")
    }

    /// Tokens an existing file extension may match.
    ///
    /// `svg+xml` also accepts the plain `svg` extension.
    pub fn extension_tokens(&self) -> Vec<&str> {
        let mut tokens = vec![self.kind.as_str(), self.subtype.as_str()];
        if self.subtype == "svg+xml" {
            tokens.push("svg");
        }
        tokens
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)
    }
}

/// Content-Transfer-Encoding of a part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEncoding {
    QuotedPrintable,
    Identity,
    Unknown(String),
}

impl TransferEncoding {
    pub fn from_header(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return TransferEncoding::Identity;
        };
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "quoted-printable" => TransferEncoding::QuotedPrintable,
            "" | "7bit" | "8bit" | "binary" => TransferEncoding::Identity,
            _ => TransferEncoding::Unknown(value),
        }
    }
}

/// Leaf part read from the archive, in document order
#[derive(Debug, Clone)]
pub struct Part {
    /// Position among all parts of the archive, containers included
    pub index: usize,
    pub content_type: ContentType,
    pub location: Option<String>,
    pub transfer_encoding: TransferEncoding,
    pub raw_payload: Vec<u8>,
}

impl Part {
    /// Location of the part, or its position when it has none
    pub fn describe(&self) -> String {
        self.location
            .clone()
            .unwrap_or_else(|| format!("part #{}", self.index))
    }
}

/// Components of a resource URI
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriParts {
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

/// Extracted resource, keyed in the output by `filename`
#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub original_uri: String,
    pub uri_parts: UriParts,
    /// URI path interpreted as a local path
    pub local_path: PathBuf,
    pub filename: String,
    pub extension: String,
    pub content_type: ContentType,
    pub payload: Vec<u8>,
}
