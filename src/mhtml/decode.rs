//! Transfer decoding of part payloads.

use quoted_printable::ParseMode;

use crate::error::{Error, Result};

use super::structures::{Part, TransferEncoding};

/// Decode a part's payload according to its transfer encoding.
///
/// Quoted-printable bytes are read back as Latin-1, where every byte value is
/// a valid character, and returned as UTF-8 text. Identity payloads and
/// unrecognized encodings are returned unchanged; reporting the latter is
/// left to the caller.
pub fn decode_payload(part: &Part) -> Result<Vec<u8>> {
    match &part.transfer_encoding {
        TransferEncoding::QuotedPrintable => {
            let decoded = quoted_printable::decode(&part.raw_payload, ParseMode::Robust)
                .map_err(|source| Error::Decode {
                    uri: part.describe(),
                    source,
                })?;
            Ok(latin1_to_string(&decoded).into_bytes())
        }
        TransferEncoding::Identity | TransferEncoding::Unknown(_) => Ok(part.raw_payload.clone()),
    }
}

/// Interpret bytes as ISO-8859-1.
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
