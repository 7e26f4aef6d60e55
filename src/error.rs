use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while unpacking an MHTML archive.
///
/// Variants are grouped by the stage that raises them: reading the source,
/// decoding a part, deriving a filename, and persisting the output.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read archive {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed MIME structure: {0}")]
    Parse(#[from] mailparse::MailParseError),

    #[error("part #{index} is missing required header {header}")]
    MissingHeader { index: usize, header: &'static str },

    #[error("resource part #{index} ({content_type}) has no Content-Location")]
    MissingLocation { index: usize, content_type: String },

    #[error("archive contains no text/html part")]
    NoDocument,

    #[error("archive contains more than one text/html part (second at part #{index})")]
    MultipleDocuments { index: usize },

    #[error("failed to decode quoted-printable payload of {uri}: {source}")]
    Decode {
        uri: String,
        #[source]
        source: quoted_printable::QuotedPrintableError,
    },

    #[error("invalid resource URI {uri}: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("filename {name} derived for {uri} is already taken by {existing}")]
    Collision {
        name: String,
        uri: String,
        existing: String,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[source] std::io::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
