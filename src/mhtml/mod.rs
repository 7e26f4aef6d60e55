//! MHTML archive parsing and extraction.
//!
//! An MHTML file (`.mht`, `.mhtml`) is a MIME `multipart/related` message
//! holding one HTML document and the resources it references, each part
//! tagged with the URI it was fetched from.
//!
//! ## Architecture
//!
//! - [`structures`]: parts, content types and extracted resource entries
//! - [`parser`]: flattens the MIME tree into leaf parts in archive order
//! - [`decode`]: reverses the transfer encoding of a part
//! - [`filename`]: derives local filenames from URIs and content types
//! - [`document`]: the HTML tree with its reference index
//! - [`extractor`]: drives the above and writes the output folder
//!
//! ## Limitations
//!
//! - Only quoted-printable and identity transfer encodings are decoded
//! - The whole archive is held in memory
//! - URIs are never fetched

pub mod decode;
pub mod document;
mod extractor;
pub mod filename;
mod parser;
pub mod structures;

pub use document::Document;
pub use extractor::{
    CollisionPolicy, DocumentPolicy, ExtractOptions, ExtractReport, INDEX_FILE,
    MhtmlExtractor, MissingLocationPolicy, Warning,
};
pub use parser::MhtmlParser;
pub use structures::*;
