//! # munpack
//!
//! Unpack MHTML web-page archives into a folder of plain files.
//!
//! An MHTML archive bundles one HTML page with the images, style sheets and
//! scripts it uses. This library splits the archive into its parts, decodes
//! them, gives every resource a local filename and rewrites the page so its
//! references point at those files.
//!
//! ## Features
//!
//! - Quoted-printable and identity transfer encodings
//! - Filenames derived from the resource URI and content type, including
//!   Chromium's `@mhtml.blink` inline style sheets
//! - Configurable handling of filename collisions, resources without a
//!   location and archives with several HTML parts
//! - Optional snapshots of the parsed document for debugging
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use munpack::{ExtractOptions, LocalFileReader, MhtmlExtractor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let reader = LocalFileReader::new(Path::new("page.mht"))?;
//!     let extractor = MhtmlExtractor::open(&reader, ExtractOptions::default()).await?;
//!
//!     for file in extractor.files() {
//!         println!("{}", file);
//!     }
//!
//!     let report = extractor.save(Path::new(".")).await?;
//!     println!("{}", report.folder.display());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod mhtml;

pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{ArchiveSource, LocalFileReader};
pub use mhtml::{ExtractOptions, ExtractReport, MhtmlExtractor, Warning};
