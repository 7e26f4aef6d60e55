use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::{debug, info, warn};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};
use crate::io::ArchiveSource;

use super::decode::decode_payload;
use super::document::Document;
use super::filename::{derive_filename, extension_of, parse_uri};
use super::parser::MhtmlParser;
use super::structures::{Part, ResourceEntry, TransferEncoding};

/// Name of the rewritten document inside the output folder.
pub const INDEX_FILE: &str = "index.html";

/// What to do when two resources derive the same filename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CollisionPolicy {
    /// The later resource replaces the earlier one
    #[default]
    Overwrite,
    /// The later resource gets a numeric suffix (`name-1.ext`)
    Suffix,
    /// Abort the extraction
    Fail,
}

/// What to do with a resource part that has no `Content-Location`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MissingLocationPolicy {
    #[default]
    Skip,
    Fail,
}

/// What to do when the archive holds more than one HTML part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DocumentPolicy {
    /// The last HTML part becomes the document
    #[default]
    Replace,
    Fail,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub collision: CollisionPolicy,
    pub missing_location: MissingLocationPolicy,
    pub extra_document: DocumentPolicy,
    /// Rewrite every element referencing a resource instead of the first one
    pub rewrite_all: bool,
    /// Directory receiving a snapshot of each parsed document
    pub snapshot_dir: Option<PathBuf>,
}

/// Non-fatal condition met while extracting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    MissingLink { uri: String, filename: String },
    UnsupportedEncoding { location: String, encoding: String },
    Overwritten { filename: String, previous: String, uri: String },
    Renamed { uri: String, from: String, to: String },
    SkippedPart { index: usize, content_type: String },
    ReplacedDocument { index: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingLink { uri, filename } => {
                write!(f, "no element references {uri}, {filename} is extracted unlinked")
            }
            Warning::UnsupportedEncoding { location, encoding } => {
                write!(f, "unsupported transfer encoding {encoding} on {location}, payload kept as-is")
            }
            Warning::Overwritten { filename, previous, uri } => {
                write!(f, "{uri} overwrites {filename} previously taken by {previous}")
            }
            Warning::Renamed { uri, from, to } => {
                write!(f, "{uri} renamed from {from} to {to} to avoid a collision")
            }
            Warning::SkippedPart { index, content_type } => {
                write!(f, "skipping part #{index} ({content_type}) without Content-Location")
            }
            Warning::ReplacedDocument { index } => {
                write!(f, "HTML part #{index} replaces the previous document")
            }
        }
    }
}

/// Summary of a completed extraction
#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub folder: PathBuf,
    /// Resource files written next to `index.html`, in archive order
    pub files: Vec<String>,
    /// Number of attributes pointed at local files
    pub rewritten: usize,
    pub warnings: Vec<Warning>,
}

/// MHTML archive extractor
///
/// Walks every leaf part once: the HTML part becomes the [`Document`], every
/// other part becomes a [`ResourceEntry`] whose reference in the document is
/// rewritten to the local file as soon as the entry is recorded. Nothing
/// touches the filesystem until [`save`](Self::save), apart from optional
/// document snapshots.
pub struct MhtmlExtractor {
    options: ExtractOptions,
    document: Option<Document>,
    resources: Vec<ResourceEntry>,
    positions: HashMap<String, usize>,
    /// Rewrites recorded before the document was seen
    pending: Vec<(String, String)>,
    rewritten: usize,
    warnings: Vec<Warning>,
}

impl MhtmlExtractor {
    pub fn new(options: ExtractOptions) -> Self {
        Self {
            options,
            document: None,
            resources: Vec::new(),
            positions: HashMap::new(),
            pending: Vec::new(),
            rewritten: 0,
            warnings: Vec::new(),
        }
    }

    /// Load and process a whole archive from `source`.
    pub async fn open<S: ArchiveSource + ?Sized>(source: &S, options: ExtractOptions) -> Result<Self> {
        let data = source.read_all().await?;
        debug!("loaded {} bytes from {}", data.len(), source.name());
        Self::from_bytes(&data, options).await
    }

    /// Process an archive already held in memory.
    pub async fn from_bytes(data: &[u8], options: ExtractOptions) -> Result<Self> {
        let parts = MhtmlParser::new(data).leaf_parts()?;
        let mut extractor = Self::new(options);
        for part in parts {
            extractor.process_part(part).await?;
        }
        Ok(extractor)
    }

    /// Feed one leaf part, in archive order.
    pub async fn process_part(&mut self, part: Part) -> Result<()> {
        if part.content_type.is_html() {
            self.add_document(part).await
        } else {
            self.add_resource(part)
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Derived filenames in output order.
    pub fn files(&self) -> Vec<&str> {
        self.resources.iter().map(|r| r.filename.as_str()).collect()
    }

    pub fn resources(&self) -> &[ResourceEntry] {
        &self.resources
    }

    pub fn resource(&self, filename: &str) -> Option<&ResourceEntry> {
        self.positions.get(filename).map(|&i| &self.resources[i])
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Write `index.html` and every resource into `<base>/<folder name>`.
    ///
    /// The folder is created if needed and reused otherwise; existing files
    /// are overwritten. The first failing write aborts the whole operation.
    pub async fn save(&self, base: &Path) -> Result<ExtractReport> {
        let document = self.document.as_ref().ok_or(Error::NoDocument)?;
        let folder = base.join(document.folder_name());

        fs::create_dir_all(&folder)
            .await
            .map_err(|source| Error::Write {
                path: folder.clone(),
                source,
            })?;

        write_file(&folder.join(INDEX_FILE), &document.to_html()?).await?;
        for entry in &self.resources {
            write_file(&folder.join(&entry.filename), &entry.payload).await?;
        }
        info!(
            "wrote {} and {} resources to {}",
            INDEX_FILE,
            self.resources.len(),
            folder.display()
        );

        Ok(ExtractReport {
            folder,
            files: self.files().into_iter().map(str::to_string).collect(),
            rewritten: self.rewritten,
            warnings: self.warnings.clone(),
        })
    }

    async fn add_document(&mut self, part: Part) -> Result<()> {
        if self.document.is_some() {
            match self.options.extra_document {
                DocumentPolicy::Fail => return Err(Error::MultipleDocuments { index: part.index }),
                DocumentPolicy::Replace => self.warn(Warning::ReplacedDocument { index: part.index }),
            }
        }

        self.check_encoding(&part);
        let payload = decode_payload(&part)?;
        let html = String::from_utf8_lossy(&payload);
        let document = Document::parse(&html, part.content_type.clone(), part.location.clone());
        info!(
            "document {} extracts into {}",
            part.describe(),
            document.folder_name()
        );

        if let Some(dir) = &self.options.snapshot_dir {
            let path = document.write_snapshot(dir).await?;
            debug!("snapshot written to {}", path.display());
        }

        self.document = Some(document);
        for (uri, filename) in std::mem::take(&mut self.pending) {
            self.rewrite(&uri, &filename);
        }
        Ok(())
    }

    fn add_resource(&mut self, part: Part) -> Result<()> {
        let Some(uri) = part.location.clone() else {
            let content_type = part.content_type.to_string();
            return match self.options.missing_location {
                MissingLocationPolicy::Fail => Err(Error::MissingLocation {
                    index: part.index,
                    content_type,
                }),
                MissingLocationPolicy::Skip => {
                    self.warn(Warning::SkippedPart {
                        index: part.index,
                        content_type,
                    });
                    Ok(())
                }
            };
        };

        self.check_encoding(&part);
        let payload = decode_payload(&part)?;
        let uri_parts = parse_uri(&uri)?;
        let derived = derive_filename(&uri_parts.path, &part.content_type);
        let filename = self.claim_filename(derived, &uri)?;
        debug!("file_name {filename}");

        let entry = ResourceEntry {
            original_uri: uri.clone(),
            local_path: PathBuf::from(&uri_parts.path),
            uri_parts,
            extension: extension_of(&filename),
            filename: filename.clone(),
            content_type: part.content_type,
            payload,
        };
        match self.positions.get(&filename) {
            Some(&i) => self.resources[i] = entry,
            None => {
                self.positions.insert(filename.clone(), self.resources.len());
                self.resources.push(entry);
            }
        }

        if self.document.is_some() {
            self.rewrite(&uri, &filename);
        } else {
            self.pending.push((uri, filename));
        }
        Ok(())
    }

    /// Apply the collision policy to a freshly derived filename.
    fn claim_filename(&mut self, name: String, uri: &str) -> Result<String> {
        let reserved = name == INDEX_FILE;
        let previous = match self.resource(&name) {
            Some(entry) => entry.original_uri.clone(),
            None if reserved => "the document".to_string(),
            None => return Ok(name),
        };

        match self.options.collision {
            CollisionPolicy::Fail => Err(Error::Collision {
                name,
                uri: uri.to_string(),
                existing: previous,
            }),
            // the document itself is never overwritten
            CollisionPolicy::Overwrite if !reserved => {
                self.warn(Warning::Overwritten {
                    filename: name.clone(),
                    previous,
                    uri: uri.to_string(),
                });
                Ok(name)
            }
            _ => {
                let unique = self.unique_name(&name);
                self.warn(Warning::Renamed {
                    uri: uri.to_string(),
                    from: name,
                    to: unique.clone(),
                });
                Ok(unique)
            }
        }
    }

    fn unique_name(&self, name: &str) -> String {
        let path = Path::new(name);
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        let extension = path.extension().map(|e| e.to_string_lossy().into_owned());

        let mut n = 1;
        loop {
            let candidate = match &extension {
                Some(ext) => format!("{stem}-{n}.{ext}"),
                None => format!("{stem}-{n}"),
            };
            if candidate != INDEX_FILE && !self.positions.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn rewrite(&mut self, uri: &str, filename: &str) {
        let Some(document) = self.document.as_mut() else {
            return;
        };
        let count = document.rewrite(uri, filename, self.options.rewrite_all);
        if count == 0 {
            self.warn(Warning::MissingLink {
                uri: uri.to_string(),
                filename: filename.to_string(),
            });
        }
        self.rewritten += count;
    }

    fn check_encoding(&mut self, part: &Part) {
        if let TransferEncoding::Unknown(encoding) = &part.transfer_encoding {
            self.warn(Warning::UnsupportedEncoding {
                location: part.describe(),
                encoding: encoding.clone(),
            });
        }
    }

    fn warn(&mut self, warning: Warning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }
}

async fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    let to_error = |source: std::io::Error| Error::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = fs::File::create(path).await.map_err(to_error)?;
    file.write_all(data).await.map_err(to_error)?;
    file.flush().await.map_err(to_error)
}
