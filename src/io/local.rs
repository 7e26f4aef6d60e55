use super::ArchiveSource;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Local archive file on disk
pub struct LocalFileReader {
    path: PathBuf,
    size: u64,
}

impl LocalFileReader {
    pub fn new(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }

    /// Size of the archive in bytes at the time it was opened
    pub fn size(&self) -> u64 {
        self.size
    }
}

#[async_trait]
impl ArchiveSource for LocalFileReader {
    async fn read_all(&self) -> Result<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|source| Error::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}
