mod local;

pub use local::LocalFileReader;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for loading a complete archive from a data source
///
/// MHTML parsing needs the whole document in memory, so sources hand back
/// every byte at once rather than offering random access.
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Read the full archive contents
    async fn read_all(&self) -> Result<Vec<u8>>;

    /// Human readable name of the source, used in log messages
    fn name(&self) -> String;
}

#[async_trait]
impl ArchiveSource for Vec<u8> {
    async fn read_all(&self) -> Result<Vec<u8>> {
        Ok(self.clone())
    }

    fn name(&self) -> String {
        "<memory>".to_string()
    }
}
