mod tar_gz;
mod zip;

use anyhow::{Result, anyhow};
use std::path::Path;

pub use tar_gz::TarGzExtractor;
pub use zip::ZipExtractor;

/// Trait for format-specific bundle extractors
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor: Send + Sync {
    /// Check if this extractor can handle the given archive format
    fn can_handle(&self, archive_path: &Path) -> bool;

    /// Extract the archive into the given directory, preserving the
    /// member paths exactly as stored
    fn extract(&self, archive_path: &Path, extract_to: &Path) -> Result<()>;
}

/// Dispatcher that selects the appropriate extractor for a binary
/// bundle. Windows bundles are ZIP archives, all others gzipped tar.
pub struct BundleExtractor {
    tar_gz: TarGzExtractor,
    zip: ZipExtractor,
}

impl Default for BundleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl BundleExtractor {
    pub fn new() -> Self {
        Self {
            tar_gz: TarGzExtractor,
            zip: ZipExtractor,
        }
    }
}

impl ArchiveExtractor for BundleExtractor {
    fn can_handle(&self, archive_path: &Path) -> bool {
        self.tar_gz.can_handle(archive_path) || self.zip.can_handle(archive_path)
    }

    #[tracing::instrument(skip(self, archive_path, extract_to))]
    fn extract(&self, archive_path: &Path, extract_to: &Path) -> Result<()> {
        if self.tar_gz.can_handle(archive_path) {
            return self.tar_gz.extract(archive_path, extract_to);
        }
        if self.zip.can_handle(archive_path) {
            return self.zip.extract(archive_path, extract_to);
        }
        Err(anyhow!(
            "Unsupported archive format: {}",
            archive_path.display()
        ))
    }
}
