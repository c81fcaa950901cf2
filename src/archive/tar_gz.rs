use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use log::debug;
use std::fs::File;
use std::path::Path;
use tar::Archive;

use super::ArchiveExtractor;

/// Extractor for .tar.gz / .tgz bundles
pub struct TarGzExtractor;

impl ArchiveExtractor for TarGzExtractor {
    fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".tar.gz") || name.ends_with(".tgz")
    }

    fn extract(&self, archive_path: &Path, extract_to: &Path) -> Result<()> {
        debug!("Extracting tar.gz bundle to {:?}...", extract_to);
        let file = File::open(archive_path)
            .with_context(|| format!("Failed to open bundle at {:?}", archive_path))?;
        let mut archive = Archive::new(GzDecoder::new(file));
        // unpack preserves Unix modes, so extracted toolchain binaries
        // stay executable
        archive
            .unpack(extract_to)
            .with_context(|| format!("Failed to extract archive {:?}", archive_path))?;
        Ok(())
    }
}
