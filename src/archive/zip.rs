use anyhow::{Context, Result};
use log::debug;
use std::fs::{self, File};
use std::path::Path;
use zip::ZipArchive;

use super::ArchiveExtractor;

/// Extractor for .zip bundles
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn can_handle(&self, archive_path: &Path) -> bool {
        let name = archive_path.to_string_lossy().to_lowercase();
        name.ends_with(".zip")
    }

    fn extract(&self, archive_path: &Path, extract_to: &Path) -> Result<()> {
        debug!("Extracting zip bundle to {:?}...", extract_to);
        let file = File::open(archive_path)
            .with_context(|| format!("Failed to open bundle at {:?}", archive_path))?;
        let mut archive = ZipArchive::new(file).with_context(|| "Failed to parse ZIP archive")?;

        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .with_context(|| format!("Failed to read ZIP entry {}", i))?;

            let entry_path = match entry.enclosed_name() {
                Some(path) => path.to_path_buf(),
                None => {
                    debug!("Skipping entry with invalid path");
                    continue;
                }
            };

            let full_path = extract_to.join(&entry_path);

            if entry.is_dir() {
                fs::create_dir_all(&full_path)
                    .with_context(|| format!("Failed to create {:?}", full_path))?;
            } else {
                if let Some(parent) = full_path.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {:?}", parent))?;
                }
                let mut dest_file = File::create(&full_path)
                    .with_context(|| format!("Failed to create {:?}", full_path))?;
                std::io::copy(&mut entry, &mut dest_file)
                    .with_context(|| format!("Failed to extract file {:?}", full_path))?;

                // Set file permissions from archive metadata (Unix only)
                #[cfg(unix)]
                if let Some(mode) = entry.unix_mode() {
                    use std::os::unix::fs::PermissionsExt;
                    if let Err(e) =
                        fs::set_permissions(&full_path, fs::Permissions::from_mode(mode))
                    {
                        debug!("Failed to set permissions on {:?}: {}", full_path, e);
                    }
                }
            }
        }

        Ok(())
    }
}
