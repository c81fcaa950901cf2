//! Staging directory lifecycle (create, guard, clean).

use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::platform::{PlatformTag, SUPPORTED_PLATFORMS};

/// Name of the throwaway assembly directory for one platform build,
/// always directly under the working directory.
pub fn staging_dir_name(tag: PlatformTag) -> String {
    format!("stage_{tag}")
}

/// RAII guard for a per-platform staging directory. The directory is
/// removed on drop, so every exit path of a build (success or failure)
/// leaves the working directory clean.
pub struct StagingDir {
    path: PathBuf,
}

impl StagingDir {
    /// Creates a fresh staging directory for `tag`, first destroying
    /// any stale one left behind by an interrupted earlier run.
    pub fn create(project_dir: &Path, tag: PlatformTag) -> Result<Self> {
        let path = project_dir.join(staging_dir_name(tag));
        if path.exists() {
            debug!("Removing stale staging directory {:?}", path);
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove stale {}", path.display()))?;
        }
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_dir_all(&self.path) {
            debug!("Failed to remove staging directory {:?}: {}", self.path, e);
        }
    }
}

/// Removes leftover staging directories for every supported platform.
/// Returns the names of the directories that were removed.
pub fn clean_staging(project_dir: &Path) -> Result<Vec<String>> {
    let mut removed = Vec::new();
    for tag in SUPPORTED_PLATFORMS {
        let name = staging_dir_name(tag);
        let path = project_dir.join(&name);
        if path.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
            removed.push(name);
        }
    }
    Ok(removed)
}

/// Recursively copies a directory tree. Symlinks are followed, which
/// matches how the toolchain release archives are laid out.
pub fn copy_dir_all(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    let entries =
        fs::read_dir(src).with_context(|| format!("Failed to read {}", src.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", src.display()))?;
        let src_path = entry.path();
        let dest_path = dest.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_all(&src_path, &dest_path)?;
        } else {
            fs::copy(&src_path, &dest_path).with_context(|| {
                format!(
                    "Failed to copy {} to {}",
                    src_path.display(),
                    dest_path.display()
                )
            })?;
        }
    }
    Ok(())
}
