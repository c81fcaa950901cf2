use anyhow::{Context, Result, anyhow, bail};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::{ArchiveExtractor, BundleExtractor};
use crate::config::Config;
use crate::package_data::{self, DOCS_SUBTREE};
use crate::platform::PlatformTag;
use crate::runner::CommandRunner;
use crate::setup_py;
use crate::stage::{self, StagingDir};
use crate::wheel;

/// Python module invoked as `python -m build --wheel`.
pub const BACKEND_MODULE: &str = "build";

/// Project files copied verbatim into every staging directory so the
/// packaging backend sees a complete source tree.
const AUX_FILES: [&str; 3] = ["README.md", "LICENSE", "MANIFEST.in"];

/// Outcome of one build run across a set of platforms.
#[derive(Debug)]
pub struct BuildSummary {
    pub succeeded: usize,
    pub total: usize,
    /// Listing of the output directory after the run.
    pub wheels: Vec<String>,
}

/// Assembles per-platform wheels: stages the package sources, unpacks
/// the matching binary bundle on top, synthesizes `setup.py`, drives
/// the packaging backend and retags the result.
pub struct WheelBuilder<'a, R: CommandRunner> {
    config: &'a Config,
    runner: &'a R,
    extractor: BundleExtractor,
}

impl<'a, R: CommandRunner> WheelBuilder<'a, R> {
    pub fn new(config: &'a Config, runner: &'a R) -> Self {
        Self {
            config,
            runner,
            extractor: BundleExtractor::new(),
        }
    }

    /// Builds every platform in `tags`, in order. A failure is
    /// confined to the platform it occurred on; the remaining builds
    /// still run. Prints a progress line per platform, then the tally
    /// and the listing of wheels in the output directory.
    #[tracing::instrument(skip(self, tags))]
    pub fn build_all(&self, tags: &[PlatformTag]) -> Result<BuildSummary> {
        let mut succeeded = 0;
        for &tag in tags {
            println!("   building {tag}");
            match self.build_platform(tag) {
                Ok(wheels) => {
                    succeeded += 1;
                    for path in &wheels {
                        println!("    created {}", path.display());
                    }
                }
                Err(e) => {
                    warn!("Build for {} failed: {:#}", tag, e);
                    println!("     failed {tag}: {e:#}");
                }
            }
        }

        println!();
        println!(
            "Build completed: {}/{} wheels created",
            succeeded,
            tags.len()
        );

        let wheels = wheel::wheels_in(&self.config.dist_dir)?;
        if succeeded > 0 && !wheels.is_empty() {
            println!();
            println!("Generated wheel files:");
            for name in &wheels {
                println!("  - {name}");
            }
        }

        Ok(BuildSummary {
            succeeded,
            total: tags.len(),
            wheels,
        })
    }

    /// Assembles and builds the wheel for one platform, returning the
    /// paths of the wheels moved into the output directory.
    ///
    /// Prerequisite checks run before the staging directory is
    /// created, so a missing bundle leaves the working directory
    /// untouched. Once staging exists, its guard removes it again on
    /// every exit path.
    #[tracing::instrument(skip(self))]
    pub fn build_platform(&self, tag: PlatformTag) -> Result<Vec<PathBuf>> {
        let manifest = &self.config.manifest;
        let project_dir = &self.config.project_dir;

        let bundle_name = tag
            .bundle_filename(&manifest.name)
            .ok_or_else(|| anyhow!("No binary bundle mapping for {tag}"))?;
        let bundle_path = project_dir.join(&bundle_name);
        if !bundle_path.is_file() {
            bail!("Binary bundle {} not found", bundle_name);
        }

        let package_name = manifest.package_dir();
        let package_src = project_dir.join(&package_name);
        if !package_src.is_dir() {
            bail!("Package directory {} not found", package_name);
        }

        let staging = StagingDir::create(project_dir, tag)?;
        let package_dest = staging.path().join(&package_name);

        stage::copy_dir_all(&package_src, &package_dest)?;
        self.extractor.extract(&bundle_path, &package_dest)?;

        // Standard library documents ship inside the package; bundle
        // contents with the same layout merge with the project's copy.
        let docs_src = project_dir.join(DOCS_SUBTREE);
        if docs_src.is_dir() {
            stage::copy_dir_all(&docs_src, &package_dest.join(DOCS_SUBTREE))?;
        }

        for name in top_level_markdown(project_dir)? {
            fs::copy(project_dir.join(&name), package_dest.join(&name))
                .with_context(|| format!("Failed to copy {}", name))?;
        }

        let package_data = package_data::collect_package_data(&package_dest)?;
        debug!(
            "Declaring {} package_data entries for {}",
            package_data.len(),
            tag
        );
        let descriptor = setup_py::render_setup_py(manifest, tag, &package_data);
        fs::write(staging.path().join("setup.py"), descriptor)
            .context("Failed to write setup.py")?;

        for name in AUX_FILES {
            fs::copy(project_dir.join(name), staging.path().join(name))
                .with_context(|| format!("Failed to copy {}", name))?;
        }
        fs::copy(&bundle_path, staging.path().join(&bundle_name))
            .with_context(|| format!("Failed to copy {}", bundle_name))?;

        let args = vec![
            "-m".to_string(),
            BACKEND_MODULE.to_string(),
            "--wheel".to_string(),
        ];
        self.runner
            .run(&self.config.python, &args, staging.path())
            .with_context(|| format!("Packaging backend failed for {tag}"))?;

        self.collect_wheels(&staging, tag)
    }

    /// Moves the backend's wheels out of the staging `dist/`,
    /// rewriting the generic platform portion of each filename to
    /// `tag`. A backend that exits zero without producing a wheel is
    /// still a failed build.
    fn collect_wheels(&self, staging: &StagingDir, tag: PlatformTag) -> Result<Vec<PathBuf>> {
        let staged_dist = staging.path().join("dist");
        let produced = wheel::wheels_in(&staged_dist)?;
        if produced.is_empty() {
            bail!("Packaging backend produced no wheel for {tag}");
        }

        fs::create_dir_all(&self.config.dist_dir)
            .with_context(|| format!("Failed to create {}", self.config.dist_dir.display()))?;

        let mut moved = Vec::new();
        for name in produced {
            let target_name = wheel::retag_filename(&name, tag);
            let source = staged_dist.join(&name);
            let target = self.config.dist_dir.join(&target_name);
            move_file(&source, &target)?;
            moved.push(target);
        }
        Ok(moved)
    }
}

/// Markdown files at the top level of the working directory, sorted.
fn top_level_markdown(project_dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(project_dir)
        .with_context(|| format!("Failed to read {}", project_dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("Failed to read {}", project_dir.display()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && name.to_lowercase().ends_with(".md")
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Renames with a copy fallback so an output directory on another
/// filesystem still works. An existing target is replaced, which keeps
/// rebuilds idempotent.
fn move_file(source: &Path, target: &Path) -> Result<()> {
    if target.exists() {
        fs::remove_file(target)
            .with_context(|| format!("Failed to replace {}", target.display()))?;
    }
    if fs::rename(source, target).is_err() {
        fs::copy(source, target).with_context(|| {
            format!(
                "Failed to move {} to {}",
                source.display(),
                target.display()
            )
        })?;
        fs::remove_file(source)
            .with_context(|| format!("Failed to remove {}", source.display()))?;
    }
    Ok(())
}
