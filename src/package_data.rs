use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Shared library suffixes bundled alongside the toolchain executables.
const SHARED_LIB_SUFFIXES: [&str; 2] = [".so", ".dylib"];

/// Directory of standard library documents shipped inside the package.
pub const DOCS_SUBTREE: &str = "std";

/// Whether a staged file is part of the binary payload: Windows
/// executables by `.exe` suffix, Unix executables by having no
/// extension at all, shared libraries by suffix.
fn is_binary_payload(name: &str) -> bool {
    let lower = name.to_lowercase();
    if lower.ends_with(".exe") {
        return true;
    }
    if SHARED_LIB_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return true;
    }
    Path::new(name).extension().is_none()
}

fn is_markdown(name: &str) -> bool {
    name.to_lowercase().ends_with(".md")
}

/// Scans a staged package directory and returns the `package_data`
/// entries to declare: binary payload files and Markdown documents at
/// the top level, plus Markdown documents one level down in `std/`.
/// Paths are `/`-separated and relative to the package directory, and
/// the result is sorted within each class so repeated builds declare
/// identical manifests.
#[tracing::instrument]
pub fn collect_package_data(package_dir: &Path) -> Result<Vec<String>> {
    let mut binaries = Vec::new();
    let mut documents = Vec::new();

    for name in file_names(package_dir)? {
        if is_binary_payload(&name) {
            binaries.push(name);
        } else if is_markdown(&name) {
            documents.push(name);
        }
    }

    let docs_dir = package_dir.join(DOCS_SUBTREE);
    let mut std_documents = Vec::new();
    if docs_dir.is_dir() {
        for name in file_names(&docs_dir)? {
            if is_markdown(&name) {
                std_documents.push(format!("{DOCS_SUBTREE}/{name}"));
            }
        }
    }

    binaries.sort();
    documents.sort();
    std_documents.sort();

    let mut entries = binaries;
    entries.append(&mut documents);
    entries.append(&mut std_documents);
    Ok(entries)
}

/// Plain file names in `dir`, skipping subdirectories and names that
/// are not valid UTF-8.
fn file_names(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => debug!("Skipping non-UTF-8 filename {:?}", name),
        }
    }
    Ok(names)
}
