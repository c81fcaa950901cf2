//! Wheel filename conventions (tagging, retagging, listing).

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::platform::PlatformTag;

/// Python and ABI tags shared by every wheel this tool produces. The
/// payload is a prebuilt native binary, so any Python 3 works and no
/// ABI is involved.
pub const LANGUAGE_TAG: &str = "py3-none";

/// Filename suffix of the platform-independent wheel the packaging
/// backend emits before retagging.
pub const GENERIC_WHEEL_SUFFIX: &str = "py3-none-any.whl";

/// Suffix carrying the platform tag, e.g. `py3-none-win_amd64.whl`.
pub fn platform_wheel_suffix(tag: PlatformTag) -> String {
    format!("{LANGUAGE_TAG}-{tag}.whl")
}

/// Full wheel filename for a distribution at a given version and
/// platform, e.g. `hulo-0.2.1-py3-none-manylinux_2_17_x86_64.whl`.
pub fn wheel_filename(dist_name: &str, version: &str, tag: PlatformTag) -> String {
    format!("{dist_name}-{version}-{LANGUAGE_TAG}-{tag}.whl")
}

/// Rewrites a backend-produced wheel filename so its platform portion
/// names `tag` instead of `any`. Filenames without the generic suffix
/// come back unchanged.
pub fn retag_filename(filename: &str, tag: PlatformTag) -> String {
    filename.replace(GENERIC_WHEEL_SUFFIX, &platform_wheel_suffix(tag))
}

/// Wheel filenames in `dir`, sorted. An absent directory reads as
/// empty rather than an error so diagnostics can run before any build.
pub fn wheels_in(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))?;
    let mut wheels = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read {}", dir.display()))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str()
            && name.to_lowercase().ends_with(".whl")
        {
            wheels.push(name.to_string());
        }
    }
    wheels.sort();
    Ok(wheels)
}
