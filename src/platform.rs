//! Platform tag resolution and binary bundle naming.

use anyhow::{Error, anyhow};
use std::env;
use std::fmt;
use std::str::FromStr;

/// Canonical wheel platform tag for one supported build target.
///
/// The tag names follow the Python packaging conventions: `win_*` for
/// Windows, `macosx_<deployment target>_*` for macOS and
/// `manylinux_2_17_*` for Linux. `Unknown` is the sentinel for any
/// OS/architecture pair outside the supported set; it never maps to a
/// binary bundle and never matches a built wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformTag {
    WinAmd64,
    WinArm64,
    Win32,
    MacosX86_64,
    MacosArm64,
    LinuxX86_64,
    LinuxArm64,
    LinuxI686,
    Unknown,
}

/// Every platform a release ships binary bundles for, in build order.
pub const SUPPORTED_PLATFORMS: [PlatformTag; 8] = [
    PlatformTag::WinAmd64,
    PlatformTag::WinArm64,
    PlatformTag::Win32,
    PlatformTag::MacosX86_64,
    PlatformTag::MacosArm64,
    PlatformTag::LinuxX86_64,
    PlatformTag::LinuxArm64,
    PlatformTag::LinuxI686,
];

impl PlatformTag {
    pub fn as_str(self) -> &'static str {
        match self {
            PlatformTag::WinAmd64 => "win_amd64",
            PlatformTag::WinArm64 => "win_arm64",
            PlatformTag::Win32 => "win32",
            PlatformTag::MacosX86_64 => "macosx_10_9_x86_64",
            PlatformTag::MacosArm64 => "macosx_11_0_arm64",
            PlatformTag::LinuxX86_64 => "manylinux_2_17_x86_64",
            PlatformTag::LinuxArm64 => "manylinux_2_17_aarch64",
            PlatformTag::LinuxI686 => "manylinux_2_17_i686",
            PlatformTag::Unknown => "unknown",
        }
    }

    /// Resolves raw OS and machine identifiers to a canonical tag.
    ///
    /// Accepts the identifiers in any of the spellings the supported
    /// toolchains report (`Darwin`/`macos`, `AMD64`/`x86_64`, ...) and
    /// returns `Unknown` for anything outside the supported set.
    pub fn resolve(os: &str, machine: &str) -> PlatformTag {
        match (normalize_os(os).as_str(), normalize_machine(machine).as_str()) {
            ("windows", "x86_64") => PlatformTag::WinAmd64,
            ("windows", "arm64") => PlatformTag::WinArm64,
            ("windows", "i386") => PlatformTag::Win32,
            ("darwin", "x86_64") => PlatformTag::MacosX86_64,
            ("darwin", "arm64") => PlatformTag::MacosArm64,
            ("linux", "x86_64") => PlatformTag::LinuxX86_64,
            ("linux", "arm64") => PlatformTag::LinuxArm64,
            ("linux", "i386") => PlatformTag::LinuxI686,
            _ => PlatformTag::Unknown,
        }
    }

    /// Name of the binary bundle holding the prebuilt toolchain for this
    /// platform, e.g. `hulo_Windows_x86_64.zip` or `hulo_Linux_arm64.tar.gz`.
    ///
    /// Windows bundles are ZIP archives, everything else is gzipped tar.
    /// Returns `None` for `Unknown`.
    pub fn bundle_filename(self, package: &str) -> Option<String> {
        let (os, arch) = self.bundle_os_arch()?;
        let ext = if self.is_windows() { "zip" } else { "tar.gz" };
        Some(format!("{package}_{os}_{arch}.{ext}"))
    }

    fn is_windows(self) -> bool {
        matches!(
            self,
            PlatformTag::WinAmd64 | PlatformTag::WinArm64 | PlatformTag::Win32
        )
    }

    /// OS and architecture tokens as they appear in bundle filenames.
    /// The OS token is capitalized (release archives are named after the
    /// uname convention: `Windows`, `Darwin`, `Linux`).
    fn bundle_os_arch(self) -> Option<(&'static str, &'static str)> {
        match self {
            PlatformTag::WinAmd64 => Some(("Windows", "x86_64")),
            PlatformTag::WinArm64 => Some(("Windows", "arm64")),
            PlatformTag::Win32 => Some(("Windows", "i386")),
            PlatformTag::MacosX86_64 => Some(("Darwin", "x86_64")),
            PlatformTag::MacosArm64 => Some(("Darwin", "arm64")),
            PlatformTag::LinuxX86_64 => Some(("Linux", "x86_64")),
            PlatformTag::LinuxArm64 => Some(("Linux", "arm64")),
            PlatformTag::LinuxI686 => Some(("Linux", "i386")),
            PlatformTag::Unknown => None,
        }
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SUPPORTED_PLATFORMS
            .iter()
            .find(|tag| tag.as_str() == s)
            .copied()
            .ok_or_else(|| {
                anyhow!(
                    "unknown platform tag '{}' (supported: {})",
                    s,
                    SUPPORTED_PLATFORMS.map(PlatformTag::as_str).join(", ")
                )
            })
    }
}

/// Lowercases an OS identifier and folds the aliases used by the
/// supported toolchains into one token per OS.
pub fn normalize_os(raw: &str) -> String {
    let lower = raw.to_lowercase();
    match lower.as_str() {
        "darwin" | "macos" => "darwin".to_string(),
        _ => lower,
    }
}

/// Lowercases a machine identifier and folds vendor aliases
/// (`AMD64`, `aarch64`, `i686`, ...) into one token per architecture.
pub fn normalize_machine(raw: &str) -> String {
    let lower = raw.to_lowercase();
    match lower.as_str() {
        "x86_64" | "amd64" => "x86_64".to_string(),
        "arm64" | "aarch64" => "arm64".to_string(),
        "i386" | "i686" | "x86" => "i386".to_string(),
        _ => lower,
    }
}

/// Raw platform identity of the running host, as reported by the
/// standard library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    pub os: String,
    pub machine: String,
}

impl HostPlatform {
    pub fn detect() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            machine: env::consts::ARCH.to_string(),
        }
    }

    /// Canonical tag for this host, `Unknown` if unsupported.
    pub fn tag(&self) -> PlatformTag {
        PlatformTag::resolve(&self.os, &self.machine)
    }

    /// Normalized `(os, machine)` token pair, for diagnostics.
    pub fn tokens(&self) -> (String, String) {
        (normalize_os(&self.os), normalize_machine(&self.machine))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_platform_has_a_bundle() {
        for tag in SUPPORTED_PLATFORMS {
            let bundle = tag.bundle_filename("hulo");
            assert!(bundle.is_some(), "no bundle for {tag}");
        }
    }

    #[test]
    fn test_unknown_has_no_bundle() {
        assert_eq!(PlatformTag::Unknown.bundle_filename("hulo"), None);
    }

    #[test]
    fn test_windows_bundles_are_zip() {
        assert_eq!(
            PlatformTag::WinAmd64.bundle_filename("hulo").unwrap(),
            "hulo_Windows_x86_64.zip"
        );
        assert_eq!(
            PlatformTag::WinArm64.bundle_filename("hulo").unwrap(),
            "hulo_Windows_arm64.zip"
        );
        assert_eq!(
            PlatformTag::Win32.bundle_filename("hulo").unwrap(),
            "hulo_Windows_i386.zip"
        );
    }

    #[test]
    fn test_unix_bundles_are_tar_gz() {
        assert_eq!(
            PlatformTag::MacosArm64.bundle_filename("hulo").unwrap(),
            "hulo_Darwin_arm64.tar.gz"
        );
        assert_eq!(
            PlatformTag::LinuxArm64.bundle_filename("hulo").unwrap(),
            "hulo_Linux_arm64.tar.gz"
        );
        assert_eq!(
            PlatformTag::LinuxI686.bundle_filename("hulo").unwrap(),
            "hulo_Linux_i386.tar.gz"
        );
    }

    #[test]
    fn test_resolve_canonical_pairs() {
        assert_eq!(
            PlatformTag::resolve("windows", "x86_64"),
            PlatformTag::WinAmd64
        );
        assert_eq!(
            PlatformTag::resolve("darwin", "arm64"),
            PlatformTag::MacosArm64
        );
        assert_eq!(
            PlatformTag::resolve("linux", "i386"),
            PlatformTag::LinuxI686
        );
    }

    #[test]
    fn test_resolve_folds_aliases() {
        // Windows reports AMD64, Rust reports aarch64, and macOS hosts
        // may report either spelling of the OS.
        assert_eq!(
            PlatformTag::resolve("Windows", "AMD64"),
            PlatformTag::WinAmd64
        );
        assert_eq!(
            PlatformTag::resolve("macos", "aarch64"),
            PlatformTag::MacosArm64
        );
        assert_eq!(
            PlatformTag::resolve("Darwin", "x86_64"),
            PlatformTag::MacosX86_64
        );
        assert_eq!(
            PlatformTag::resolve("Linux", "aarch64"),
            PlatformTag::LinuxArm64
        );
        assert_eq!(PlatformTag::resolve("linux", "i686"), PlatformTag::LinuxI686);
        assert_eq!(PlatformTag::resolve("windows", "x86"), PlatformTag::Win32);
    }

    #[test]
    fn test_bundle_tokens_resolve_back_to_their_tag() {
        // The bundle naming side and the host resolution side must
        // agree for every supported platform, or an installed host
        // could never find the wheel built for it.
        for tag in SUPPORTED_PLATFORMS {
            let (os, arch) = tag.bundle_os_arch().unwrap();
            assert_eq!(PlatformTag::resolve(os, arch), tag, "mismatch for {tag}");
        }
    }

    #[test]
    fn test_resolve_rejects_unsupported_pairs() {
        assert_eq!(PlatformTag::resolve("freebsd", "x86_64"), PlatformTag::Unknown);
        assert_eq!(PlatformTag::resolve("linux", "riscv64"), PlatformTag::Unknown);
        assert_eq!(PlatformTag::resolve("", ""), PlatformTag::Unknown);
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for tag in SUPPORTED_PLATFORMS {
            let parsed: PlatformTag = tag.to_string().parse().unwrap();
            assert_eq!(parsed, tag);
        }
    }

    #[test]
    fn test_from_str_rejects_unknown_tags() {
        let err = "win64".parse::<PlatformTag>().unwrap_err();
        assert!(err.to_string().contains("win_amd64"));
        assert!("unknown".parse::<PlatformTag>().is_err());
    }

    #[test]
    fn test_detect_reports_the_running_host() {
        let host = HostPlatform::detect();
        assert!(!host.os.is_empty());
        assert!(!host.machine.is_empty());
        #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
        assert_eq!(host.tag(), PlatformTag::LinuxX86_64);
        #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
        assert_eq!(host.tag(), PlatformTag::MacosArm64);
        #[cfg(all(target_os = "windows", target_arch = "x86_64"))]
        assert_eq!(host.tag(), PlatformTag::WinAmd64);
    }

    #[test]
    fn test_tokens_are_normalized() {
        let host = HostPlatform {
            os: "Darwin".to_string(),
            machine: "aarch64".to_string(),
        };
        assert_eq!(
            host.tokens(),
            ("darwin".to_string(), "arm64".to_string())
        );
    }

    #[test]
    fn test_tag_strings_match_wheel_conventions() {
        assert_eq!(PlatformTag::MacosX86_64.as_str(), "macosx_10_9_x86_64");
        assert_eq!(PlatformTag::LinuxArm64.as_str(), "manylinux_2_17_aarch64");
        assert_eq!(PlatformTag::Win32.as_str(), "win32");
    }
}
