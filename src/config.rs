use anyhow::Result;
use std::path::PathBuf;

use crate::project::ProjectManifest;

/// Resolved settings shared by the build and install pipelines.
#[derive(Debug)]
pub struct Config {
    /// Working directory holding `pyproject.toml`, the package sources
    /// and the binary bundles.
    pub project_dir: PathBuf,
    /// Where finished wheels land and where installs look for them.
    pub dist_dir: PathBuf,
    /// Python interpreter driving the packaging backend and pip.
    pub python: String,
    pub manifest: ProjectManifest,
}

impl Config {
    pub fn new(
        project_dir: Option<PathBuf>,
        dist_dir: Option<PathBuf>,
        python: Option<String>,
    ) -> Result<Self> {
        let (project_dir, dist_dir) = Self::resolve_dirs(project_dir, dist_dir);
        let manifest = ProjectManifest::load(&project_dir)?;
        Ok(Self {
            project_dir,
            dist_dir,
            python: python.unwrap_or_else(|| default_python().to_string()),
            manifest,
        })
    }

    /// Working and output directories from the CLI arguments. The
    /// output directory defaults to `dist/` under the working
    /// directory.
    pub fn resolve_dirs(
        project_dir: Option<PathBuf>,
        dist_dir: Option<PathBuf>,
    ) -> (PathBuf, PathBuf) {
        let project_dir = project_dir.unwrap_or_else(|| PathBuf::from("."));
        let dist_dir = dist_dir.unwrap_or_else(|| project_dir.join("dist"));
        (project_dir, dist_dir)
    }
}

/// Interpreter used when `--python` is not given. Plenty of Unix
/// systems ship no bare `python`, while the Windows installer
/// registers exactly that name.
pub fn default_python() -> &'static str {
    if cfg!(windows) { "python" } else { "python3" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_manifest(dir: &Path) {
        std::fs::write(
            dir.join("pyproject.toml"),
            "[project]\nname = \"hulo\"\nversion = \"0.2.1\"\n",
        )
        .unwrap();
    }

    #[test]
    fn test_resolve_dirs_defaults() {
        let (project, dist) = Config::resolve_dirs(None, None);
        assert_eq!(project, PathBuf::from("."));
        assert_eq!(dist, PathBuf::from("./dist"));
    }

    #[test]
    fn test_resolve_dirs_dist_follows_project() {
        let (project, dist) = Config::resolve_dirs(Some(PathBuf::from("/work/hulo")), None);
        assert_eq!(project, PathBuf::from("/work/hulo"));
        assert_eq!(dist, PathBuf::from("/work/hulo/dist"));
    }

    #[test]
    fn test_resolve_dirs_explicit_dist() {
        let (_, dist) = Config::resolve_dirs(
            Some(PathBuf::from("/work/hulo")),
            Some(PathBuf::from("/tmp/out")),
        );
        assert_eq!(dist, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_new_loads_the_manifest() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());

        let config = Config::new(Some(dir.path().to_path_buf()), None, None).unwrap();
        assert_eq!(config.manifest.name, "hulo");
        assert_eq!(config.dist_dir, dir.path().join("dist"));
        assert_eq!(config.python, default_python());
    }

    #[test]
    fn test_new_honors_python_override() {
        let dir = tempdir().unwrap();
        write_manifest(dir.path());

        let config = Config::new(
            Some(dir.path().to_path_buf()),
            None,
            Some("/opt/py/bin/python3.12".to_string()),
        )
        .unwrap();
        assert_eq!(config.python, "/opt/py/bin/python3.12");
    }

    #[test]
    fn test_new_fails_without_manifest() {
        let dir = tempdir().unwrap();
        let err = Config::new(Some(dir.path().to_path_buf()), None, None).unwrap_err();
        assert!(err.to_string().contains("pyproject.toml"));
    }
}
