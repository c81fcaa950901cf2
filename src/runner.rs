//! Subprocess execution seam for the packaging backend and pip.

use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;
use std::process::Command;

/// Seam for the external programs the pipeline drives: the Python
/// packaging backend and pip. Output streams through to the caller's
/// terminal; only the exit status is interpreted.
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<()>;
}

/// Runs commands on the real system.
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<()> {
        debug!("Running {} {:?} in {:?}", program, args, cwd);
        let status = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .status()
            .with_context(|| format!("Failed to execute {program}"))?;
        if !status.success() {
            bail!("{} {} exited with {}", program, args.join(" "), status);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    #[cfg(unix)]
    fn test_run_succeeds_for_zero_exit() {
        let dir = tempdir().unwrap();
        SystemRunner
            .run("true", &[], dir.path())
            .unwrap();
    }

    #[test]
    #[cfg(unix)]
    fn test_run_reports_nonzero_exit() {
        let dir = tempdir().unwrap();
        let err = SystemRunner.run("false", &[], dir.path()).unwrap_err();
        assert!(err.to_string().contains("false"));
    }

    #[test]
    fn test_run_reports_missing_program() {
        let dir = tempdir().unwrap();
        let err = SystemRunner
            .run("binwheel-no-such-program", &[], dir.path())
            .unwrap_err();
        assert!(err.to_string().contains("Failed to execute"));
    }

    #[test]
    #[cfg(unix)]
    fn test_run_uses_the_given_working_directory() {
        let dir = tempdir().unwrap();
        SystemRunner
            .run(
                "touch",
                &["marker.txt".to_string()],
                dir.path(),
            )
            .unwrap();
        assert!(dir.path().join("marker.txt").exists());
    }
}
