use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::platform::{HostPlatform, PlatformTag};
use crate::runner::CommandRunner;
use crate::wheel;

/// How an install request was satisfied.
#[derive(Debug, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The platform wheel at this path was pip-installed.
    PlatformWheel(PathBuf),
    /// No usable platform wheel; the stub package was installed.
    Stub,
}

/// Resolves the running host to a platform tag, installs the matching
/// wheel from the output directory, and falls back to the stub package
/// when no wheel fits or pip rejects it. `editable` skips resolution
/// entirely and installs the stub in development mode.
#[tracing::instrument(skip(config, runner))]
pub fn resolve_and_install<R: CommandRunner>(
    config: &Config,
    runner: &R,
    editable: bool,
) -> Result<InstallOutcome> {
    if editable {
        println!(" installing {} (editable)", config.manifest.name);
        install_stub(config, runner, true)?;
        println!(
            "  installed {} {} (editable)",
            config.manifest.name, config.manifest.version
        );
        return Ok(InstallOutcome::Stub);
    }
    install_for_host(config, runner, &HostPlatform::detect())
}

fn install_for_host<R: CommandRunner>(
    config: &Config,
    runner: &R,
    host: &HostPlatform,
) -> Result<InstallOutcome> {
    let (os, arch) = host.tokens();
    let tag = host.tag();
    println!("  resolving {os}/{arch}");

    if tag == PlatformTag::Unknown {
        warn!("Unsupported platform {}/{}", os, arch);
        println!("Warning: unsupported platform {os}/{arch}");
        print_available_wheels(&config.dist_dir)?;
        return fall_back(config, runner);
    }

    let wanted = wheel::wheel_filename(&config.manifest.dist_name(), &config.manifest.version, tag);
    match find_matching_wheel(&config.dist_dir, &wanted)? {
        Some(path) => {
            println!(" installing {}", path.display());
            match pip_install_wheel(config, runner, &path) {
                Ok(()) => {
                    println!(
                        "  installed {} {} ({tag})",
                        config.manifest.name, config.manifest.version
                    );
                    return Ok(InstallOutcome::PlatformWheel(path));
                }
                Err(e) => {
                    warn!("Failed to install {}: {:#}", path.display(), e);
                    println!("Error installing wheel: {e:#}");
                }
            }
        }
        None => println!("Warning: no wheel found for {os}/{arch}"),
    }

    println!("Looking for: {wanted}");
    print_available_wheels(&config.dist_dir)?;
    fall_back(config, runner)
}

/// Installs the stub package, the degraded mode that still gives the
/// user an importable package and a diagnosable setup.
fn fall_back<R: CommandRunner>(config: &Config, runner: &R) -> Result<InstallOutcome> {
    println!(" installing {} (stub package)", config.manifest.name);
    install_stub(config, runner, false)?;
    println!(
        "  installed {} {} (stub)",
        config.manifest.name, config.manifest.version
    );
    Ok(InstallOutcome::Stub)
}

/// First wheel in `dist_dir` matching `filename`. The name carries no
/// wildcard today, but matching through a glob keeps version ranges
/// possible without touching the callers.
fn find_matching_wheel(dist_dir: &Path, filename: &str) -> Result<Option<PathBuf>> {
    let pattern = glob::Pattern::new(filename)
        .with_context(|| format!("Invalid wheel pattern {filename}"))?;
    for name in wheel::wheels_in(dist_dir)? {
        if pattern.matches(&name) {
            debug!("Matched wheel {}", name);
            return Ok(Some(dist_dir.join(name)));
        }
    }
    Ok(None)
}

fn print_available_wheels(dist_dir: &Path) -> Result<()> {
    println!("Available wheels:");
    let wheels = wheel::wheels_in(dist_dir)?;
    if wheels.is_empty() {
        println!("  (none)");
    } else {
        for name in &wheels {
            println!("  - {name}");
        }
    }
    Ok(())
}

fn pip_install_wheel<R: CommandRunner>(
    config: &Config,
    runner: &R,
    wheel_path: &Path,
) -> Result<()> {
    let args = vec![
        "-m".to_string(),
        "pip".to_string(),
        "install".to_string(),
        wheel_path.display().to_string(),
    ];
    runner.run(&config.python, &args, &config.project_dir)
}

fn install_stub<R: CommandRunner>(config: &Config, runner: &R, editable: bool) -> Result<()> {
    let mut args = vec!["-m".to_string(), "pip".to_string(), "install".to_string()];
    if editable {
        args.push("-e".to_string());
    }
    args.push(config.project_dir.display().to_string());
    runner
        .run(&config.python, &args, &config.project_dir)
        .context("Failed to install the stub package")
}
