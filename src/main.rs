use anyhow::Result;
use binwheel::builder::WheelBuilder;
use binwheel::config::Config;
use binwheel::platform::{PlatformTag, SUPPORTED_PLATFORMS};
use binwheel::runner::SystemRunner;
use binwheel::{installer, stage, wheel};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

/// binwheel - platform wheel packager for prebuilt toolchains
///
/// Packages per-platform binary bundles into Python wheels and
/// installs the wheel matching the running host.
///
/// Examples:
///   binwheel build                    # Build wheels for all supported platforms
///   binwheel install                  # Install the wheel for this host
#[derive(Parser, Debug)]
#[command(author, version = env!("BINWHEEL_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Working directory with pyproject.toml and the binary bundles
    #[arg(
        long = "project-dir",
        short = 'C',
        value_name = "PATH",
        global = true
    )]
    pub project_dir: Option<PathBuf>,

    /// Output directory for wheels (defaults to <project-dir>/dist)
    #[arg(long = "dist-dir", value_name = "PATH", global = true)]
    pub dist_dir: Option<PathBuf>,

    /// Python interpreter for the packaging backend and pip (also via BINWHEEL_PYTHON)
    #[arg(long, env = "BINWHEEL_PYTHON", value_name = "EXE", global = true)]
    pub python: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Build platform wheels from the binary bundles
    Build(BuildArgs),

    /// Install the wheel matching this host, or the stub package
    Install(InstallArgs),

    /// List the wheels in the output directory
    List,

    /// Remove staging directories, and optionally built wheels
    Clean(CleanArgs),
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Platform tags to build (default: every supported platform)
    #[arg(long = "platform", value_name = "TAG")]
    pub platforms: Vec<PlatformTag>,
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    /// Development install: the stub package in editable mode, no
    /// platform resolution
    #[arg(long, short = 'e')]
    pub editable: bool,
}

#[derive(clap::Args, Debug)]
pub struct CleanArgs {
    /// Also remove the wheels from the output directory
    #[arg(long)]
    pub dist: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runner = SystemRunner;

    match cli.command {
        Commands::Build(args) => {
            let config = Config::new(cli.project_dir, cli.dist_dir, cli.python)?;
            let tags = if args.platforms.is_empty() {
                SUPPORTED_PLATFORMS.to_vec()
            } else {
                args.platforms
            };
            WheelBuilder::new(&config, &runner).build_all(&tags)?;
        }
        Commands::Install(args) => {
            let config = Config::new(cli.project_dir, cli.dist_dir, cli.python)?;
            installer::resolve_and_install(&config, &runner, args.editable)?;
        }
        Commands::List => {
            let (_, dist_dir) = Config::resolve_dirs(cli.project_dir, cli.dist_dir);
            let wheels = wheel::wheels_in(&dist_dir)?;
            if wheels.is_empty() {
                println!("No wheels in {}", dist_dir.display());
            } else {
                println!("Wheels in {}:", dist_dir.display());
                for name in &wheels {
                    println!("  - {name}");
                }
            }
        }
        Commands::Clean(args) => {
            let (project_dir, dist_dir) = Config::resolve_dirs(cli.project_dir, cli.dist_dir);
            let removed = stage::clean_staging(&project_dir)?;
            for name in &removed {
                println!("    removed {name}");
            }
            let mut count = removed.len();
            if args.dist {
                for name in wheel::wheels_in(&dist_dir)? {
                    fs::remove_file(dist_dir.join(&name))?;
                    println!("    removed {name}");
                    count += 1;
                }
            }
            println!("Cleaned {count} entries");
        }
    }
    Ok(())
}
