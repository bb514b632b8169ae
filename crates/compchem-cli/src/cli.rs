use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    name = "compchem-toolkit",
    author = "Antonio M. Ferreira",
    version,
    about = "CompChem Toolkit - shared tooling for computational chemistry projects: logging setup and release automation.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    /// Defaults to `config.toml` in the user configuration directory, if present.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S logging.console=debug
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true, num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the toolkit entry point (the default when no command is given).
    Run,
    /// Inspect or bump the version in a project manifest.
    Version(VersionArgs),
    /// Tag a new version or publish a development build, then build and write release notes.
    Release(ReleaseArgs),
    /// Inspect the toolkit's log output location.
    Logs(LogsArgs),
}

/// Arguments for the `version` subcommand.
#[derive(Args, Debug)]
pub struct VersionArgs {
    #[command(subcommand)]
    pub command: VersionCommands,
}

#[derive(Subcommand, Debug)]
pub enum VersionCommands {
    /// Print the version declared in the manifest.
    Show {
        /// Path to the manifest (Cargo.toml or pyproject.toml).
        #[arg(short, long, value_name = "PATH")]
        manifest: Option<PathBuf>,
    },
    /// Bump the patch version, optionally as a development build.
    Bump {
        /// Path to the manifest (Cargo.toml or pyproject.toml).
        #[arg(short, long, value_name = "PATH")]
        manifest: Option<PathBuf>,

        /// Append a timestamp-based development suffix (X.Y.Z.devN).
        #[arg(long)]
        dev: bool,

        /// Use this Unix timestamp for the development suffix instead of the current time.
        #[arg(long, value_name = "SECONDS", requires = "dev")]
        timestamp: Option<u64>,

        /// Print the new version without writing the manifest.
        #[arg(long)]
        dry_run: bool,
    },
}

/// Arguments for the `release` subcommand.
#[derive(Args, Debug)]
pub struct ReleaseArgs {
    /// Path to the manifest (Cargo.toml or pyproject.toml).
    #[arg(short, long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Write release notes to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub notes: Option<PathBuf>,

    /// Override the build command, e.g. "poetry build".
    #[arg(short, long, value_name = "COMMAND")]
    pub build_command: Option<String>,

    /// Skip the package build step.
    #[arg(long)]
    pub skip_build: bool,

    /// Release even when the current branch is not a release branch.
    #[arg(long)]
    pub any_branch: bool,

    /// Use this Unix timestamp for a development suffix instead of the current time.
    #[arg(long, value_name = "SECONDS")]
    pub timestamp: Option<u64>,

    /// Plan and report every step without tagging, writing or building.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `logs` subcommand.
#[derive(Args, Debug)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsCommands,
}

#[derive(Subcommand, Debug)]
pub enum LogsCommands {
    /// Show the absolute path of the toolkit log file.
    Path,
}
