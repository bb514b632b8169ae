mod cli;
mod commands;
mod config;
mod error;
mod git;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!(
        "CompChem Toolkit CLI v{} starting up.",
        env!("CARGO_PKG_VERSION")
    );
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let config = config::build_config(cli.config.as_deref(), &cli.set_values)?;
    debug!("Effective configuration: {:?}", config);

    let command_result = match cli.command {
        None | Some(Commands::Run) => {
            info!("Dispatching to 'run' command.");
            commands::run::run(&config).await
        }
        Some(Commands::Version(args)) => {
            info!("Dispatching to 'version' command.");
            commands::version::run(args, &config).await
        }
        Some(Commands::Release(args)) => {
            info!("Dispatching to 'release' command.");
            commands::release::run(args, &config, cli.quiet).await
        }
        Some(Commands::Logs(args)) => {
            info!("Dispatching to 'logs' command.");
            commands::logs::run(args, &config).await
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
