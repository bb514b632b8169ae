use crate::config::AppConfig;
use crate::error::Result;
use compchem_toolkit::logging::{create_logger_or_fallback, named_logging};
use tracing::info;

pub const PROG_NAME: &str = "compchem-toolkit";

pub async fn run(config: &AppConfig) -> Result<()> {
    let message = announce(config);
    println!("{}", message);
    Ok(())
}

/// Creates the toolkit logger and records the start-up announcement. A log
/// file that cannot be opened only costs the file output.
fn announce(config: &AppConfig) -> String {
    let logger = create_logger_or_fallback(&config.logger);
    info!("Toolkit logger '{}' ready.", logger.name());

    let message = named_logging(Some(&logger), "main", &[&PROG_NAME], |logger| {
        let message = format!("Running {}", PROG_NAME);
        logger.info(&message);
        Ok::<_, std::convert::Infallible>(message)
    })
    .unwrap_or_else(|never| match never {});
    logger.flush();
    message
}
