//! Rally TUI entry point.

use clap::Parser;
use rally_core::SystemEnv;
use rally_tui::{Args, Runtime, TerminalDriver, logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    logging::init(&args.log_file, &args.log_level)?;

    let config = args.client_config();
    tracing::info!(url = %config.url, max_attempts = config.link.max_attempts, "starting");

    let driver = TerminalDriver::new()?;
    let runtime = Runtime::new(driver, SystemEnv::new(), config);
    runtime.run().await?;

    tracing::info!("exiting");
    Ok(())
}
