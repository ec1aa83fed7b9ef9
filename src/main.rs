use clap::Parser;
use mirrorsync::commands::sync;
use mirrorsync::config::Cli;
use mirrorsync::scheduler::CancelToken;
use mirrorsync::{Config, Logger};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;

    let logger = Logger::to_stdout_and_file(&config.log_file, config.log_level)?;

    // Ctrl+C stops the loop at the next wait; a cycle in progress finishes first.
    let token = CancelToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || handler_token.cancel())?;

    logger.in_scope(|| sync::run(&config, &token))?;

    Ok(())
}
