//! # Morning Board Application Entry Point
//!
//! This binary wires configuration, data sources and the board together and hands
//! them to the poll loop. It supports both production mode (the real board) and a
//! dry-run mode (`BOARD_DRY_RUN=true`) that prints every slide to stdout.

// Test modules
#[cfg(test)]
mod tests;

use anyhow::Context;
use log::{error, info};
use morning_board_lib::config::Config;
use morning_board_lib::display::{DisplaySink, StdoutSink, Vestaboard};
use morning_board_lib::poll::{PollLoop, SystemClock};
use morning_board_lib::session::BoardSession;
use morning_board_lib::sources::HttpSources;
use std::time::Duration;

/// Build the session around `display` and poll forever.
async fn serve<D: DisplaySink>(config: &Config, display: D) -> anyhow::Result<()> {
    let sources = HttpSources::new(config).context("build HTTP client")?;
    let mut session = BoardSession::new(config, sources, display);
    let poll = PollLoop::from_config(&config.poll);

    info!("Polling every {:?}", poll.interval());
    poll.run(&mut session, &SystemClock, None).await;
    Ok(())
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().context("invalid configuration")?;
    info!(
        "Service window {} ({} slides), bus {} at {}",
        config.service.window,
        config.slides.len(),
        config.bus.number.as_deref().unwrap_or("<unset>"),
        config.bus.expected_time.format("%H:%M")
    );

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;

    let result = rt.block_on(async {
        if config.display.dry_run {
            info!("Dry run: slides go to stdout");
            serve(&config, StdoutSink::new()).await
        } else {
            let timeout = Duration::from_secs(config.poll.fetch_timeout_secs);
            let board = Vestaboard::new(&config.display, timeout).context("connect to board")?;
            serve(&config, board).await
        }
    });

    // The poll loop only ends on a startup failure; a supervisor restarts us
    if let Err(e) = &result {
        error!("Morning board stopped: {e:#}");
    }
    result
}
