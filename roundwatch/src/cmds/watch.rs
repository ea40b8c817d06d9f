//! The dashboard: refresh loops in the background, a redraw loop in front.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use roundwatch_node::constants::DEFAULT_DRAW_INTERVAL_MS;
use roundwatch_node::logging::init_logging;
use roundwatch_node::{Aggregator, Config, PauseSwitch, Scheduler};
use roundwatch_state::StateHandle;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use crate::render;

const CLEAR_SCREEN: &str = "\x1B[2J\x1B[H";

#[derive(Debug, Parser)]
pub struct Opts {
    /// Path to a JSON config file; flags override its values
    #[clap(long, env = "ROUNDWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Tendermint RPC address
    #[clap(long, env = "ROUNDWATCH_RPC_HOST")]
    pub rpc_host: Option<String>,

    /// Where validator monikers and upgrade plans come from: tendermint, cosmos-rpc or cosmos-lcd
    #[clap(long)]
    pub chain_type: Option<String>,

    /// Cosmos LCD address, required with --chain-type cosmos-lcd
    #[clap(long, env = "ROUNDWATCH_LCD_HOST")]
    pub lcd_host: Option<String>,

    /// Provider chain RPC address when watching a consumer chain
    #[clap(long, env = "ROUNDWATCH_PROVIDER_RPC_HOST")]
    pub provider_rpc_host: Option<String>,

    /// Chain ID of the watched consumer chain, required with --provider-rpc-host
    #[clap(long)]
    pub consumer_chain_id: Option<String>,

    /// Consensus refresh interval in milliseconds
    #[clap(long)]
    pub refresh_rate_ms: Option<u64>,

    /// Validator roster refresh interval in milliseconds
    #[clap(long)]
    pub validators_refresh_rate_ms: Option<u64>,

    /// Node status refresh interval in milliseconds
    #[clap(long)]
    pub chain_info_refresh_rate_ms: Option<u64>,

    /// Upgrade plan refresh interval in milliseconds
    #[clap(long)]
    pub upgrade_refresh_rate_ms: Option<u64>,

    /// Block time refresh interval in milliseconds
    #[clap(long)]
    pub block_time_refresh_rate_ms: Option<u64>,

    /// How many blocks back the average block time looks
    #[clap(long)]
    pub blocks_behind: Option<i64>,

    /// Show a "halt" upgrade at this height instead of the chain's upgrade plan
    #[clap(long)]
    pub halt_height: Option<i64>,

    #[clap(long)]
    pub request_timeout_secs: Option<u64>,

    #[clap(long, env = "ROUNDWATCH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for roundwatch.log; logs go to stderr if unset
    #[clap(long)]
    pub logs_path: Option<PathBuf>,

    /// Redraw interval in milliseconds
    #[clap(long, default_value_t = DEFAULT_DRAW_INTERVAL_MS)]
    pub draw_interval_ms: u64,
}

impl Opts {
    fn to_config(&self) -> Config {
        Config {
            rpc_host: self.rpc_host.clone(),
            chain_type: self.chain_type.clone(),
            lcd_host: self.lcd_host.clone(),
            provider_rpc_host: self.provider_rpc_host.clone(),
            consumer_chain_id: self.consumer_chain_id.clone(),
            refresh_rate_ms: self.refresh_rate_ms,
            validators_refresh_rate_ms: self.validators_refresh_rate_ms,
            chain_info_refresh_rate_ms: self.chain_info_refresh_rate_ms,
            upgrade_refresh_rate_ms: self.upgrade_refresh_rate_ms,
            block_time_refresh_rate_ms: self.block_time_refresh_rate_ms,
            blocks_behind: self.blocks_behind,
            halt_height: self.halt_height,
            request_timeout_secs: self.request_timeout_secs,
            log_level: self.log_level.clone(),
            logs_path: self.logs_path.clone(),
        }
    }

    pub fn load_config(&self) -> Result<Config> {
        let file_config = match &self.config {
            Some(path) => Config::from_filepath(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        Ok(file_config.merge(self.to_config()))
    }
}

/// What a line typed on stdin asks for
#[derive(Debug, PartialEq, Eq)]
enum Command {
    TogglePause,
    Quit,
    Unknown,
}

fn parse_command(line: &str) -> Command {
    match line.trim() {
        "p" => Command::TogglePause,
        "q" => Command::Quit,
        _ => Command::Unknown,
    }
}

pub async fn run(opts: &Opts) -> Result<()> {
    let settings = opts.load_config()?.validate()?;
    init_logging(settings.logs_path.clone(), settings.log_level.clone())?;

    log::info!("Watching {} ({:?})", settings.rpc_host, settings.chain_type);

    let aggregator = Arc::new(Aggregator::from_settings(&settings)?);
    let state = StateHandle::default();
    let pause = PauseSwitch::new();
    let (shutdown_tx, _) = broadcast::channel(1);

    let handles = Scheduler::new(aggregator, state.clone(), settings.intervals.clone(), pause.clone()).spawn(&shutdown_tx);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut draw = tokio::time::interval(Duration::from_millis(opts.draw_interval_ms.max(1)));

    loop {
        tokio::select! {
            _ = draw.tick() => {
                let snapshot = state.snapshot().await;
                let text = render::render(&snapshot, Utc::now(), pause.is_paused());
                redraw(&text)?;
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match parse_command(&line) {
                        Command::TogglePause => {
                            let paused = pause.toggle();
                            log::info!("Refreshing {}", if paused { "paused" } else { "resumed" });
                        }
                        Command::Quit => break,
                        Command::Unknown => {}
                    },
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        log::warn!("Stopped reading commands from stdin: {}", e);
                        stdin_open = false;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    log::info!("Shutting down");
    let _ = shutdown_tx.send(());
    for handle in handles {
        handle.await?;
    }

    Ok(())
}

fn redraw(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{}{}\n{}\n", CLEAR_SCREEN, text, render::legend())?;
    writeln!(stdout, " p + Enter: pause/resume, q + Enter: quit")?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("p\n"), Command::TogglePause);
        assert_eq!(parse_command(" q "), Command::Quit);
        assert_eq!(parse_command("pause"), Command::Unknown);
    }

    #[test]
    fn test_flags_override_defaults() {
        let opts = Opts::parse_from(["roundwatch", "--rpc-host", "http://node:26657", "--halt-height", "900"]);
        let config = opts.load_config().unwrap();

        assert_eq!(config.rpc_host.as_deref(), Some("http://node:26657"));
        assert_eq!(config.halt_height, Some(900));
        assert_eq!(opts.draw_interval_ms, DEFAULT_DRAW_INTERVAL_MS);
    }
}
