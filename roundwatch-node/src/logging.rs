use anyhow::Result;
use log::LevelFilter;
use std::fs::OpenOptions;
use std::path::PathBuf;

use crate::constants::LOG_FILE_NAME;

/// Parse a log level name, falling back to info for anything unknown.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Level used when none is configured. Stderr shares the terminal with the
/// dashboard, so it only gets errors unless asked for more.
pub fn default_level(to_file: bool) -> &'static str {
    if to_file {
        "info"
    } else {
        "error"
    }
}

/// Initialize logging.
///
/// The dashboard owns the terminal, so logs go to `<logs_path>/roundwatch.log`
/// when a path is configured and to stderr otherwise.
pub fn init_logging(logs_path: Option<PathBuf>, log_level: Option<String>) -> Result<()> {
    let level_str = log_level.unwrap_or_else(|| default_level(logs_path.is_some()).to_string());
    let level_filter = parse_level(&level_str);

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&level_str));
    builder.filter_level(level_filter);

    match logs_path {
        Some(logs_dir) => {
            std::fs::create_dir_all(&logs_dir)?;

            let log_file_path = logs_dir.join(LOG_FILE_NAME);
            let log_file = OpenOptions::new().create(true).append(true).open(&log_file_path)?;

            builder.target(env_logger::Target::Pipe(Box::new(log_file)));
            builder.try_init()?;

            log::info!(
                "Logging initialized. Logs will be written to: {} (level: {})",
                log_file_path.display(),
                level_str
            );
        }
        None => {
            builder.target(env_logger::Target::Stderr);
            builder.try_init()?;

            log::info!("Logging initialized. Logs will be written to stderr (level: {})", level_str);
        }
    }

    Ok(())
}
