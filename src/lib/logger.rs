use std::{fmt::Display, fs::File, str::FromStr, sync::Mutex};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::config::LoggerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "info" | "inf" => Ok(LogLevel::Info),
            "warn" | "warning" | "war" => Ok(LogLevel::Warn),
            "error" | "err" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "Debug"),
            LogLevel::Info => write!(f, "Info"),
            LogLevel::Warn => write!(f, "Warn"),
            LogLevel::Error => write!(f, "Error"),
        }
    }
}

/// Path of the log file for a run started now.
pub fn log_file_path() -> String {
    format!(
        "./logs/sfa_run_{}.txt",
        Local::now().format("%Y-%m-%d_%H-%M-%S")
    )
}

/// Installs a global `tracing` subscriber according to `config`.
///
/// Returns `Ok(false)` if logging is disabled or another subscriber was
/// already installed, so repeated calls (e.g. from several tests) are
/// harmless.
pub fn init(config: &LoggerConfig) -> anyhow::Result<bool> {
    if !*config.get_enabled() {
        return Ok(false);
    }

    let level = config.get_log_level().level_filter();

    let installed = if *config.get_log_file() {
        std::fs::create_dir_all("./logs")?;
        let file = File::create(log_file_path())?;

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init()
            .is_ok()
    } else {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    };

    Ok(installed)
}
