use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::logger::LogLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    enabled: bool,
    log_file: bool,
    log_level: LogLevel,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            enabled: false,
            log_file: false,
            log_level: LogLevel::Warn,
        }
    }
}

impl LoggerConfig {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn get_enabled(&self) -> &bool {
        &self.enabled
    }

    pub fn with_log_file(mut self, log_file: bool) -> Self {
        self.log_file = log_file;
        self
    }

    pub fn set_log_file(&mut self, log_file: bool) {
        self.log_file = log_file;
    }

    pub fn get_log_file(&self) -> &bool {
        &self.log_file
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn set_log_level(&mut self, log_level: LogLevel) {
        self.log_level = log_level;
    }

    pub fn get_log_level(&self) -> &LogLevel {
        &self.log_level
    }
}

/// Default cap on the number of predicates a single minterm computation may
/// split on.
pub const DEFAULT_MAX_MINTERM_PREDICATES: usize = 2500;

/// Settings for a run of the automaton engine. Missing keys in a config file
/// fall back to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    timeout: Option<Duration>,
    max_minterm_predicates: usize,
    logger: LoggerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            timeout: None,
            max_minterm_predicates: DEFAULT_MAX_MINTERM_PREDICATES,
            logger: LoggerConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> anyhow::Result<Self> {
        let canonic_path = std::fs::canonicalize(file_path)?;
        let content = std::fs::read_to_string(canonic_path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_optional_file<P: AsRef<Path>>(file_path: Option<P>) -> anyhow::Result<Self> {
        match file_path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn get_timeout(&self) -> &Option<Duration> {
        &self.timeout
    }

    pub fn with_max_minterm_predicates(mut self, max_minterm_predicates: usize) -> Self {
        self.max_minterm_predicates = max_minterm_predicates;
        self
    }

    pub fn set_max_minterm_predicates(&mut self, max_minterm_predicates: usize) {
        self.max_minterm_predicates = max_minterm_predicates;
    }

    pub fn get_max_minterm_predicates(&self) -> &usize {
        &self.max_minterm_predicates
    }

    pub fn with_logger(mut self, logger: LoggerConfig) -> Self {
        self.logger = logger;
        self
    }

    pub fn set_logger(&mut self, logger: LoggerConfig) {
        self.logger = logger;
    }

    pub fn get_logger(&self) -> &LoggerConfig {
        &self.logger
    }
}
