use std::time::{Duration, Instant};

use crate::{
    config::{EngineConfig, DEFAULT_MAX_MINTERM_PREDICATES},
    error::{SfaError, SfaResult},
};

/// Time and resource budget of one engine call.
///
/// The clock starts when the budget is created. Every long running loop in the
/// engine calls [`Budget::check`] and propagates the error.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    start: Instant,
    time_limit: Option<Duration>,
    max_minterm_predicates: usize,
}

impl Budget {
    pub fn unlimited() -> Self {
        Budget {
            start: Instant::now(),
            time_limit: None,
            max_minterm_predicates: DEFAULT_MAX_MINTERM_PREDICATES,
        }
    }

    pub fn with_time_limit(time_limit: Duration) -> Self {
        Budget {
            time_limit: Some(time_limit),
            ..Budget::unlimited()
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Budget {
            start: Instant::now(),
            time_limit: *config.get_timeout(),
            max_minterm_predicates: *config.get_max_minterm_predicates(),
        }
    }

    pub fn with_max_minterm_predicates(mut self, max_minterm_predicates: usize) -> Self {
        self.max_minterm_predicates = max_minterm_predicates;
        self
    }

    pub fn get_time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    pub fn get_max_minterm_predicates(&self) -> usize {
        self.max_minterm_predicates
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.time_limit
            .map(|limit| limit.saturating_sub(self.start.elapsed()))
    }

    pub fn max_time_reached(&self) -> bool {
        match self.time_limit {
            Some(limit) => self.start.elapsed() >= limit,
            None => false,
        }
    }

    pub fn check(&self) -> SfaResult<()> {
        match self.time_limit {
            Some(limit) if self.start.elapsed() >= limit => Err(SfaError::Timeout(limit)),
            _ => Ok(()),
        }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Budget::unlimited()
    }
}
