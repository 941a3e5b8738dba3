// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry configuration.
//!
//! There are no configuration files. A [`Config`] is built in code, or read
//! from two environment variables:
//!
//! | Variable             | Sets                                   | Default |
//! |----------------------|----------------------------------------|---------|
//! | `LOGDISPATCH_LEVEL`  | threshold of newly created loggers     | `INFO`  |
//! | `LOGDISPATCH_STATUS` | threshold of the [status](crate::status) logger | `WARN` |
//!
//! Values are standard level names, in any case. An unrecognized name is
//! treated as `INFO`, the same as an unknown level anywhere else.

use crate::level::{Level, StandardLevel};
use crate::status;

pub const LEVEL_VAR: &str = "LOGDISPATCH_LEVEL";
pub const STATUS_VAR: &str = "LOGDISPATCH_STATUS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    default_threshold: Level,
    status_threshold: Level,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            default_threshold: Level::INFO,
            status_threshold: default_status_threshold(),
        }
    }
}

#[cfg(feature = "internal_status")]
fn default_status_threshold() -> Level {
    StandardLevel::Debug.level()
}

#[cfg(not(feature = "internal_status"))]
fn default_status_threshold() -> Level {
    StandardLevel::Warn.level()
}

impl Config {
    /// Reads [`LEVEL_VAR`] and [`STATUS_VAR`] from the process environment.
    pub fn from_env() -> Config {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), with the variables supplied by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Config {
        let mut config = Config::default();
        if let Some(value) = lookup(LEVEL_VAR) {
            config.default_threshold = Level::parse_or_info(&value);
        }
        if let Some(value) = lookup(STATUS_VAR) {
            config.status_threshold = Level::parse_or_info(&value);
        }
        config
    }

    pub fn with_default_threshold(mut self, level: Level) -> Config {
        self.default_threshold = level;
        self
    }

    pub fn with_status_threshold(mut self, level: Level) -> Config {
        self.status_threshold = level;
        self
    }

    /// The threshold new loggers start with.
    pub fn default_threshold(&self) -> &Level {
        &self.default_threshold
    }

    pub fn status_threshold(&self) -> &Level {
        &self.status_threshold
    }

    /// Installs the status threshold process-wide.
    pub fn apply_status(&self) {
        status::set_threshold(&self.status_threshold);
    }
}
