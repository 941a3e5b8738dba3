// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging macros.
//!
//! The macros are thin forwarding over [`crate::dispatch`]. Their only job is
//! to pick the entry point for the call's arity at compile time and to check
//! the level before any argument expression is evaluated.
//!
//! ```rust
//! use logdispatch::{Config, InMemorySink, Level, LoggerRegistry};
//! use std::sync::Arc;
//!
//! fn expensive() -> u64 {
//!     unreachable!("TRACE is below the INFO threshold")
//! }
//!
//! let sink = Arc::new(InMemorySink::new());
//! let registry = LoggerRegistry::new(Config::default(), sink.clone());
//! let logger = registry.get("orders");
//! let audit = registry.marker("AUDIT");
//!
//! logdispatch::info!(logger, "order {} placed", 17);
//! logdispatch::warn!(logger, marker: audit, "refund {} of {}", 3, "9.99");
//! logdispatch::log!(logger, Level::ERROR, "{}-{}-{}", 'a', 'b', 'c');
//! logdispatch::trace!(logger, "never evaluated: {}", expensive());
//!
//! assert_eq!(
//!     sink.texts(),
//!     ["order 17 placed", "[AUDIT] refund 3 of 9.99", "a-b-c"]
//! );
//! ```

/// Logs at the given [`Level`](crate::Level).
///
/// Forms, each optionally with `marker: <expr>` after the level:
///
/// * `log!(logger, level, "text")`
/// * `log!(logger, level, "pattern {}", a)`
/// * `log!(logger, level, "pattern {} {}", a, b)`
/// * `log!(logger, level, "pattern {} {} {}", a, b, c, ...)`
///
/// `logger` may be a `Logger`, `&Logger` or `Arc<Logger>`. Arguments are
/// anything with an `Into<Arg>` conversion and are only evaluated when the
/// level is enabled.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, marker: $marker:expr, $pattern:expr $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        let level: &$crate::Level = &$level;
        let marker: &$crate::Marker = &$marker;
        if logger.is_enabled_for(level, marker) {
            $crate::dispatch::log_simple(logger, level, Some(marker), $pattern);
        }
    }};
    ($logger:expr, $level:expr, marker: $marker:expr, $pattern:expr, $a:expr $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        let level: &$crate::Level = &$level;
        let marker: &$crate::Marker = &$marker;
        if logger.is_enabled_for(level, marker) {
            $crate::dispatch::log_single_param(logger, level, Some(marker), $pattern, $a);
        }
    }};
    ($logger:expr, $level:expr, marker: $marker:expr, $pattern:expr, $a:expr, $b:expr $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        let level: &$crate::Level = &$level;
        let marker: &$crate::Marker = &$marker;
        if logger.is_enabled_for(level, marker) {
            $crate::dispatch::log_two_params(logger, level, Some(marker), $pattern, $a, $b);
        }
    }};
    ($logger:expr, $level:expr, marker: $marker:expr, $pattern:expr, $($arg:expr),+ $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        let level: &$crate::Level = &$level;
        let marker: &$crate::Marker = &$marker;
        if logger.is_enabled_for(level, marker) {
            $crate::dispatch::log(
                logger,
                level,
                Some(marker),
                $pattern,
                vec![$($crate::Arg::from($arg)),+],
            );
        }
    }};
    ($logger:expr, $level:expr, $pattern:expr $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        let level: &$crate::Level = &$level;
        if logger.is_enabled(level) {
            $crate::dispatch::log_simple(logger, level, None, $pattern);
        }
    }};
    ($logger:expr, $level:expr, $pattern:expr, $a:expr $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        let level: &$crate::Level = &$level;
        if logger.is_enabled(level) {
            $crate::dispatch::log_single_param(logger, level, None, $pattern, $a);
        }
    }};
    ($logger:expr, $level:expr, $pattern:expr, $a:expr, $b:expr $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        let level: &$crate::Level = &$level;
        if logger.is_enabled(level) {
            $crate::dispatch::log_two_params(logger, level, None, $pattern, $a, $b);
        }
    }};
    ($logger:expr, $level:expr, $pattern:expr, $($arg:expr),+ $(,)?) => {{
        let logger: &$crate::Logger = &$logger;
        let level: &$crate::Level = &$level;
        if logger.is_enabled(level) {
            $crate::dispatch::log(
                logger,
                level,
                None,
                $pattern,
                vec![$($crate::Arg::from($arg)),+],
            );
        }
    }};
}

/// [`log!`] at `TRACE`.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::TRACE, $($rest)+)
    };
}

/// [`log!`] at `DEBUG`.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::DEBUG, $($rest)+)
    };
}

/// [`log!`] at `INFO`.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::INFO, $($rest)+)
    };
}

/// [`log!`] at `WARN`.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::WARN, $($rest)+)
    };
}

/// [`log!`] at `ERROR`.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::ERROR, $($rest)+)
    };
}

/// [`log!`] at `FATAL`.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($rest:tt)+) => {
        $crate::log!($logger, $crate::Level::FATAL, $($rest)+)
    };
}
