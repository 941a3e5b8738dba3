// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single funnel every logging call passes through.
//!
//! # Architecture
//!
//! Each call goes through the same steps, in order:
//! 1. Level gate: the level's own rank against the logger's threshold, then
//!    the sink's [`is_level_enabled`](crate::Sink::is_level_enabled) with the
//!    precomputed [`StandardLevel`](crate::StandardLevel). A custom level is
//!    never admitted past a threshold it is less severe than, even when it
//!    translates to a standard level the threshold allows. A rejected call
//!    returns here having done an integer compare and one atomic load.
//! 2. Marker gate: the logger's [`MarkerFilter`](crate::MarkerFilter), only
//!    when a marker is present.
//! 3. The message is built and formatted. Lazy suppliers run here and nowhere
//!    earlier.
//! 4. The marker label, if any, is prepended to the text.
//! 5. The thread's MDC and NDC are captured.
//! 6. The sink receives one [`LogRecord`]. An explicit error rides alongside
//!    the text rather than being appended to it.
//!
//! The specialized entry points ([`log_simple`], [`log_single_param`],
//! [`log_two_params`], [`log_with_exception`], [`log_lazy`]) differ from
//! [`log`] only in not building an argument `Vec`. They gate before
//! converting their arguments.
//!
//! # Example
//!
//! ```rust
//! use logdispatch::{dispatch, Config, InMemorySink, Level, LoggerRegistry};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(InMemorySink::new());
//! let registry = LoggerRegistry::new(Config::default(), sink.clone());
//! let logger = registry.get("db");
//! let slow = registry.marker("SLOW");
//!
//! dispatch::log_two_params(&logger, &Level::WARN, Some(&slow), "{} took {}ms", "query", 1200);
//! dispatch::log_single_param(&logger, &Level::DEBUG, None, "not shown {}", 1);
//!
//! assert_eq!(sink.texts(), ["[SLOW] query took 1200ms"]);
//! ```

use crate::context::ThreadContext;
use crate::level::Level;
use crate::log_record::LogRecord;
use crate::logger::Logger;
use crate::marker::Marker;
use crate::message::{Arg, Message, SharedError};
use crate::sink::SharedSink;
use arc_swap::Guard;
use std::borrow::Cow;
use std::sync::Arc;

/// Runs both gates. Returns the sink to deliver to when the call is admitted.
#[inline]
pub(crate) fn admit(
    logger: &Logger,
    level: &Level,
    marker: Option<&Marker>,
) -> Option<Guard<Arc<SharedSink>>> {
    if level.rank() > logger.threshold_rank() {
        return None;
    }
    let standard = level.standard();
    let sink = logger.load_sink();
    if !sink.is_level_enabled(standard) {
        return None;
    }
    if let Some(marker) = marker {
        if !logger.load_marker_filter().admits(standard, marker) {
            return None;
        }
    }
    Some(sink)
}

fn emit(
    logger: &Logger,
    sink: &SharedSink,
    level: &Level,
    marker: Option<&Marker>,
    message: Message,
    error: Option<SharedError>,
) {
    let formatted = message.formatted();
    let text = match marker {
        Some(marker) => {
            let mut text = marker.label();
            text.push(' ');
            text.push_str(formatted);
            text
        }
        None => formatted.to_string(),
    };
    let error = error.or_else(|| message.error().cloned());
    let record = LogRecord::new(
        level.clone(),
        logger.shared_name(),
        marker.cloned(),
        text,
        error,
        ThreadContext::capture(),
    );
    sink.log_record(record);
}

/// Dispatches a built message.
///
/// `error`, when given, replaces any error the message carries.
pub fn dispatch(
    logger: &Logger,
    level: &Level,
    marker: Option<&Marker>,
    message: Message,
    error: Option<SharedError>,
) {
    if let Some(sink) = admit(logger, level, marker) {
        emit(logger, &sink, level, marker, message, error);
    }
}

/// The general path: `pattern` and any number of arguments, through the
/// logger's factory.
pub fn log(
    logger: &Logger,
    level: &Level,
    marker: Option<&Marker>,
    pattern: impl Into<Cow<'static, str>>,
    args: Vec<Arg>,
) {
    if let Some(sink) = admit(logger, level, marker) {
        let message = logger.factory().new_message(pattern.into(), args);
        emit(logger, &sink, level, marker, message, None);
    }
}

/// Text without arguments. Same output as [`log`] with no arguments.
pub fn log_simple(
    logger: &Logger,
    level: &Level,
    marker: Option<&Marker>,
    text: impl Into<Cow<'static, str>>,
) {
    if let Some(sink) = admit(logger, level, marker) {
        let message = logger.factory().new_message(text.into(), Vec::new());
        emit(logger, &sink, level, marker, message, None);
    }
}

pub fn log_single_param(
    logger: &Logger,
    level: &Level,
    marker: Option<&Marker>,
    pattern: impl Into<Cow<'static, str>>,
    arg: impl Into<Arg>,
) {
    if let Some(sink) = admit(logger, level, marker) {
        let message = logger.factory().new_message1(pattern.into(), arg.into());
        emit(logger, &sink, level, marker, message, None);
    }
}

pub fn log_two_params(
    logger: &Logger,
    level: &Level,
    marker: Option<&Marker>,
    pattern: impl Into<Cow<'static, str>>,
    first: impl Into<Arg>,
    second: impl Into<Arg>,
) {
    if let Some(sink) = admit(logger, level, marker) {
        let message = logger
            .factory()
            .new_message2(pattern.into(), first.into(), second.into());
        emit(logger, &sink, level, marker, message, None);
    }
}

/// Text plus an error that is handed to the sink alongside it.
pub fn log_with_exception(
    logger: &Logger,
    level: &Level,
    marker: Option<&Marker>,
    text: impl Into<Cow<'static, str>>,
    error: SharedError,
) {
    if let Some(sink) = admit(logger, level, marker) {
        let message = logger.factory().new_message(text.into(), Vec::new());
        emit(logger, &sink, level, marker, message, Some(error));
    }
}

/// Logs whatever `supplier` returns, calling it only after both gates pass.
///
/// A panicking supplier does not unwind into the caller: the record is still
/// delivered, with `error formatting message: <panic message>` as its text.
pub fn log_lazy<F, T>(logger: &Logger, level: &Level, marker: Option<&Marker>, supplier: F)
where
    F: Fn() -> T + Send + Sync + 'static,
    T: Into<Arg>,
{
    if let Some(sink) = admit(logger, level, marker) {
        emit(logger, &sink, level, marker, Message::lazy(supplier), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::inmemory_sink::InMemorySink;
    use crate::registry::LoggerRegistry;
    use crate::sink::DenyMarker;

    fn setup() -> (Arc<InMemorySink>, LoggerRegistry) {
        let sink = Arc::new(InMemorySink::new());
        let registry = LoggerRegistry::new(Config::default(), sink.clone());
        (sink, registry)
    }

    #[test]
    fn threshold_compares_the_call_levels_own_rank() {
        let (sink, registry) = setup();
        let logger = registry.get("gate");
        let chatty = registry.level("CHATTY", 450);
        let notice = registry.level("NOTICE", 350);

        // CHATTY translates to INFO but is still less severe than INFO
        assert_eq!(chatty.standard(), crate::StandardLevel::Info);
        assert!(!logger.is_enabled(&chatty));
        assert!(logger.is_enabled(&notice));
        log_lazy(&logger, &chatty, None, || -> &'static str {
            panic!("must not run")
        });
        logger.set_threshold(&chatty);
        assert!(logger.is_enabled(&chatty));
        logger.set_threshold(&notice);
        assert!(!logger.is_enabled(&chatty));
        assert!(!logger.is_enabled(&Level::INFO));
        assert!(logger.is_enabled(&Level::WARN));
        logger.set_threshold(&Level::OFF);
        assert!(!logger.is_enabled(&Level::FATAL));
        logger.set_threshold(&Level::ALL);
        assert!(logger.is_enabled(&Level::TRACE));
        assert!(sink.is_empty());
    }

    #[test]
    fn sink_level_check_is_part_of_the_gate() {
        let sink = Arc::new(InMemorySink::with_threshold(crate::StandardLevel::Error));
        let registry = LoggerRegistry::new(Config::default(), sink.clone());
        let logger = registry.get("gate");
        log_lazy(&logger, &Level::WARN, None, || -> &'static str {
            panic!("must not run")
        });
        logger.error("kept");
        assert_eq!(sink.texts(), ["kept"]);
    }

    #[test]
    fn marker_filter_suppresses() {
        let (sink, registry) = setup();
        let logger = registry.get("filtered");
        let audit = registry.marker("AUDIT");
        logger.set_marker_filter(Arc::new(DenyMarker(audit.clone())));

        assert!(logger.is_enabled(&Level::INFO));
        assert!(!logger.is_enabled_for(&Level::INFO, &audit));
        log_simple(&logger, &Level::ERROR, Some(&audit), "dropped");
        log_simple(&logger, &Level::ERROR, None, "kept");
        assert_eq!(sink.texts(), ["kept"]);
    }

    #[test]
    fn explicit_error_wins_over_message_error() {
        #[derive(Debug)]
        struct Named(&'static str);
        impl std::fmt::Display for Named {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.0)
            }
        }
        impl std::error::Error for Named {}

        let (sink, registry) = setup();
        let logger = registry.get("errors");
        let message = Message::parameterized("failed {}", vec![1.into(), Arg::error(Named("inner"))]);
        dispatch(&logger, &Level::ERROR, None, message, None);
        let message = Message::parameterized("failed {}", vec![2.into(), Arg::error(Named("inner"))]);
        dispatch(&logger, &Level::ERROR, None, message, Some(Arc::new(Named("explicit"))));

        let records = sink.drain_records();
        assert_eq!(records[0].text(), "failed 1");
        assert_eq!(records[0].error().map(|e| e.to_string()).as_deref(), Some("inner"));
        assert_eq!(records[1].error().map(|e| e.to_string()).as_deref(), Some("explicit"));
    }
}
