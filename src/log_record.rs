// SPDX-License-Identifier: MIT OR Apache-2.0

//! The normalized record handed to a [`Sink`](crate::Sink).
//!
//! By the time a [`LogRecord`] exists every decision has been made: the call
//! passed both gates, the message was formatted (once), the marker label was
//! prepended and the thread's context was captured. Sinks only render.
//!
//! ```rust
//! use logdispatch::{InMemorySink, Level, LoggerRegistry, Config};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(InMemorySink::new());
//! let registry = LoggerRegistry::new(Config::default(), sink.clone());
//! registry.get("app").info("ready");
//!
//! let record = sink.drain_records().pop().unwrap();
//! assert_eq!(record.text(), "ready");
//! assert_eq!(record.logger(), "app");
//! assert_eq!(record.original_level(), &Level::INFO);
//! ```

use crate::context::{ContextProvider, ContextSnapshot};
use crate::level::{Level, StandardLevel};
use crate::marker::Marker;
use crate::message::SharedError;
use crate::sys::{Duration, Instant};
use std::fmt::Display;
use std::sync::{Arc, OnceLock};

static INITIAL_TIMESTAMP: OnceLock<Instant> = OnceLock::new();

fn initial_timestamp() -> Instant {
    *INITIAL_TIMESTAMP.get_or_init(Instant::now)
}

/**
A finished log record.

Records are built by the dispatcher, never by callers, and are passed to the sink
by value. Cloning is cheap apart from the text: the error, marker, logger name
and context are all shared.
*/
#[derive(Debug, Clone)]
pub struct LogRecord {
    level: StandardLevel,
    original: Level,
    logger: Arc<str>,
    marker: Option<Marker>,
    text: String,
    error: Option<SharedError>,
    context: ContextSnapshot,
    elapsed: Duration,
}

impl LogRecord {
    pub(crate) fn new(
        original: Level,
        logger: Arc<str>,
        marker: Option<Marker>,
        text: String,
        error: Option<SharedError>,
        context: ContextSnapshot,
    ) -> Self {
        Self {
            level: original.standard(),
            original,
            logger,
            marker,
            text,
            error,
            context,
            elapsed: Instant::now().duration_since(initial_timestamp()),
        }
    }

    /// The backend level.
    pub fn level(&self) -> StandardLevel {
        self.level
    }

    /// The level the call was made at, which may be a custom level.
    pub fn original_level(&self) -> &Level {
        &self.original
    }

    pub fn logger(&self) -> &str {
        &self.logger
    }

    pub fn marker(&self) -> Option<&Marker> {
        self.marker.as_ref()
    }

    /// The final text, marker label included.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn error(&self) -> Option<&SharedError> {
        self.error.as_ref()
    }

    /// The MDC and NDC of the logging thread at the time of the call.
    pub fn context(&self) -> &ContextSnapshot {
        &self.context
    }

    /// Time since the first record of the process.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// One line per record, then one `caused by:` line per error in the chain.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:?}] {} {} - {}",
            self.elapsed, self.original, self.logger, self.text
        )?;
        if !self.context.mdc().is_empty() {
            write!(f, " {}", self.context.mdc())?;
        }
        if !self.context.ndc().is_empty() {
            write!(f, " {}", self.context.ndc())?;
        }
        let mut cause: Option<&(dyn std::error::Error + 'static)> =
            self.error.as_deref().map(|e| e as &(dyn std::error::Error + 'static));
        while let Some(e) = cause {
            write!(f, "\ncaused by: {}", e)?;
            cause = e.source();
        }
        Ok(())
    }
}
/*
Boilerplate notes for LogRecord:

IMPLEMENTED:
- Debug: Derived - essential for diagnostics
- Clone: Derived - sinks that fan out need copies
- Display: Implemented - the reference rendering used by the bundled sinks

NOT IMPLEMENTED:
- PartialEq/Eq/Hash: the error is a trait object with no equality, and two records
  with equal fields are still two log calls
- Default: a record without a logger or level is meaningless, and only the
  dispatcher builds them
- Ord/PartialOrd: No meaningful ordering for log records
- From/Into: No obvious conversions to/from other types

AUTOMATIC:
- Send/Sync: every field is Send + Sync, so records can be handed to a sink
  that forwards them to another thread
*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextMap, ContextStack, ThreadContext};

    #[derive(Debug)]
    struct Outer(Inner);
    #[derive(Debug)]
    struct Inner;
    impl Display for Outer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("request failed")
        }
    }
    impl Display for Inner {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("connection reset")
        }
    }
    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }
    impl std::error::Error for Inner {}

    #[test]
    fn render_includes_context_and_error_chain() {
        ThreadContext::clear_all();
        ThreadContext::put("user", "ada");
        ThreadContext::push("checkout");
        let record = LogRecord::new(
            Level::WARN,
            Arc::from("shop"),
            None,
            "slow".to_string(),
            Some(Arc::new(Outer(Inner))),
            ThreadContext::capture(),
        );
        ThreadContext::clear_all();

        let rendered = record.render();
        let mut lines = rendered.lines();
        let first = lines.next().unwrap();
        assert!(first.ends_with("WARN shop - slow {user=ada} [checkout]"), "{first}");
        assert_eq!(lines.next(), Some("caused by: request failed"));
        assert_eq!(lines.next(), Some("caused by: connection reset"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn custom_level_keeps_its_name() {
        let levels = crate::LevelRegistry::new();
        let notice = levels.for_name("NOTICE", 350);
        let record = LogRecord::new(
            notice.clone(),
            Arc::from("x"),
            None,
            "t".to_string(),
            None,
            ContextSnapshot::new(ContextMap::default(), ContextStack::default()),
        );
        assert_eq!(record.level(), StandardLevel::Warn);
        assert_eq!(record.original_level(), &notice);
        assert!(record.render().ends_with("NOTICE x - t"));
    }
}
