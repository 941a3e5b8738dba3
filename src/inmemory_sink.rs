// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Sink
//!
//! A [`Sink`] that keeps records in memory instead of writing them anywhere.
//! It exists for tests: install it in a [`LoggerRegistry`](crate::LoggerRegistry),
//! run the code under test, then inspect what was logged.
//!
//! Records are stored whole, so a test can look at the level, marker, error
//! and captured context as well as the text.

use crate::level::StandardLevel;
use crate::log_record::LogRecord;
use crate::sink::Sink;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A sink that stores log records in a `Vec`.
///
/// # Example
///
/// ```rust
/// use logdispatch::{Config, InMemorySink, LoggerRegistry};
/// use std::sync::Arc;
///
/// let sink = Arc::new(InMemorySink::new());
/// let registry = LoggerRegistry::new(Config::default(), sink.clone());
/// let logger = registry.get("test");
///
/// logdispatch::warn!(logger, "disk at {}%", 91);
/// logdispatch::debug!(logger, "below the INFO threshold");
///
/// assert_eq!(sink.texts(), ["disk at 91%"]);
/// assert!(sink.drain_logs().contains("WARN test - disk at 91%"));
/// assert!(sink.is_empty());
/// ```
///
/// # Thread Safety
///
/// All operations lock an internal mutex. A panic while the lock was held does
/// not poison the sink for later callers.
#[derive(Debug)]
pub struct InMemorySink {
    records: Mutex<Vec<LogRecord>>,
    threshold: Option<StandardLevel>,
    prepared_to_die: AtomicUsize,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// Design decisions for InMemorySink trait implementations:
//
// - Debug: Derived for diagnostic purposes and required by Sink trait
// - Default: Implemented with obvious zero-value (empty buffer, no threshold)
// - Clone: NOT implemented - a copy would silently split the captured records
// - PartialEq/Eq: NOT implemented - equality semantics unclear for sinks
// - Hash: NOT implemented - requires Eq
// - Display: NOT implemented - no meaningful display representation
// - Send/Sync: Automatically implemented due to Mutex usage (required for Sink trait)

impl Default for InMemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySink {
    /// Creates a sink that accepts every level.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            threshold: None,
            prepared_to_die: AtomicUsize::new(0),
        }
    }

    /// Creates a sink whose [`is_level_enabled`](Sink::is_level_enabled)
    /// rejects anything less severe than `threshold`.
    pub fn with_threshold(threshold: StandardLevel) -> Self {
        Self {
            threshold: Some(threshold),
            ..Self::new()
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drains all records, rendered and joined with newlines.
    ///
    /// Subsequent calls return an empty string until something new is logged.
    pub fn drain_logs(&self) -> String {
        let mut records = self.lock();
        let result = records
            .iter()
            .map(LogRecord::render)
            .collect::<Vec<_>>()
            .join("\n");
        records.clear();
        result
    }

    /// Drains all records in the order they arrived.
    pub fn drain_records(&self) -> Vec<LogRecord> {
        std::mem::take(&mut *self.lock())
    }

    /// The text of every stored record, without draining.
    pub fn texts(&self) -> Vec<String> {
        self.lock().iter().map(|r| r.text().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// How many times [`prepare_to_die`](Sink::prepare_to_die) has been called.
    pub fn prepare_to_die_count(&self) -> usize {
        self.prepared_to_die.load(Ordering::Relaxed)
    }

    /// Writes all records to stderr (the console on wasm32), clearing the buffer.
    pub fn drain_to_console(&self) {
        for record in self.drain_records() {
            #[cfg(target_arch = "wasm32")]
            web_sys::console::log_1(&record.render().into());
            #[cfg(not(target_arch = "wasm32"))]
            eprintln!("{}", record);
        }
    }
}

impl Sink for InMemorySink {
    fn is_level_enabled(&self, level: StandardLevel) -> bool {
        match self.threshold {
            Some(threshold) => level <= threshold,
            None => true,
        }
    }

    fn log_record(&self, record: LogRecord) {
        self.lock().push(record);
    }

    /// Records are already in memory, so this only counts the call.
    fn prepare_to_die(&self) {
        self.prepared_to_die.fetch_add(1, Ordering::Relaxed);
    }
}
