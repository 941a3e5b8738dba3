// SPDX-License-Identifier: MIT OR Apache-2.0

//! An optional process-wide [`LoggerRegistry`].
//!
//! Libraries and tests should prefer an injected registry. Applications that
//! want one registry for the whole process use the functions here, which
//! share a single lazily created instance.
//!
//! # Default Behavior
//!
//! On first use the registry is configured with [`Config::from_env`], the
//! status threshold from that configuration is installed, and records go to a
//! [`StdErrorSink`]. Logging works without any setup.
//!
//! # Examples
//!
//! ```
//! use logdispatch::global;
//!
//! let logger = global::logger("app");
//! logger.info("started");
//! ```
//!
//! ## Capturing output
//!
//! ```
//! use logdispatch::{global, InMemorySink};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(InMemorySink::new());
//! global::set_global_sink(sink.clone());
//! global::logger("captured").warn("only in memory");
//! assert!(sink.drain_logs().contains("only in memory"));
//! ```
//!
//! # Shutdown
//!
//! Call [`shutdown`] before the process exits so sinks can flush. Loggers are
//! recreated if anything logs afterwards.

use crate::config::Config;
use crate::logger::Logger;
use crate::marker::Marker;
use crate::registry::LoggerRegistry;
use crate::sink::SharedSink;
use crate::stderror_sink::StdErrorSink;
use std::sync::{Arc, OnceLock};

static GLOBAL_REGISTRY: OnceLock<LoggerRegistry> = OnceLock::new();

/// The process-wide registry, created on first call.
pub fn global_registry() -> &'static LoggerRegistry {
    GLOBAL_REGISTRY.get_or_init(|| {
        let config = Config::from_env();
        config.apply_status();
        LoggerRegistry::new(config, Arc::new(StdErrorSink::new()))
    })
}

/// The global logger called `name`.
pub fn logger(name: &str) -> Arc<Logger> {
    global_registry().get(name)
}

/// The global marker called `name`.
pub fn marker(name: &str) -> Marker {
    global_registry().marker(name)
}

/// Sends every global logger's records to `sink`.
pub fn set_global_sink(sink: SharedSink) {
    global_registry().set_sink(sink);
}

/// Flushes and drops every global logger. See [`LoggerRegistry::shutdown`].
pub fn shutdown() {
    if let Some(registry) = GLOBAL_REGISTRY.get() {
        registry.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inmemory_sink::InMemorySink;
    use std::sync::Mutex;

    static TEST_LOGGER_GUARD: Mutex<()> = Mutex::new(());

    #[test]
    fn test_same_handle_everywhere() {
        let _guard = TEST_LOGGER_GUARD.lock().unwrap();
        let a = logger("global-test");
        let b = std::thread::spawn(|| logger("global-test")).join().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(marker("GLOBAL"), marker("GLOBAL"));
    }

    #[test]
    fn test_set_sink_and_shutdown() {
        let _guard = TEST_LOGGER_GUARD.lock().unwrap();
        let sink = Arc::new(InMemorySink::new());
        set_global_sink(sink.clone());
        logger("global-shutdown").error("before");
        shutdown();
        assert_eq!(sink.prepare_to_die_count(), 1);
        assert!(!global_registry().exists("global-shutdown"));

        logger("global-shutdown").error("after");
        assert_eq!(sink.texts(), ["before", "after"]);
        set_global_sink(Arc::new(StdErrorSink::new()));
    }
}
