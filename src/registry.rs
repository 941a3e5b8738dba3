// SPDX-License-Identifier: MIT OR Apache-2.0

//! The logger registry.
//!
//! A [`LoggerRegistry`] owns everything that would otherwise be process-wide
//! state: the logger handles, the [`MarkerRegistry`], the [`LevelRegistry`]
//! and the default sink. Tests build their own; applications that want a
//! single shared instance use [`crate::global`].
//!
//! # Handle identity
//!
//! Loggers are cached by (name, [`FactoryId`]). The first `get` for a key
//! creates the handle under the map's shard lock, so racing callers all
//! receive the same `Arc`:
//!
//! ```rust
//! use logdispatch::{Config, InMemorySink, LoggerRegistry, SimpleMessageFactory};
//! use std::sync::Arc;
//!
//! let registry = LoggerRegistry::new(Config::default(), Arc::new(InMemorySink::new()));
//! let a = registry.get("app");
//! let b = registry.get("app");
//! assert!(Arc::ptr_eq(&a, &b));
//!
//! // another factory is another key
//! let simple = registry.get_with("app", Arc::new(SimpleMessageFactory));
//! assert!(!Arc::ptr_eq(&a, &simple));
//! assert_eq!(registry.names(), ["app"]);
//! ```
//!
//! # Shutdown
//!
//! [`shutdown`](LoggerRegistry::shutdown) drops every handle and calls
//! [`Sink::prepare_to_die`](crate::Sink::prepare_to_die) once per distinct
//! sink. The registry stays usable: a later `get` creates a fresh handle.

use crate::config::Config;
use crate::level::{Level, LevelRegistry};
use crate::logger::Logger;
use crate::marker::{Marker, MarkerRegistry};
use crate::message::{FactoryId, MessageFactory, ParameterizedMessageFactory};
use crate::sink::{AcceptAllMarkers, MarkerFilter, SharedSink};
use crate::status;
use arc_swap::ArcSwap;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

pub struct LoggerRegistry {
    config: Config,
    levels: LevelRegistry,
    markers: MarkerRegistry,
    loggers: DashMap<(String, FactoryId), Arc<Logger>>,
    default_factory: Arc<dyn MessageFactory>,
    default_threshold: AtomicU32,
    sink: ArcSwap<SharedSink>,
    marker_filter: ArcSwap<Arc<dyn MarkerFilter>>,
}

impl LoggerRegistry {
    /// A registry whose loggers deliver to `sink`.
    ///
    /// Does not touch the process-wide status threshold; see
    /// [`Config::apply_status`].
    pub fn new(config: Config, sink: SharedSink) -> LoggerRegistry {
        LoggerRegistry {
            default_threshold: AtomicU32::new(config.default_threshold().rank()),
            config,
            levels: LevelRegistry::new(),
            markers: MarkerRegistry::new(),
            loggers: DashMap::new(),
            default_factory: Arc::new(ParameterizedMessageFactory),
            sink: ArcSwap::from_pointee(sink),
            marker_filter: ArcSwap::from_pointee(Arc::new(AcceptAllMarkers) as Arc<dyn MarkerFilter>),
        }
    }

    /// Replaces the factory used by [`get`](Self::get). Existing handles keep theirs.
    pub fn with_default_factory(mut self, factory: Arc<dyn MessageFactory>) -> LoggerRegistry {
        self.default_factory = factory;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The logger called `name`, using the default factory.
    pub fn get(&self, name: &str) -> Arc<Logger> {
        self.get_with(name, self.default_factory.clone())
    }

    /// The logger called `name` whose messages are built by `factory`.
    ///
    /// At most one handle ever exists per (name, factory id), however many
    /// threads ask for it at once.
    pub fn get_with(&self, name: &str, factory: Arc<dyn MessageFactory>) -> Arc<Logger> {
        let key = (name.to_string(), factory.id());
        if let Some(existing) = self.loggers.get(&key) {
            return existing.value().clone();
        }
        self.loggers
            .entry(key)
            .or_insert_with(|| {
                Arc::new(Logger::new(
                    name,
                    factory,
                    self.default_threshold.load(Ordering::Relaxed),
                    SharedSink::clone(&self.sink.load()),
                    Arc::<dyn MarkerFilter>::clone(&self.marker_filter.load()),
                ))
            })
            .value()
            .clone()
    }

    /// Whether any logger called `name` exists, whatever its factory.
    pub fn exists(&self, name: &str) -> bool {
        self.loggers.iter().any(|entry| entry.key().0 == name)
    }

    /// The names of all loggers, sorted, each once.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.loggers.iter().map(|entry| entry.key().0.clone()).collect();
        names.sort();
        names.dedup();
        names
    }

    /// Number of handles, counting each (name, factory) separately.
    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    /// Sends every existing and future logger's records to `sink`.
    pub fn set_sink(&self, sink: SharedSink) {
        self.sink.store(Arc::new(sink.clone()));
        for entry in self.loggers.iter() {
            entry.value().set_sink(sink.clone());
        }
    }

    pub fn sink(&self) -> SharedSink {
        SharedSink::clone(&self.sink.load())
    }

    /// Sets the threshold of every existing and future logger.
    pub fn set_threshold_all(&self, level: &Level) {
        self.default_threshold.store(level.rank(), Ordering::Relaxed);
        for entry in self.loggers.iter() {
            entry.value().set_threshold(level);
        }
    }

    /// Installs `filter` on every existing and future logger.
    pub fn set_marker_filter(&self, filter: Arc<dyn MarkerFilter>) {
        self.marker_filter.store(Arc::new(filter.clone()));
        for entry in self.loggers.iter() {
            entry.value().set_marker_filter(filter.clone());
        }
    }

    pub fn markers(&self) -> &MarkerRegistry {
        &self.markers
    }

    pub fn levels(&self) -> &LevelRegistry {
        &self.levels
    }

    /// Shorthand for `self.markers().get_or_create(name)`.
    pub fn marker(&self, name: &str) -> Marker {
        self.markers.get_or_create(name)
    }

    /// Shorthand for `self.levels().for_name(name, rank)`.
    pub fn level(&self, name: &str, rank: u32) -> Level {
        self.levels.for_name(name, rank)
    }

    /// Drops every logger handle and tells each distinct sink to flush.
    ///
    /// Handles already held by callers keep working. A later [`get`](Self::get)
    /// creates a new handle.
    pub fn shutdown(&self) {
        let mut sinks: Vec<SharedSink> = vec![self.sink()];
        for entry in self.loggers.iter() {
            let sink = entry.value().sink();
            if !sinks.iter().any(|s| same_sink(s, &sink)) {
                sinks.push(sink);
            }
        }
        self.loggers.clear();
        status::debug(format_args!(
            "registry shut down, flushing {} sink(s)",
            sinks.len()
        ));
        for sink in sinks {
            sink.prepare_to_die();
        }
    }

    /// Forgets every logger, marker and custom level without flushing.
    pub fn reset(&self) {
        self.loggers.clear();
        self.markers.clear();
        self.levels.clear_custom();
        self.default_threshold
            .store(self.config.default_threshold().rank(), Ordering::Relaxed);
    }
}

fn same_sink(a: &SharedSink, b: &SharedSink) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl std::fmt::Debug for LoggerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerRegistry")
            .field("config", &self.config)
            .field("loggers", &self.names())
            .field("markers", &self.markers.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inmemory_sink::InMemorySink;
    use crate::message::SimpleMessageFactory;

    fn registry() -> (Arc<InMemorySink>, LoggerRegistry) {
        let sink = Arc::new(InMemorySink::new());
        (sink.clone(), LoggerRegistry::new(Config::default(), sink))
    }

    #[test]
    fn exists_and_names() {
        let (_, registry) = registry();
        assert!(!registry.exists("a"));
        registry.get("b");
        registry.get("a");
        registry.get_with("a", Arc::new(SimpleMessageFactory));
        assert!(registry.exists("a"));
        assert_eq!(registry.names(), ["a", "b"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn new_loggers_inherit_current_settings() {
        let (_, registry) = registry();
        let early = registry.get("early");
        registry.set_threshold_all(&Level::ERROR);
        let replacement = Arc::new(InMemorySink::new());
        registry.set_sink(replacement.clone());

        let late = registry.get("late");
        for logger in [&early, &late] {
            assert_eq!(logger.threshold_rank(), Level::ERROR.rank());
            logger.error("to the replacement");
        }
        assert_eq!(replacement.len(), 2);
    }

    #[test]
    fn shutdown_flushes_each_sink_once_and_recreates() {
        let (sink, registry) = registry();
        let before = registry.get("x");
        registry.get("y");
        let other = Arc::new(InMemorySink::new());
        registry.get("z").set_sink(other.clone());

        registry.shutdown();
        assert_eq!(sink.prepare_to_die_count(), 1);
        assert_eq!(other.prepare_to_die_count(), 1);
        assert!(registry.is_empty());

        let after = registry.get("x");
        assert!(!Arc::ptr_eq(&before, &after));
        after.warn("still logging");
        assert_eq!(sink.texts(), ["still logging"]);
    }

    #[test]
    fn reset_forgets_markers_and_levels() {
        let (_, registry) = registry();
        registry.marker("M");
        registry.level("NOTICE", 350);
        registry.set_threshold_all(&Level::TRACE);
        registry.reset();
        assert!(!registry.markers().exists("M"));
        assert!(registry.levels().get("NOTICE").is_none());
        assert_eq!(registry.get("fresh").threshold_rank(), Level::INFO.rank());
    }
}
