// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named logger handles.
//!
//! A [`Logger`] is what call sites hold. It owns nothing but configuration: a
//! name, the [`MessageFactory`] that builds its messages, a threshold, a sink
//! and a marker filter. Every method here forwards to [`crate::dispatch`].
//!
//! Handles come from a [`LoggerRegistry`](crate::LoggerRegistry), which hands
//! out one shared instance per (name, factory).

use crate::dispatch;
use crate::level::Level;
use crate::marker::Marker;
use crate::message::{Arg, FactoryId, Message, MessageFactory, SharedError};
use crate::sink::{MarkerFilter, SharedSink};
use arc_swap::{ArcSwap, Guard};
use std::borrow::Cow;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

pub struct Logger {
    name: Arc<str>,
    factory: Arc<dyn MessageFactory>,
    threshold: AtomicU32,
    sink: ArcSwap<SharedSink>,
    marker_filter: ArcSwap<Arc<dyn MarkerFilter>>,
}

impl Logger {
    pub(crate) fn new(
        name: &str,
        factory: Arc<dyn MessageFactory>,
        threshold: u32,
        sink: SharedSink,
        marker_filter: Arc<dyn MarkerFilter>,
    ) -> Logger {
        Logger {
            name: Arc::from(name),
            factory,
            threshold: AtomicU32::new(threshold),
            sink: ArcSwap::from_pointee(sink),
            marker_filter: ArcSwap::from_pointee(marker_filter),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        self.name.clone()
    }

    pub fn factory(&self) -> &dyn MessageFactory {
        &*self.factory
    }

    pub fn factory_id(&self) -> FactoryId {
        self.factory.id()
    }

    /// The rank of the least severe level this logger lets through.
    #[inline]
    pub fn threshold_rank(&self) -> u32 {
        self.threshold.load(Ordering::Relaxed)
    }

    /// Changes the threshold. Custom levels are compared by rank.
    pub fn set_threshold(&self, level: &Level) {
        self.threshold.store(level.rank(), Ordering::Relaxed);
    }

    pub fn sink(&self) -> SharedSink {
        SharedSink::clone(&self.sink.load())
    }

    #[inline]
    pub(crate) fn load_sink(&self) -> Guard<Arc<SharedSink>> {
        self.sink.load()
    }

    pub fn set_sink(&self, sink: SharedSink) {
        self.sink.store(Arc::new(sink));
    }

    #[inline]
    pub(crate) fn load_marker_filter(&self) -> Guard<Arc<Arc<dyn MarkerFilter>>> {
        self.marker_filter.load()
    }

    pub fn set_marker_filter(&self, filter: Arc<dyn MarkerFilter>) {
        self.marker_filter.store(Arc::new(filter));
    }

    /// Whether a call at `level` without a marker would reach the sink.
    #[inline]
    pub fn is_enabled(&self, level: &Level) -> bool {
        dispatch::admit(self, level, None).is_some()
    }

    /// Whether a call at `level` with `marker` would reach the sink.
    pub fn is_enabled_for(&self, level: &Level, marker: &Marker) -> bool {
        dispatch::admit(self, level, Some(marker)).is_some()
    }

    pub fn trace(&self, text: impl Into<Cow<'static, str>>) {
        dispatch::log_simple(self, &Level::TRACE, None, text)
    }

    pub fn debug(&self, text: impl Into<Cow<'static, str>>) {
        dispatch::log_simple(self, &Level::DEBUG, None, text)
    }

    pub fn info(&self, text: impl Into<Cow<'static, str>>) {
        dispatch::log_simple(self, &Level::INFO, None, text)
    }

    pub fn warn(&self, text: impl Into<Cow<'static, str>>) {
        dispatch::log_simple(self, &Level::WARN, None, text)
    }

    pub fn error(&self, text: impl Into<Cow<'static, str>>) {
        dispatch::log_simple(self, &Level::ERROR, None, text)
    }

    pub fn fatal(&self, text: impl Into<Cow<'static, str>>) {
        dispatch::log_simple(self, &Level::FATAL, None, text)
    }

    /// Logs `pattern` with `args` through this logger's factory.
    ///
    /// Prefer the [`log!`](crate::log!) macro, which skips building `args`
    /// when the level is disabled.
    pub fn log(&self, level: &Level, pattern: impl Into<Cow<'static, str>>, args: Vec<Arg>) {
        dispatch::log(self, level, None, pattern, args)
    }

    pub fn log_marker(
        &self,
        level: &Level,
        marker: &Marker,
        pattern: impl Into<Cow<'static, str>>,
        args: Vec<Arg>,
    ) {
        dispatch::log(self, level, Some(marker), pattern, args)
    }

    /// Logs a message that was built elsewhere.
    pub fn log_message(&self, level: &Level, marker: Option<&Marker>, message: Message) {
        dispatch::dispatch(self, level, marker, message, None)
    }

    /// Logs the value `supplier` returns. `supplier` only runs if the call is admitted.
    pub fn log_lazy<F, T>(&self, level: &Level, supplier: F)
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Into<Arg>,
    {
        dispatch::log_lazy(self, level, None, supplier)
    }

    pub fn log_error(&self, level: &Level, text: impl Into<Cow<'static, str>>, error: SharedError) {
        dispatch::log_with_exception(self, level, None, text, error)
    }
}

impl Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("factory", &self.factory.id())
            .field("threshold", &self.threshold_rank())
            .field("sink", &**self.sink.load())
            .finish()
    }
}

/*
Boilerplate notes.

# Logger

Clone is out: a registry hands out Arc<Logger> and the whole point is that there is one handle per key.
PartialEq/Eq would have to mean identity, and Arc::ptr_eq already says that.
Default makes no sense without a name and a sink.
Display is not very sensible.
Debug is written by hand since the sink and filter sit behind ArcSwap.
*/
