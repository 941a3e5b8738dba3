// SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# logdispatch

logdispatch is the dispatch core of a logging facade: it decides whether a log call does any work,
formats the message exactly once, attaches the calling thread's diagnostic context and hands a single
finished record to a backend sink.

It does not write files, talk to the network or read configuration files. Those belong to the sink.

# The problem

A logging call is made far more often than it is emitted. Most calls are below the threshold, so the
expensive parts (formatting arguments, running lazy suppliers, copying context) must happen only after
a cheap check says the record is wanted. And when a record is wanted, every shape of call (plain text,
`{}` patterns of any arity, prebuilt messages, lazy values, with or without a marker or an error) should
go through the same steps so they all behave the same.

# The pipeline

```text
call site -> LoggerRegistry::get -> Logger -> dispatch
          -> level gate -> marker gate -> format -> marker label -> capture context -> Sink
```

| Piece                  | Module                 |
|------------------------|------------------------|
| severities             | [`Level`], [`StandardLevel`], [`LevelRegistry`] |
| hierarchical tags      | [`Marker`], [`MarkerRegistry`] |
| messages and arguments | [`Message`], [`Arg`], [`MessageFactory`], [`format`] |
| MDC / NDC              | [`context`]            |
| the funnel             | [`dispatch`]           |
| handles                | [`Logger`], [`LoggerRegistry`], [`global`] |
| backends               | [`Sink`], [`StdErrorSink`], [`InMemorySink`] |

# The API

```rust
use logdispatch::{Config, InMemorySink, LoggerRegistry};
use logdispatch::context::{ContextProvider, ThreadContext};
use std::sync::Arc;

let sink = Arc::new(InMemorySink::new());
let registry = LoggerRegistry::new(Config::default(), sink.clone());
let logger = registry.get("checkout");

ThreadContext::put("user", "ada");
logdispatch::info!(logger, "cart has {} items", 3);
logdispatch::debug!(logger, "not emitted at the default INFO threshold: {}", 1);
ThreadContext::clear_all();

let records = sink.drain_records();
assert_eq!(records.len(), 1);
assert_eq!(records[0].text(), "cart has 3 items");
assert_eq!(records[0].context().mdc().get("user"), Some("ada"));
```

Arguments to the macros are only evaluated when the level is enabled. For values that are expensive
to compute, [`Logger::log_lazy`] defers the work the same way without a macro.

# Failure

Logging never fails the caller. Unknown level names become `INFO`. A lazy supplier that panics, or an
argument whose `Display` fails, produces a record with the text `error formatting message: <cause>`
and a report on the [`status`] logger, which writes straight to stderr.

# Multithreading

Diagnostic context is per thread and never copied to another thread on its own.
If you are e.g. spawning a child thread, writing an async executor or similar,
use [`context::ContextSnapshot::wrap`] or [`context::ApplyContext`] to carry it along.
*/

mod config;
pub mod context;
pub mod dispatch;
mod error;
pub mod format;
pub mod global;
mod inmemory_sink;
mod level;
mod log_record;
mod logger;
mod macros;
mod marker;
mod message;
mod registry;
mod sink;
pub mod status;
mod stderror_sink;
mod sys;

pub use config::{Config, LEVEL_VAR, STATUS_VAR};
pub use error::Error;
pub use inmemory_sink::InMemorySink;
pub use level::{Level, LevelRegistry, StandardLevel, translate};
pub use log_record::LogRecord;
pub use logger::Logger;
pub use marker::{Marker, MarkerRegistry};
pub use message::{
    Arg, FactoryId, Message, MessageFactory, ParameterizedMessageFactory, SharedError,
    SimpleMessageFactory,
};
pub use registry::LoggerRegistry;
pub use sink::{AcceptAllMarkers, DenyMarker, MarkerFilter, SharedSink, Sink};
pub use stderror_sink::StdErrorSink;

pub use sys::Duration;
