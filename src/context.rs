// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread-scoped diagnostic context: a key/value map (MDC) and a stack of
//! labels (NDC).
//!
//! Each thread owns its own context, created empty on first use and dropped
//! when the thread exits. Every record dispatched on a thread carries a
//! snapshot of that thread's context for the sink to render.
//!
//! ```rust
//! use logdispatch::context::ThreadContext;
//!
//! ThreadContext::put("request", "r-42");
//! ThreadContext::push("checkout");
//! assert_eq!(ThreadContext::get("request").as_deref(), Some("r-42"));
//! assert_eq!(ThreadContext::peek().as_deref(), Some("checkout"));
//! ThreadContext::clear_all();
//! assert!(ThreadContext::is_empty());
//! ```
//!
//! # Scopes
//!
//! [`ContextScope`] undoes exactly what it did when dropped, restoring any
//! value it overwrote:
//!
//! ```rust
//! use logdispatch::context::{ContextScope, ThreadContext};
//!
//! ThreadContext::put("k", "1");
//! {
//!     let _scope = ContextScope::new().put("k", "2").push("inner");
//!     assert_eq!(ThreadContext::get("k").as_deref(), Some("2"));
//! }
//! assert_eq!(ThreadContext::get("k").as_deref(), Some("1"));
//! assert_eq!(ThreadContext::depth(), 0);
//! # ThreadContext::clear_all();
//! ```
//!
//! # Crossing threads and tasks
//!
//! Context is never copied to another thread implicitly. Capture a
//! [`ContextSnapshot`] and install it where the work runs:
//!
//! ```rust
//! use logdispatch::context::ThreadContext;
//!
//! ThreadContext::put("job", "7");
//! let work = ThreadContext::capture().wrap(|| ThreadContext::get("job"));
//! let seen = std::thread::spawn(work).join().unwrap();
//! assert_eq!(seen.as_deref(), Some("7"));
//! # ThreadContext::clear_all();
//! ```
//!
//! Async tasks share OS threads and may hop between them, so thread-local
//! state does not follow a task on its own. Wrap the future in
//! [`ApplyContext`]: it installs the task's context around every poll and
//! saves the task's changes when the poll returns.

mod apply_context;
mod scope;
mod thread_context;


pub use apply_context::ApplyContext;
pub use scope::ContextScope;
pub use thread_context::{ContextMap, ContextProvider, ContextSnapshot, ContextStack, ThreadContext};
