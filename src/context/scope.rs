// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoped context changes that undo themselves.

use super::thread_context::ThreadContext;
use std::marker::PhantomData;

/// A set of MDC puts and NDC pushes that are reverted when the scope drops.
///
/// Each `put` remembers the value it overwrote and restores it on drop (or
/// removes the key if there was none), newest first, so nested scopes unwind
/// to exactly the state before them. Pushed frames are trimmed back to the
/// depth the stack had before the first push.
///
/// Drop runs on every exit path, including unwinding.
///
/// A scope belongs to the thread that created it and is not `Send`.
///
/// ```rust
/// use logdispatch::context::{ContextScope, ThreadContext};
///
/// fn handle(request_id: &str) {
///     let _scope = ContextScope::new()
///         .put("request", request_id)
///         .push("handle");
///     assert_eq!(ThreadContext::get("request").as_deref(), Some(request_id));
/// }
///
/// handle("r-1");
/// assert!(ThreadContext::is_empty());
/// ```
#[must_use = "the context changes are reverted as soon as the scope is dropped"]
#[derive(Debug, Default)]
pub struct ContextScope {
    saved: Vec<(String, Option<String>)>,
    base_depth: Option<usize>,
    _thread_bound: PhantomData<*const ()>,
}

impl ContextScope {
    pub fn new() -> ContextScope {
        ContextScope::default()
    }

    /// Sets `key` for the lifetime of the scope.
    pub fn put(mut self, key: impl Into<String>, value: impl Into<String>) -> ContextScope {
        let key = key.into();
        let prior = ThreadContext::get(&key);
        ThreadContext::put(key.clone(), value);
        self.saved.push((key, prior));
        self
    }

    /// Sets every entry for the lifetime of the scope.
    pub fn put_all<I, K, V>(self, entries: I) -> ContextScope
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        entries
            .into_iter()
            .fold(self, |scope, (key, value)| scope.put(key, value))
    }

    /// Pushes `frame` for the lifetime of the scope.
    pub fn push(mut self, frame: impl Into<String>) -> ContextScope {
        if self.base_depth.is_none() {
            self.base_depth = Some(ThreadContext::depth());
        }
        ThreadContext::push(frame);
        self
    }

    /// Reverts now rather than at end of scope.
    pub fn close(self) {}
}

impl Drop for ContextScope {
    fn drop(&mut self) {
        while let Some((key, prior)) = self.saved.pop() {
            match prior {
                Some(value) => ThreadContext::put(key, value),
                None => ThreadContext::remove(&key),
            }
        }
        if let Some(depth) = self.base_depth.take() {
            ThreadContext::trim(depth);
        }
    }
}

impl ThreadContext {
    /// Shorthand for `ContextScope::new().put(key, value)`.
    pub fn scoped_put(key: impl Into<String>, value: impl Into<String>) -> ContextScope {
        ContextScope::new().put(key, value)
    }

    /// Shorthand for `ContextScope::new().push(frame)`.
    pub fn scoped_push(frame: impl Into<String>) -> ContextScope {
        ContextScope::new().push(frame)
    }
}
