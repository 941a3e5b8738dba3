// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thread-local MDC/NDC storage and its snapshots.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

/// Read-only view of an MDC, sorted by key.
///
/// Snapshots share storage with the live context until the live context is
/// next modified, so taking one costs a reference count. There is no way to
/// mutate a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextMap(Arc<BTreeMap<String, String>>);

impl ContextMap {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// An owned, mutable copy.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::clone(&self.0)
    }
}

impl Display for ContextMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{k}={v}")?;
        }
        f.write_str("}")
    }
}

/// Read-only view of an NDC, bottom frame first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStack(Arc<Vec<String>>);

impl ContextStack {
    /// The top frame.
    pub fn peek(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for ContextStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[")?;
        for (i, frame) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(frame)?;
        }
        f.write_str("]")
    }
}

/// What a sink may read from a record's context.
pub trait ContextProvider {
    fn mdc(&self) -> &ContextMap;

    fn ndc(&self) -> &ContextStack;

    fn has_context(&self) -> bool {
        !self.mdc().is_empty() || !self.ndc().is_empty()
    }
}

/// A thread's whole context (map and stack) at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSnapshot {
    map: ContextMap,
    stack: ContextStack,
}

impl ContextProvider for ContextSnapshot {
    fn mdc(&self) -> &ContextMap {
        &self.map
    }

    fn ndc(&self) -> &ContextStack {
        &self.stack
    }
}

impl ContextSnapshot {
    pub fn new(map: ContextMap, stack: ContextStack) -> ContextSnapshot {
        ContextSnapshot { map, stack }
    }

    /// Replaces the current thread's context with this snapshot.
    pub fn apply(&self) {
        ThreadContext::replace(self.clone());
    }

    /// Runs `f` with this snapshot installed, then puts the previous context
    /// back, also when `f` panics.
    pub fn scope<R>(&self, f: impl FnOnce() -> R) -> R {
        let reinstate = Reinstate::install(self.clone());
        let result = f();
        reinstate.finish();
        result
    }

    /// Turns `f` into a closure that runs inside this snapshot on whichever
    /// thread calls it.
    pub fn wrap<F, R>(self, f: F) -> impl FnOnce() -> R + Send
    where
        F: FnOnce() -> R + Send,
    {
        move || self.scope(f)
    }
}

/// Puts a saved context back on drop.
pub(crate) struct Reinstate(Option<ContextSnapshot>);

impl Reinstate {
    /// Installs `snapshot`, remembering what it replaced.
    pub(crate) fn install(snapshot: ContextSnapshot) -> Reinstate {
        Reinstate(Some(ThreadContext::replace(snapshot)))
    }

    /// Restores the remembered context and returns the one it displaced.
    pub(crate) fn finish(mut self) -> ContextSnapshot {
        match self.0.take() {
            Some(prior) => ThreadContext::replace(prior),
            None => ContextSnapshot::default(),
        }
    }
}

impl Drop for Reinstate {
    fn drop(&mut self) {
        if let Some(prior) = self.0.take() {
            ThreadContext::replace(prior);
        }
    }
}

#[derive(Default)]
struct ContextData {
    map: Arc<BTreeMap<String, String>>,
    stack: Arc<Vec<String>>,
}

thread_local! {
    static CONTEXT: RefCell<ContextData> = RefCell::new(ContextData::default());
}

/// Runs `f` against this thread's context.
///
/// During thread teardown the storage may already be gone; reads then see an
/// empty context and writes are dropped.
fn with_context<R>(f: impl FnOnce(&mut ContextData) -> R) -> Option<R> {
    CONTEXT.try_with(|cell| f(&mut cell.borrow_mut())).ok()
}

/// Associated functions over the calling thread's MDC and NDC.
#[derive(Debug)]
pub struct ThreadContext {
    _private: (),
}

impl ThreadContext {
    /// Sets `key` to `value`.
    pub fn put(key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        with_context(|data| {
            if data.map.get(&key) != Some(&value) {
                Arc::make_mut(&mut data.map).insert(key, value);
            }
        });
    }

    /// `put` with absent inputs: no key does nothing, no value removes the key.
    pub fn put_opt(key: Option<&str>, value: Option<&str>) {
        match (key, value) {
            (None, _) => {}
            (Some(key), Some(value)) => Self::put(key, value),
            (Some(key), None) => Self::remove(key),
        }
    }

    /// Applies [`put_opt`](Self::put_opt) to each entry in order.
    pub fn put_all<I, K, V>(entries: I)
    where
        I: IntoIterator<Item = (K, Option<V>)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in entries {
            let value: Option<&str> = value.as_ref().map(|v| v.as_ref());
            Self::put_opt(Some(key.as_ref()), value);
        }
    }

    pub fn get(key: &str) -> Option<String> {
        with_context(|data| data.map.get(key).cloned()).flatten()
    }

    pub fn contains_key(key: &str) -> bool {
        with_context(|data| data.map.contains_key(key)).unwrap_or(false)
    }

    pub fn remove(key: &str) {
        with_context(|data| {
            if data.map.contains_key(key) {
                Arc::make_mut(&mut data.map).remove(key);
            }
        });
    }

    pub fn remove_all<I, K>(keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            Self::remove(key.as_ref());
        }
    }

    pub fn clear_map() {
        with_context(|data| data.map = Arc::default());
    }

    /// An owned copy of the map. Changing it does not affect the context.
    pub fn context() -> BTreeMap<String, String> {
        Self::immutable_context().to_map()
    }

    pub fn immutable_context() -> ContextMap {
        with_context(|data| ContextMap(data.map.clone())).unwrap_or_default()
    }

    pub fn push(frame: impl Into<String>) {
        let frame = frame.into();
        with_context(|data| Arc::make_mut(&mut data.stack).push(frame));
    }

    /// Removes and returns the top frame, or `None` if the stack is empty.
    pub fn pop() -> Option<String> {
        with_context(|data| {
            if data.stack.is_empty() {
                None
            } else {
                Arc::make_mut(&mut data.stack).pop()
            }
        })
        .flatten()
    }

    pub fn peek() -> Option<String> {
        with_context(|data| data.stack.last().cloned()).flatten()
    }

    pub fn depth() -> usize {
        with_context(|data| data.stack.len()).unwrap_or(0)
    }

    /// Drops frames until at most `depth` remain.
    pub fn trim(depth: usize) {
        with_context(|data| {
            if data.stack.len() > depth {
                Arc::make_mut(&mut data.stack).truncate(depth);
            }
        });
    }

    pub fn clear_stack() {
        with_context(|data| data.stack = Arc::default());
    }

    pub fn immutable_stack() -> ContextStack {
        with_context(|data| ContextStack(data.stack.clone())).unwrap_or_default()
    }

    /// Replaces the stack with `stack`.
    pub fn set_stack(stack: &ContextStack) {
        let frames = stack.0.clone();
        with_context(|data| data.stack = frames);
    }

    pub fn clear_all() {
        with_context(|data| *data = ContextData::default());
    }

    /// True when both the map and the stack are empty.
    pub fn is_empty() -> bool {
        with_context(|data| data.map.is_empty() && data.stack.is_empty()).unwrap_or(true)
    }

    /// Snapshot of the map and stack together.
    pub fn capture() -> ContextSnapshot {
        with_context(|data| ContextSnapshot {
            map: ContextMap(data.map.clone()),
            stack: ContextStack(data.stack.clone()),
        })
        .unwrap_or_default()
    }

    /// Installs `snapshot` as this thread's context and returns the context it replaced.
    pub fn replace(snapshot: ContextSnapshot) -> ContextSnapshot {
        let ContextSnapshot { map, stack } = snapshot;
        with_context(move |data| {
            let prior_map = std::mem::replace(&mut data.map, map.0);
            let prior_stack = std::mem::replace(&mut data.stack, stack.0);
            ContextSnapshot {
                map: ContextMap(prior_map),
                stack: ContextStack(prior_stack),
            }
        })
        .unwrap_or_default()
    }
}
