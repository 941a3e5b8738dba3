// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async context preservation.

use std::future::Future;
use std::pin::Pin;
use std::task::Poll;

use super::thread_context::{ContextSnapshot, Reinstate, ThreadContext};

/// A [`Future`] wrapper that gives a task its own diagnostic context.
///
/// Executors poll many tasks on the same OS threads, and a task may resume on a
/// different thread than it started on, so thread-local context neither
/// follows a task nor stays out of its neighbours. `ApplyContext` carries the
/// task's context with the future instead:
///
/// 1. Install the task's context on the polling thread.
/// 2. Poll the inner future.
/// 3. Save whatever the future left in the context back into the wrapper.
/// 4. Restore the thread's previous context.
///
/// # Examples
///
/// ```rust
/// use logdispatch::context::{ApplyContext, ThreadContext};
///
/// async fn process() -> Option<String> {
///     ThreadContext::get("user")
/// }
///
/// # async fn example() {
/// ThreadContext::put("user", "ada");
/// let task = ApplyContext::current(process());
/// ThreadContext::clear_all();
///
/// // the task still sees the context it was created with
/// assert_eq!(task.await.as_deref(), Some("ada"));
/// # }
/// ```
pub struct ApplyContext<F> {
    context: ContextSnapshot,
    future: F,
}

impl<F> ApplyContext<F> {
    /// Runs `future` inside `context`.
    pub fn new(context: ContextSnapshot, future: F) -> Self {
        Self { context, future }
    }

    /// Runs `future` inside a snapshot of the calling thread's context.
    pub fn current(future: F) -> Self {
        Self::new(ThreadContext::capture(), future)
    }

    /// The context the task will see on its next poll.
    pub fn context(&self) -> &ContextSnapshot {
        &self.context
    }
}

impl<F> Future for ApplyContext<F>
where
    F: Future,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut std::task::Context<'_>) -> Poll<Self::Output> {
        //safety: `future` is never moved out of the pinned wrapper
        let (context, fut) = unsafe {
            let d = self.get_unchecked_mut();
            (&mut d.context, Pin::new_unchecked(&mut d.future))
        };
        let reinstate = Reinstate::install(context.clone());
        let r = fut.poll(cx);
        *context = reinstate.finish();
        r
    }
}
