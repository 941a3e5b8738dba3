// SPDX-License-Identifier: MIT OR Apache-2.0

//! Internal diagnostics for the dispatch core itself.
//!
//! A formatting failure discovered while dispatching must not be dispatched
//! again (the sink that would receive it may be the very thing being logged
//! through), so problems inside the core are written straight to stderr, the
//! same way [`StdErrorSink`](crate::StdErrorSink) does.
//!
//! The status threshold is process-wide. It defaults to `WARN`, or `DEBUG` when
//! the crate is built with the `internal_status` feature, and can be changed
//! with [`set_threshold`] or through [`Config`](crate::Config).

use crate::level::{Level, StandardLevel};
use std::fmt::Display;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

#[cfg(feature = "internal_status")]
const DEFAULT_THRESHOLD: u32 = StandardLevel::Debug.rank();
#[cfg(not(feature = "internal_status"))]
const DEFAULT_THRESHOLD: u32 = StandardLevel::Warn.rank();

static THRESHOLD: AtomicU32 = AtomicU32::new(DEFAULT_THRESHOLD);
static PROBLEMS: AtomicU64 = AtomicU64::new(0);

/// Sets the most verbose level the status logger will print.
///
/// `Level::OFF` silences it entirely. Problems are still counted.
pub fn set_threshold(level: &Level) {
    THRESHOLD.store(level.rank(), Ordering::Relaxed);
}

/// Whether a status message at `level` would be printed.
#[inline]
pub fn is_enabled(level: StandardLevel) -> bool {
    level.rank() <= THRESHOLD.load(Ordering::Relaxed)
}

/// Number of `WARN`-or-worse problems reported since process start, printed or not.
pub fn problems_reported() -> u64 {
    PROBLEMS.load(Ordering::Relaxed)
}

pub(crate) fn report(level: StandardLevel, message: impl Display) {
    if level.rank() <= StandardLevel::Warn.rank() {
        PROBLEMS.fetch_add(1, Ordering::Relaxed);
    }
    if !is_enabled(level) {
        return;
    }
    let line = format!("logdispatch {}: {}", level, message);
    #[cfg(not(target_arch = "wasm32"))]
    {
        use std::io::Write;
        let mut lock = std::io::stderr().lock();
        //nowhere left to report a failed status write
        let _ = lock.write_all(line.as_bytes());
        let _ = lock.write_all(b"\n");
    }
    #[cfg(target_arch = "wasm32")]
    {
        web_sys::console::warn_1(&line.into());
    }
}

#[inline]
pub(crate) fn warn(message: impl Display) {
    report(StandardLevel::Warn, message)
}

#[inline]
pub(crate) fn debug(message: impl Display) {
    report(StandardLevel::Debug, message)
}
