// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform-specific time types for cross-platform compatibility.
//!
//! On native platforms these come from `std::time`, while on WASM they come
//! from `web_time`, since `std::time::Instant::now` panics there.
//!
//! [`Duration`] is re-exported at the crate root because
//! [`LogRecord::elapsed`](crate::LogRecord::elapsed) returns it.

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant};
#[cfg(target_arch = "wasm32")]
pub use web_time::{Duration, Instant};
