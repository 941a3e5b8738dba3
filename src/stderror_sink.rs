// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::level::StandardLevel;
use crate::log_record::LogRecord;
use crate::sink::Sink;

/**
A reference sink that writes rendered records to stderr.

On wasm32 each record goes to the browser console method matching its level.
 */
#[derive(Debug, Clone)]
pub struct StdErrorSink {}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// Design decisions for StdErrorSink trait implementations:
//
// - Debug/Clone: Already derived - appropriate for zero-sized struct
// - Copy: Implemented - safe for zero-sized struct with no heap allocation
// - PartialEq/Eq: Implemented - all instances are equivalent (zero-sized)
// - Hash: Implemented - consistent with Eq, enables use as hash map keys
// - Default: Implemented - provides convenient zero-argument constructor
// - Display: NOT implemented - no meaningful string representation for stderr sink
// - From/Into: NOT implemented - no obvious conversions
// - Send/Sync: Automatically implemented - zero-sized struct is always thread-safe

impl Copy for StdErrorSink {}

impl PartialEq for StdErrorSink {
    fn eq(&self, _other: &Self) -> bool {
        // All instances of a zero-sized struct are equal
        true
    }
}

impl Eq for StdErrorSink {}

impl std::hash::Hash for StdErrorSink {
    fn hash<H: std::hash::Hasher>(&self, _state: &mut H) {
        // Zero-sized struct has no data to hash - this is consistent with Eq
    }
}

impl Default for StdErrorSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StdErrorSink {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Sink for StdErrorSink {
    fn log_record(&self, record: LogRecord) {
        let msg = record.render();
        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::io::Write;
            let mut lock = std::io::stderr().lock();
            //a closed stderr is not the caller's problem
            let _ = lock.write_all(msg.as_bytes());
            let _ = lock.write_all(b"\n");
        }
        #[cfg(target_arch = "wasm32")]
        {
            match record.level() {
                StandardLevel::Trace => {
                    web_sys::console::trace_1(&msg.into());
                }
                StandardLevel::Debug => {
                    web_sys::console::debug_1(&msg.into());
                }
                StandardLevel::Info => {
                    web_sys::console::info_1(&msg.into());
                }
                StandardLevel::Warn => {
                    web_sys::console::warn_1(&msg.into());
                }
                StandardLevel::Error | StandardLevel::Fatal => {
                    web_sys::console::error_1(&msg.into());
                }
            }
        }
    }

    fn is_level_enabled(&self, _level: StandardLevel) -> bool {
        true
    }

    fn prepare_to_die(&self) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::io::Write;
            let _ = std::io::stderr().flush();
        }
    }
}
