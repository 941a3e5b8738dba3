// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error type for the few fallible, off-hot-path operations.
//!
//! Nothing on the logging path returns this type. Those calls degrade instead
//! (unknown level names resolve to `INFO`, formatting failures become
//! fallback text). `Error` surfaces only where a caller explicitly asks, e.g.
//! [`Level::from_str`](std::str::FromStr::from_str) or
//! [`Message::try_formatted`](crate::Message::try_formatted).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The name does not belong to any standard level.
    #[error("unknown level name {0:?}")]
    UnknownLevel(String),

    /// A custom level name was already bound to a different rank.
    #[error("level {name} is already registered with rank {existing}, not {requested}")]
    LevelConflict {
        name: String,
        existing: u32,
        requested: u32,
    },

    /// A lazy supplier panicked or an argument's `Display` impl failed.
    #[error("error formatting message: {0}")]
    Formatting(String),
}
