// SPDX-License-Identifier: MIT OR Apache-2.0

//! Severity levels.
//!
//! A [`Level`] is a name plus a rank. Lower ranks are more severe:
//!
//! | Level | Rank       |
//! |-------|------------|
//! | OFF   | 0          |
//! | FATAL | 100        |
//! | ERROR | 200        |
//! | WARN  | 300        |
//! | INFO  | 400        |
//! | DEBUG | 500        |
//! | TRACE | 600        |
//! | ALL   | `u32::MAX` |
//!
//! Custom levels may use any rank. Backends only understand the six
//! [`StandardLevel`]s, so every level carries its translation, computed once
//! when the level is constructed. Custom levels are interned by name in a
//! [`LevelRegistry`] so that a name keeps its rank for the life of the registry.
//!
//! ```
//! use logdispatch::{Level, LevelRegistry, StandardLevel};
//!
//! let levels = LevelRegistry::new();
//! let notice = levels.for_name("notice", 350);
//! assert_eq!(notice.standard(), StandardLevel::Warn);
//! assert!(notice.is_more_severe_than(&Level::INFO));
//! // the first registration wins
//! assert_eq!(levels.for_name("NOTICE", 999).rank(), 350);
//! ```

use crate::error::Error;
use crate::status;
use dashmap::DashMap;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

/// The severities a backend sink understands.
///
/// Declaration order matches rank order, so the derived `Ord` agrees with
/// [`rank`](Self::rank): `Fatal < Error < ... < Trace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StandardLevel {
    Fatal,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

const BUCKETS: [StandardLevel; 6] = [
    StandardLevel::Fatal,
    StandardLevel::Error,
    StandardLevel::Warn,
    StandardLevel::Info,
    StandardLevel::Debug,
    StandardLevel::Trace,
];

impl StandardLevel {
    pub const fn rank(self) -> u32 {
        match self {
            StandardLevel::Fatal => 100,
            StandardLevel::Error => 200,
            StandardLevel::Warn => 300,
            StandardLevel::Info => 400,
            StandardLevel::Debug => 500,
            StandardLevel::Trace => 600,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            StandardLevel::Fatal => "FATAL",
            StandardLevel::Error => "ERROR",
            StandardLevel::Warn => "WARN",
            StandardLevel::Info => "INFO",
            StandardLevel::Debug => "DEBUG",
            StandardLevel::Trace => "TRACE",
        }
    }

    /// The standard level with the largest rank that is still `<= rank`.
    ///
    /// Ranks more severe than `FATAL` clamp to `FATAL`, ranks past `TRACE`
    /// clamp to `TRACE`. A custom level therefore never maps to anything less
    /// severe than itself.
    pub const fn nearest(rank: u32) -> StandardLevel {
        let mut found = StandardLevel::Fatal;
        let mut i = 0;
        while i < BUCKETS.len() {
            if BUCKETS[i].rank() > rank {
                break;
            }
            found = BUCKETS[i];
            i += 1;
        }
        found
    }

    /// The [`Level`] constant for this standard level.
    pub const fn level(self) -> Level {
        match self {
            StandardLevel::Fatal => Level::FATAL,
            StandardLevel::Error => Level::ERROR,
            StandardLevel::Warn => Level::WARN,
            StandardLevel::Info => Level::INFO,
            StandardLevel::Debug => Level::DEBUG,
            StandardLevel::Trace => Level::TRACE,
        }
    }
}

impl Display for StandardLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A named severity.
///
/// Equality and hashing use both name and rank; ordering is by rank
/// (most severe first) with the name as a tiebreak.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Level {
    name: Cow<'static, str>,
    rank: u32,
    standard: StandardLevel,
}

impl Level {
    pub const OFF: Level = Level::constant("OFF", 0);
    pub const FATAL: Level = Level::constant("FATAL", 100);
    pub const ERROR: Level = Level::constant("ERROR", 200);
    pub const WARN: Level = Level::constant("WARN", 300);
    pub const INFO: Level = Level::constant("INFO", 400);
    pub const DEBUG: Level = Level::constant("DEBUG", 500);
    pub const TRACE: Level = Level::constant("TRACE", 600);
    pub const ALL: Level = Level::constant("ALL", u32::MAX);

    const STANDARD: [Level; 8] = [
        Level::OFF,
        Level::FATAL,
        Level::ERROR,
        Level::WARN,
        Level::INFO,
        Level::DEBUG,
        Level::TRACE,
        Level::ALL,
    ];

    const fn constant(name: &'static str, rank: u32) -> Level {
        Level {
            name: Cow::Borrowed(name),
            rank,
            standard: StandardLevel::nearest(rank),
        }
    }

    fn custom(name: String, rank: u32) -> Level {
        Level {
            name: Cow::Owned(name),
            rank,
            standard: StandardLevel::nearest(rank),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn rank(&self) -> u32 {
        self.rank
    }

    /// The backend level this level translates to.
    ///
    /// Computed when the level is built, so this is a field read.
    #[inline]
    pub fn standard(&self) -> StandardLevel {
        self.standard
    }

    #[inline]
    pub fn is_more_severe_than(&self, other: &Level) -> bool {
        self.rank < other.rank
    }

    #[inline]
    pub fn is_less_severe_than(&self, other: &Level) -> bool {
        self.rank > other.rank
    }

    /// True when this level lies between `most_severe` and `least_severe`, inclusive.
    pub fn is_in_range(&self, most_severe: &Level, least_severe: &Level) -> bool {
        most_severe.rank <= self.rank && self.rank <= least_severe.rank
    }

    /// Looks up a standard level by name, falling back to `INFO`.
    pub fn parse_or_info(name: &str) -> Level {
        name.parse().unwrap_or_else(|e| {
            status::debug(format_args!("{e}, using INFO"));
            Level::INFO
        })
    }
}

/// Translates an optional level to its backend level. An absent level is `INFO`.
#[inline]
pub fn translate(level: Option<&Level>) -> StandardLevel {
    level.map_or(StandardLevel::Info, Level::standard)
}

impl PartialOrd for Level {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Level {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank
            .cmp(&other.rank)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::INFO
    }
}

impl From<StandardLevel> for Level {
    fn from(level: StandardLevel) -> Self {
        level.level()
    }
}

/// Parses the standard level names, ignoring case and surrounding whitespace.
///
/// Custom levels are not known here; resolve those through a [`LevelRegistry`].
impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Level::STANDARD
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(wanted))
            .cloned()
            .ok_or_else(|| Error::UnknownLevel(s.to_string()))
    }
}

/*
Boilerplate notes.

Level is not Copy because custom names are owned.  Clone is cheap for the
standard constants (borrowed names).
Default is INFO, which is also what an absent level means everywhere else.
Ord is by rank, so `Level::FATAL < Level::INFO` reads as "more severe sorts first".
*/

/// Interns levels by name.
///
/// Names are case-insensitive (stored upper-case). The eight standard levels
/// are always present.
#[derive(Debug)]
pub struct LevelRegistry {
    levels: DashMap<String, Level>,
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelRegistry {
    pub fn new() -> Self {
        let levels = DashMap::new();
        for level in Level::STANDARD {
            levels.insert(level.name().to_string(), level);
        }
        Self { levels }
    }

    /// Returns the level called `name`, creating it with `rank` on first use.
    ///
    /// If the name is already known the existing level is returned unchanged,
    /// even when `rank` differs. An empty name resolves to `INFO`.
    pub fn for_name(&self, name: &str, rank: u32) -> Level {
        let key = name.trim().to_ascii_uppercase();
        if key.is_empty() {
            status::warn("empty level name, using INFO");
            return Level::INFO;
        }
        let level = self
            .levels
            .entry(key.clone())
            .or_insert_with(|| Level::custom(key, rank))
            .value()
            .clone();
        if level.rank != rank {
            status::debug(format_args!(
                "level {} keeps rank {}, ignoring requested rank {}",
                level, level.rank, rank
            ));
        }
        level
    }

    /// Like [`for_name`](Self::for_name), but refuses to rebind a known name.
    pub fn register(&self, name: &str, rank: u32) -> Result<Level, Error> {
        let level = self.for_name(name, rank);
        if level.rank != rank {
            return Err(Error::LevelConflict {
                name: level.name().to_string(),
                existing: level.rank,
                requested: rank,
            });
        }
        Ok(level)
    }

    pub fn get(&self, name: &str) -> Option<Level> {
        self.levels
            .get(&name.trim().to_ascii_uppercase())
            .map(|l| l.value().clone())
    }

    /// Looks up `name`; unknown names resolve to `INFO`.
    pub fn resolve(&self, name: &str) -> Level {
        self.get(name).unwrap_or_else(|| {
            status::debug(format_args!("unknown level {name:?}, using INFO"));
            Level::INFO
        })
    }

    /// Every known level, most severe first.
    pub fn values(&self) -> Vec<Level> {
        let mut values: Vec<Level> = self.levels.iter().map(|l| l.value().clone()).collect();
        values.sort();
        values
    }

    /// Forgets every custom level.
    pub fn clear_custom(&self) {
        self.levels
            .retain(|_, level| Level::STANDARD.iter().any(|s| *s == *level));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_levels_are_ordered_by_severity() {
        assert!(Level::OFF < Level::FATAL);
        assert!(Level::FATAL < Level::ERROR);
        assert!(Level::WARN < Level::INFO);
        assert!(Level::TRACE < Level::ALL);
        assert!(Level::ERROR.is_more_severe_than(&Level::WARN));
        assert!(Level::DEBUG.is_less_severe_than(&Level::INFO));
        assert!(Level::INFO.is_in_range(&Level::ERROR, &Level::DEBUG));
        assert!(!Level::TRACE.is_in_range(&Level::ERROR, &Level::DEBUG));
    }

    #[test]
    fn nearest_picks_closest_rank_at_or_below() {
        assert_eq!(StandardLevel::nearest(400), StandardLevel::Info);
        assert_eq!(StandardLevel::nearest(450), StandardLevel::Info);
        assert_eq!(StandardLevel::nearest(499), StandardLevel::Info);
        assert_eq!(StandardLevel::nearest(500), StandardLevel::Debug);
        assert_eq!(StandardLevel::nearest(0), StandardLevel::Fatal);
        assert_eq!(StandardLevel::nearest(99), StandardLevel::Fatal);
        assert_eq!(StandardLevel::nearest(u32::MAX), StandardLevel::Trace);
    }

    #[test]
    fn translate_defaults_to_info() {
        assert_eq!(translate(None), StandardLevel::Info);
        assert_eq!(translate(Some(&Level::ERROR)), StandardLevel::Error);
        assert_eq!(Level::ALL.standard(), StandardLevel::Trace);
        assert_eq!(Level::OFF.standard(), StandardLevel::Fatal);
    }

    #[test]
    fn parse_standard_names() {
        assert_eq!("warn".parse::<Level>(), Ok(Level::WARN));
        assert_eq!(" Trace ".parse::<Level>(), Ok(Level::TRACE));
        assert_eq!(
            "verbose".parse::<Level>(),
            Err(Error::UnknownLevel("verbose".to_string()))
        );
        assert_eq!(Level::parse_or_info("verbose"), Level::INFO);
    }

    #[test]
    fn custom_levels_keep_their_first_rank() {
        let levels = LevelRegistry::new();
        let notice = levels.for_name("Notice", 350);
        assert_eq!(notice.name(), "NOTICE");
        assert_eq!(notice.standard(), StandardLevel::Warn);

        let again = levels.for_name("notice", 10);
        assert_eq!(again, notice);
        assert_eq!(
            levels.register("NOTICE", 10),
            Err(Error::LevelConflict {
                name: "NOTICE".to_string(),
                existing: 350,
                requested: 10
            })
        );
        assert_eq!(levels.register("notice", 350), Ok(notice));
    }

    #[test]
    fn standard_names_cannot_be_rebound() {
        let levels = LevelRegistry::new();
        assert_eq!(levels.for_name("info", 42), Level::INFO);
        assert!(levels.register("DEBUG", 1).is_err());
    }

    #[test]
    fn registry_values_and_clear() {
        let levels = LevelRegistry::new();
        levels.for_name("verbose", 550);
        let values = levels.values();
        assert_eq!(values.len(), 9);
        assert_eq!(values[0], Level::OFF);
        assert_eq!(values[6].name(), "VERBOSE");
        assert_eq!(levels.resolve("nope"), Level::INFO);
        assert_eq!(levels.for_name("", 5), Level::INFO);

        levels.clear_custom();
        assert!(levels.get("verbose").is_none());
        assert_eq!(levels.get("error"), Some(Level::ERROR));
    }
}
