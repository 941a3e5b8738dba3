// SPDX-License-Identifier: MIT OR Apache-2.0

//! `{}` placeholder substitution.
//!
//! The pattern is scanned once, left to right. Each `{}` takes the next
//! argument; once the arguments run out the remaining placeholders are copied
//! literally, and surplus arguments are ignored.
//!
//! ```
//! use logdispatch::format::format;
//! use logdispatch::Arg;
//!
//! assert_eq!(format("{} and {}", &["a".into(), "b".into()]), "a and b");
//! assert_eq!(format("{} {} {}", &["x".into()]), "x {} {}");
//! assert_eq!(format("no placeholders", &["unused".into()]), "no placeholders");
//! assert_eq!(format("{}", &[Arg::Null]), "null");
//! ```
//!
//! [`format1`] and [`format2`] produce exactly what [`format`] would for one
//! or two arguments, without the caller building a slice. Each has a `try_`
//! form that reports a failing `Display` instead of substituting fallback text.

use crate::error::Error;
use crate::message::Arg;
use std::fmt::{self, Write};

const PLACEHOLDER: &str = "{}";

/// Copies `pattern` into `out`, calling `write_arg(out, i)` for the first
/// `available` placeholders.
fn substitute<F>(out: &mut String, pattern: &str, available: usize, mut write_arg: F) -> fmt::Result
where
    F: FnMut(&mut String, usize) -> fmt::Result,
{
    let mut rest = pattern;
    let mut next = 0;
    while next < available {
        let Some(at) = rest.find(PLACEHOLDER) else {
            break;
        };
        out.push_str(&rest[..at]);
        write_arg(out, next)?;
        next += 1;
        rest = &rest[at + PLACEHOLDER.len()..];
    }
    out.push_str(rest);
    Ok(())
}

/// Renders a single argument the way a placeholder would.
pub fn write_arg(out: &mut String, arg: &Arg) -> fmt::Result {
    match arg {
        Arg::Null => out.push_str("null"),
        Arg::Text(text) => out.push_str(text),
        Arg::Int(v) => write!(out, "{v}")?,
        Arg::UInt(v) => write!(out, "{v}")?,
        Arg::Float(v) => write!(out, "{v}")?,
        Arg::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
        Arg::Char(v) => out.push(*v),
        Arg::Display(v) => write!(out, "{v}")?,
        Arg::Error(e) => write!(out, "{e}")?,
        Arg::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_arg(out, item)?;
            }
            out.push(']');
        }
    }
    Ok(())
}

fn capacity(pattern: &str, args: usize) -> usize {
    pattern.len() + args * 8
}

fn display_failure(pattern: &str) -> Error {
    Error::Formatting(format!("an argument of {pattern:?} failed to display"))
}

/// Substitutes `args` into `pattern`, failing if an argument's `Display` fails.
pub fn try_format(pattern: &str, args: &[Arg]) -> Result<String, Error> {
    let mut out = String::with_capacity(capacity(pattern, args.len()));
    substitute(&mut out, pattern, args.len(), |out, i| write_arg(out, &args[i]))
        .map_err(|_| display_failure(pattern))?;
    Ok(out)
}

/// Substitutes `args` into `pattern`.
///
/// If an argument cannot be displayed the result is the fallback text
/// `error formatting message: ...` rather than an error.
pub fn format(pattern: &str, args: &[Arg]) -> String {
    try_format(pattern, args).unwrap_or_else(|e| e.to_string())
}

/// One-argument form of [`try_format`].
pub fn try_format1(pattern: &str, arg: &Arg) -> Result<String, Error> {
    let mut out = String::with_capacity(capacity(pattern, 1));
    substitute(&mut out, pattern, 1, |out, _| write_arg(out, arg))
        .map_err(|_| display_failure(pattern))?;
    Ok(out)
}

/// One-argument form of [`format`].
pub fn format1(pattern: &str, arg: &Arg) -> String {
    try_format1(pattern, arg).unwrap_or_else(|e| e.to_string())
}

/// Two-argument form of [`try_format`].
pub fn try_format2(pattern: &str, first: &Arg, second: &Arg) -> Result<String, Error> {
    let mut out = String::with_capacity(capacity(pattern, 2));
    substitute(&mut out, pattern, 2, |out, i| {
        write_arg(out, if i == 0 { first } else { second })
    })
    .map_err(|_| display_failure(pattern))?;
    Ok(out)
}

/// Two-argument form of [`format`].
pub fn format2(pattern: &str, first: &Arg, second: &Arg) -> String {
    try_format2(pattern, first, second).unwrap_or_else(|e| e.to_string())
}

/// Number of `{}` placeholders in `pattern`.
pub fn count_placeholders(pattern: &str) -> usize {
    pattern.matches(PLACEHOLDER).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Display;

    struct Broken;
    impl Display for Broken {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn placeholders_take_arguments_in_order() {
        assert_eq!(format("{} and {}", &["a".into(), "b".into()]), "a and b");
        assert_eq!(format("{}{}", &[1.into(), 2.into()]), "12");
        assert_eq!(format("x={}, y={}!", &[1.5.into(), true.into()]), "x=1.5, y=true!");
    }

    #[test]
    fn missing_arguments_leave_placeholders() {
        assert_eq!(format("{} {} {}", &["x".into()]), "x {} {}");
        assert_eq!(format("{}", &[]), "{}");
    }

    #[test]
    fn surplus_arguments_are_ignored() {
        assert_eq!(format("no placeholders", &["unused".into()]), "no placeholders");
        assert_eq!(format("{}", &["a".into(), "b".into()]), "a");
    }

    #[test]
    fn null_and_lists() {
        assert_eq!(format("{}", &[Arg::Null]), "null");
        let nested = Arg::List(vec![1.into(), Arg::List(vec!["a".into(), Arg::Null]), 'z'.into()]);
        assert_eq!(format("v={}", &[nested]), "v=[1, [a, null], z]");
        assert_eq!(format("{}", &[Arg::List(Vec::new())]), "[]");
        assert_eq!(format("{}", &[vec![3u8, 4].into()]), "[3, 4]");
    }

    #[test]
    fn unicode_around_placeholders() {
        assert_eq!(format("é{}ü{}", &["ß".into(), "→".into()]), "éßü→");
    }

    #[test]
    fn fast_paths_match_general_path() {
        let a: Arg = "a".into();
        let b: Arg = 2.into();
        for pattern in ["", "{}", "{} {}", "{} {} {}", "plain", "{{}}", "}{"] {
            assert_eq!(format1(pattern, &a), format(pattern, &[a.clone()]), "{pattern}");
            assert_eq!(
                format2(pattern, &a, &b),
                format(pattern, &[a.clone(), b.clone()]),
                "{pattern}"
            );
        }
    }

    #[test]
    fn display_failure_degrades_to_fallback_text() {
        let broken = Arg::display(Broken);
        assert!(try_format("{}", &[broken.clone()]).is_err());
        assert!(format("{}", &[broken.clone()]).starts_with("error formatting message: "));
        assert_eq!(format1("{}", &broken), format("{}", &[broken]));
    }

    #[test]
    fn counts_placeholders() {
        assert_eq!(count_placeholders("{} {} x"), 2);
        assert_eq!(count_placeholders("none"), 0);
    }
}
