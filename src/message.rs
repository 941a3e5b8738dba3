// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message shapes and their arguments.
//!
//! Every log call carries one [`Message`]. Whatever its shape (plain text, a
//! `{}` pattern with arguments, a pre-rendered string, or a lazily supplied
//! value) it answers the same questions: formatted text, raw pattern, raw
//! arguments and attached error.
//!
//! The formatted text is computed on first access and cached, so a lazy
//! supplier runs at most once however many times the message is read.
//!
//! ```
//! use logdispatch::{Arg, Message};
//!
//! let message = Message::parameterized("user {} logged in from {}", vec!["ada".into(), "10.0.0.7".into()]);
//! assert_eq!(message.formatted(), "user ada logged in from 10.0.0.7");
//! assert_eq!(message.pattern(), Some("user {} logged in from {}"));
//! assert_eq!(message.args().len(), 2);
//! ```

use crate::error::Error;
use crate::format;
use crate::status;
use std::any::Any;
use std::borrow::Cow;
use std::fmt::{self, Debug, Display};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, OnceLock};

/// An error value shared between a message, a record and the sink.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// A positional argument for a `{}` placeholder.
///
/// Primitive values are stored inline; anything else that implements
/// [`Display`] goes through [`Arg::display`].
#[derive(Clone)]
pub enum Arg {
    /// Rendered as `null`.
    Null,
    Text(Cow<'static, str>),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Char(char),
    Display(Arc<dyn Display + Send + Sync>),
    /// Rendered as `[a, b, c]`, each element formatted recursively.
    List(Vec<Arg>),
    /// An error value. As the last argument of a parameterized message it
    /// becomes the message's attached error instead of a format argument.
    Error(SharedError),
}

impl Arg {
    pub fn display<T: Display + Send + Sync + 'static>(value: T) -> Arg {
        Arg::Display(Arc::new(value))
    }

    pub fn error<E: std::error::Error + Send + Sync + 'static>(error: E) -> Arg {
        Arg::Error(Arc::new(error))
    }

    pub fn list<I, T>(items: I) -> Arg
    where
        I: IntoIterator<Item = T>,
        T: Into<Arg>,
    {
        Arg::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Arg::Null)
    }

    pub fn as_error(&self) -> Option<&SharedError> {
        match self {
            Arg::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Null => f.write_str("Null"),
            Arg::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Arg::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Arg::UInt(v) => f.debug_tuple("UInt").field(v).finish(),
            Arg::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Arg::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Arg::Char(v) => f.debug_tuple("Char").field(v).finish(),
            Arg::Display(_) => {
                let mut out = String::new();
                if format::write_arg(&mut out, self).is_err() {
                    out = String::from("<Display failed>");
                }
                f.debug_tuple("Display").field(&out).finish()
            }
            Arg::List(items) => f.debug_tuple("List").field(items).finish(),
            Arg::Error(e) => f.debug_tuple("Error").field(e).finish(),
        }
    }
}

impl Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        format::write_arg(&mut out, self)?;
        f.write_str(&out)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Text(Cow::Owned(value.to_string()))
    }
}

impl From<&String> for Arg {
    fn from(value: &String) -> Self {
        Arg::Text(Cow::Owned(value.clone()))
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Text(Cow::Owned(value))
    }
}

impl From<Cow<'static, str>> for Arg {
    fn from(value: Cow<'static, str>) -> Self {
        Arg::Text(value)
    }
}

macro_rules! arg_from {
    ($variant:ident, $wide:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Arg {
                #[inline]
                fn from(value: $t) -> Self {
                    Arg::$variant(<$wide>::from(value))
                }
            }
        )+
    };
}

arg_from!(Int, i64, i8, i16, i32, i64);
arg_from!(UInt, u64, u8, u16, u32, u64);
arg_from!(Float, f64, f32, f64);

impl From<isize> for Arg {
    fn from(value: isize) -> Self {
        Arg::Int(value as i64)
    }
}

impl From<usize> for Arg {
    fn from(value: usize) -> Self {
        Arg::UInt(value as u64)
    }
}

impl From<i128> for Arg {
    fn from(value: i128) -> Self {
        Arg::display(value)
    }
}

impl From<u128> for Arg {
    fn from(value: u128) -> Self {
        Arg::display(value)
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<char> for Arg {
    fn from(value: char) -> Self {
        Arg::Char(value)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::Null, Into::into)
    }
}

impl<T: Into<Arg>> From<Vec<T>> for Arg {
    fn from(value: Vec<T>) -> Self {
        Arg::list(value)
    }
}

impl<T: Into<Arg> + Clone> From<&[T]> for Arg {
    fn from(value: &[T]) -> Self {
        Arg::list(value.iter().cloned())
    }
}

impl<T: Into<Arg>, const N: usize> From<[T; N]> for Arg {
    fn from(value: [T; N]) -> Self {
        Arg::list(value)
    }
}

impl From<SharedError> for Arg {
    fn from(value: SharedError) -> Self {
        Arg::Error(value)
    }
}

/// Arguments stored without a heap container for the common small arities.
#[derive(Debug, Clone)]
enum Args {
    None,
    One([Arg; 1]),
    Two([Arg; 2]),
    Many(Vec<Arg>),
}

impl Args {
    fn as_slice(&self) -> &[Arg] {
        match self {
            Args::None => &[],
            Args::One(a) => a,
            Args::Two(a) => a,
            Args::Many(v) => v,
        }
    }

    /// Splits off a trailing error argument.
    fn split_error(self) -> (Args, Option<SharedError>) {
        match self {
            Args::One([Arg::Error(e)]) => (Args::None, Some(e)),
            Args::Two([first, Arg::Error(e)]) => (Args::One([first]), Some(e)),
            Args::Many(mut v) => {
                if let Some(Arg::Error(_)) = v.last() {
                    if let Some(Arg::Error(e)) = v.pop() {
                        return (Args::from_vec(v), Some(e));
                    }
                }
                (Args::Many(v), None)
            }
            other => (other, None),
        }
    }

    fn from_vec(mut v: Vec<Arg>) -> Args {
        match v.len() {
            0 => Args::None,
            1 => match v.pop() {
                Some(a) => Args::One([a]),
                None => Args::None,
            },
            _ => Args::Many(v),
        }
    }
}

type Supplier = Box<dyn Fn() -> Arg + Send + Sync>;

enum Shape {
    Text(Cow<'static, str>),
    Parameterized {
        pattern: Cow<'static, str>,
        args: Args,
    },
    Prebuilt {
        pattern: Option<Cow<'static, str>>,
        args: Vec<Arg>,
    },
    Lazy(Supplier),
}

#[derive(Debug)]
struct Rendered {
    text: String,
    failure: Option<String>,
}

/// A log message in one of four shapes, formatted at most once.
pub struct Message {
    shape: Shape,
    error: Option<SharedError>,
    formatted: OnceLock<Rendered>,
}

impl Message {
    fn with_shape(shape: Shape, error: Option<SharedError>) -> Message {
        Message {
            shape,
            error,
            formatted: OnceLock::new(),
        }
    }

    /// Plain text, used verbatim.
    pub fn text(text: impl Into<Cow<'static, str>>) -> Message {
        Self::with_shape(Shape::Text(text.into()), None)
    }

    /// A `{}` pattern and its arguments. A trailing [`Arg::Error`] becomes the
    /// attached error.
    pub fn parameterized(pattern: impl Into<Cow<'static, str>>, args: Vec<Arg>) -> Message {
        Self::parameterized_args(pattern.into(), Args::from_vec(args))
    }

    /// [`parameterized`](Self::parameterized) with one argument, no `Vec`.
    pub fn parameterized1(pattern: impl Into<Cow<'static, str>>, arg: Arg) -> Message {
        Self::parameterized_args(pattern.into(), Args::One([arg]))
    }

    /// [`parameterized`](Self::parameterized) with two arguments, no `Vec`.
    pub fn parameterized2(pattern: impl Into<Cow<'static, str>>, first: Arg, second: Arg) -> Message {
        Self::parameterized_args(pattern.into(), Args::Two([first, second]))
    }

    fn parameterized_args(pattern: Cow<'static, str>, args: Args) -> Message {
        let (args, error) = args.split_error();
        Self::with_shape(Shape::Parameterized { pattern, args }, error)
    }

    /// Text that was rendered elsewhere. The pattern and arguments are kept
    /// for sinks that want them but are not substituted again.
    pub fn prebuilt(
        formatted: String,
        pattern: Option<Cow<'static, str>>,
        args: Vec<Arg>,
        error: Option<SharedError>,
    ) -> Message {
        Message {
            shape: Shape::Prebuilt { pattern, args },
            error,
            formatted: OnceLock::from(Rendered {
                text: formatted,
                failure: None,
            }),
        }
    }

    /// A value produced on demand. `supplier` is not called until the message
    /// is formatted, and then only once.
    pub fn lazy<F, T>(supplier: F) -> Message
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Into<Arg>,
    {
        Self::with_shape(Shape::Lazy(Box::new(move || -> Arg { supplier().into() })), None)
    }

    /// Attaches `error`, replacing any error split off the arguments.
    pub fn with_error(mut self, error: SharedError) -> Message {
        self.error = Some(error);
        self
    }

    pub fn pattern(&self) -> Option<&str> {
        match &self.shape {
            Shape::Text(_) | Shape::Lazy(_) => None,
            Shape::Parameterized { pattern, .. } => Some(pattern),
            Shape::Prebuilt { pattern, .. } => pattern.as_deref(),
        }
    }

    pub fn args(&self) -> &[Arg] {
        match &self.shape {
            Shape::Parameterized { args, .. } => args.as_slice(),
            Shape::Prebuilt { args, .. } => args,
            Shape::Text(_) | Shape::Lazy(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&SharedError> {
        self.error.as_ref()
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.shape, Shape::Lazy(_))
    }

    /// The formatted text, computed on first call.
    ///
    /// A supplier that panics or an argument whose `Display` fails yields
    /// `error formatting message: <cause>` and a status warning.
    pub fn formatted(&self) -> &str {
        &self.rendered().text
    }

    /// Like [`formatted`](Self::formatted), but reports a formatting failure.
    pub fn try_formatted(&self) -> Result<&str, Error> {
        let rendered = self.rendered();
        match &rendered.failure {
            None => Ok(&rendered.text),
            Some(cause) => Err(Error::Formatting(cause.clone())),
        }
    }

    fn rendered(&self) -> &Rendered {
        self.formatted.get_or_init(|| {
            let outcome = catch_unwind(AssertUnwindSafe(|| self.render()))
                .unwrap_or_else(|panic| Err(Error::Formatting(panic_message(&*panic))));
            match outcome {
                Ok(text) => Rendered {
                    text,
                    failure: None,
                },
                Err(e) => {
                    status::warn(&e);
                    let cause = match &e {
                        Error::Formatting(cause) => cause.clone(),
                        other => other.to_string(),
                    };
                    Rendered {
                        text: e.to_string(),
                        failure: Some(cause),
                    }
                }
            }
        })
    }

    fn render(&self) -> Result<String, Error> {
        match &self.shape {
            Shape::Text(text) => Ok(text.to_string()),
            Shape::Parameterized { pattern, args } => match args {
                Args::None => Ok(pattern.to_string()),
                Args::One([a]) => format::try_format1(pattern, a),
                Args::Two([a, b]) => format::try_format2(pattern, a, b),
                Args::Many(v) => format::try_format(pattern, v),
            },
            //always initialized at construction
            Shape::Prebuilt { .. } => Ok(String::new()),
            Shape::Lazy(supplier) => {
                let value = supplier();
                let mut out = String::new();
                format::write_arg(&mut out, &value).map_err(|_| {
                    Error::Formatting("lazily supplied value failed to display".to_string())
                })?;
                Ok(out)
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "supplier panicked".to_string()
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.formatted())
    }
}

impl Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self.shape {
            Shape::Text(_) => "Text",
            Shape::Parameterized { .. } => "Parameterized",
            Shape::Prebuilt { .. } => "Prebuilt",
            Shape::Lazy(_) => "Lazy",
        };
        f.debug_struct("Message")
            .field("shape", &shape)
            .field("pattern", &self.pattern())
            .field("args", &self.args())
            .field("error", &self.error)
            .field("formatted", &self.formatted.get().map(|r| &r.text))
            .finish()
    }
}

impl From<&'static str> for Message {
    fn from(text: &'static str) -> Self {
        Message::text(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::text(text)
    }
}

/// Identifies a [`MessageFactory`] in the logger registry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FactoryId(pub &'static str);

/// Builds messages from a pattern and arguments.
///
/// Loggers are cached per (name, factory), so two factories with different
/// ids yield two distinct loggers for the same name.
pub trait MessageFactory: Debug + Send + Sync {
    fn id(&self) -> FactoryId;

    fn new_message(&self, pattern: Cow<'static, str>, args: Vec<Arg>) -> Message;

    fn new_message1(&self, pattern: Cow<'static, str>, arg: Arg) -> Message {
        self.new_message(pattern, vec![arg])
    }

    fn new_message2(&self, pattern: Cow<'static, str>, first: Arg, second: Arg) -> Message {
        self.new_message(pattern, vec![first, second])
    }
}

/// Substitutes `{}` placeholders. The default factory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ParameterizedMessageFactory;

impl MessageFactory for ParameterizedMessageFactory {
    fn id(&self) -> FactoryId {
        FactoryId("parameterized")
    }

    fn new_message(&self, pattern: Cow<'static, str>, args: Vec<Arg>) -> Message {
        Message::parameterized(pattern, args)
    }

    fn new_message1(&self, pattern: Cow<'static, str>, arg: Arg) -> Message {
        Message::parameterized1(pattern, arg)
    }

    fn new_message2(&self, pattern: Cow<'static, str>, first: Arg, second: Arg) -> Message {
        Message::parameterized2(pattern, first, second)
    }
}

/// Uses the pattern verbatim. Arguments are kept on the message, unformatted,
/// and a trailing error is still split off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SimpleMessageFactory;

impl MessageFactory for SimpleMessageFactory {
    fn id(&self) -> FactoryId {
        FactoryId("simple")
    }

    fn new_message(&self, pattern: Cow<'static, str>, args: Vec<Arg>) -> Message {
        let (args, error) = Args::from_vec(args).split_error();
        let args = args.as_slice().to_vec();
        Message::prebuilt(pattern.to_string(), Some(pattern), args, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Boom;
    impl Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }
    impl std::error::Error for Boom {}

    #[test]
    fn text_is_verbatim() {
        let message = Message::text("literal {}");
        assert_eq!(message.formatted(), "literal {}");
        assert_eq!(message.pattern(), None);
        assert!(message.args().is_empty());
    }

    #[test]
    fn formatting_is_memoized() {
        let message = Message::parameterized("{}-{}", vec![1.into(), 2.into()]);
        let first = message.formatted();
        let second = message.formatted();
        assert_eq!(first, "1-2");
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn lazy_supplier_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let message = Message::lazy(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            "expensive"
        });
        assert!(message.is_lazy());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(message.formatted(), "expensive");
        assert_eq!(message.formatted(), "expensive");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn trailing_error_is_split_off() {
        let message = Message::parameterized("failed {}", vec!["job".into(), Arg::error(Boom)]);
        assert_eq!(message.formatted(), "failed job");
        assert_eq!(message.args().len(), 1);
        assert_eq!(message.error().map(|e| e.to_string()), Some("boom".to_string()));

        let only_error = Message::parameterized1("failed {}", Arg::error(Boom));
        assert_eq!(only_error.formatted(), "failed {}");
        assert!(only_error.error().is_some());

        let pair = Message::parameterized2("{} {}", "a".into(), Arg::error(Boom));
        assert_eq!(pair.formatted(), "a {}");
        assert!(pair.error().is_some());

        let leading = Message::parameterized("{} {}", vec![Arg::error(Boom), "b".into()]);
        assert_eq!(leading.formatted(), "boom b");
        assert!(leading.error().is_none());
    }

    #[test]
    fn panicking_supplier_degrades() {
        let message = Message::lazy(|| -> Arg { panic!("supplier exploded") });
        assert_eq!(message.formatted(), "error formatting message: supplier exploded");
        assert_eq!(
            message.try_formatted(),
            Err(Error::Formatting("supplier exploded".to_string()))
        );
    }

    #[test]
    fn prebuilt_keeps_raw_parts() {
        let message = Message::prebuilt(
            "done in 3ms".to_string(),
            Some("done in {}ms".into()),
            vec![3.into()],
            None,
        );
        assert_eq!(message.formatted(), "done in 3ms");
        assert_eq!(message.pattern(), Some("done in {}ms"));
        assert_eq!(message.args().len(), 1);
        assert_eq!(message.try_formatted(), Ok("done in 3ms"));
    }

    #[test]
    fn factories() {
        let parameterized = ParameterizedMessageFactory;
        let simple = SimpleMessageFactory;
        assert_ne!(parameterized.id(), simple.id());

        let message = parameterized.new_message2("{}+{}".into(), 1.into(), 2.into());
        assert_eq!(message.formatted(), "1+2");

        let message = simple.new_message("{}+{}".into(), vec![1.into(), Arg::error(Boom)]);
        assert_eq!(message.formatted(), "{}+{}");
        assert_eq!(message.args().len(), 1);
        assert!(message.error().is_some());
    }

    #[test]
    fn debug_survives_a_failing_display() {
        struct Refuses;
        impl Display for Refuses {
            fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Err(fmt::Error)
            }
        }

        let message = Message::parameterized("{} and {}", vec![Arg::display(Refuses), 2.into()]);
        let debug = format!("{:?}", message);
        assert!(debug.contains("<Display failed>"));
        assert!(message.try_formatted().is_err());
        assert_eq!(format!("{:?}", Arg::display("fine")), "Display(\"fine\")");
    }

    #[test]
    fn option_and_collections_convert() {
        let none: Option<&str> = None;
        assert!(Arg::from(none).is_null());
        assert_eq!(Arg::from(Some(5u8)).to_string(), "5");
        assert_eq!(Arg::from(["x", "y"]).to_string(), "[x, y]");
        assert_eq!(Arg::from(&[1i32, 2][..]).to_string(), "[1, 2]");
        assert_eq!(Arg::from(u128::MAX).to_string(), u128::MAX.to_string());
    }
}
