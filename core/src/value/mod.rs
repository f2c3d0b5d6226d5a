//! The value abstraction every flag stores its state behind.
//!
//! A [`Value`] parses text into itself, renders itself back to text, and
//! exposes a dynamically typed snapshot. Built-in scalar types go through
//! [`Handle<T>`], a shared cell the caller keeps to read the parsed result.

mod duration;
mod scalar;

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::ValueError;

pub use duration::{format_duration, parse_duration};
pub use scalar::Scalar;

/// Storage behind a flag.
///
/// `Display` is the canonical text form: it is captured as the flag's default
/// at registration time and feeding it back to [`set`](Value::set) must
/// reproduce the value.
///
/// # Examples
///
/// A value that accumulates every occurrence instead of overwriting:
///
/// ```
/// use std::any::Any;
/// use std::fmt;
/// use flagset_core::{ErrorHandling, FlagSet, Value, ValueError};
///
/// #[derive(Default)]
/// struct Tags(Vec<String>);
///
/// impl fmt::Display for Tags {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "[{}]", self.0.join(" "))
///     }
/// }
///
/// impl Value for Tags {
///     fn set(&mut self, raw: &str) -> Result<(), ValueError> {
///         self.0.push(raw.to_string());
///         Ok(())
///     }
///
///     fn get(&self) -> Box<dyn Any> {
///         Box::new(self.0.clone())
///     }
/// }
///
/// let mut flags = FlagSet::new("tags", ErrorHandling::ContinueOnError);
/// flags.var(Tags::default(), "tag", Some('t'), "add a tag", None);
/// flags.parse(["--tag", "a", "-t", "b", "--tag=c"]).unwrap();
///
/// assert_eq!(flags.lookup("tag").unwrap().value().to_string(), "[a b c]");
/// ```
pub trait Value: fmt::Display {
    /// Parses `raw` and stores the result. On failure the value is unchanged.
    fn set(&mut self, raw: &str) -> Result<(), ValueError>;

    /// Returns a snapshot of the current value.
    fn get(&self) -> Box<dyn Any>;

    /// Boolean-like values toggle when given without an explicit `=value`.
    fn is_bool_flag(&self) -> bool {
        false
    }

    /// Short type name for usage text; empty for booleans.
    fn type_hint(&self) -> &str {
        "value"
    }
}

/// Hook run after a flag's value was set successfully.
pub type Callback = Box<dyn Fn(&dyn Value) -> Result<(), ValueError>>;

/// Shared, single-threaded cell holding a flag's typed value.
///
/// The registry keeps one clone of the handle as the flag's [`Value`]; the
/// caller keeps another and reads the result after parsing.
///
/// ```
/// use flagset_core::Handle;
///
/// let port = Handle::new(8080u64);
/// let alias = port.clone();
/// alias.replace(9090);
/// assert_eq!(port.get(), 9090);
/// ```
#[derive(Debug, Default)]
pub struct Handle<T>(Rc<RefCell<T>>);

impl<T> Handle<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Returns a copy of the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().clone()
    }

    /// Stores `value`, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }

    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: Scalar> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.borrow().format_text())
    }
}

impl<T: Scalar> Value for Handle<T> {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        let parsed = T::parse_text(raw)?;
        self.replace(parsed);
        Ok(())
    }

    fn get(&self) -> Box<dyn Any> {
        Box::new(self.0.borrow().clone())
    }

    fn is_bool_flag(&self) -> bool {
        T::IS_BOOL
    }

    fn type_hint(&self) -> &str {
        T::TYPE_HINT
    }
}
