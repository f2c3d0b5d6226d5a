//! The process-wide default flag set.
//!
//! Programs that need a single set of flags can use these free functions
//! instead of threading a [`FlagSet`] around. The instance is named after the
//! program (the first process argument) and exits with status 2 on parse
//! failures.
//!
//! ```no_run
//! use flagset_core::command_line;
//!
//! let verbose = command_line::bool("verbose", Some('v'), false, "log more", None);
//! if let Err(err) = command_line::parse() {
//!     assert!(err.is_help());
//!     return;
//! }
//! if verbose.get() {
//!     println!("{:?}", command_line::args());
//! }
//! ```
//!
//! The instance lives in a thread local, so each thread sees its own. Usage
//! routines installed with [`set_usage`] receive the flag set directly and
//! must not call back into this module.

use std::cell::RefCell;
use std::env;
use std::io::Write;
use std::time::Duration;

use crate::config::UsageLayout;
use crate::error::Result;
use crate::flag::{Flag, FlagMode};
use crate::flagset::{ErrorHandling, FlagSet};
use crate::value::{Callback, Handle, Value};

thread_local! {
    static COMMAND_LINE: RefCell<FlagSet> =
        RefCell::new(FlagSet::new(program_name(), ErrorHandling::ExitOnError));
}

fn program_name() -> String {
    env::args().next().unwrap_or_default()
}

/// Runs `f` with exclusive access to the default flag set.
pub fn with_command_line<R>(f: impl FnOnce(&mut FlagSet) -> R) -> R {
    COMMAND_LINE.with_borrow_mut(f)
}

/// Replaces the default flag set with an empty one.
pub fn reset(name: impl Into<String>, error_handling: ErrorHandling) {
    with_command_line(|flags| *flags = FlagSet::new(name, error_handling));
}

/// Parses the process arguments, skipping the program name.
pub fn parse() -> Result<()> {
    parse_from(env::args().skip(1))
}

/// Parses an explicit argument list.
pub fn parse_from<I, S>(arguments: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    with_command_line(|flags| flags.parse(arguments))
}

pub fn parsed() -> bool {
    with_command_line(|flags| flags.parsed())
}

pub fn args() -> Vec<String> {
    with_command_line(|flags| flags.args().to_vec())
}

pub fn arg(i: usize) -> Option<String> {
    with_command_line(|flags| flags.arg(i).map(str::to_string))
}

pub fn n_arg() -> usize {
    with_command_line(|flags| flags.n_arg())
}

pub fn n_flag() -> usize {
    with_command_line(|flags| flags.n_flag())
}

pub fn name() -> String {
    with_command_line(|flags| flags.name().to_string())
}

pub fn print_defaults() {
    with_command_line(|flags| flags.print_defaults());
}

pub fn usage() {
    with_command_line(|flags| flags.usage());
}

pub fn visit_all<F: FnMut(usize, &Flag)>(visit: F) {
    with_command_line(|flags| flags.visit_all(visit));
}

pub fn set_layout(layout: UsageLayout) {
    with_command_line(|flags| flags.set_layout(layout));
}

pub fn set_output(output: impl Write + 'static) {
    with_command_line(|flags| flags.set_output(output));
}

pub fn set_usage(usage: impl Fn(&FlagSet) + 'static) {
    with_command_line(|flags| flags.set_usage(usage));
}

/// See [`FlagSet::register`].
#[allow(clippy::too_many_arguments)]
pub fn register(
    value: Box<dyn Value>,
    name: &str,
    alias: Option<char>,
    usage: &str,
    mode: FlagMode,
    callback: Option<Callback>,
    subflags: Vec<Flag>,
) -> Option<Flag> {
    with_command_line(|flags| flags.register(value, name, alias, usage, mode, callback, subflags))
}

pub fn var(
    value: impl Value + 'static,
    name: &str,
    alias: Option<char>,
    usage: &str,
    callback: Option<Callback>,
) {
    with_command_line(|flags| flags.var(value, name, alias, usage, callback));
}

pub fn var_sub_flag(
    value: impl Value + 'static,
    name: &str,
    alias: Option<char>,
    usage: &str,
    callback: Option<Callback>,
) -> Flag {
    with_command_line(|flags| flags.var_sub_flag(value, name, alias, usage, callback))
}

pub fn bool_sub_command(
    name: &str,
    alias: Option<char>,
    usage: &str,
    subflags: Vec<Flag>,
) -> Handle<bool> {
    with_command_line(|flags| flags.bool_sub_command(name, alias, usage, subflags))
}

pub fn bool_var_sub_command(
    handle: &Handle<bool>,
    name: &str,
    alias: Option<char>,
    usage: &str,
    subflags: Vec<Flag>,
) {
    with_command_line(|flags| flags.bool_var_sub_command(handle, name, alias, usage, subflags));
}

pub fn bool_var_sub_command_nested(
    handle: &Handle<bool>,
    name: &str,
    alias: Option<char>,
    usage: &str,
    subflags: Vec<Flag>,
) -> Flag {
    with_command_line(|flags| {
        flags.bool_var_sub_command_nested(handle, name, alias, usage, subflags)
    })
}

macro_rules! scalar_wrappers {
    ($($ty:ty, $arg:ty => $plain:ident, $var:ident, $sub:ident, $var_sub:ident;)*) => {
        $(
            #[doc = concat!("See [`FlagSet::", stringify!($plain), "`].")]
            pub fn $plain(
                name: &str,
                alias: Option<char>,
                default: $arg,
                usage: &str,
                callback: Option<Callback>,
            ) -> Handle<$ty> {
                with_command_line(|flags| flags.$plain(name, alias, default, usage, callback))
            }

            #[doc = concat!("See [`FlagSet::", stringify!($var), "`].")]
            pub fn $var(
                handle: &Handle<$ty>,
                name: &str,
                alias: Option<char>,
                default: $arg,
                usage: &str,
                callback: Option<Callback>,
            ) {
                with_command_line(|flags| flags.$var(handle, name, alias, default, usage, callback))
            }

            #[doc = concat!("See [`FlagSet::", stringify!($sub), "`].")]
            pub fn $sub(
                name: &str,
                alias: Option<char>,
                default: $arg,
                usage: &str,
                callback: Option<Callback>,
            ) -> Flag {
                with_command_line(|flags| flags.$sub(name, alias, default, usage, callback))
            }

            #[doc = concat!("See [`FlagSet::", stringify!($var_sub), "`].")]
            pub fn $var_sub(
                handle: Option<&Handle<$ty>>,
                name: &str,
                alias: Option<char>,
                default: $arg,
                usage: &str,
                callback: Option<Callback>,
            ) -> Flag {
                with_command_line(|flags| {
                    flags.$var_sub(handle, name, alias, default, usage, callback)
                })
            }
        )*
    };
}

scalar_wrappers! {
    bool, bool => bool, bool_var, bool_sub_flag, bool_var_sub_flag;
    isize, isize => int, int_var, int_sub_flag, int_var_sub_flag;
    i64, i64 => int64, int64_var, int64_sub_flag, int64_var_sub_flag;
    usize, usize => uint, uint_var, uint_sub_flag, uint_var_sub_flag;
    u64, u64 => uint64, uint64_var, uint64_sub_flag, uint64_var_sub_flag;
    f64, f64 => float64, float64_var, float64_sub_flag, float64_var_sub_flag;
    String, &str => string, string_var, string_sub_flag, string_var_sub_flag;
    Duration, Duration => duration, duration_var, duration_sub_flag, duration_var_sub_flag;
}
