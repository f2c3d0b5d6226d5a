//! The [`FlagSet`] registry and its registration API.

use std::cell::RefCell;
use std::io::{self, Write};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{FlagSetConfig, UsageLayout};
use crate::flag::{Flag, FlagKey, FlagMode, Registry, validate_alias};
use crate::value::{Callback, Handle, Value};

/// How [`FlagSet::parse`] reacts to a parse failure.
///
/// Help requests are not failures and are always returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorHandling {
    /// Return the error (the default).
    #[default]
    ContinueOnError,
    /// Exit the process with status 2.
    ExitOnError,
    /// Panic with the error message.
    PanicOnError,
}

type UsageFn = Box<dyn Fn(&FlagSet)>;

/// A set of flags for one program, plus the state of parsing it.
///
/// Entering a subcommand during [`parse`](FlagSet::parse) narrows the active
/// scope to that subcommand's flags; lookups, later parses and usage output
/// all work against the active scope from then on.
///
/// # Examples
///
/// ```
/// use flagset_core::{ErrorHandling, FlagSet};
///
/// let mut flags = FlagSet::new("server", ErrorHandling::ContinueOnError);
/// let verbose = flags.bool("verbose", Some('v'), false, "log every request", None);
/// let port = flags.uint64("port", Some('p'), 8080, "listen `port`", None);
///
/// flags.parse(["-v", "--port=9000", "public/"]).unwrap();
///
/// assert!(verbose.get());
/// assert_eq!(port.get(), 9000);
/// assert_eq!(flags.args(), ["public/"]);
/// ```
pub struct FlagSet {
    pub(crate) name: String,
    pub(crate) root: Registry,
    /// Slots of the entered subcommands, from the root registry downwards.
    pub(crate) scope: Vec<usize>,
    pub(crate) args: Vec<String>,
    pub(crate) index: usize,
    pub(crate) parsed: bool,
    pub(crate) error_handling: ErrorHandling,
    pub(crate) layout: UsageLayout,
    output: RefCell<Option<Box<dyn Write>>>,
    usage: Option<UsageFn>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>, error_handling: ErrorHandling) -> Self {
        Self {
            name: name.into(),
            root: Registry::new(),
            scope: Vec::new(),
            args: Vec::new(),
            index: 0,
            parsed: false,
            error_handling,
            layout: UsageLayout::default(),
            output: RefCell::new(None),
            usage: None,
        }
    }

    /// Creates a flag set using the error handling and layout of `config`.
    pub fn from_config(name: impl Into<String>, config: &FlagSetConfig) -> Self {
        let mut flags = Self::new(name, config.error_handling);
        flags.layout = config.layout;
        flags
    }

    /// Resets the name and error-handling policy.
    pub fn init(&mut self, name: impl Into<String>, error_handling: ErrorHandling) {
        self.name = name.into();
        self.error_handling = error_handling;
    }

    /// Display name, extended with every subcommand entered so far.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn error_handling(&self) -> ErrorHandling {
        self.error_handling
    }

    pub fn layout(&self) -> UsageLayout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: UsageLayout) {
        self.layout = layout;
    }

    /// Redirects error and usage text. Standard error is used until this is
    /// called.
    pub fn set_output(&mut self, output: impl Write + 'static) {
        *self.output.get_mut() = Some(Box::new(output));
    }

    /// Replaces the routine run when help is requested.
    pub fn set_usage(&mut self, usage: impl Fn(&FlagSet) + 'static) {
        self.usage = Some(Box::new(usage));
    }

    /// Runs the usage routine: the custom one if set, otherwise a
    /// `Usage: <name>` header followed by [`print_defaults`](FlagSet::print_defaults).
    pub fn usage(&self) {
        match &self.usage {
            Some(usage) => usage(self),
            None => self.default_usage(),
        }
    }

    fn default_usage(&self) {
        self.write_output(&format!("\nUsage: {}\n\n", self.name));
        self.print_defaults();
    }

    /// Writes text to the configured output. Write failures are ignored.
    pub fn write_output(&self, text: &str) {
        let mut output = self.output.borrow_mut();
        let _ = match output.as_mut() {
            Some(writer) => writer.write_all(text.as_bytes()),
            None => io::stderr().write_all(text.as_bytes()),
        };
    }

    /// Whether [`parse`](FlagSet::parse) has been called.
    pub fn parsed(&self) -> bool {
        self.parsed
    }

    /// Positional arguments left after parsing.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The `i`th positional argument.
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.args.get(i).map(String::as_str)
    }

    pub fn n_arg(&self) -> usize {
        self.args.len()
    }

    /// Number of flags defined in the active scope.
    pub fn n_flag(&self) -> usize {
        self.flags().len()
    }

    /// Registry of the active scope.
    pub fn flags(&self) -> &Registry {
        let mut registry = &self.root;
        for &slot in &self.scope {
            registry = &registry.slot(slot).children;
        }
        registry
    }

    pub(crate) fn flags_mut(&mut self) -> &mut Registry {
        let mut registry = &mut self.root;
        for &slot in &self.scope {
            registry = &mut registry.slot_mut(slot).children;
        }
        registry
    }

    /// Finds a flag of the active scope by name.
    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags().get(FlagKey::Name(name))
    }

    /// Finds a flag of the active scope by alias.
    pub fn lookup_alias(&self, alias: char) -> Option<&Flag> {
        self.flags().get(FlagKey::Alias(alias))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut Flag> {
        self.flags_mut().get_mut(FlagKey::Name(name))
    }

    /// Defines a flag around an arbitrary [`Value`].
    ///
    /// `subflags` become the nested registry of the new flag. With
    /// [`FlagMode::NESTED`] the flag is returned instead of being inserted,
    /// so it can itself be passed as a subflag; otherwise `None` is returned.
    ///
    /// # Panics
    ///
    /// Panics when a subflag name or alias is repeated, when `name` or
    /// `alias` is already defined in the active scope, or when `alias` is not
    /// an ASCII letter or digit. These are programming errors; the message is
    /// also written to the output.
    #[allow(clippy::too_many_arguments)]
    pub fn register(
        &mut self,
        value: Box<dyn Value>,
        name: &str,
        alias: Option<char>,
        usage: &str,
        mode: FlagMode,
        callback: Option<Callback>,
        subflags: Vec<Flag>,
    ) -> Option<Flag> {
        let mut children = Registry::new();
        for subflag in subflags {
            if let Some(key) = children.collision(&subflag) {
                self.redefined(&key);
            }
            children.insert(subflag);
        }

        if self.flags().contains(FlagKey::Name(name)) {
            self.redefined(name);
        }

        let flag = Flag {
            name: name.to_string(),
            alias: validate_alias(alias),
            usage: usage.to_string(),
            default_value: value.to_string(),
            value,
            callback,
            children,
            is_sub_command: mode.contains(FlagMode::COMMAND),
        };

        if mode.contains(FlagMode::NESTED) {
            return Some(flag);
        }

        if let Some(key) = self.flags().collision(&flag) {
            self.redefined(&key);
        }
        self.flags_mut().insert(flag);
        None
    }

    fn redefined(&self, key: &str) -> ! {
        let message = format!("flag redefined: {key}");
        self.write_output(&format!("{message}\n"));
        panic!("{message}");
    }

    /// Defines a flag around a custom [`Value`] in the active scope.
    pub fn var(
        &mut self,
        value: impl Value + 'static,
        name: &str,
        alias: Option<char>,
        usage: &str,
        callback: Option<Callback>,
    ) {
        self.register(
            Box::new(value),
            name,
            alias,
            usage,
            FlagMode::empty(),
            callback,
            Vec::new(),
        );
    }

    /// Like [`var`](FlagSet::var), but returns the flag for use as a subflag.
    pub fn var_sub_flag(
        &mut self,
        value: impl Value + 'static,
        name: &str,
        alias: Option<char>,
        usage: &str,
        callback: Option<Callback>,
    ) -> Flag {
        self.nested(Box::new(value), name, alias, usage, FlagMode::NESTED, callback, Vec::new())
    }

    #[allow(clippy::too_many_arguments)]
    fn nested(
        &mut self,
        value: Box<dyn Value>,
        name: &str,
        alias: Option<char>,
        usage: &str,
        mode: FlagMode,
        callback: Option<Callback>,
        subflags: Vec<Flag>,
    ) -> Flag {
        match self.register(value, name, alias, usage, mode | FlagMode::NESTED, callback, subflags) {
            Some(flag) => flag,
            None => unreachable!("nested registration always returns the flag"),
        }
    }

    /// Defines a subcommand in the active scope and returns a handle that
    /// turns `true` once the subcommand is entered.
    ///
    /// ```
    /// use flagset_core::{ErrorHandling, FlagSet};
    ///
    /// let mut flags = FlagSet::new("git", ErrorHandling::ContinueOnError);
    /// let all = flags.bool_sub_flag("all", Some('a'), false, "stage everything", None);
    /// let commit = flags.bool_sub_command("commit", None, "record changes", vec![all]);
    ///
    /// flags.parse(["commit", "-a"]).unwrap();
    ///
    /// assert!(commit.get());
    /// assert_eq!(flags.name(), "git commit");
    /// assert_eq!(flags.lookup("all").unwrap().value().to_string(), "true");
    /// ```
    pub fn bool_sub_command(
        &mut self,
        name: &str,
        alias: Option<char>,
        usage: &str,
        subflags: Vec<Flag>,
    ) -> Handle<bool> {
        let handle = Handle::new(false);
        self.bool_var_sub_command(&handle, name, alias, usage, subflags);
        handle
    }

    /// Like [`bool_sub_command`](FlagSet::bool_sub_command), storing into an
    /// existing handle.
    pub fn bool_var_sub_command(
        &mut self,
        handle: &Handle<bool>,
        name: &str,
        alias: Option<char>,
        usage: &str,
        subflags: Vec<Flag>,
    ) {
        handle.replace(false);
        self.register(
            Box::new(handle.clone()),
            name,
            alias,
            usage,
            FlagMode::COMMAND,
            None,
            subflags,
        );
    }

    /// Defines a subcommand that is itself a subflag of another subcommand.
    pub fn bool_var_sub_command_nested(
        &mut self,
        handle: &Handle<bool>,
        name: &str,
        alias: Option<char>,
        usage: &str,
        subflags: Vec<Flag>,
    ) -> Flag {
        handle.replace(false);
        self.nested(
            Box::new(handle.clone()),
            name,
            alias,
            usage,
            FlagMode::COMMAND,
            None,
            subflags,
        )
    }
}

macro_rules! scalar_flags {
    ($($ty:ty, $arg:ty => $plain:ident, $var:ident, $sub:ident, $var_sub:ident;)*) => {
        impl FlagSet {
            $(
                #[doc = concat!("Defines a `", stringify!($ty), "` flag and returns a handle to its value.")]
                pub fn $plain(
                    &mut self,
                    name: &str,
                    alias: Option<char>,
                    default: $arg,
                    usage: &str,
                    callback: Option<Callback>,
                ) -> Handle<$ty> {
                    let handle = Handle::new(<$ty>::from(default));
                    self.var(handle.clone(), name, alias, usage, callback);
                    handle
                }

                #[doc = concat!("Defines a `", stringify!($ty), "` flag storing into `handle`, which is reset to `default`.")]
                pub fn $var(
                    &mut self,
                    handle: &Handle<$ty>,
                    name: &str,
                    alias: Option<char>,
                    default: $arg,
                    usage: &str,
                    callback: Option<Callback>,
                ) {
                    handle.replace(<$ty>::from(default));
                    self.var(handle.clone(), name, alias, usage, callback);
                }

                #[doc = concat!("Builds a `", stringify!($ty), "` flag to pass as a subflag of a subcommand.")]
                pub fn $sub(
                    &mut self,
                    name: &str,
                    alias: Option<char>,
                    default: $arg,
                    usage: &str,
                    callback: Option<Callback>,
                ) -> Flag {
                    self.$var_sub(None, name, alias, default, usage, callback)
                }

                #[doc = concat!("Like `", stringify!($sub), "`, storing into `handle` when one is given.")]
                pub fn $var_sub(
                    &mut self,
                    handle: Option<&Handle<$ty>>,
                    name: &str,
                    alias: Option<char>,
                    default: $arg,
                    usage: &str,
                    callback: Option<Callback>,
                ) -> Flag {
                    let handle = match handle {
                        Some(handle) => {
                            handle.replace(<$ty>::from(default));
                            handle.clone()
                        }
                        None => Handle::new(<$ty>::from(default)),
                    };
                    self.var_sub_flag(handle, name, alias, usage, callback)
                }
            )*
        }
    };
}

scalar_flags! {
    bool, bool => bool, bool_var, bool_sub_flag, bool_var_sub_flag;
    isize, isize => int, int_var, int_sub_flag, int_var_sub_flag;
    i64, i64 => int64, int64_var, int64_sub_flag, int64_var_sub_flag;
    usize, usize => uint, uint_var, uint_sub_flag, uint_var_sub_flag;
    u64, u64 => uint64, uint64_var, uint64_sub_flag, uint64_var_sub_flag;
    f64, f64 => float64, float64_var, float64_sub_flag, float64_var_sub_flag;
    String, &str => string, string_var, string_sub_flag, string_var_sub_flag;
    Duration, Duration => duration, duration_var, duration_sub_flag, duration_var_sub_flag;
}
