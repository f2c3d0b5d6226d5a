//! Command-line flag parsing with short aliases, grouped short options and
//! nested subcommands.
//!
//! The crate is organised around a few types:
//!
//! - [`FlagSet`]: named collection of flags plus the state of parsing an
//!   argument list against it.
//! - [`Flag`]: one declared option or subcommand. Subcommands own a nested
//!   [`Registry`] of their own flags.
//! - [`Value`]: the storage behind a flag. Built-in types use [`Handle`], a
//!   shared cell the caller keeps to read the parsed result.
//! - [`ParseError`]: everything that can go wrong while parsing, and the
//!   help-requested signal.
//!
//! Argument syntax:
//!
//! - `--name value`, `--name=value`, `-n value`, `-n=value`
//! - `-abc` groups boolean (or final value-taking) short options
//! - boolean flags toggle when no value is given
//! - leading tokens naming subcommands (or their single-letter aliases)
//!   narrow the active scope before options are read
//! - everything else is collected as a positional argument
//!
//! # Example
//!
//! ```
//! use flagset_core::*;
//!
//! let mut flags = FlagSet::new("git", ErrorHandling::ContinueOnError);
//! let verbose = flags.bool("verbose", Some('v'), false, "talk more", None);
//!
//! let amend = flags.bool_sub_flag("amend", None, false, "rewrite the last commit", None);
//! let message = Handle::new(String::new());
//! let msg = flags.string_var_sub_flag(Some(&message), "message", Some('m'), "", "commit `text`", None);
//! let commit = flags.bool_sub_command("commit", Some('c'), "record changes", vec![amend, msg]);
//!
//! flags.parse(["commit", "-m", "initial import", "src/"]).unwrap();
//!
//! assert!(commit.get());
//! assert!(!verbose.get());
//! assert_eq!(message.get(), "initial import");
//! assert_eq!(flags.name(), "git commit");
//! assert_eq!(flags.args(), ["src/"]);
//! ```

pub mod command_line;
mod config;
mod error;
mod flag;
mod flagset;
mod parser;
mod usage;
mod value;

pub use config::{DEFAULT_INDENT, DEFAULT_PAD, FlagSetConfig, UsageLayout};
pub use error::{ParseError, Result, ValueError};
pub use flag::{Flag, FlagKey, FlagMode, Registry};
pub use flagset::{ErrorHandling, FlagSet};
pub use parser::EXIT_STATUS;
pub use usage::{display_name, unquote_usage, value_type_name};
pub use value::{Callback, Handle, Scalar, Value, format_duration, parse_duration};
