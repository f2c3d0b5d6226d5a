//! Usage text: the two-block `Options` / `Commands` listing of the active
//! scope.
//!
//! Each entry is the flag's display name padded to the layout's `pad`
//! column, two spaces, then the usage string. Usage strings spanning
//! several lines continue under the first usage character:
//!
//! ```text
//! Options:
//!   -v, --verbose         log every request
//!       --root            directory to serve,
//!                         relative to the working directory
//!
//! Commands:
//!    s,   serve           start the server
//! ```

use crate::config::UsageLayout;
use crate::flag::{Flag, Registry};
use crate::flagset::FlagSet;

impl FlagSet {
    /// Calls `visit` for every flag of the active scope in ascending order
    /// of name, with depth 1.
    pub fn visit_all<F: FnMut(usize, &Flag)>(&self, visit: F) {
        visit_registry(1, self.flags(), visit);
    }

    /// Usage listing of the active scope, as written by
    /// [`print_defaults`](FlagSet::print_defaults) without its final newline.
    ///
    /// ```
    /// use flagset_core::{ErrorHandling, FlagSet};
    ///
    /// let mut flags = FlagSet::new("serve", ErrorHandling::ContinueOnError);
    /// flags.string("root", None, ".", "`dir` to serve", None);
    ///
    /// assert_eq!(
    ///     flags.defaults(),
    ///     "Options:\n      --root            `dir` to serve\n"
    /// );
    /// ```
    pub fn defaults(&self) -> String {
        let mut options = String::new();
        let mut commands = String::new();
        let layout = self.layout;

        self.visit_all(|depth, flag| {
            let block = if flag.is_sub_command {
                &mut commands
            } else {
                &mut options
            };
            block.push_str(&format_entry(depth, flag, layout));
        });

        let mut text = String::new();
        if !options.is_empty() {
            text.push_str("Options:\n");
            text.push_str(&options);
        }
        if !commands.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str("Commands:\n");
            text.push_str(&commands);
        }
        text
    }

    /// Writes [`defaults`](FlagSet::defaults) and a trailing newline to the
    /// output.
    pub fn print_defaults(&self) {
        self.write_output(&format!("{}\n", self.defaults()));
    }
}

fn visit_registry<F: FnMut(usize, &Flag)>(depth: usize, registry: &Registry, mut visit: F) {
    for flag in registry.sorted() {
        visit(depth, flag);
    }
}

/// Left column of a usage entry.
///
/// Options render as `-a, --name` or `    --name`; subcommands as
/// ` a,   name  ` or `name      `.
pub fn display_name(flag: &Flag) -> String {
    match (flag.alias, flag.is_sub_command) {
        (Some(alias), false) => format!("-{alias}, --{}", flag.name),
        (None, false) => format!("    --{}", flag.name),
        (Some(alias), true) => format!(" {alias},   {}  ", flag.name),
        (None, true) => format!("{}      ", flag.name),
    }
}

fn format_entry(depth: usize, flag: &Flag, layout: UsageLayout) -> String {
    let name = display_name(flag);
    let margin = depth * layout.indent;
    let column = name.chars().count().max(layout.pad);
    let continuation = " ".repeat(margin + 2 + column);

    let mut entry = format!("{}{name:<pad$}", " ".repeat(margin), pad = layout.pad);
    for (i, line) in flag.usage().split('\n').enumerate() {
        if i == 0 {
            entry.push_str("  ");
        } else {
            entry.push_str(&continuation);
        }
        entry.push_str(line);
        entry.push('\n');
    }
    entry
}

/// Extracts a placeholder name for the flag's argument from its usage.
///
/// The first back-quoted word is the name and is returned with its quotes
/// removed from the usage. Without one, the value's
/// [`type_hint`](crate::Value::type_hint) is used, which is empty for
/// booleans.
///
/// ```
/// use flagset_core::{ErrorHandling, FlagSet, unquote_usage};
///
/// let mut flags = FlagSet::new("cp", ErrorHandling::ContinueOnError);
/// flags.string("target", Some('t'), "", "copy into `directory`", None);
/// flags.uint("jobs", Some('j'), 1, "parallel copies", None);
///
/// let target = flags.lookup("target").unwrap();
/// assert_eq!(
///     unquote_usage(target),
///     ("directory".to_string(), "copy into directory".to_string())
/// );
/// let jobs = flags.lookup("jobs").unwrap();
/// assert_eq!(unquote_usage(jobs).0, "uint");
/// ```
pub fn unquote_usage(flag: &Flag) -> (String, String) {
    let usage = flag.usage();
    if let Some(start) = usage.find('`') {
        let rest = &usage[start + 1..];
        if let Some(len) = rest.find('`') {
            let name = &rest[..len];
            let unquoted = format!("{}{name}{}", &usage[..start], &rest[len + 1..]);
            return (name.to_string(), unquoted);
        }
    }
    (flag.value().type_hint().to_string(), usage.to_string())
}

/// Short name of the flag's value type: `bool` for boolean flags, otherwise
/// the value's type hint.
pub fn value_type_name(flag: &Flag) -> &str {
    if flag.value().is_bool_flag() {
        "bool"
    } else {
        flag.value().type_hint()
    }
}
