//! Declaration files: a serializable description of a flag set that the CLI
//! turns into a live [`FlagSet`].
//!
//! ```yaml
//! name: git
//! settings:
//!   layout:
//!     pad: 24
//! flags:
//!   - name: verbose
//!     alias: v
//!     type: bool
//!     usage: talk more
//!   - name: commit
//!     alias: c
//!     type: command
//!     usage: record changes
//!     flags:
//!       - name: message
//!         alias: m
//!         type: string
//!         usage: commit `text`
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

use flagset_core::{
    Flag, FlagMode, FlagSet, FlagSetConfig, Handle, Scalar, Value, ValueError, format_duration,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    #[serde(default)]
    pub settings: FlagSetConfig,
    #[serde(default)]
    pub flags: Vec<FlagDecl>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<char>,
    #[serde(rename = "type")]
    pub kind: FlagType,
    /// Text form of the initial value; the type's zero value when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub usage: String,
    /// Subflags; only meaningful for subcommands.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<FlagDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagType {
    Bool,
    Int,
    Int64,
    Uint,
    Uint64,
    Float64,
    String,
    Duration,
    Command,
}

/// Reads a declaration, as JSON for `.json` files and YAML otherwise.
pub fn load(path: &Path) -> Result<Declaration> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&raw).map_err(|source| CliError::DeclarationJson {
            path: path.to_path_buf(),
            source,
        })
    } else {
        serde_yaml::from_str(&raw).map_err(|source| CliError::DeclarationYaml {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Lists every problem that would make registration panic or a default
/// unparseable. An empty list means [`build`] will succeed.
pub fn check(declaration: &Declaration) -> Vec<String> {
    let mut problems = Vec::new();
    check_scope(&declaration.flags, None, &mut problems);

    // Nested flags are registered while the root scope is active, so their
    // names must not repeat a top-level flag registered before them.
    let mut top_level: HashSet<&str> = HashSet::new();
    for decl in &declaration.flags {
        visit_nested(decl, &decl.name, &mut |path, nested| {
            if top_level.contains(nested.name.as_str()) {
                problems.push(format!(
                    "`{path}' reuses the name of an earlier top-level flag"
                ));
            }
        });
        top_level.insert(decl.name.as_str());
    }

    problems
}

fn check_scope(decls: &[FlagDecl], parent: Option<&str>, problems: &mut Vec<String>) {
    let mut names = HashSet::new();
    let mut aliases = HashSet::new();

    for decl in decls {
        let path = join(parent, &decl.name);

        if decl.name.is_empty() {
            problems.push(format!("empty flag name under `{}'", parent.unwrap_or("<root>")));
        } else if !names.insert(decl.name.as_str()) {
            problems.push(format!("duplicate flag name `{path}'"));
        }

        if let Some(alias) = decl.alias {
            if !alias.is_ascii_alphanumeric() {
                problems.push(format!("`{alias}' is invalid as an alias of `{path}'"));
            } else if !aliases.insert(alias) {
                problems.push(format!("duplicate alias `-{alias}' on `{path}'"));
            }
        }

        match decl.kind {
            FlagType::Command if decl.default.is_some() => {
                problems.push(format!("subcommand `{path}' cannot have a default"));
            }
            FlagType::Command => {}
            _ if !decl.flags.is_empty() => {
                problems.push(format!("`{path}' is not a subcommand and cannot have subflags"));
            }
            _ => {
                if let Err(err) = Slot::new(decl.kind, decl.default.as_deref()) {
                    problems.push(format!(
                        "invalid default {:?} for `{path}': {err}",
                        decl.default.as_deref().unwrap_or_default()
                    ));
                }
            }
        }

        check_scope(&decl.flags, Some(&path), problems);
    }
}

fn visit_nested<'a>(decl: &'a FlagDecl, path: &str, visit: &mut dyn FnMut(&str, &'a FlagDecl)) {
    for child in &decl.flags {
        let child_path = join(Some(path), &child.name);
        visit(&child_path, child);
        visit_nested(child, &child_path, visit);
    }
}

fn join(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}.{name}"),
        None => name.to_string(),
    }
}

/// Typed storage for one declared flag, kept so values can be reported after
/// parsing.
#[derive(Debug, Clone)]
enum Slot {
    Bool(Handle<bool>),
    Int(Handle<isize>),
    Int64(Handle<i64>),
    Uint(Handle<usize>),
    Uint64(Handle<u64>),
    Float64(Handle<f64>),
    String(Handle<String>),
    Duration(Handle<Duration>),
}

impl Slot {
    fn new(kind: FlagType, default: Option<&str>) -> std::result::Result<Self, ValueError> {
        fn handle<T: Scalar + Default>(
            default: Option<&str>,
        ) -> std::result::Result<Handle<T>, ValueError> {
            let value = default.map(T::parse_text).transpose()?;
            Ok(Handle::new(value.unwrap_or_default()))
        }

        Ok(match kind {
            FlagType::Bool | FlagType::Command => Self::Bool(handle(default)?),
            FlagType::Int => Self::Int(handle(default)?),
            FlagType::Int64 => Self::Int64(handle(default)?),
            FlagType::Uint => Self::Uint(handle(default)?),
            FlagType::Uint64 => Self::Uint64(handle(default)?),
            FlagType::Float64 => Self::Float64(handle(default)?),
            FlagType::String => Self::String(handle(default)?),
            FlagType::Duration => Self::Duration(handle(default)?),
        })
    }

    fn value(&self) -> Box<dyn Value> {
        match self {
            Self::Bool(handle) => Box::new(handle.clone()),
            Self::Int(handle) => Box::new(handle.clone()),
            Self::Int64(handle) => Box::new(handle.clone()),
            Self::Uint(handle) => Box::new(handle.clone()),
            Self::Uint64(handle) => Box::new(handle.clone()),
            Self::Float64(handle) => Box::new(handle.clone()),
            Self::String(handle) => Box::new(handle.clone()),
            Self::Duration(handle) => Box::new(handle.clone()),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(handle) => serde_json::Value::from(handle.get()),
            Self::Int(handle) => serde_json::Value::from(handle.get()),
            Self::Int64(handle) => serde_json::Value::from(handle.get()),
            Self::Uint(handle) => serde_json::Value::from(handle.get()),
            Self::Uint64(handle) => serde_json::Value::from(handle.get()),
            Self::Float64(handle) => serde_json::Value::from(handle.get()),
            Self::String(handle) => serde_json::Value::from(handle.get()),
            Self::Duration(handle) => serde_json::Value::from(format_duration(handle.get())),
        }
    }
}

/// A flag set built from a declaration, with access to every declared value.
pub struct Bound {
    pub flags: FlagSet,
    slots: BTreeMap<String, Slot>,
}

/// Outcome of parsing an argument list against a declaration.
#[derive(Debug, Serialize)]
pub struct ParseReport {
    /// Display name, extended by every entered subcommand.
    pub name: String,
    /// Final value of every declared flag, keyed by dotted path.
    pub values: BTreeMap<String, serde_json::Value>,
    /// Positional arguments.
    pub args: Vec<String>,
}

impl Bound {
    pub fn report(&self) -> ParseReport {
        ParseReport {
            name: self.flags.name().to_string(),
            values: self
                .slots
                .iter()
                .map(|(path, slot)| (path.clone(), slot.to_json()))
                .collect(),
            args: self.flags.args().to_vec(),
        }
    }
}

/// Builds a flag set from a declaration.
///
/// The declaration is [`check`]ed first so registration never panics.
pub fn build(declaration: &Declaration) -> Result<Bound> {
    let problems = check(declaration);
    if !problems.is_empty() {
        return Err(CliError::Invalid(problems));
    }

    let mut flags = FlagSet::from_config(declaration.name.as_str(), &declaration.settings);
    let mut slots = BTreeMap::new();
    for decl in &declaration.flags {
        declare(&mut flags, decl, None, &mut slots)?;
    }
    debug!(name = %declaration.name, flags = slots.len(), "Built flag set from declaration");

    Ok(Bound { flags, slots })
}

fn declare(
    flags: &mut FlagSet,
    decl: &FlagDecl,
    parent: Option<&str>,
    slots: &mut BTreeMap<String, Slot>,
) -> Result<Option<Flag>> {
    let path = join(parent, &decl.name);

    let mut subflags = Vec::with_capacity(decl.flags.len());
    for child in &decl.flags {
        subflags.extend(declare(flags, child, Some(&path), slots)?);
    }

    let slot = Slot::new(decl.kind, decl.default.as_deref())
        .map_err(|err| CliError::Invalid(vec![format!("invalid default for `{path}': {err}")]))?;

    let mut mode = if decl.kind == FlagType::Command {
        FlagMode::COMMAND
    } else {
        FlagMode::empty()
    };
    if parent.is_some() {
        mode |= FlagMode::NESTED;
    }

    let value = slot.value();
    slots.insert(path, slot);
    Ok(flags.register(value, &decl.name, decl.alias, &decl.usage, mode, None, subflags))
}
