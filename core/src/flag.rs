//! Flag records and the registry that indexes them by name and alias.

use std::collections::HashMap;
use std::fmt;

use bitflags::bitflags;

use crate::value::{Callback, Value};

bitflags! {
    /// Registration switches for [`FlagSet::register`](crate::FlagSet::register).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FlagMode: u8 {
        /// The flag is a subcommand owning a nested registry.
        const COMMAND = 1 << 0;
        /// Do not insert the flag into the registry; hand it back to the
        /// caller so it can be passed as a subflag of a subcommand.
        const NESTED = 1 << 1;
    }
}

/// A declared option or subcommand.
///
/// Flags are created through [`FlagSet`](crate::FlagSet) registration
/// methods. A flag registered with [`FlagMode::NESTED`] is returned to the
/// caller and becomes part of a subcommand's registry when passed as one of
/// its subflags.
pub struct Flag {
    pub(crate) name: String,
    pub(crate) alias: Option<char>,
    pub(crate) usage: String,
    pub(crate) value: Box<dyn Value>,
    pub(crate) default_value: String,
    pub(crate) callback: Option<Callback>,
    pub(crate) children: Registry,
    pub(crate) is_sub_command: bool,
}

impl Flag {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Single-character short form, if any.
    pub fn alias(&self) -> Option<char> {
        self.alias
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    pub fn value(&self) -> &dyn Value {
        self.value.as_ref()
    }

    /// Mutable access to the value, bypassing the callback.
    pub fn value_mut(&mut self) -> &mut dyn Value {
        self.value.as_mut()
    }

    /// Text form of the value captured at registration time.
    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    pub fn is_sub_command(&self) -> bool {
        self.is_sub_command
    }

    /// Flags scoped under this subcommand. Empty for ordinary options.
    pub fn children(&self) -> &Registry {
        &self.children
    }

    /// Calls `visit` for each nested flag, sorted by name, at `depth`.
    pub fn visit_children<F: FnMut(usize, &Flag)>(&self, depth: usize, mut visit: F) {
        for flag in self.children.sorted() {
            visit(depth, flag);
        }
    }
}

impl fmt::Debug for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flag")
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("value", &self.value.to_string())
            .field("default_value", &self.default_value)
            .field("is_sub_command", &self.is_sub_command)
            .field("children", &self.children.len())
            .finish()
    }
}

/// Lookup token into a [`Registry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKey<'a> {
    Name(&'a str),
    Alias(char),
}

impl fmt::Display for FlagKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "{name}"),
            Self::Alias(alias) => write!(f, "-{alias}"),
        }
    }
}

/// Flags of one scope, reachable by name and by alias.
///
/// Both indexes point into the same store, so a flag with an alias is still
/// a single entry.
#[derive(Default)]
pub struct Registry {
    flags: Vec<Flag>,
    names: HashMap<String, usize>,
    aliases: HashMap<char, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn get(&self, key: FlagKey<'_>) -> Option<&Flag> {
        self.position(key).map(|slot| &self.flags[slot])
    }

    pub fn get_mut(&mut self, key: FlagKey<'_>) -> Option<&mut Flag> {
        self.position(key).map(|slot| &mut self.flags[slot])
    }

    pub fn contains(&self, key: FlagKey<'_>) -> bool {
        self.position(key).is_some()
    }

    /// All flags in ascending order of name.
    pub fn sorted(&self) -> Vec<&Flag> {
        let mut flags: Vec<&Flag> = self.flags.iter().collect();
        flags.sort_by(|a, b| a.name.cmp(&b.name));
        flags
    }

    pub(crate) fn position(&self, key: FlagKey<'_>) -> Option<usize> {
        match key {
            FlagKey::Name(name) => self.names.get(name).copied(),
            FlagKey::Alias(alias) => self.aliases.get(&alias).copied(),
        }
    }

    pub(crate) fn slot(&self, slot: usize) -> &Flag {
        &self.flags[slot]
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> &mut Flag {
        &mut self.flags[slot]
    }

    /// Finds the first name or alias of `flag` already present.
    pub(crate) fn collision(&self, flag: &Flag) -> Option<String> {
        if self.contains(FlagKey::Name(&flag.name)) {
            return Some(FlagKey::Name(&flag.name).to_string());
        }
        flag.alias
            .filter(|alias| self.contains(FlagKey::Alias(*alias)))
            .map(|alias| FlagKey::Alias(alias).to_string())
    }

    /// Stores `flag`; the caller has ruled out collisions.
    pub(crate) fn insert(&mut self, flag: Flag) {
        let slot = self.flags.len();
        self.names.insert(flag.name.clone(), slot);
        if let Some(alias) = flag.alias {
            self.aliases.insert(alias, slot);
        }
        self.flags.push(flag);
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.sorted()).finish()
    }
}

/// Checks that an alias is an ASCII letter or digit.
///
/// # Panics
///
/// Panics for any other character: aliases are fixed at build time, so an
/// invalid one is a programming error.
pub(crate) fn validate_alias(alias: Option<char>) -> Option<char> {
    match alias {
        Some(c) if c.is_ascii_alphanumeric() => Some(c),
        Some(c) => panic!("`{c}' is invalid as an alias"),
        None => None,
    }
}
