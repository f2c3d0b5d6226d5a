//! Serializable settings for a [`FlagSet`](crate::FlagSet).
//!
//! # Example YAML
//!
//! ```yaml
//! error_handling: exit-on-error
//! layout:
//!   indent: 4
//!   pad: 24
//! ```

use serde::{Deserialize, Serialize};

use crate::flagset::ErrorHandling;

/// Default indentation per nesting depth in usage output.
pub const DEFAULT_INDENT: usize = 2;

/// Default width of the flag-name column in usage output.
pub const DEFAULT_PAD: usize = 20;

/// Column layout of [`print_defaults`](crate::FlagSet::print_defaults).
///
/// ```
/// use flagset_core::UsageLayout;
///
/// let layout = UsageLayout::default();
/// assert_eq!((layout.indent, layout.pad), (2, 20));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageLayout {
    /// Spaces per nesting depth before the flag name.
    pub indent: usize,
    /// Minimum width of the flag-name column.
    pub pad: usize,
}

impl Default for UsageLayout {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            pad: DEFAULT_PAD,
        }
    }
}

/// Settings applied when a flag set is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagSetConfig {
    /// Reaction to parse failures.
    pub error_handling: ErrorHandling,
    /// Usage output columns.
    pub layout: UsageLayout,
}
