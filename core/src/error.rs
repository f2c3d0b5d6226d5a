//! Error types for value conversion and argument parsing.
//!
//! Registration defects (duplicate names, invalid aliases) are not represented
//! here: they panic at setup time. Everything driven by argument tokens is a
//! [`ParseError`].

use thiserror::Error;

/// Failure reported by [`Value::set`](crate::Value::set) or a flag callback.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The text is not a valid literal for the value type.
    #[error("invalid syntax")]
    Syntax,
    /// The literal is well formed but does not fit the value type.
    #[error("value out of range")]
    Range,
    /// A custom value or callback refused the input.
    #[error("{0}")]
    Rejected(String),
}

impl ValueError {
    /// Builds a [`ValueError::Rejected`] from any message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }
}

/// Errors produced while parsing an argument list.
///
/// [`ParseError::HelpRequested`] is a control signal rather than a failure:
/// it is always returned to the caller of [`FlagSet::parse`](crate::FlagSet::parse)
/// and never escalated by the error-handling policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `--help` or `-h` was given and no flag of that name is registered.
    #[error("flag: help requested")]
    HelpRequested,

    /// The option body is empty or starts with `-` or `=`.
    #[error("invalid syntax as an option `{0}'")]
    InvalidSyntax(String),

    /// No flag with this long name exists in the active scope.
    #[error("unrecognized option `--{0}'")]
    UnrecognizedLong(String),

    /// `-x=value` where `x` is not a registered alias.
    #[error("unrecognized option `-{0}'")]
    UnrecognizedShort(String),

    /// A character of a short option group is not a registered alias.
    #[error("unrecognized option `{0}'")]
    UnrecognizedAlias(char),

    /// `-abc=value`: a value cannot be assigned to a group of short options.
    #[error("ambiguous option `-{0}': a value cannot be assigned to grouped short options")]
    AmbiguousShortValue(String),

    /// A non-boolean flag appeared last with no value after it.
    #[error("option `--{0}' requires an argument")]
    MissingArgument(String),

    /// The flag claims boolean capability but does not hold a `bool`.
    #[error("option `--{0}' type not a boolean")]
    NotBoolean(String),

    /// The flag's value (or its callback) rejected the text.
    #[error("invalid value \"{value}\" for option `--{name}': {source}")]
    InvalidValue {
        name: String,
        value: String,
        #[source]
        source: ValueError,
    },
}

impl ParseError {
    /// Returns `true` for the help-requested signal.
    pub fn is_help(&self) -> bool {
        matches!(self, Self::HelpRequested)
    }

    /// Returns the underlying value error, if this is a conversion failure.
    pub fn value_error(&self) -> Option<&ValueError> {
        match self {
            Self::InvalidValue { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience alias for results with [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;
