use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the `flagset` binary.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse '{}' as JSON: {source}", .path.display())]
    DeclarationJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse '{}' as YAML: {source}", .path.display())]
    DeclarationYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid declaration ({} problem(s)):\n  {}", .0.len(), .0.join("\n  "))]
    Invalid(Vec<String>),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
