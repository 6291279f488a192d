//! Error types for ghmir-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::EntityName;

/// All errors that can arise while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error: includes file path and line context from serde_yaml.
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The configuration file did not exist at the expected path.
    #[error("config file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// `dirs::home_dir()` returned `None`: cannot locate the default config.
    #[error("cannot determine home directory; set $HOME or pass --config")]
    HomeNotFound,

    #[error("configuration for {0} not found")]
    EntityNotFound(EntityName),

    #[error("github_token not set for {0}")]
    MissingSourceToken(EntityName),

    #[error("incomplete gitlab configuration for {0}")]
    IncompleteDestination(EntityName),

    #[error("invalid type for {entity}: must be 'user' or 'org' (got '{found}')")]
    InvalidEntityType { entity: EntityName, found: String },

    #[error("empty entity name in entities list")]
    EmptyEntityName,

    #[error("no entities requested")]
    NoEntities,
}
