//! Typed errors for the library seams.
//!
//! Collaborator clients and tool bodies use `anyhow`; these enums cover the
//! places where callers need to branch on what went wrong.

use thiserror::Error;

/// Startup configuration problems. All of them are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    MissingSecret(&'static str),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Tool registration problems, detected once at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("tool '{0}' is registered more than once")]
    DuplicateTool(String),

    #[error("tool '{tool}' declares parameter '{parameter}' more than once")]
    DuplicateParameter { tool: String, parameter: String },

    #[error("tool names must not be empty")]
    EmptyName,
}

/// Faults of the dialogue loop itself. Tool faults never show up here.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("model service error: {0}")]
    Remote(String),

    #[error("model service did not answer within {0}s")]
    Timeout(u64),
}
