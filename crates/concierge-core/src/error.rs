//! Typed errors for configuration and prompt resolution

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading settings or resolving a use case.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The requested use-case identifier is not in the configured mapping.
    /// This is reported to the caller, never silently replaced by a default
    /// persona — a fallback would mask misconfiguration.
    #[error("unknown use case '{0}'")]
    UnknownUseCase(String),

    #[error("failed to read settings file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("invalid settings: {0}")]
    Invalid(String),

    #[error("invalid tool server url '{url}' for server '{name}'")]
    InvalidToolServerUrl { name: String, url: String },
}

/// Errors raised while loading a persona's prompt file.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("prompt file not found: {0} (tried as given, relative to cwd, and under config/)")]
    NotFound(String),

    #[error("failed to read prompt file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse prompt file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },

    #[error("prompt file {0} does not contain a non-empty 'prompt' field")]
    MissingPrompt(PathBuf),
}
