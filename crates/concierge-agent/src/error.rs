//! Session-level errors

use thiserror::Error;

use concierge_core::error::{ConfigError, PromptError};

/// A session-start failure, reported to whatever triggered the join.
/// These abort session creation entirely; tool-server failures do not
/// appear here because they only degrade the session's tool set.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("conversation engine failed to start for room '{room}': {message}")]
    EngineStart { room: String, message: String },
}
