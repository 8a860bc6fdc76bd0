//! Core configuration and tool plumbing for Concierge
//!
//! Holds the application settings, the use-case registry that selects the
//! active persona, the prompt loader, and the per-session tool registry
//! that downstream crates populate with discovered tool-server tools.

pub mod error;
pub mod prompt;
pub mod settings;
pub mod tools;
pub mod usecase;

pub use error::{ConfigError, PromptError};
pub use prompt::PromptLoader;
pub use settings::{AgentSettings, AppSettings, LiveKitSettings, McpSettings};
pub use tools::{ToolDefinition, ToolExecutor, ToolHandler, ToolRegistry};
pub use usecase::{ToolServerRef, UseCaseConfig, UseCaseRegistry};
