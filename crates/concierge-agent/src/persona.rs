//! Persona resolution — from use-case configuration to live session material
//!
//! Resolution happens in two phases matching the session state machine:
//! `PersonaResolver::resolve` covers the `Resolving` state (registry lookup
//! and prompt load, both fatal on failure), and `PendingPersona::connect`
//! covers `Connecting` (tool-server fan-out, degrading on failure).

use std::sync::Arc;
use tracing::info;

use concierge_core::prompt::PromptLoader;
use concierge_core::tools::ToolHandler;
use concierge_core::usecase::{ToolServerRef, UseCaseRegistry};
use concierge_mcp::connector::{ToolServerConnector, ToolServerHandle};
use tokio_util::sync::CancellationToken;

use crate::error::SessionError;

/// Resolves use-case identifiers into session-ready personas.
pub struct PersonaResolver {
    registry: Arc<UseCaseRegistry>,
}

impl PersonaResolver {
    pub fn new(registry: Arc<UseCaseRegistry>) -> Self {
        Self { registry }
    }

    /// Registry lookup plus prompt load. The prompt file is re-read on
    /// every call so edits apply to the next session.
    pub fn resolve(&self, use_case_id: &str) -> Result<PendingPersona, SessionError> {
        let config = self.registry.resolve(use_case_id)?;
        let instructions = PromptLoader::load(&config.prompt_file)?;

        info!(
            "Resolved use case '{}' ({}, {} tool servers)",
            use_case_id,
            config.name,
            config.tool_servers.len()
        );

        Ok(PendingPersona {
            display_name: config.name.clone(),
            greeting: config.greeting.clone(),
            instructions,
            servers: config.tool_servers.clone(),
        })
    }
}

/// A persona whose configuration is resolved but whose tool servers are not
/// yet connected.
#[derive(Debug)]
pub struct PendingPersona {
    pub display_name: String,
    pub greeting: String,
    pub instructions: String,
    pub servers: Vec<ToolServerRef>,
}

impl PendingPersona {
    /// Connect every configured tool server concurrently. Servers that fail
    /// stay on the persona as failed handles; their tools are simply absent.
    pub async fn connect(
        self,
        connector: &ToolServerConnector,
        cancel: &CancellationToken,
    ) -> ResolvedPersona {
        let handles = connector.connect_all(&self.servers, cancel).await;
        ResolvedPersona {
            display_name: self.display_name,
            greeting: self.greeting,
            instructions: self.instructions,
            handles,
        }
    }
}

/// The materialized runtime form of a use case, owned by exactly one
/// session and discarded with it.
pub struct ResolvedPersona {
    pub display_name: String,
    pub greeting: String,
    pub instructions: String,
    pub handles: Vec<ToolServerHandle>,
}

impl ResolvedPersona {
    /// Union of the tools advertised by the servers that connected.
    pub fn connected_tools(&self) -> Vec<Arc<dyn ToolHandler>> {
        self.handles.iter().flat_map(|h| h.tools()).collect()
    }

    pub fn tool_count(&self) -> usize {
        self.handles.iter().map(|h| h.tool_count()).sum()
    }

    /// Close every handle. Idempotent per handle.
    pub fn close_all(&mut self) {
        for handle in &mut self.handles {
            handle.close();
        }
    }
}
