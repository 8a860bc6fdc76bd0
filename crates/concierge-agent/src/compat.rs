//! Single-persona compatibility constructor
//!
//! The pre-multi-use-case deployment wired a hospitality assistant
//! directly. Kept as a thin shim that pins the generic orchestrator to the
//! `hospitality` use case so those deployments upgrade without config
//! changes.

use std::sync::Arc;

use concierge_core::settings::AppSettings;
use concierge_mcp::connector::ToolServerConnector;

use crate::engine::ConversationEngine;
use crate::orchestrator::Orchestrator;

pub fn hospitality_orchestrator(
    settings: &AppSettings,
    engine: Arc<dyn ConversationEngine>,
) -> Orchestrator {
    Orchestrator::new(
        "hospitality",
        Arc::new(settings.registry()),
        ToolServerConnector::new(&settings.mcp),
        engine,
        settings.agent.identity_prefix.clone(),
    )
}
