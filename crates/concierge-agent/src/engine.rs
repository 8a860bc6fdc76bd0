//! Conversation engine seam
//!
//! The engine is the external collaborator that actually runs speech
//! recognition, the language model, and synthesis. The orchestrator only
//! hands it a bound session (instructions, tools, room) and tells it what
//! to say; everything behind that boundary is someone else's pipeline.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use concierge_core::settings::{LlmSettings, SttSettings, TtsSettings};
use concierge_core::tools::{ToolExecutor, ToolRegistry};

/// Everything a conversation engine needs to run one room's session.
#[derive(Clone)]
pub struct SessionBinding {
    pub room: String,
    pub instructions: String,
    pub tools: Arc<ToolRegistry>,
}

/// Interface to the voice conversation pipeline.
#[async_trait]
pub trait ConversationEngine: Send + Sync {
    /// Bind a session to a room. Called once per session, before any
    /// `say`.
    async fn start(&self, binding: SessionBinding) -> Result<()>;

    /// Speak to the room.
    async fn say(&self, room: &str, text: &str) -> Result<()>;

    /// Tear down the room's pipeline. Must tolerate repeat calls and
    /// unknown rooms.
    async fn close(&self, room: &str);
}

/// Development engine that logs the conversation surface instead of
/// driving a media pipeline.
///
/// TODO: replace with a LiveKit RTC engine once the rust-sdks room/track
/// APIs land in a release we can pin.
pub struct EchoEngine {
    llm: LlmSettings,
    stt: SttSettings,
    tts: TtsSettings,
}

impl EchoEngine {
    pub fn new(llm: LlmSettings, stt: SttSettings, tts: TtsSettings) -> Self {
        Self { llm, stt, tts }
    }
}

#[async_trait]
impl ConversationEngine for EchoEngine {
    async fn start(&self, binding: SessionBinding) -> Result<()> {
        info!(
            "Engine bound to room {} (llm: {}, stt: {}, tts: {}, {} tools)",
            binding.room,
            self.llm.model,
            self.stt.model,
            self.tts.model,
            binding.tools.list_tools().len()
        );
        Ok(())
    }

    async fn say(&self, room: &str, text: &str) -> Result<()> {
        info!("[{}] agent says: {}", room, text);
        Ok(())
    }

    async fn close(&self, room: &str) {
        info!("Engine released room {}", room);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_engine_lifecycle() {
        let engine = EchoEngine::new(
            LlmSettings::default(),
            SttSettings::default(),
            TtsSettings::default(),
        );
        let binding = SessionBinding {
            room: "room-42".to_string(),
            instructions: "You are a concierge.".to_string(),
            tools: Arc::new(ToolRegistry::new()),
        };
        engine.start(binding).await.unwrap();
        engine.say("room-42", "Welcome!").await.unwrap();
        engine.close("room-42").await;
        // close must tolerate repeats and unknown rooms
        engine.close("room-42").await;
        engine.close("room-99").await;
    }
}
