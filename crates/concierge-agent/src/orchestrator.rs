//! Session orchestrator — one session per room, from first join to empty
//!
//! Sessions are keyed by room. The first participant join starts the
//! Resolving → Connecting → Active pipeline; later joins attach to the
//! existing session; the last leave (or an explicit room-empty event)
//! cancels whatever is in flight and releases everything the session owns.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use concierge_core::settings::AppSettings;
use concierge_core::tools::ToolRegistry;
use concierge_core::usecase::UseCaseRegistry;
use concierge_mcp::connector::ToolServerConnector;

use crate::engine::{ConversationEngine, SessionBinding};
use crate::error::SessionError;
use crate::events::RoomEvent;
use crate::persona::{PersonaResolver, ResolvedPersona};
use crate::session::SessionState;

/// Snapshot of one live session, for status reporting.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub room: String,
    pub use_case: String,
    pub state: SessionState,
    pub participants: usize,
    pub tool_count: usize,
    pub started_at: DateTime<Utc>,
}

struct SessionHandle {
    room: String,
    use_case: String,
    started_at: DateTime<Utc>,
    state: RwLock<SessionState>,
    participants: Mutex<HashSet<String>>,
    persona: Mutex<Option<ResolvedPersona>>,
    cancel: CancellationToken,
}

impl SessionHandle {
    fn new(room: &str, use_case: &str) -> Self {
        Self {
            room: room.to_string(),
            use_case: use_case.to_string(),
            started_at: Utc::now(),
            state: RwLock::new(SessionState::Resolving),
            participants: Mutex::new(HashSet::new()),
            persona: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    async fn state(&self) -> SessionState {
        *self.state.read().await
    }

    /// Apply a transition if the state machine allows it. Lost races (the
    /// canceller closed the session first) surface here as refused
    /// transitions and are ignored.
    async fn transition(&self, next: SessionState) -> bool {
        let mut state = self.state.write().await;
        if state.can_transition_to(next) {
            debug!("Session {} state: {} -> {}", self.room, *state, next);
            *state = next;
            true
        } else {
            debug!(
                "Session {} refusing transition {} -> {}",
                self.room, *state, next
            );
            false
        }
    }

    async fn add_participant(&self, identity: &str) {
        self.participants.lock().await.insert(identity.to_string());
    }

    /// Returns the number of participants remaining.
    async fn remove_participant(&self, identity: &str) -> usize {
        let mut participants = self.participants.lock().await;
        participants.remove(identity);
        participants.len()
    }

    async fn store_persona(&self, persona: ResolvedPersona) {
        *self.persona.lock().await = Some(persona);
    }

    async fn take_persona(&self) -> Option<ResolvedPersona> {
        self.persona.lock().await.take()
    }

    async fn snapshot(&self) -> SessionInfo {
        let tool_count = self
            .persona
            .lock()
            .await
            .as_ref()
            .map(|p| p.tool_count())
            .unwrap_or(0);
        SessionInfo {
            room: self.room.clone(),
            use_case: self.use_case.clone(),
            state: self.state().await,
            participants: self.participants.lock().await.len(),
            tool_count,
            started_at: self.started_at,
        }
    }
}

/// Hosts every room's session for one worker process.
pub struct Orchestrator {
    use_case: String,
    resolver: PersonaResolver,
    connector: ToolServerConnector,
    engine: Arc<dyn ConversationEngine>,
    agent_identity_prefix: String,
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
}

impl Orchestrator {
    pub fn new(
        use_case: impl Into<String>,
        registry: Arc<UseCaseRegistry>,
        connector: ToolServerConnector,
        engine: Arc<dyn ConversationEngine>,
        agent_identity_prefix: impl Into<String>,
    ) -> Self {
        Self {
            use_case: use_case.into(),
            resolver: PersonaResolver::new(registry),
            connector,
            engine,
            agent_identity_prefix: agent_identity_prefix.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Build an orchestrator serving the settings' active use case.
    pub fn from_settings(settings: &AppSettings, engine: Arc<dyn ConversationEngine>) -> Self {
        Self::new(
            settings.active_use_case(),
            Arc::new(settings.registry()),
            ToolServerConnector::new(&settings.mcp),
            engine,
            settings.agent.identity_prefix.clone(),
        )
    }

    pub fn use_case(&self) -> &str {
        &self.use_case
    }

    fn is_agent(&self, identity: &str) -> bool {
        identity.starts_with(&self.agent_identity_prefix)
    }

    /// React to a room membership event from the media layer.
    pub async fn handle_event(&self, event: RoomEvent) {
        match event {
            RoomEvent::ParticipantJoined { room, identity } => {
                if self.is_agent(&identity) {
                    debug!("Ignoring agent participant {} in room {}", identity, room);
                    return;
                }
                if let Err(e) = self.start_session(&room, &identity).await {
                    warn!("Session start failed for room {}: {}", room, e);
                }
            }
            RoomEvent::ParticipantLeft { room, identity } => {
                if self.is_agent(&identity) {
                    return;
                }
                let now_empty = {
                    let sessions = self.sessions.read().await;
                    match sessions.get(&room) {
                        Some(handle) => handle.remove_participant(&identity).await == 0,
                        None => false,
                    }
                };
                if now_empty {
                    self.end_session(&room).await;
                }
            }
            RoomEvent::RoomEmpty { room } => {
                self.end_session(&room).await;
            }
        }
    }

    /// Start a session for the room, or attach to the one already running.
    ///
    /// The first caller drives the full Resolving/Connecting pipeline and
    /// receives any fatal resolution error; a concurrent duplicate join is
    /// a no-op against the existing session.
    pub async fn start_session(&self, room: &str, identity: &str) -> Result<(), SessionError> {
        let handle = {
            let mut sessions = self.sessions.write().await;
            if let Some(existing) = sessions.get(room) {
                if !existing.state().await.is_terminal() {
                    existing.add_participant(identity).await;
                    debug!(
                        "Participant {} attached to existing session for room {}",
                        identity, room
                    );
                    return Ok(());
                }
                // Terminal leftovers start a fresh cycle.
                sessions.remove(room);
            }
            let handle = Arc::new(SessionHandle::new(room, &self.use_case));
            handle.add_participant(identity).await;
            sessions.insert(room.to_string(), handle.clone());
            handle
        };

        info!(
            "Starting {} session for room {} (participant: {})",
            self.use_case, room, identity
        );

        match self.run_pipeline(&handle).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = handle.transition(SessionState::Failed).await;
                self.remove_if_same(room, &handle).await;
                Err(e)
            }
        }
    }

    async fn run_pipeline(&self, handle: &Arc<SessionHandle>) -> Result<(), SessionError> {
        // Resolving: registry lookup + prompt load. Fatal on failure.
        let pending = self.resolver.resolve(&self.use_case)?;

        if handle.cancel.is_cancelled() {
            debug!("Session {} cancelled during resolution", handle.room);
            return Ok(());
        }

        // Connecting: tool-server fan-out, bounded per server, cancellable.
        let _ = handle.transition(SessionState::Connecting).await;
        let mut persona = pending.connect(&self.connector, &handle.cancel).await;

        if handle.cancel.is_cancelled() {
            debug!("Session {} cancelled during tool-server connect", handle.room);
            persona.close_all();
            return Ok(());
        }

        let mut tools = ToolRegistry::new();
        tools.register_all(persona.connected_tools());
        let binding = SessionBinding {
            room: handle.room.clone(),
            instructions: persona.instructions.clone(),
            tools: Arc::new(tools),
        };
        let greeting = persona.greeting.clone();
        let tool_count = persona.tool_count();
        handle.store_persona(persona).await;

        if handle.cancel.is_cancelled() {
            debug!("Session {} cancelled before activation", handle.room);
            if let Some(mut persona) = handle.take_persona().await {
                persona.close_all();
            }
            return Ok(());
        }

        if let Err(e) = self.engine.start(binding).await {
            if let Some(mut persona) = handle.take_persona().await {
                persona.close_all();
            }
            return Err(SessionError::EngineStart {
                room: handle.room.clone(),
                message: format!("{e:#}"),
            });
        }

        // Active: greeting goes out exactly once, after the tool set is
        // final.
        let _ = handle.transition(SessionState::Active).await;
        if let Err(e) = self.engine.say(&handle.room, &greeting).await {
            warn!("Greeting for room {} was not delivered: {}", handle.room, e);
        }

        info!(
            "Session active for room {} ({} tools available)",
            handle.room, tool_count
        );
        Ok(())
    }

    /// Tear down the room's session, cancelling any in-flight tool-server
    /// connection attempts. Safe to call for rooms with no session.
    pub async fn end_session(&self, room: &str) {
        let handle = { self.sessions.write().await.remove(room) };
        let Some(handle) = handle else {
            debug!("No session to end for room {}", room);
            return;
        };

        info!("Ending session for room {}", room);
        handle.cancel.cancel();
        let _ = handle.transition(SessionState::Ending).await;

        if let Some(mut persona) = handle.take_persona().await {
            persona.close_all();
        }
        self.engine.close(room).await;

        let _ = handle.transition(SessionState::Closed).await;
        info!("Session closed for room {}", room);
    }

    async fn remove_if_same(&self, room: &str, handle: &Arc<SessionHandle>) {
        let mut sessions = self.sessions.write().await;
        if let Some(current) = sessions.get(room) {
            if Arc::ptr_eq(current, handle) {
                sessions.remove(room);
            }
        }
    }

    pub async fn session(&self, room: &str) -> Option<SessionInfo> {
        let handle = { self.sessions.read().await.get(room).cloned() }?;
        Some(handle.snapshot().await)
    }

    pub async fn active_rooms(&self) -> Vec<String> {
        self.sessions.read().await.keys().cloned().collect()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use concierge_core::ToolExecutor;
    use async_trait::async_trait;
    use axum::Json;
    use axum::http::StatusCode;
    use axum::routing::post;
    use concierge_core::usecase::{ToolServerRef, UseCaseConfig};
    use serde_json::Value;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    #[derive(Default)]
    struct RecordingEngine {
        fail_start: bool,
        started: Mutex<Vec<SessionBinding>>,
        said: Mutex<Vec<(String, String)>>,
        closed: Mutex<Vec<String>>,
    }

    impl RecordingEngine {
        fn failing() -> Self {
            Self {
                fail_start: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ConversationEngine for RecordingEngine {
        async fn start(&self, binding: SessionBinding) -> anyhow::Result<()> {
            if self.fail_start {
                return Err(anyhow!("pipeline refused to start"));
            }
            self.started.lock().await.push(binding);
            Ok(())
        }

        async fn say(&self, room: &str, text: &str) -> anyhow::Result<()> {
            self.said
                .lock()
                .await
                .push((room.to_string(), text.to_string()));
            Ok(())
        }

        async fn close(&self, room: &str) {
            self.closed.lock().await.push(room.to_string());
        }
    }

    /// Minimal MCP tool server; `delay` simulates an unresponsive one.
    async fn stub_tool_server(tool_names: Vec<&'static str>, delay: Duration) -> String {
        let app = axum::Router::new().route(
            "/",
            post(move |Json(body): Json<Value>| {
                let tool_names = tool_names.clone();
                async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let Some(id) = body.get("id").cloned() else {
                        return (StatusCode::ACCEPTED, Json(Value::Null));
                    };
                    let method = body.get("method").and_then(|m| m.as_str()).unwrap_or("");
                    let result = match method {
                        "initialize" => serde_json::json!({
                            "protocolVersion": "2024-11-05",
                            "capabilities": {},
                            "serverInfo": {"name": "stub", "version": "0.0.0"},
                        }),
                        "tools/list" => {
                            let tools: Vec<Value> = tool_names
                                .iter()
                                .map(|n| {
                                    serde_json::json!({
                                        "name": n,
                                        "description": "stub tool",
                                        "inputSchema": {"type": "object"},
                                    })
                                })
                                .collect();
                            serde_json::json!({"tools": tools})
                        }
                        _ => serde_json::json!({"content": [{"type": "text", "text": "ok"}]}),
                    };
                    (
                        StatusCode::OK,
                        Json(serde_json::json!({"jsonrpc": "2.0", "id": id, "result": result})),
                    )
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn write_prompt(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "prompt: {text}").unwrap();
        file.flush().unwrap();
        file
    }

    fn registry(prompt_file: &str, servers: Vec<ToolServerRef>) -> Arc<UseCaseRegistry> {
        let mut cases = HashMap::new();
        cases.insert(
            "hospitality".to_string(),
            UseCaseConfig {
                name: "Hospitality Assistant".to_string(),
                greeting: "Welcome to the Grand Hotel!".to_string(),
                prompt_file: prompt_file.to_string(),
                tool_servers: servers,
            },
        );
        Arc::new(UseCaseRegistry::new(cases))
    }

    fn orchestrator(
        use_case: &str,
        registry: Arc<UseCaseRegistry>,
        engine: Arc<RecordingEngine>,
    ) -> Orchestrator {
        Orchestrator::new(
            use_case,
            registry,
            ToolServerConnector::with_timeouts(Duration::from_secs(2), Duration::from_secs(2)),
            engine,
            "agent-",
        )
    }

    #[tokio::test]
    async fn test_unknown_use_case_leaves_no_session() {
        let prompt = write_prompt("You are a concierge.");
        let engine = Arc::new(RecordingEngine::default());
        let orch = orchestrator(
            "retail",
            registry(prompt.path().to_str().unwrap(), vec![]),
            engine.clone(),
        );

        let err = orch.start_session("room-42", "user-1").await.unwrap_err();
        assert!(matches!(err, SessionError::Config(_)));
        assert_eq!(orch.session_count().await, 0);
        assert!(engine.started.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_prompt_fails_join() {
        let engine = Arc::new(RecordingEngine::default());
        let orch = orchestrator(
            "hospitality",
            registry("/nonexistent/prompt.yml", vec![]),
            engine.clone(),
        );

        let err = orch.start_session("room-42", "user-1").await.unwrap_err();
        assert!(matches!(err, SessionError::Prompt(_)));
        assert_eq!(orch.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_zero_tool_servers_goes_active_immediately() {
        let prompt = write_prompt("You are a concierge.");
        let engine = Arc::new(RecordingEngine::default());
        let orch = orchestrator(
            "hospitality",
            registry(prompt.path().to_str().unwrap(), vec![]),
            engine.clone(),
        );

        orch.start_session("room-42", "user-1").await.unwrap();

        let info = orch.session("room-42").await.unwrap();
        assert_eq!(info.state, SessionState::Active);
        assert_eq!(info.tool_count, 0);
        assert_eq!(info.participants, 1);

        let started = engine.started.lock().await;
        assert_eq!(started.len(), 1);
        assert!(started[0].tools.is_empty());
    }

    #[tokio::test]
    async fn test_greeting_emitted_once_with_tools() {
        let prompt = write_prompt("You are a concierge.");
        let url = stub_tool_server(vec!["save_booking_record"], Duration::ZERO).await;
        let engine = Arc::new(RecordingEngine::default());
        let orch = orchestrator(
            "hospitality",
            registry(
                prompt.path().to_str().unwrap(),
                vec![ToolServerRef {
                    name: "booking_server".to_string(),
                    url,
                }],
            ),
            engine.clone(),
        );

        orch.start_session("room-42", "user-1").await.unwrap();

        let info = orch.session("room-42").await.unwrap();
        assert_eq!(info.state, SessionState::Active);
        assert_eq!(info.tool_count, 1);

        let said = engine.said.lock().await;
        assert_eq!(said.len(), 1);
        assert_eq!(said[0].0, "room-42");
        assert!(said[0].1.starts_with("Welcome to"));

        let started = engine.started.lock().await;
        let tools = started[0].tools.list_tools();
        assert_eq!(tools[0].name, "booking_server:save_booking_record");
    }

    #[tokio::test]
    async fn test_failed_tool_server_degrades_but_session_activates() {
        let prompt = write_prompt("You are a concierge.");
        let good = stub_tool_server(vec!["save_booking_record"], Duration::ZERO).await;
        let engine = Arc::new(RecordingEngine::default());
        let orch = orchestrator(
            "hospitality",
            registry(
                prompt.path().to_str().unwrap(),
                vec![
                    ToolServerRef {
                        name: "booking_server".to_string(),
                        url: good,
                    },
                    ToolServerRef {
                        name: "down_server".to_string(),
                        url: "http://127.0.0.1:1".to_string(),
                    },
                ],
            ),
            engine.clone(),
        );

        orch.start_session("room-42", "user-1").await.unwrap();

        let info = orch.session("room-42").await.unwrap();
        assert_eq!(info.state, SessionState::Active);
        // Only the reachable server's tools made it in.
        assert_eq!(info.tool_count, 1);
    }

    #[tokio::test]
    async fn test_all_tool_servers_down_still_activates() {
        let prompt = write_prompt("You are a concierge.");
        let engine = Arc::new(RecordingEngine::default());
        let orch = orchestrator(
            "hospitality",
            registry(
                prompt.path().to_str().unwrap(),
                vec![ToolServerRef {
                    name: "booking_server".to_string(),
                    url: "http://127.0.0.1:1".to_string(),
                }],
            ),
            engine.clone(),
        );

        orch.start_session("room-42", "user-1").await.unwrap();
        let info = orch.session("room-42").await.unwrap();
        assert_eq!(info.state, SessionState::Active);
        assert_eq!(info.tool_count, 0);
        assert_eq!(engine.said.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_join_attaches_to_existing_session() {
        let prompt = write_prompt("You are a concierge.");
        let engine = Arc::new(RecordingEngine::default());
        let orch = Arc::new(orchestrator(
            "hospitality",
            registry(prompt.path().to_str().unwrap(), vec![]),
            engine.clone(),
        ));

        let (a, b) = tokio::join!(
            orch.start_session("room-42", "user-1"),
            orch.start_session("room-42", "user-2"),
        );
        a.unwrap();
        b.unwrap();

        assert_eq!(orch.session_count().await, 1);
        let info = orch.session("room-42").await.unwrap();
        assert_eq!(info.participants, 2);
        // One engine binding, one greeting — not two.
        assert_eq!(engine.started.lock().await.len(), 1);
        assert_eq!(engine.said.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_room_empty_mid_connecting_cancels_cleanly() {
        let prompt = write_prompt("You are a concierge.");
        let slow = stub_tool_server(vec!["t"], Duration::from_secs(30)).await;
        let engine = Arc::new(RecordingEngine::default());
        let orch = Arc::new(Orchestrator::new(
            "hospitality",
            registry(
                prompt.path().to_str().unwrap(),
                vec![ToolServerRef {
                    name: "slow_server".to_string(),
                    url: slow,
                }],
            ),
            // Long connect timeout: only cancellation can unblock this.
            ToolServerConnector::with_timeouts(Duration::from_secs(30), Duration::from_secs(60)),
            engine.clone(),
            "agent-",
        ));

        let starter = orch.clone();
        let join =
            tokio::spawn(async move { starter.start_session("room-42", "user-1").await });

        tokio::time::sleep(Duration::from_millis(100)).await;
        let start = std::time::Instant::now();
        orch.handle_event(RoomEvent::RoomEmpty {
            room: "room-42".to_string(),
        })
        .await;

        join.await.unwrap().unwrap();
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(orch.session_count().await, 0);
        // Never activated: no binding, no greeting; engine told to release.
        assert!(engine.started.lock().await.is_empty());
        assert!(engine.said.lock().await.is_empty());
        assert_eq!(engine.closed.lock().await.as_slice(), ["room-42"]);
    }

    #[tokio::test]
    async fn test_participant_left_ends_session_when_room_empties() {
        let prompt = write_prompt("You are a concierge.");
        let engine = Arc::new(RecordingEngine::default());
        let orch = orchestrator(
            "hospitality",
            registry(prompt.path().to_str().unwrap(), vec![]),
            engine.clone(),
        );

        orch.start_session("room-42", "user-1").await.unwrap();
        orch.start_session("room-42", "user-2").await.unwrap();

        orch.handle_event(RoomEvent::ParticipantLeft {
            room: "room-42".to_string(),
            identity: "user-1".to_string(),
        })
        .await;
        // One participant remains; the session stays up.
        assert_eq!(orch.session_count().await, 1);

        orch.handle_event(RoomEvent::ParticipantLeft {
            room: "room-42".to_string(),
            identity: "user-2".to_string(),
        })
        .await;
        assert_eq!(orch.session_count().await, 0);
        assert_eq!(engine.closed.lock().await.as_slice(), ["room-42"]);
    }

    #[tokio::test]
    async fn test_agent_identity_does_not_count() {
        let prompt = write_prompt("You are a concierge.");
        let engine = Arc::new(RecordingEngine::default());
        let orch = orchestrator(
            "hospitality",
            registry(prompt.path().to_str().unwrap(), vec![]),
            engine.clone(),
        );

        // The agent joining a room must not create a session.
        orch.handle_event(RoomEvent::ParticipantJoined {
            room: "room-42".to_string(),
            identity: "agent-concierge".to_string(),
        })
        .await;
        assert_eq!(orch.session_count().await, 0);

        orch.start_session("room-42", "user-1").await.unwrap();
        orch.handle_event(RoomEvent::ParticipantLeft {
            room: "room-42".to_string(),
            identity: "agent-concierge".to_string(),
        })
        .await;
        // The agent leaving must not tear the session down.
        assert_eq!(orch.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_room_hosts_fresh_session_after_close() {
        let prompt = write_prompt("You are a concierge.");
        let engine = Arc::new(RecordingEngine::default());
        let orch = orchestrator(
            "hospitality",
            registry(prompt.path().to_str().unwrap(), vec![]),
            engine.clone(),
        );

        orch.start_session("room-42", "user-1").await.unwrap();
        orch.end_session("room-42").await;
        orch.start_session("room-42", "user-2").await.unwrap();

        let info = orch.session("room-42").await.unwrap();
        assert_eq!(info.state, SessionState::Active);
        assert_eq!(engine.started.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_prompt_edit_applies_to_next_session() {
        let mut prompt = NamedTempFile::new().unwrap();
        writeln!(prompt, "prompt: first instructions").unwrap();
        prompt.flush().unwrap();

        let engine = Arc::new(RecordingEngine::default());
        let orch = orchestrator(
            "hospitality",
            registry(prompt.path().to_str().unwrap(), vec![]),
            engine.clone(),
        );

        orch.start_session("room-42", "user-1").await.unwrap();
        orch.end_session("room-42").await;

        use std::io::Seek;
        prompt.as_file_mut().set_len(0).unwrap();
        prompt.as_file_mut().rewind().unwrap();
        writeln!(prompt, "prompt: second instructions").unwrap();
        prompt.flush().unwrap();

        orch.start_session("room-42", "user-2").await.unwrap();

        let started = engine.started.lock().await;
        assert_eq!(started[0].instructions, "first instructions");
        assert_eq!(started[1].instructions, "second instructions");
    }

    #[tokio::test]
    async fn test_engine_start_failure_reported_and_cleaned_up() {
        let prompt = write_prompt("You are a concierge.");
        let engine = Arc::new(RecordingEngine::failing());
        let orch = orchestrator(
            "hospitality",
            registry(prompt.path().to_str().unwrap(), vec![]),
            engine.clone(),
        );

        let err = orch.start_session("room-42", "user-1").await.unwrap_err();
        assert!(matches!(err, SessionError::EngineStart { .. }));
        assert_eq!(orch.session_count().await, 0);
        assert!(engine.said.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_end_session_without_session_is_noop() {
        let prompt = write_prompt("You are a concierge.");
        let engine = Arc::new(RecordingEngine::default());
        let orch = orchestrator(
            "hospitality",
            registry(prompt.path().to_str().unwrap(), vec![]),
            engine.clone(),
        );
        orch.end_session("room-never-seen").await;
        assert_eq!(orch.session_count().await, 0);
    }
}
