//! Tool-server connector — concurrent, independently-failing connections
//!
//! A session's configured tool servers are connected in one fan-out: every
//! server is attempted concurrently, each attempt bounded by its own
//! timeout, and the fan-in barrier resolves once every attempt has either
//! succeeded or failed. One unreachable server never blocks the others and
//! never fails the session; it just leaves its tools unavailable.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use concierge_core::settings::McpSettings;
use concierge_core::tools::ToolHandler;
use concierge_core::usecase::ToolServerRef;

use crate::client::McpHttpClient;

/// Connection lifecycle of one tool-server handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Pending,
    Connected,
    Failed,
    Closed,
}

/// Per-server connection error. Recorded on the handle and logged at
/// session granularity; never fatal to the session.
#[derive(Error, Debug, Clone)]
pub enum ConnectError {
    #[error("tool server '{name}' did not connect within {timeout_secs}s")]
    Timeout { name: String, timeout_secs: u64 },

    #[error("tool server '{name}' connection failed: {message}")]
    Transport { name: String, message: String },

    #[error("tool server '{name}' connection cancelled")]
    Cancelled { name: String },
}

/// A connection to one external tool server, owned by exactly one session.
pub struct ToolServerHandle {
    name: String,
    url: String,
    state: HandleState,
    error: Option<ConnectError>,
    client: Option<Arc<McpHttpClient>>,
    tools: Vec<Arc<dyn ToolHandler>>,
}

impl ToolServerHandle {
    pub fn pending(server: &ToolServerRef) -> Self {
        Self {
            name: server.name.clone(),
            url: server.url.clone(),
            state: HandleState::Pending,
            error: None,
            client: None,
            tools: Vec::new(),
        }
    }

    fn mark_connected(&mut self, client: Arc<McpHttpClient>, tools: Vec<Arc<dyn ToolHandler>>) {
        info!(
            "Tool server {} connected ({} tools)",
            self.name,
            tools.len()
        );
        self.state = HandleState::Connected;
        self.client = Some(client);
        self.tools = tools;
    }

    fn mark_failed(&mut self, error: ConnectError) {
        warn!("{}", error);
        self.state = HandleState::Failed;
        self.error = Some(error);
    }

    fn mark_cancelled(&mut self) {
        debug!("Tool server {} connection cancelled", self.name);
        self.error = Some(ConnectError::Cancelled {
            name: self.name.clone(),
        });
        self.close();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == HandleState::Connected
    }

    pub fn error(&self) -> Option<&ConnectError> {
        self.error.as_ref()
    }

    /// The tools this server advertised. Empty unless connected.
    pub fn tools(&self) -> Vec<Arc<dyn ToolHandler>> {
        self.tools.clone()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    /// Release the connection. Safe to call any number of times and from
    /// any state; a handle that already failed stays `Failed`.
    pub fn close(&mut self) {
        if matches!(self.state, HandleState::Pending | HandleState::Connected) {
            debug!("Closing tool server handle {}", self.name);
            self.state = HandleState::Closed;
        }
        self.client = None;
        self.tools.clear();
    }
}

/// Establishes a session's tool-server connections.
#[derive(Clone)]
pub struct ToolServerConnector {
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl ToolServerConnector {
    pub fn new(settings: &McpSettings) -> Self {
        Self {
            connect_timeout: settings.connect_timeout(),
            request_timeout: settings.request_timeout(),
        }
    }

    pub fn with_timeouts(connect_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            request_timeout,
        }
    }

    /// Connect to a single tool server, bounded by the connect timeout.
    /// Failure is recorded on the returned handle, not raised.
    pub async fn connect(&self, server: &ToolServerRef) -> ToolServerHandle {
        let mut handle = ToolServerHandle::pending(server);

        match tokio::time::timeout(self.connect_timeout, self.try_connect(server)).await {
            Ok(Ok((client, tools))) => handle.mark_connected(client, tools),
            Ok(Err(e)) => handle.mark_failed(ConnectError::Transport {
                name: server.name.clone(),
                message: format!("{e:#}"),
            }),
            Err(_) => handle.mark_failed(ConnectError::Timeout {
                name: server.name.clone(),
                timeout_secs: self.connect_timeout.as_secs(),
            }),
        }

        handle
    }

    /// Open one client and discover its tools. Any failure propagates to
    /// `connect`, which records it on the handle.
    async fn try_connect(
        &self,
        server: &ToolServerRef,
    ) -> anyhow::Result<(Arc<McpHttpClient>, Vec<Arc<dyn ToolHandler>>)> {
        let client =
            McpHttpClient::connect(&server.name, &server.url, self.request_timeout).await?;
        let tools = client.discover_tools().await?;
        Ok((client, tools))
    }

    /// Fan out over every configured server concurrently and join once all
    /// attempts have resolved. Cancelling the token aborts in-flight
    /// attempts immediately and returns their handles closed.
    pub async fn connect_all(
        &self,
        servers: &[ToolServerRef],
        cancel: &CancellationToken,
    ) -> Vec<ToolServerHandle> {
        if servers.is_empty() {
            debug!("No tool servers configured; nothing to connect");
            return Vec::new();
        }

        let mut tasks = Vec::with_capacity(servers.len());
        for server in servers {
            let connector = self.clone();
            let server = server.clone();
            let cancel = cancel.clone();
            tasks.push(tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        let mut handle = ToolServerHandle::pending(&server);
                        handle.mark_cancelled();
                        handle
                    }
                    handle = connector.connect(&server) => handle,
                }
            }));
        }

        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            match task.await {
                Ok(handle) => handles.push(handle),
                Err(e) => warn!("Tool server connect task aborted: {}", e),
            }
        }

        let connected = handles.iter().filter(|h| h.is_connected()).count();
        info!(
            "Tool server fan-out resolved: {}/{} connected",
            connected,
            handles.len()
        );
        handles
    }
}
