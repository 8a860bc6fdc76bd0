//! MCP HTTP client — connects to an external tool server and discovers tools

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use concierge_core::tools::ToolHandler;

use crate::protocol::{JsonRpcRequest, JsonRpcResponse, McpTool, PROTOCOL_VERSION};

/// Client for one MCP tool server reachable over HTTP.
///
/// The transport is stateless request/response; "connection" means the
/// initialize handshake succeeded and the server is answering.
pub struct McpHttpClient {
    name: String,
    endpoint: String,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl McpHttpClient {
    /// Perform the MCP initialize handshake against `url`.
    pub async fn connect(name: &str, url: &str, request_timeout: Duration) -> Result<Arc<Self>> {
        info!("Connecting to tool server: {} ({})", name, url);

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("failed to build HTTP client")?;

        let client = Arc::new(Self {
            name: name.to_string(),
            endpoint: url.trim_end_matches('/').to_string(),
            http,
            next_id: AtomicU64::new(1),
        });

        client.initialize().await?;
        Ok(client)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn initialize(&self) -> Result<()> {
        let result = self
            .send_request(
                "initialize",
                serde_json::json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": {},
                    "clientInfo": {
                        "name": "concierge",
                        "version": env!("CARGO_PKG_VERSION")
                    }
                }),
            )
            .await?;

        debug!("Tool server {} initialize response: {:?}", self.name, result);

        self.send_notification("notifications/initialized", serde_json::json!({}))
            .await?;

        info!("Tool server {} initialized", self.name);
        Ok(())
    }

    /// Ask the server what tools it exposes and wrap each as a handler.
    /// Tool names are prefixed with the server name so two servers with
    /// overlapping tool names stay distinguishable in one session.
    pub async fn discover_tools(self: &Arc<Self>) -> Result<Vec<Arc<dyn ToolHandler>>> {
        let result = self
            .send_request("tools/list", serde_json::json!({}))
            .await?;

        let tools: Vec<McpTool> = serde_json::from_value(
            result
                .get("tools")
                .cloned()
                .unwrap_or(serde_json::json!([])),
        )
        .unwrap_or_default();

        info!(
            "Discovered {} tools from tool server {}",
            tools.len(),
            self.name
        );

        let handlers: Vec<Arc<dyn ToolHandler>> = tools
            .into_iter()
            .map(|tool| {
                let prefixed_name = format!("{}:{}", self.name, tool.name);
                Arc::new(RemoteTool {
                    name: prefixed_name,
                    remote_name: tool.name,
                    description: tool.description,
                    schema: tool.input_schema,
                    client: self.clone(),
                }) as Arc<dyn ToolHandler>
            })
            .collect();

        Ok(handlers)
    }

    /// Call a tool on the server and flatten the content array to text.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<String> {
        let result = self
            .send_request(
                "tools/call",
                serde_json::json!({
                    "name": name,
                    "arguments": arguments,
                }),
            )
            .await?;

        if let Some(content) = result.get("content").and_then(|c| c.as_array()) {
            let texts: Vec<&str> = content
                .iter()
                .filter_map(|c| c.get("text").and_then(|t| t.as_str()))
                .collect();
            Ok(texts.join("\n"))
        } else {
            Ok(serde_json::to_string_pretty(&result)?)
        }
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("failed to reach tool server '{}'", self.name))?;

        if !resp.status().is_success() {
            return Err(anyhow!(
                "tool server '{}' returned HTTP {} for {}",
                self.name,
                resp.status(),
                method
            ));
        }

        let response: JsonRpcResponse = resp
            .json()
            .await
            .with_context(|| format!("invalid JSON-RPC response from tool server '{}'", self.name))?;

        if let Some(error) = response.error {
            return Err(anyhow!(
                "tool server '{}' error {}: {}",
                self.name,
                error.code,
                error.message
            ));
        }

        Ok(response.result.unwrap_or(Value::Null))
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<()> {
        let request = JsonRpcRequest::notification(method, params);

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("failed to reach tool server '{}'", self.name))?;

        // Notifications expect no body; any non-error status is fine.
        if !resp.status().is_success() {
            return Err(anyhow!(
                "tool server '{}' returned HTTP {} for notification {}",
                self.name,
                resp.status(),
                method
            ));
        }

        Ok(())
    }
}

/// A tool handler backed by a remote MCP tool.
pub struct RemoteTool {
    name: String,
    remote_name: String,
    description: String,
    schema: Value,
    client: Arc<McpHttpClient>,
}

#[async_trait]
impl ToolHandler for RemoteTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(&self, input: Value) -> Result<String> {
        debug!(
            "Executing remote tool {} (remote: {})",
            self.name, self.remote_name
        );
        self.client.call_tool(&self.remote_name, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::testing::{StubServer, stub_tool};

    #[tokio::test]
    async fn test_connect_refused() {
        // Port 1 is never listening.
        let result =
            McpHttpClient::connect("bad", "http://127.0.0.1:1", Duration::from_secs(2)).await;
        assert!(result.is_err());
        let err = result.err().unwrap().to_string();
        assert!(err.contains("bad"));
    }

    #[tokio::test]
    async fn test_connect_and_discover() {
        let server = StubServer::start(vec![
            stub_tool("save_booking_record", "Book a room"),
            stub_tool("get_room_availability", "Check availability"),
        ])
        .await;

        let client = McpHttpClient::connect("booking_server", &server.url, Duration::from_secs(5))
            .await
            .unwrap();
        let tools = client.discover_tools().await.unwrap();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name(), "booking_server:save_booking_record");
    }

    #[tokio::test]
    async fn test_call_tool_roundtrip() {
        let server = StubServer::start(vec![stub_tool("echo", "Echo input")]).await;

        let client = McpHttpClient::connect("stub", &server.url, Duration::from_secs(5))
            .await
            .unwrap();
        let tools = client.discover_tools().await.unwrap();
        let result = tools[0]
            .execute(serde_json::json!({"message": "hello"}))
            .await
            .unwrap();
        assert!(result.contains("echo"));
    }
}
