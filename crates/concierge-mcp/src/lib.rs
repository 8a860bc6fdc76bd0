//! MCP (Model Context Protocol) tool-server support for Concierge
//!
//! Each use case configures a set of external tool servers speaking MCP
//! over HTTP. This crate provides the JSON-RPC client, tool discovery, and
//! the connector that establishes all of a session's server connections
//! concurrently without letting one slow server hold up the rest.

pub mod client;
pub mod connector;
pub mod protocol;

pub use client::{McpHttpClient, RemoteTool};
pub use connector::{ConnectError, HandleState, ToolServerConnector, ToolServerHandle};
