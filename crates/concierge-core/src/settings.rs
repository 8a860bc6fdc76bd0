//! Application settings — YAML file plus environment overrides for secrets
//!
//! One settings file configures the whole deployment: the active use case,
//! the use-case mapping, the voice-pipeline descriptors handed to the
//! conversation engine, LiveKit credentials, and tool-server timeouts.
//! Loaded once at process start; the use-case mapping is immutable after.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::ConfigError;
use crate::usecase::{UseCaseConfig, UseCaseRegistry};

/// Selects which use case this worker serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseCaseSettings {
    pub use_case: String,
}

/// LLM descriptor, passed through to the conversation engine uninterpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_temperature() -> f32 {
    0.7
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: default_llm_model(),
            temperature: default_temperature(),
        }
    }
}

/// STT descriptor, passed through to the conversation engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SttSettings {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub language: String,
}

/// TTS descriptor, passed through to the conversation engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TtsSettings {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub voice: String,
    #[serde(default)]
    pub language: String,
}

fn default_token_ttl_secs() -> u64 {
    3600
}

/// LiveKit server coordinates and signing credentials.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct LiveKitSettings {
    pub url: String,
    pub api_key: String,
    #[serde(skip_serializing)]
    pub api_secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl fmt::Debug for LiveKitSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitSettings")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_request_timeout_secs() -> u64 {
    30
}

/// Tool-server connection policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpSettings {
    /// Per-server bound on the connect + discovery handshake. A server that
    /// does not answer within this window is marked failed and the session
    /// proceeds without its tools.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for McpSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl McpSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_identity_prefix() -> String {
    "agent-".to_string()
}

/// Worker-side agent identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    /// Participants whose identity starts with this prefix are the agent
    /// itself and do not count toward room occupancy.
    #[serde(default = "default_identity_prefix")]
    pub identity_prefix: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            identity_prefix: default_identity_prefix(),
        }
    }
}

/// Root settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub use_case_settings: UseCaseSettings,
    pub use_cases: HashMap<String, UseCaseConfig>,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub stt: SttSettings,
    #[serde(default)]
    pub tts: TtsSettings,
    #[serde(default)]
    pub livekit: Option<LiveKitSettings>,
    #[serde(default)]
    pub mcp: McpSettings,
    #[serde(default)]
    pub agent: AgentSettings,
}

impl AppSettings {
    /// Load settings from a YAML file, then apply `LIVEKIT_URL`,
    /// `LIVEKIT_API_KEY`, and `LIVEKIT_API_SECRET` environment overrides so
    /// signing credentials never have to live in the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut settings: AppSettings =
            serde_yml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.apply_env_overrides();
        info!(
            "Loaded settings from {} ({} use cases, active: {})",
            path.display(),
            settings.use_cases.len(),
            settings.use_case_settings.use_case
        );
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        let url = std::env::var("LIVEKIT_URL").ok();
        let api_key = std::env::var("LIVEKIT_API_KEY").ok();
        let api_secret = std::env::var("LIVEKIT_API_SECRET").ok();
        if url.is_none() && api_key.is_none() && api_secret.is_none() {
            return;
        }

        let livekit = self.livekit.get_or_insert_with(LiveKitSettings::default);
        if let Some(url) = url {
            livekit.url = url;
        }
        if let Some(api_key) = api_key {
            livekit.api_key = api_key;
        }
        if let Some(api_secret) = api_secret {
            livekit.api_secret = api_secret;
        }
    }

    /// Identifier of the use case this worker serves.
    pub fn active_use_case(&self) -> &str {
        &self.use_case_settings.use_case
    }

    /// Build the read-only use-case registry shared by all sessions.
    pub fn registry(&self) -> UseCaseRegistry {
        UseCaseRegistry::new(self.use_cases.clone())
    }
}
