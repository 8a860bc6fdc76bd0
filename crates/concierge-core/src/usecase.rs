//! Use-case registry — maps a use-case identifier to its persona configuration
//!
//! A use case bundles everything that makes one persona (hospitality,
//! medical, education, HR, ...): display name, greeting, prompt file, and
//! the tool servers the persona may call. The registry is built once at
//! startup from settings and is read-only afterwards, so sessions on any
//! number of rooms can resolve concurrently without locking.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use url::Url;

use crate::error::ConfigError;

/// Reference to one external tool server the persona may call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolServerRef {
    pub name: String,
    pub url: String,
}

impl ToolServerRef {
    /// Parse and validate the configured URL.
    pub fn parsed_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.url).map_err(|_| ConfigError::InvalidToolServerUrl {
            name: self.name.clone(),
            url: self.url.clone(),
        })
    }
}

fn default_greeting() -> String {
    "Hello! How may I help you today?".to_string()
}

/// Static configuration for one use case. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UseCaseConfig {
    pub name: String,
    #[serde(default = "default_greeting")]
    pub greeting: String,
    pub prompt_file: String,
    #[serde(default, alias = "mcp_servers")]
    pub tool_servers: Vec<ToolServerRef>,
}

/// Process-wide mapping from use-case identifier to configuration.
pub struct UseCaseRegistry {
    cases: HashMap<String, UseCaseConfig>,
}

impl UseCaseRegistry {
    pub fn new(cases: HashMap<String, UseCaseConfig>) -> Self {
        debug!("Use-case registry initialized with {} entries", cases.len());
        Self { cases }
    }

    /// Look up a use case by identifier.
    ///
    /// An unknown identifier is a reported error, never a fallback to some
    /// default persona.
    pub fn resolve(&self, use_case_id: &str) -> Result<&UseCaseConfig, ConfigError> {
        self.cases
            .get(use_case_id)
            .ok_or_else(|| ConfigError::UnknownUseCase(use_case_id.to_string()))
    }

    /// Validate every configured tool-server URL up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for config in self.cases.values() {
            for server in &config.tool_servers {
                let _ = server.parsed_url()?;
            }
        }
        Ok(())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.cases.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hospitality() -> UseCaseConfig {
        UseCaseConfig {
            name: "Hospitality Assistant".to_string(),
            greeting: "Welcome to the Grand Hotel!".to_string(),
            prompt_file: "prompts/hospitality.yml".to_string(),
            tool_servers: vec![ToolServerRef {
                name: "booking_server".to_string(),
                url: "http://localhost:8001/mcp".to_string(),
            }],
        }
    }

    fn registry() -> UseCaseRegistry {
        let mut cases = HashMap::new();
        cases.insert("hospitality".to_string(), hospitality());
        UseCaseRegistry::new(cases)
    }

    #[test]
    fn test_resolve_known() {
        let registry = registry();
        let config = registry.resolve("hospitality").unwrap();
        assert_eq!(config.name, "Hospitality Assistant");
        assert_eq!(config.tool_servers.len(), 1);
    }

    #[test]
    fn test_resolve_unknown_is_error() {
        let registry = registry();
        let err = registry.resolve("retail").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownUseCase(ref id) if id == "retail"));
    }

    #[test]
    fn test_deserialize_with_mcp_servers_alias() {
        let yaml = r#"
name: Medical Assistant
greeting: "Hello, how can I help with your appointment?"
prompt_file: prompts/medical.yml
mcp_servers:
  - name: appointment_server
    url: http://localhost:8002/mcp
"#;
        let config: UseCaseConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.tool_servers.len(), 1);
        assert_eq!(config.tool_servers[0].name, "appointment_server");
    }

    #[test]
    fn test_default_greeting_when_absent() {
        let yaml = "name: HR Assistant\nprompt_file: prompts/hr.yml\n";
        let config: UseCaseConfig = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.greeting, "Hello! How may I help you today?");
        assert!(config.tool_servers.is_empty());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut cases = HashMap::new();
        let mut config = hospitality();
        config.tool_servers[0].url = "not a url".to_string();
        cases.insert("hospitality".to_string(), config);
        let registry = UseCaseRegistry::new(cases);
        assert!(matches!(
            registry.validate(),
            Err(ConfigError::InvalidToolServerUrl { .. })
        ));
    }

    #[test]
    fn test_parsed_url() {
        let server = ToolServerRef {
            name: "booking_server".to_string(),
            url: "http://localhost:8001/mcp".to_string(),
        };
        let url = server.parsed_url().unwrap();
        assert_eq!(url.port(), Some(8001));
    }
}
