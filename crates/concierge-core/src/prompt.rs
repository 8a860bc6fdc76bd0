//! Prompt loader — resolves a persona's prompt file to instruction text
//!
//! Prompt files are YAML: either a mapping with a `prompt` key or a bare
//! string document. The loader re-reads the file on every call so an edited
//! prompt takes effect for the next session without a restart.

use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::PromptError;

pub struct PromptLoader;

impl PromptLoader {
    /// Load instruction text from a prompt file.
    ///
    /// The path is tried as given, then relative to the working directory,
    /// then under `config/`, matching how deployments lay out their prompt
    /// directories.
    pub fn load(prompt_file: &str) -> Result<String, PromptError> {
        let path = Self::locate(prompt_file)
            .ok_or_else(|| PromptError::NotFound(prompt_file.to_string()))?;

        info!("Loading prompt from {}", path.display());
        let raw = std::fs::read_to_string(&path).map_err(|source| PromptError::Io {
            path: path.clone(),
            source,
        })?;

        let value: serde_yml::Value =
            serde_yml::from_str(&raw).map_err(|source| PromptError::Parse {
                path: path.clone(),
                source,
            })?;

        let prompt = match value {
            serde_yml::Value::String(text) => text,
            serde_yml::Value::Mapping(ref map) => map
                .get("prompt")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            _ => String::new(),
        };

        if prompt.trim().is_empty() {
            return Err(PromptError::MissingPrompt(path));
        }

        Ok(prompt)
    }

    fn locate(prompt_file: &str) -> Option<PathBuf> {
        let candidates = [
            PathBuf::from(prompt_file),
            Path::new(".").join(prompt_file),
            Path::new("config").join(prompt_file),
        ];
        candidates.into_iter().find(|p| p.is_file())
    }
}
