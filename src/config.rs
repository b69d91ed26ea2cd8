use crate::errors::AppResult;
use crate::models::{ExampleStrategy, RemotePolicy, StorageMode};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "notebook.yaml";
pub const LOCAL_DB_FILE_NAME: &str = "notebook.sqlite";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotebookConfig {
    pub default_storage_mode: StorageMode,
    pub log_level: String,
    pub http_timeout_secs: u64,
    pub remote: RemoteConfig,
    pub auth: AuthConfig,
    pub dictionary: DictionaryConfig,
    pub link_preview: LinkPreviewConfig,
    pub chat: ChatConfig,
    pub enrichment: EnrichmentConfig,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            default_storage_mode: StorageMode::Local,
            log_level: "info".to_string(),
            http_timeout_secs: 30,
            remote: RemoteConfig::default(),
            auth: AuthConfig::default(),
            dictionary: DictionaryConfig::default(),
            link_preview: LinkPreviewConfig::default(),
            chat: ChatConfig::default(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl NotebookConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: Option<String>,
    pub policy: RemotePolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DictionaryConfig {
    pub base_url: String,
    pub language: String,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.dictionaryapi.dev".to_string(),
            language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LinkPreviewConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub example_strategy: ExampleStrategy,
}

pub fn load_config(path: &Path) -> AppResult<NotebookConfig> {
    if !path.exists() {
        return Ok(NotebookConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config = parse_config(&raw).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

fn parse_config(raw: &str) -> anyhow::Result<NotebookConfig> {
    if raw.trim().is_empty() {
        return Ok(NotebookConfig::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[test]
    fn missing_and_empty_files_use_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert_eq!(load_config(&path).expect("missing"), NotebookConfig::default());

        std::fs::write(&path, "\n").expect("write");
        assert_eq!(load_config(&path).expect("empty"), NotebookConfig::default());
    }

    #[test]
    fn partial_yaml_overrides_selected_keys() {
        let config = parse_config(
            "default_storage_mode: remote\nremote:\n  base_url: https://docs.example\n  policy: append-only\nenrichment:\n  example_strategy: first-only\n",
        )
        .expect("parse");
        assert_eq!(config.default_storage_mode, StorageMode::Remote);
        assert_eq!(config.remote.base_url.as_deref(), Some("https://docs.example"));
        assert_eq!(config.remote.policy, RemotePolicy::AppendOnly);
        assert_eq!(config.enrichment.example_strategy, ExampleStrategy::FirstOnly);
        assert_eq!(config.dictionary.language, "en");
        assert_eq!(config.chat.model, "gpt-3.5-turbo");
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "remote: [unclosed").expect("write");
        let error = load_config(&path).unwrap_err();
        assert!(matches!(error, AppError::Internal(_)));
        assert!(error.to_string().contains("parsing"));
    }
}
