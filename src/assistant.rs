//! Stubbed AI system.
//!
//! There is no model behind these calls: [`CannedResponder`] returns fixed
//! results so the HTTP contract can be exercised end to end. A real backend
//! would implement [`Responder`] and be handed to [`AgentSystem::new`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::persist::{write_json_atomic, write_json_atomic_async};

pub const VERSION: &str = "1.0.0";
pub const MODEL_NAME: &str = "AgenticAI-v1";
const DEFAULT_PRIORITY: &str = "normal";

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("AI config file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("AI config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type AssistantResult<T> = Result<T, AssistantError>;

/// Tunables for the AI system, persisted as `ai_config.json`.
///
/// Keys the service does not know about are kept in `extra` so that a
/// client's overrides survive a round trip through the file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    pub search_enabled: bool,
    pub ai_models: Vec<String>,
    pub confidence_threshold: f64,
    pub max_results: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            search_enabled: true,
            ai_models: vec!["gpt-4".to_string(), "claude-3".to_string()],
            confidence_threshold: 0.8,
            max_results: 10,
            extra: Map::new(),
        }
    }
}

impl AiConfig {
    /// Reads the config at `path`, writing the defaults there if it is missing.
    pub fn load_or_init(path: &Path) -> AssistantResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                write_json_atomic(path, &config)?;
                info!(path = %path.display(), "Wrote default AI config");
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns a copy of this config with the top-level keys of `overrides`
    /// replaced.
    pub fn merged(&self, overrides: Value) -> AssistantResult<Self> {
        let Value::Object(overrides) = overrides else {
            return Err(AssistantError::InvalidInput(
                "Configuration must be a JSON object".to_string(),
            ));
        };
        let mut base = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        base.extend(overrides);

        serde_json::from_value(Value::Object(base))
            .map_err(|e| AssistantError::InvalidInput(format!("Invalid configuration: {}", e)))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchResults {
    pub confidence: f64,
    pub sources: Vec<String>,
    pub summary: String,
    pub details: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SystemInfo {
    pub version: String,
    pub model: String,
    pub processing_time: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SearchResponse {
    pub query: String,
    pub context: Option<Value>,
    pub timestamp: DateTime<Utc>,
    pub status: String,
    pub results: SearchResults,
    pub system_info: SystemInfo,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeliveryInfo {
    pub estimated_delivery: String,
    pub channel: String,
    pub encryption: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageReceipt {
    pub message_id: String,
    pub recipient: String,
    pub message: String,
    pub priority: String,
    pub timestamp: DateTime<Utc>,
    pub status: String,
    pub delivery_info: DeliveryInfo,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AiSystemStatus {
    pub initialized: bool,
    pub version: String,
    pub config: AiConfig,
}

/// Produces answers for search and message requests.
pub trait Responder: Send + Sync {
    fn search(&self, query: &str, context: Option<Value>) -> SearchResponse;
    fn send_message(&self, recipient: &str, message: &str, priority: &str) -> MessageReceipt;
}

/// First 8 hex characters of SHA-256 over recipient, message and send time.
pub fn message_id(recipient: &str, message: &str, sent_at: DateTime<Utc>) -> String {
    let digest = Sha256::digest(format!("{}{}{}", recipient, message, sent_at).as_bytes());
    hex::encode(&digest[..4])
}

/// Deterministic stand-in for a model backend.
#[derive(Debug, Clone)]
pub struct CannedResponder {
    version: String,
}

impl CannedResponder {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }
}

impl Default for CannedResponder {
    fn default() -> Self {
        Self::new(VERSION)
    }
}

impl Responder for CannedResponder {
    fn search(&self, query: &str, context: Option<Value>) -> SearchResponse {
        SearchResponse {
            query: query.to_string(),
            context,
            timestamp: Utc::now(),
            status: "processed".to_string(),
            results: SearchResults {
                confidence: 0.95,
                sources: vec!["AI Knowledge Base".to_string(), "Real-time Data".to_string()],
                summary: format!("Processed query: {}", query),
                details: "AI system successfully processed the request with high confidence."
                    .to_string(),
                recommendations: vec![
                    "Consider refining query".to_string(),
                    "Check related topics".to_string(),
                ],
            },
            system_info: SystemInfo {
                version: self.version.clone(),
                model: MODEL_NAME.to_string(),
                processing_time: "0.234s".to_string(),
            },
        }
    }

    fn send_message(&self, recipient: &str, message: &str, priority: &str) -> MessageReceipt {
        let timestamp = Utc::now();
        MessageReceipt {
            message_id: message_id(recipient, message, timestamp),
            recipient: recipient.to_string(),
            message: message.to_string(),
            priority: priority.to_string(),
            timestamp,
            status: "sent".to_string(),
            delivery_info: DeliveryInfo {
                estimated_delivery: "immediate".to_string(),
                channel: "ai_direct".to_string(),
                encryption: "enabled".to_string(),
            },
        }
    }
}

/// The AI service object shared by the HTTP handlers.
pub struct AgentSystem {
    version: String,
    initialized: bool,
    config: RwLock<AiConfig>,
    config_path: PathBuf,
    responder: Box<dyn Responder>,
}

impl AgentSystem {
    /// Creates the system around an already loaded config.
    ///
    /// # Arguments
    /// * `config` - The current configuration
    /// * `config_path` - Where configuration updates are persisted
    /// * `responder` - Backend producing search and message results
    pub fn new(config: AiConfig, config_path: PathBuf, responder: Box<dyn Responder>) -> Self {
        Self {
            version: VERSION.to_string(),
            initialized: true,
            config: RwLock::new(config),
            config_path,
            responder,
        }
    }

    /// Loads (or initializes) the config file and wires in the canned responder.
    pub fn initialize(config_path: impl Into<PathBuf>) -> AssistantResult<Self> {
        let config_path = config_path.into();
        let config = AiConfig::load_or_init(&config_path)?;
        info!(version = VERSION, path = %config_path.display(), "AI system initialized");
        Ok(Self::new(
            config,
            config_path,
            Box::new(CannedResponder::default()),
        ))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub async fn config(&self) -> AiConfig {
        self.config.read().await.clone()
    }

    pub async fn status(&self) -> AiSystemStatus {
        AiSystemStatus {
            initialized: self.initialized,
            version: self.version.clone(),
            config: self.config().await,
        }
    }

    pub fn search(&self, query: &str, context: Option<Value>) -> AssistantResult<SearchResponse> {
        if query.trim().is_empty() {
            return Err(AssistantError::InvalidInput("Query is required".to_string()));
        }
        debug!(query, "Processing search");
        Ok(self.responder.search(query, context))
    }

    pub fn send_message(
        &self,
        recipient: &str,
        message: &str,
        priority: Option<&str>,
    ) -> AssistantResult<MessageReceipt> {
        if recipient.trim().is_empty() || message.trim().is_empty() {
            return Err(AssistantError::InvalidInput(
                "Recipient and message are required".to_string(),
            ));
        }
        let priority = priority
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PRIORITY);

        let receipt = self.responder.send_message(recipient, message, priority);
        debug!(message_id = %receipt.message_id, recipient, priority, "Message sent");
        Ok(receipt)
    }

    /// Applies `overrides` to the config and persists the result.
    ///
    /// The in-memory config only changes once the file has been written.
    pub async fn update_config(&self, overrides: Value) -> AssistantResult<AiConfig> {
        let mut config = self.config.write().await;
        let updated = config.merged(overrides)?;
        write_json_atomic_async(&self.config_path, &updated).await?;
        *config = updated.clone();
        info!(path = %self.config_path.display(), "AI config updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn system_in(dir: &tempfile::TempDir) -> AgentSystem {
        AgentSystem::initialize(dir.path().join("ai_config.json")).unwrap()
    }

    #[test]
    fn missing_config_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai_config.json");

        let config = AiConfig::load_or_init(&path).unwrap();

        assert_eq!(config, AiConfig::default());
        let on_disk: AiConfig =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, config);
    }

    #[test]
    fn partial_config_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ai_config.json");
        std::fs::write(&path, r#"{"max_results": 3, "theme": "dark"}"#).unwrap();

        let config = AiConfig::load_or_init(&path).unwrap();

        assert_eq!(config.max_results, 3);
        assert!(config.search_enabled);
        assert_eq!(config.extra.get("theme"), Some(&json!("dark")));
    }

    #[test]
    fn merge_rejects_non_object_and_bad_types() {
        let config = AiConfig::default();
        assert!(matches!(config.merged(json!([1, 2])), Err(AssistantError::InvalidInput(_))));
        assert!(matches!(
            config.merged(json!({"max_results": "lots"})),
            Err(AssistantError::InvalidInput(_))
        ));
    }

    #[test]
    fn message_id_is_eight_hex_chars() {
        let id = message_id("bob", "hello", Utc::now());
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn search_returns_canned_result() {
        let dir = tempfile::tempdir().unwrap();
        let system = system_in(&dir);

        let response = system
            .search("rust jobs", Some(json!({"region": "eu"})))
            .unwrap();

        assert_eq!(response.status, "processed");
        assert_eq!(response.results.summary, "Processed query: rust jobs");
        assert_eq!(response.results.confidence, 0.95);
        assert_eq!(response.system_info.model, MODEL_NAME);
        assert_eq!(response.system_info.version, VERSION);
        assert_eq!(response.context, Some(json!({"region": "eu"})));
    }

    #[test]
    fn search_requires_query() {
        let dir = tempfile::tempdir().unwrap();
        let system = system_in(&dir);
        assert!(matches!(system.search("  ", None), Err(AssistantError::InvalidInput(_))));
    }

    #[test]
    fn send_message_defaults_priority() {
        let dir = tempfile::tempdir().unwrap();
        let system = system_in(&dir);

        let receipt = system.send_message("ops@example.com", "deploy done", None).unwrap();
        assert_eq!(receipt.priority, "normal");
        assert_eq!(receipt.status, "sent");
        assert_eq!(receipt.delivery_info.channel, "ai_direct");

        let receipt = system
            .send_message("ops@example.com", "deploy done", Some("high"))
            .unwrap();
        assert_eq!(receipt.priority, "high");
    }

    #[test]
    fn send_message_requires_recipient_and_message() {
        let dir = tempfile::tempdir().unwrap();
        let system = system_in(&dir);
        assert!(system.send_message("", "hi", None).is_err());
        assert!(system.send_message("bob", "", None).is_err());
    }

    #[tokio::test]
    async fn update_config_persists_and_keeps_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let system = system_in(&dir);

        let updated = system
            .update_config(json!({"max_results": 25, "beta": true}))
            .await
            .unwrap();
        assert_eq!(updated.max_results, 25);
        assert_eq!(updated.extra.get("beta"), Some(&json!(true)));

        let reloaded = system_in(&dir);
        assert_eq!(reloaded.config().await, updated);
    }

    #[tokio::test]
    async fn rejected_update_leaves_config_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let system = system_in(&dir);

        assert!(system
            .update_config(json!({"confidence_threshold": "high"}))
            .await
            .is_err());
        assert_eq!(system.config().await, AiConfig::default());
    }
}
