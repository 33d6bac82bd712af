use axum::{
    extract::{rejection::JsonRejection, State},
    response::Html,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::assistant::{AgentSystem, AiConfig, AiSystemStatus, MessageReceipt, SearchResponse};
use crate::error::{AppError, AppResult};
use crate::waitlist::{JoinOutcome, WaitlistStats, WaitlistStore};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinWaitlistRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JoinStatus {
    Success,
    AlreadyExists,
}

serde_plain::derive_display_from_serialize!(JoinStatus);

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinWaitlistResponse {
    pub status: JoinStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl From<JoinOutcome> for JoinWaitlistResponse {
    fn from(outcome: JoinOutcome) -> Self {
        match outcome {
            JoinOutcome::Joined { position } => Self {
                status: JoinStatus::Success,
                message: "Successfully added to waitlist".to_string(),
                position: Some(position),
            },
            JoinOutcome::AlreadyExists { .. } => Self {
                status: JoinStatus::AlreadyExists,
                message: "Email already on waitlist".to_string(),
                position: None,
            },
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
    pub query: String,
    pub context: Option<Value>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageRequest {
    pub recipient: String,
    pub message: String,
    pub priority: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub ai_system: AiSystemStatus,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigUpdateResponse {
    pub status: String,
    pub message: String,
    pub config: AiConfig,
}

#[derive(Clone)]
pub struct AppState {
    pub waitlist: WaitlistStore,
    pub agent: Arc<AgentSystem>,
    pub index_file: Arc<PathBuf>,
}

impl AppState {
    pub fn new(waitlist: WaitlistStore, agent: AgentSystem, index_file: PathBuf) -> Self {
        Self {
            waitlist,
            agent: Arc::new(agent),
            index_file: Arc::new(index_file),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/status", get(api_status))
        .route("/api/waitlist", get(waitlist_stats).post(join_waitlist))
        .route("/api/ai/search", post(ai_search))
        .route("/api/ai/message", post(ai_message))
        .route("/api/ai/config", get(get_ai_config).post(update_ai_config))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Unwraps a JSON body, turning extractor rejections into a 400 `{error}`.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

async fn index(State(state): State<AppState>) -> AppResult<Html<String>> {
    match tokio::fs::read_to_string(state.index_file.as_path()).await {
        Ok(page) => Ok(Html(page)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(format!(
            "{} not found",
            state.index_file.display()
        ))),
        Err(e) => Err(e.into()),
    }
}

async fn api_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "active".to_string(),
        ai_system: state.agent.status().await,
        timestamp: Utc::now(),
    })
}

async fn join_waitlist(
    State(state): State<AppState>,
    payload: Result<Json<JoinWaitlistRequest>, JsonRejection>,
) -> AppResult<Json<JoinWaitlistResponse>> {
    let request = body(payload)?;
    let outcome = state.waitlist.join(&request.email).await?;
    let response = JoinWaitlistResponse::from(outcome);
    debug!(status = %response.status, position = outcome.position(), "Waitlist join handled");
    Ok(Json(response))
}

async fn waitlist_stats(State(state): State<AppState>) -> Json<WaitlistStats> {
    Json(state.waitlist.stats().await)
}

async fn ai_search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> AppResult<Json<SearchResponse>> {
    let request = body(payload)?;
    Ok(Json(state.agent.search(&request.query, request.context)?))
}

async fn ai_message(
    State(state): State<AppState>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> AppResult<Json<MessageReceipt>> {
    let request = body(payload)?;
    let receipt = state.agent.send_message(
        &request.recipient,
        &request.message,
        request.priority.as_deref(),
    )?;
    Ok(Json(receipt))
}

async fn get_ai_config(State(state): State<AppState>) -> Json<AiConfig> {
    Json(state.agent.config().await)
}

async fn update_ai_config(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<ConfigUpdateResponse>> {
    let overrides = body(payload)?;
    let config = state.agent.update_config(overrides).await?;
    Ok(Json(ConfigUpdateResponse {
        status: "success".to_string(),
        message: "Configuration updated".to_string(),
        config,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_response_omits_position_for_duplicates() {
        let response: JoinWaitlistResponse = JoinOutcome::AlreadyExists { position: 4 }.into();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "already_exists");
        assert!(value.get("position").is_none());

        let response: JoinWaitlistResponse = JoinOutcome::Joined { position: 2 }.into();
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["position"], 2);
    }

    #[test]
    fn join_status_displays_as_wire_value() {
        assert_eq!(JoinStatus::AlreadyExists.to_string(), "already_exists");
    }
}
