use crate::agent::DialogueOrchestrator;
use crate::types::ChatMessage;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

type AppState = State<Arc<DialogueOrchestrator>>;

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub name: String,
    pub wallet_address: String,
}

/// 500 with a `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError(String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": self.0})),
        )
            .into_response()
    }
}

pub async fn health(State(agent): AppState) -> Json<HealthResponse> {
    let identity = agent.identity();
    Json(HealthResponse {
        status: "online",
        name: identity.name.clone(),
        wallet_address: identity
            .wallet_address
            .clone()
            .unwrap_or_else(|| "Not found".to_string()),
    })
}

pub async fn chat(
    State(agent): AppState,
    Json(req): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let response = agent
        .chat(&req.message)
        .await
        .map_err(|e| ApiError(format!("Error processing message: {}", e)))?;
    Ok(Json(MessageResponse { response }))
}

pub async fn history(State(agent): AppState) -> Json<HistoryResponse> {
    Json(HistoryResponse {
        history: agent.history().await,
    })
}

pub async fn clear_history(State(agent): AppState) -> Json<serde_json::Value> {
    agent.clear_history().await;
    Json(json!({"status": "Chat history cleared successfully"}))
}
