//! Management API — health, status, config, tokens, rooms
//!
//! Thin handlers over the issuer and room manager; all conversation logic
//! lives with the worker, not here.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, warn};

use concierge_core::settings::AppSettings;

use crate::issuer::{CredentialIssuer, LiveKitIssuer};
use crate::protocol::{
    CreateRoomRequest, ErrorResponse, RoomListResponse, TokenRequest, TokenResponse,
};
use crate::rooms::RoomManager;

pub struct ApiState {
    pub settings: AppSettings,
    pub issuer: Option<Arc<dyn CredentialIssuer>>,
    pub rooms: Option<Arc<RoomManager>>,
    pub started_at: DateTime<Utc>,
}

impl ApiState {
    pub fn new(settings: AppSettings) -> Self {
        let issuer: Option<Arc<dyn CredentialIssuer>> = match settings.livekit.clone() {
            Some(livekit) => match LiveKitIssuer::new(livekit) {
                Ok(issuer) => Some(Arc::new(issuer)),
                Err(e) => {
                    warn!("Credential issuer disabled: {}", e);
                    None
                }
            },
            None => {
                warn!("No LiveKit settings; token and room endpoints will refuse requests");
                None
            }
        };

        let rooms = settings
            .livekit
            .as_ref()
            .map(|livekit| Arc::new(RoomManager::new(livekit)));

        Self {
            settings,
            issuer,
            rooms,
            started_at: Utc::now(),
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

pub fn api_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/config", get(config))
        .route("/api/token", post(token))
        .route("/api/room/create", post(create_room))
        .route("/api/room/list", get(list_rooms))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "concierge-api",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/health",
            "status": "/status",
            "config": "/config",
            "token": "/api/token (POST)",
            "room_create": "/api/room/create (POST)",
            "room_list": "/api/room/list (GET)",
        },
    }))
}

async fn health(State(state): State<Arc<ApiState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "concierge-api",
        "config_loaded": true,
        "use_cases": state.settings.use_cases.len(),
    }))
}

async fn status(State(state): State<Arc<ApiState>>) -> Json<Value> {
    let uptime = (Utc::now() - state.started_at).num_seconds();
    Json(json!({
        "status": "running",
        "uptime_secs": uptime,
        "active_use_case": state.settings.active_use_case(),
        "configuration": {
            "llm": state.settings.llm,
            "stt": state.settings.stt,
            "tts": state.settings.tts,
        },
    }))
}

async fn config(State(state): State<Arc<ApiState>>) -> Json<Value> {
    // LiveKitSettings skips the secret on serialization; nothing sensitive
    // leaves here.
    Json(json!({
        "use_case": state.settings.active_use_case(),
        "use_cases": state.settings.use_cases.keys().collect::<Vec<_>>(),
        "llm": state.settings.llm,
        "stt": state.settings.stt,
        "tts": state.settings.tts,
    }))
}

async fn token(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let issuer = state.issuer.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "LiveKit configuration not found. Set LIVEKIT_URL, LIVEKIT_API_KEY, and LIVEKIT_API_SECRET.",
        )
    })?;

    let grant = issuer
        .issue(
            &request.room_name,
            &request.participant_name,
            request.participant_identity.as_deref(),
        )
        .map_err(|e| {
            error!("Token issuance failed: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate token: {e}"),
            )
        })?;

    Ok(Json(TokenResponse::from(grant)))
}

async fn create_room(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<CreateRoomRequest>,
) -> Result<Json<Value>, ApiError> {
    let rooms = state.rooms.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "LiveKit configuration not found",
        )
    })?;

    let room = rooms
        .create_room(
            &request.room_name,
            request.empty_timeout,
            request.max_participants,
        )
        .await
        .map_err(|e| {
            error!("Room creation failed: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to create room: {e}"),
            )
        })?;

    let url = state
        .settings
        .livekit
        .as_ref()
        .map(|l| l.url.clone())
        .unwrap_or_default();
    Ok(Json(json!({"room": room, "url": url})))
}

async fn list_rooms(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<RoomListResponse>, ApiError> {
    let rooms = state.rooms.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "LiveKit configuration not found",
        )
    })?;

    let list = rooms.list_rooms().await.map_err(|e| {
        error!("Room listing failed: {}", e);
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to list rooms: {e}"),
        )
    })?;

    let count = list.len();
    Ok(Json(RoomListResponse { rooms: list, count }))
}
