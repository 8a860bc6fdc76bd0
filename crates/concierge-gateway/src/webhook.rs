//! LiveKit webhook receiver — room membership events for the worker
//!
//! The media layer posts lifecycle events here; we translate the ones the
//! orchestrator cares about and drop the rest. Delivery is acknowledged
//! unconditionally so LiveKit does not retry events we chose to ignore.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use concierge_agent::events::RoomEvent;
use concierge_agent::orchestrator::Orchestrator;

pub fn webhook_router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/livekit/webhook", post(receive))
        .with_state(orchestrator)
}

async fn receive(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(payload): Json<Value>,
) -> StatusCode {
    match parse_event(&payload) {
        Some(event) => {
            info!("Webhook event: {:?}", event);
            orchestrator.handle_event(event).await;
        }
        None => {
            debug!(
                "Ignoring webhook event: {}",
                payload.get("event").and_then(|e| e.as_str()).unwrap_or("?")
            );
        }
    }
    StatusCode::OK
}

/// Translate a LiveKit webhook payload into a room event, if it is one we
/// act on.
pub fn parse_event(payload: &Value) -> Option<RoomEvent> {
    let kind = payload.get("event")?.as_str()?;
    let room = payload.pointer("/room/name")?.as_str()?.to_string();

    match kind {
        "participant_joined" => {
            let identity = payload.pointer("/participant/identity")?.as_str()?.to_string();
            Some(RoomEvent::ParticipantJoined { room, identity })
        }
        "participant_left" => {
            let identity = payload.pointer("/participant/identity")?.as_str()?.to_string();
            Some(RoomEvent::ParticipantLeft { room, identity })
        }
        "room_finished" => Some(RoomEvent::RoomEmpty { room }),
        _ => None,
    }
}
