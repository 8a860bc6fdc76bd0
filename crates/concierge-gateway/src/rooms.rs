//! Room management via the LiveKit server API

use livekit_api::services::room::{CreateRoomOptions, RoomClient};
use thiserror::Error;
use tracing::info;

use concierge_core::settings::LiveKitSettings;

use crate::protocol::RoomInfo;

#[derive(Error, Debug)]
#[error("room service error: {0}")]
pub struct RoomServiceError(pub String);

/// Thin wrapper over the LiveKit room service.
pub struct RoomManager {
    client: RoomClient,
}

impl RoomManager {
    pub fn new(settings: &LiveKitSettings) -> Self {
        let client =
            RoomClient::with_api_key(&settings.url, &settings.api_key, &settings.api_secret);
        Self { client }
    }

    pub async fn create_room(
        &self,
        name: &str,
        empty_timeout: u32,
        max_participants: Option<u32>,
    ) -> Result<RoomInfo, RoomServiceError> {
        let options = CreateRoomOptions {
            empty_timeout,
            max_participants: max_participants.unwrap_or_default(),
            ..Default::default()
        };

        let room = self
            .client
            .create_room(name, options)
            .await
            .map_err(|e| RoomServiceError(e.to_string()))?;

        info!("Created room {}", room.name);
        Ok(room_info(&room))
    }

    pub async fn list_rooms(&self) -> Result<Vec<RoomInfo>, RoomServiceError> {
        let rooms = self
            .client
            .list_rooms(Vec::new())
            .await
            .map_err(|e| RoomServiceError(e.to_string()))?;

        Ok(rooms.iter().map(room_info).collect())
    }
}

fn room_info(room: &livekit_protocol::Room) -> RoomInfo {
    RoomInfo {
        name: room.name.clone(),
        num_participants: room.num_participants,
        creation_time: Some(room.creation_time.to_string()),
        empty_timeout: Some(room.empty_timeout),
        max_participants: Some(room.max_participants),
    }
}
