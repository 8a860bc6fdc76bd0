//! API request/response models

use serde::{Deserialize, Serialize};

use crate::issuer::AccessGrant;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub room_name: String,
    pub participant_name: String,
    #[serde(default)]
    pub participant_identity: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub url: String,
    pub room_name: String,
    pub participant_name: String,
    pub participant_identity: String,
}

impl From<AccessGrant> for TokenResponse {
    fn from(grant: AccessGrant) -> Self {
        Self {
            token: grant.token,
            url: grant.url,
            room_name: grant.room_name,
            participant_name: grant.participant_name,
            participant_identity: grant.participant_identity,
        }
    }
}

fn default_empty_timeout() -> u32 {
    300
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    pub room_name: String,
    #[serde(default = "default_empty_timeout")]
    pub empty_timeout: u32,
    #[serde(default)]
    pub max_participants: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomInfo {
    pub name: String,
    pub num_participants: u32,
    pub creation_time: Option<String>,
    pub empty_timeout: Option<u32>,
    pub max_participants: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct RoomListResponse {
    pub rooms: Vec<RoomInfo>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_optional_identity() {
        let req: TokenRequest =
            serde_json::from_str(r#"{"room_name":"room-42","participant_name":"John"}"#).unwrap();
        assert!(req.participant_identity.is_none());
    }

    #[test]
    fn test_create_room_defaults() {
        let req: CreateRoomRequest =
            serde_json::from_str(r#"{"room_name":"room-42"}"#).unwrap();
        assert_eq!(req.empty_timeout, 300);
        assert!(req.max_participants.is_none());
    }

    #[test]
    fn test_token_response_from_grant() {
        let grant = AccessGrant {
            token: "jwt".to_string(),
            url: "wss://example".to_string(),
            room_name: "room-42".to_string(),
            participant_name: "John".to_string(),
            participant_identity: "user-1".to_string(),
        };
        let resp = TokenResponse::from(grant);
        assert_eq!(resp.token, "jwt");
        assert_eq!(resp.participant_identity, "user-1");
    }
}
