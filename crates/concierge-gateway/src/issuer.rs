//! Access-grant issuance — signed credentials for joining a room
//!
//! Issuance precedes session creation and never touches session state.
//! The signing algorithm itself is the livekit-api crate's business; this
//! module only shapes grants and reports issuer failures.

use livekit_api::access_token::{AccessToken, VideoGrants};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use concierge_core::settings::LiveKitSettings;

/// A signed credential permitting one participant to join one room.
#[derive(Debug, Clone, Serialize)]
pub struct AccessGrant {
    pub token: String,
    pub url: String,
    pub room_name: String,
    pub participant_name: String,
    pub participant_identity: String,
}

#[derive(Error, Debug)]
pub enum IssuerError {
    #[error("credential issuer is not configured: set LIVEKIT_URL, LIVEKIT_API_KEY, and LIVEKIT_API_SECRET")]
    NotConfigured,

    #[error("failed to sign access token: {0}")]
    Signing(String),
}

/// Issues room-access credentials. The orchestrator and API handlers call
/// this; they never sign anything themselves.
pub trait CredentialIssuer: Send + Sync {
    fn issue(
        &self,
        room_name: &str,
        participant_name: &str,
        participant_identity: Option<&str>,
    ) -> Result<AccessGrant, IssuerError>;
}

/// Issuer backed by LiveKit API-key signing.
#[derive(Debug)]
pub struct LiveKitIssuer {
    settings: LiveKitSettings,
}

impl LiveKitIssuer {
    pub fn new(settings: LiveKitSettings) -> Result<Self, IssuerError> {
        if settings.url.is_empty() || settings.api_key.is_empty() || settings.api_secret.is_empty()
        {
            return Err(IssuerError::NotConfigured);
        }
        Ok(Self { settings })
    }
}

impl CredentialIssuer for LiveKitIssuer {
    fn issue(
        &self,
        room_name: &str,
        participant_name: &str,
        participant_identity: Option<&str>,
    ) -> Result<AccessGrant, IssuerError> {
        let identity = participant_identity.unwrap_or(participant_name);
        debug!(
            "Issuing access grant for room {} (identity: {})",
            room_name, identity
        );

        let token = AccessToken::with_api_key(&self.settings.api_key, &self.settings.api_secret)
            .with_identity(identity)
            .with_name(participant_name)
            .with_grants(VideoGrants {
                room_join: true,
                room: room_name.to_string(),
                can_publish: true,
                can_subscribe: true,
                can_publish_data: true,
                ..Default::default()
            })
            .with_ttl(Duration::from_secs(self.settings.token_ttl_secs))
            .to_jwt()
            .map_err(|e| IssuerError::Signing(e.to_string()))?;

        Ok(AccessGrant {
            token,
            url: self.settings.url.clone(),
            room_name: room_name.to_string(),
            participant_name: participant_name.to_string(),
            participant_identity: identity.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
    use serde::Deserialize;

    fn settings() -> LiveKitSettings {
        LiveKitSettings {
            url: "wss://example.livekit.cloud".to_string(),
            api_key: "test_key".to_string(),
            api_secret: "test_secret_test_secret_test_secret".to_string(),
            token_ttl_secs: 600,
        }
    }

    #[derive(Debug, Deserialize)]
    struct Claims {
        iss: String,
        sub: String,
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = LiveKitIssuer::new(LiveKitSettings::default()).unwrap_err();
        assert!(matches!(err, IssuerError::NotConfigured));
    }

    #[test]
    fn test_issue_grant_fields() {
        let issuer = LiveKitIssuer::new(settings()).unwrap();
        let grant = issuer.issue("room-42", "John Doe", Some("user-123")).unwrap();
        assert_eq!(grant.room_name, "room-42");
        assert_eq!(grant.participant_name, "John Doe");
        assert_eq!(grant.participant_identity, "user-123");
        assert_eq!(grant.url, "wss://example.livekit.cloud");
        assert!(!grant.token.is_empty());
    }

    #[test]
    fn test_identity_defaults_to_name() {
        let issuer = LiveKitIssuer::new(settings()).unwrap();
        let grant = issuer.issue("room-42", "John Doe", None).unwrap();
        assert_eq!(grant.participant_identity, "John Doe");
    }

    #[test]
    fn test_token_signed_with_configured_secret() {
        let issuer = LiveKitIssuer::new(settings()).unwrap();
        let grant = issuer.issue("room-42", "John Doe", Some("user-123")).unwrap();

        let key = DecodingKey::from_secret(b"test_secret_test_secret_test_secret");
        let validation = Validation::new(Algorithm::HS256);
        let decoded = decode::<Claims>(&grant.token, &key, &validation).unwrap();
        assert_eq!(decoded.claims.iss, "test_key");
        assert_eq!(decoded.claims.sub, "user-123");
    }
}
