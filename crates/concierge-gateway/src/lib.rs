//! HTTP surface for Concierge
//!
//! Two routers live here: the management API (health, status, config,
//! access tokens, room management) served by the `api` process, and the
//! LiveKit webhook receiver the worker mounts to learn about room
//! membership changes.

pub mod issuer;
pub mod protocol;
pub mod rooms;
pub mod routes;
pub mod webhook;

pub use issuer::{AccessGrant, CredentialIssuer, IssuerError, LiveKitIssuer};
pub use rooms::{RoomManager, RoomServiceError};
pub use routes::{ApiState, api_router};
pub use webhook::webhook_router;
