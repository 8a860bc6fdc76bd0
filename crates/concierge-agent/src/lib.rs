//! Session orchestration for Concierge
//!
//! Binds a configured persona to a LiveKit room for the duration of a
//! conversation: resolves the active use case, connects its tool servers,
//! hands the bound session to the conversation engine, and tracks the
//! session lifecycle from the first participant join until the room
//! empties.

pub mod compat;
pub mod engine;
pub mod error;
pub mod events;
pub mod orchestrator;
pub mod persona;
pub mod session;

pub use compat::hospitality_orchestrator;
pub use engine::{ConversationEngine, EchoEngine, SessionBinding};
pub use error::SessionError;
pub use events::RoomEvent;
pub use orchestrator::{Orchestrator, SessionInfo};
pub use persona::{PendingPersona, PersonaResolver, ResolvedPersona};
pub use session::SessionState;
