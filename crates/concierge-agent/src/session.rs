//! Session lifecycle state machine
//!
//! A session moves `Resolving → Connecting → Active → Ending → Closed`.
//! `Failed` is terminal and reachable while the session is still being
//! assembled (`Resolving`/`Connecting`); a room-empty event may push any
//! non-terminal state into `Ending`. "Idle" is not a state of a session
//! object — it is the absence of one for the room.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Resolving,
    Connecting,
    Active,
    Ending,
    Closed,
    Failed,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Closed | SessionState::Failed)
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Resolving, Connecting)
                | (Resolving, Failed)
                | (Resolving, Ending)
                | (Connecting, Active)
                | (Connecting, Failed)
                | (Connecting, Ending)
                | (Active, Ending)
                | (Ending, Closed)
        )
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Resolving => "resolving",
            SessionState::Connecting => "connecting",
            SessionState::Active => "active",
            SessionState::Ending => "ending",
            SessionState::Closed => "closed",
            SessionState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::SessionState::*;

    #[test]
    fn test_happy_path_transitions() {
        assert!(Resolving.can_transition_to(Connecting));
        assert!(Connecting.can_transition_to(Active));
        assert!(Active.can_transition_to(Ending));
        assert!(Ending.can_transition_to(Closed));
    }

    #[test]
    fn test_failure_only_while_assembling() {
        assert!(Resolving.can_transition_to(Failed));
        assert!(Connecting.can_transition_to(Failed));
        assert!(!Active.can_transition_to(Failed));
    }

    #[test]
    fn test_cancellation_from_any_live_state() {
        assert!(Resolving.can_transition_to(Ending));
        assert!(Connecting.can_transition_to(Ending));
        assert!(Active.can_transition_to(Ending));
    }

    #[test]
    fn test_terminal_states() {
        assert!(Closed.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Ending.is_terminal());
        assert!(!Closed.can_transition_to(Resolving));
        assert!(!Failed.can_transition_to(Connecting));
    }

    #[test]
    fn test_no_skipping_connecting() {
        assert!(!Resolving.can_transition_to(Active));
    }
}
