//! Room membership events consumed from the real-time media layer

/// What the media layer tells us about a room. The orchestrator reacts to
/// these; it never polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    ParticipantJoined { room: String, identity: String },
    ParticipantLeft { room: String, identity: String },
    RoomEmpty { room: String },
}

impl RoomEvent {
    pub fn room(&self) -> &str {
        match self {
            RoomEvent::ParticipantJoined { room, .. }
            | RoomEvent::ParticipantLeft { room, .. }
            | RoomEvent::RoomEmpty { room } => room,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_accessor() {
        let event = RoomEvent::ParticipantJoined {
            room: "room-42".to_string(),
            identity: "user-1".to_string(),
        };
        assert_eq!(event.room(), "room-42");
        assert_eq!(
            RoomEvent::RoomEmpty {
                room: "room-7".to_string()
            }
            .room(),
            "room-7"
        );
    }
}
