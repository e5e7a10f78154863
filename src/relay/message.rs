use super::*;

/// The only messages the relay itself originates. Everything else on the wire is relayed verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceMessage {
    /// Sent once to a connection that just joined, counting every member of the room including itself
    Peers(usize),
    /// Sent to the existing members of a room when someone joins
    Join,
    /// Sent to the remaining members of a room when someone leaves
    Leave,
}

impl PresenceMessage {
    /// A complete unmasked text frame carrying this message
    pub fn to_frame(&self) -> Vec<u8> {
        frame::encode(true, frame::OPCODE_TEXT, self.to_string().as_bytes(), None)
    }
}

impl Display for PresenceMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PresenceMessage::Peers(count) => write!(f, "{{\"type\":\"peers\",\"count\":{}}}", count),
            PresenceMessage::Join => write!(f, "{{\"type\":\"join\"}}"),
            PresenceMessage::Leave => write!(f, "{{\"type\":\"leave\"}}"),
        }
    }
}
