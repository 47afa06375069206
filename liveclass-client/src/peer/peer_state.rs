use std::fmt;

/// Negotiation progress with one remote participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    New,
    HasLocalOffer,
    AwaitingOffer,
    RemoteDescriptionSet,
    Connected,
    Closed,
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PeerState::New => "new",
            PeerState::HasLocalOffer => "has-local-offer",
            PeerState::AwaitingOffer => "awaiting-offer",
            PeerState::RemoteDescriptionSet => "remote-description-set",
            PeerState::Connected => "connected",
            PeerState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Connection state reported by the media layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl LinkState {
    /// The remote is gone and the session should be torn down.
    pub fn is_departed(&self) -> bool {
        matches!(self, LinkState::Failed | LinkState::Closed)
    }
}
