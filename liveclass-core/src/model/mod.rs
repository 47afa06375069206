mod class;
mod ice;
mod participant;
mod payload;
mod signaling;
mod wire;

pub use class::ClassId;
pub use ice::IceServerConfig;
pub use participant::{IdParseError, ParticipantId};
pub use payload::{IceCandidate, PayloadError, SdpKind, SessionDescription};
pub use signaling::{SignalKind, SignalingMessage};
pub use wire::{
    ErrorBody, IdentityResponse, PollQuery, PollResponse, RosterResponse, SendSignalRequest,
};
