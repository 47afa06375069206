use anyhow::Result;
use async_trait::async_trait;
use liveclass_core::{IceCandidate, ParticipantId, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::peer::LinkState;

#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    /// Trickle ICE: a candidate gathered locally that the remote needs.
    LocalCandidate {
        remote: ParticipantId,
        generation: u64,
        candidate: IceCandidate,
    },
    StateChanged {
        remote: ParticipantId,
        generation: u64,
        state: LinkState,
    },
}

impl PeerEvent {
    pub fn remote(&self) -> ParticipantId {
        match self {
            PeerEvent::LocalCandidate { remote, .. } | PeerEvent::StateChanged { remote, .. } => {
                *remote
            }
        }
    }

    /// Which connection produced the event. Events from a replaced
    /// connection carry a stale generation.
    pub fn generation(&self) -> u64 {
        match self {
            PeerEvent::LocalCandidate { generation, .. }
            | PeerEvent::StateChanged { generation, .. } => *generation,
        }
    }
}

/// Handed to a new connection so its callbacks can report back to the
/// session that owns it.
#[derive(Debug, Clone)]
pub struct PeerEventSender {
    remote: ParticipantId,
    generation: u64,
    tx: mpsc::Sender<PeerEvent>,
}

impl PeerEventSender {
    pub fn new(remote: ParticipantId, generation: u64, tx: mpsc::Sender<PeerEvent>) -> Self {
        Self {
            remote,
            generation,
            tx,
        }
    }

    pub fn remote(&self) -> ParticipantId {
        self.remote
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub async fn local_candidate(&self, candidate: IceCandidate) {
        let _ = self
            .tx
            .send(PeerEvent::LocalCandidate {
                remote: self.remote,
                generation: self.generation,
                candidate,
            })
            .await;
    }

    pub async fn state_changed(&self, state: LinkState) {
        let _ = self
            .tx
            .send(PeerEvent::StateChanged {
                remote: self.remote,
                generation: self.generation,
                state,
            })
            .await;
    }
}

/// The media primitive negotiated over the relay.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn create_offer(&self) -> Result<SessionDescription>;

    async fn create_answer(&self) -> Result<SessionDescription>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<()>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait PeerFactory: Send + Sync {
    async fn create(&self, events: PeerEventSender) -> Result<Arc<dyn PeerConnection>>;
}
