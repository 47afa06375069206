use liveclass_core::{IceCandidate, ParticipantId, SessionDescription};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::peer::{PeerConnection, PeerEvent, PeerEventSender, PeerFactory, PeerState};

// Process-wide: a generation is never reused, even by a recreated session.
static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq)]
pub enum OfferOutcome {
    /// Send this answer back to the offerer.
    Answered(SessionDescription),
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOutcome {
    Applied,
    Buffered,
    Ignored,
}

/// Negotiation with one remote participant.
///
/// Candidates that arrive before the remote description are held in
/// `pending_candidates` and applied, in receipt order, right after the
/// remote description is set.
pub struct PeerSession {
    remote: ParticipantId,
    connection: Option<Arc<dyn PeerConnection>>,
    generation: u64,
    state: PeerState,
    remote_description_set: bool,
    pending_candidates: Vec<IceCandidate>,
}

impl PeerSession {
    pub fn new(remote: ParticipantId) -> Self {
        Self {
            remote,
            connection: None,
            generation: 0,
            state: PeerState::New,
            remote_description_set: false,
            pending_candidates: Vec::new(),
        }
    }

    /// A session created by an early candidate, before any offer arrived.
    pub fn awaiting_offer(remote: ParticipantId) -> Self {
        Self {
            state: PeerState::AwaitingOffer,
            ..Self::new(remote)
        }
    }

    pub fn remote(&self) -> ParticipantId {
        self.remote
    }

    pub fn state(&self) -> PeerState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_connection(&self) -> bool {
        self.connection.is_some()
    }

    pub fn remote_description_set(&self) -> bool {
        self.remote_description_set
    }

    pub fn pending_candidates(&self) -> &[IceCandidate] {
        &self.pending_candidates
    }

    /// Polite side of an offer collision.
    fn is_polite(&self, local: ParticipantId) -> bool {
        local < self.remote
    }

    async fn create_connection(
        &self,
        factory: &dyn PeerFactory,
        events: &mpsc::Sender<PeerEvent>,
    ) -> Result<(Arc<dyn PeerConnection>, u64), ClientError> {
        let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
        let sender = PeerEventSender::new(self.remote, generation, events.clone());
        let connection = factory.create(sender).await.map_err(peer_failure)?;

        debug!("Opened connection #{} to {}", generation, self.remote);
        Ok((connection, generation))
    }

    /// Makes `connection` the current one, closing whatever it replaces.
    async fn install(&mut self, connection: Arc<dyn PeerConnection>, generation: u64) {
        if let Some(old) = self.connection.replace(connection) {
            if let Err(e) = old.close().await {
                warn!("Failed to close replaced connection to {}: {:#}", self.remote, e);
            }
        }
        self.generation = generation;
        self.remote_description_set = false;
    }

    /// Local initiation: create and apply an offer. The caller sends it.
    pub async fn start_offer(
        &mut self,
        factory: &dyn PeerFactory,
        events: &mpsc::Sender<PeerEvent>,
    ) -> Result<SessionDescription, ClientError> {
        if self.state != PeerState::New {
            return Err(ClientError::PeerConnection(format!(
                "cannot offer to {} in state {}",
                self.remote, self.state
            )));
        }

        let (connection, generation) = self.create_connection(factory, events).await?;
        self.install(connection.clone(), generation).await;
        let offer = connection.create_offer().await.map_err(peer_failure)?;
        connection
            .set_local_description(offer.clone())
            .await
            .map_err(peer_failure)?;

        self.state = PeerState::HasLocalOffer;
        Ok(offer)
    }

    pub async fn receive_offer(
        &mut self,
        local: ParticipantId,
        offer: SessionDescription,
        factory: &dyn PeerFactory,
        events: &mpsc::Sender<PeerEvent>,
    ) -> Result<OfferOutcome, ClientError> {
        let replace = match self.state {
            PeerState::Closed => {
                debug!("Ignoring offer from {}: session closed", self.remote);
                return Ok(OfferOutcome::Ignored);
            }
            PeerState::HasLocalOffer if !self.is_polite(local) => {
                info!("Offer collision with {}; keeping our own offer", self.remote);
                return Ok(OfferOutcome::Ignored);
            }
            PeerState::HasLocalOffer => {
                info!("Offer collision with {}; discarding our own offer", self.remote);
                true
            }
            PeerState::RemoteDescriptionSet | PeerState::Connected => {
                info!("{} restarted negotiation", self.remote);
                true
            }
            PeerState::New | PeerState::AwaitingOffer => self.connection.is_none(),
        };

        // A replacement takes over only after it accepts the offer.
        let connection = match (replace, self.connection.clone()) {
            (false, Some(connection)) => {
                connection
                    .set_remote_description(offer)
                    .await
                    .map_err(malformed)?;
                connection
            }
            _ => {
                let (connection, generation) = self.create_connection(factory, events).await?;
                if let Err(e) = connection.set_remote_description(offer).await {
                    if let Err(close_err) = connection.close().await {
                        warn!(
                            "Failed to close rejected connection to {}: {:#}",
                            self.remote, close_err
                        );
                    }
                    return Err(malformed(e));
                }
                self.install(connection.clone(), generation).await;
                connection
            }
        };
        self.remote_description_set = true;

        let answer = connection.create_answer().await.map_err(peer_failure)?;
        connection
            .set_local_description(answer.clone())
            .await
            .map_err(peer_failure)?;
        self.state = PeerState::RemoteDescriptionSet;

        self.flush_candidates(&connection).await;
        Ok(OfferOutcome::Answered(answer))
    }

    /// Returns false when the answer does not match an outstanding offer.
    pub async fn receive_answer(&mut self, answer: SessionDescription) -> Result<bool, ClientError> {
        let connection = match (self.state, self.connection.clone()) {
            (PeerState::HasLocalOffer, Some(connection)) => connection,
            (state, _) => {
                warn!("Dropping answer from {}: session is {}", self.remote, state);
                return Ok(false);
            }
        };

        connection
            .set_remote_description(answer)
            .await
            .map_err(malformed)?;
        self.remote_description_set = true;
        self.state = PeerState::RemoteDescriptionSet;

        self.flush_candidates(&connection).await;
        Ok(true)
    }

    pub async fn receive_candidate(
        &mut self,
        candidate: IceCandidate,
    ) -> Result<CandidateOutcome, ClientError> {
        if self.state == PeerState::Closed {
            debug!("Ignoring candidate from {}: session closed", self.remote);
            return Ok(CandidateOutcome::Ignored);
        }

        match (&self.connection, self.remote_description_set) {
            (Some(connection), true) => {
                connection
                    .add_ice_candidate(candidate)
                    .await
                    .map_err(malformed)?;
                Ok(CandidateOutcome::Applied)
            }
            _ => {
                self.pending_candidates.push(candidate);
                debug!(
                    "Buffered candidate from {} ({} pending)",
                    self.remote,
                    self.pending_candidates.len()
                );
                Ok(CandidateOutcome::Buffered)
            }
        }
    }

    async fn flush_candidates(&mut self, connection: &Arc<dyn PeerConnection>) {
        let pending = std::mem::take(&mut self.pending_candidates);
        if pending.is_empty() {
            return;
        }

        let total = pending.len();
        let mut applied = 0usize;
        for candidate in pending {
            match connection.add_ice_candidate(candidate).await {
                Ok(()) => applied += 1,
                Err(e) => warn!("Dropping buffered candidate from {}: {:#}", self.remote, e),
            }
        }
        debug!("Applied {}/{} buffered candidate(s) from {}", applied, total, self.remote);
    }

    /// Returns true on the first transition into `Connected`.
    pub fn mark_connected(&mut self) -> bool {
        if self.state == PeerState::RemoteDescriptionSet {
            self.state = PeerState::Connected;
            return true;
        }
        false
    }

    /// Closes the connection and discards buffered state. Returns false if
    /// the session was already closed.
    pub async fn close(&mut self) -> bool {
        if self.state == PeerState::Closed {
            return false;
        }

        if let Some(connection) = self.connection.take() {
            if let Err(e) = connection.close().await {
                warn!("Error closing connection to {}: {:#}", self.remote, e);
            }
        }
        self.pending_candidates.clear();
        self.remote_description_set = false;
        self.state = PeerState::Closed;
        true
    }
}

fn peer_failure(e: anyhow::Error) -> ClientError {
    ClientError::PeerConnection(format!("{:#}", e))
}

fn malformed(e: anyhow::Error) -> ClientError {
    ClientError::MalformedPayload(format!("{:#}", e))
}
