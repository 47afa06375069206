use liveclass_core::utils::DEFAULT_POLL_INTERVAL_MS;
use liveclass_core::{
    ClassId, IceCandidate, ParticipantId, SendSignalRequest, SessionDescription, SignalKind,
    SignalingMessage,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::error::ClientError;
use crate::peer::{LinkState, OfferOutcome, PeerEvent, PeerFactory, PeerSession, PeerState};
use crate::transport::SignalingTransport;

const PEER_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub poll_interval: Duration,
    /// Consecutive failed polls before the failure is reported as an error.
    pub failure_warn_threshold: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            failure_warn_threshold: 5,
        }
    }
}

/// The local participant's view of one live class: a peer session per
/// remote participant, the relay transport and the polling loop.
pub struct LiveClassSession {
    class_id: ClassId,
    local_id: ParticipantId,
    transport: Arc<dyn SignalingTransport>,
    factory: Arc<dyn PeerFactory>,
    options: SessionOptions,
    peers: HashMap<ParticipantId, PeerSession>,
    /// Outgoing signals in send order; the head is retried after a
    /// transient failure.
    outbox: VecDeque<SendSignalRequest>,
    events_tx: mpsc::Sender<PeerEvent>,
    events_rx: Option<mpsc::Receiver<PeerEvent>>,
    consecutive_failures: u32,
    left: bool,
}

impl LiveClassSession {
    pub fn new(
        class_id: ClassId,
        local_id: ParticipantId,
        transport: Arc<dyn SignalingTransport>,
        factory: Arc<dyn PeerFactory>,
        options: SessionOptions,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(PEER_EVENT_CAPACITY);
        Self {
            class_id,
            local_id,
            transport,
            factory,
            options,
            peers: HashMap::new(),
            outbox: VecDeque::new(),
            events_tx,
            events_rx: Some(events_rx),
            consecutive_failures: 0,
            left: false,
        }
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    pub fn local_id(&self) -> ParticipantId {
        self.local_id
    }

    pub fn peer(&self, remote: &ParticipantId) -> Option<&PeerSession> {
        self.peers.get(remote)
    }

    pub fn peer_state(&self, remote: &ParticipantId) -> Option<PeerState> {
        self.peers.get(remote).map(PeerSession::state)
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Signals waiting for the relay to become reachable.
    pub fn queued_signals(&self) -> usize {
        self.outbox.len()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn has_left(&self) -> bool {
        self.left
    }

    /// Starts negotiation with every participant in `roster` that has no
    /// session yet. Returns how many offers were created.
    pub async fn join(&mut self, roster: &[ParticipantId]) -> Result<usize, ClientError> {
        if self.left {
            warn!("Ignoring join for class {}: already left", self.class_id);
            return Ok(0);
        }

        let mut started = 0;
        for &remote in roster {
            if remote == self.local_id || self.peers.contains_key(&remote) {
                continue;
            }
            match self.connect_to(remote).await {
                Ok(()) => started += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("Could not start negotiation with {}: {}", remote, e),
            }
        }

        info!(
            "Joined class {} as {}; offered to {} participant(s)",
            self.class_id, self.local_id, started
        );
        Ok(started)
    }

    /// Local initiation towards one participant.
    pub async fn connect_to(&mut self, remote: ParticipantId) -> Result<(), ClientError> {
        if remote == self.local_id {
            return Err(ClientError::InvalidRequest(
                "cannot negotiate with ourselves".into(),
            ));
        }
        if self.peers.contains_key(&remote) {
            debug!("Already negotiating with {}", remote);
            return Ok(());
        }

        let mut session = PeerSession::new(remote);
        let offer = match session
            .start_offer(self.factory.as_ref(), &self.events_tx)
            .await
        {
            Ok(offer) => offer,
            Err(e) => {
                session.close().await;
                return Err(e);
            }
        };
        self.peers.insert(remote, session);

        self.dispatch(remote, SignalKind::Offer, offer.to_payload())
            .await
    }

    /// Applies one relayed message to the matching peer session.
    pub async fn handle_message(&mut self, message: SignalingMessage) -> Result<(), ClientError> {
        if self.left {
            debug!("Ignoring {} {}: class already left", message.message_type, message.id);
            return Ok(());
        }
        if message.class_id != self.class_id {
            warn!(
                "Ignoring {} {} for class {}",
                message.message_type, message.id, message.class_id
            );
            return Ok(());
        }

        let sender = message.sender_id;
        if sender == self.local_id {
            warn!("Ignoring self-addressed {} {}", message.message_type, message.id);
            return Ok(());
        }

        match message.message_type {
            SignalKind::Offer => {
                let offer = SessionDescription::from_payload(SignalKind::Offer, &message.payload)?;
                let local = self.local_id;
                let outcome = match self.peers.get_mut(&sender) {
                    Some(session) => {
                        session
                            .receive_offer(local, offer, self.factory.as_ref(), &self.events_tx)
                            .await?
                    }
                    None => {
                        // Remember the sender only once its offer is accepted.
                        let mut session = PeerSession::new(sender);
                        match session
                            .receive_offer(local, offer, self.factory.as_ref(), &self.events_tx)
                            .await
                        {
                            Ok(outcome) => {
                                self.peers.insert(sender, session);
                                outcome
                            }
                            Err(e) => {
                                session.close().await;
                                return Err(e);
                            }
                        }
                    }
                };
                if let OfferOutcome::Answered(answer) = outcome {
                    self.dispatch(sender, SignalKind::Answer, answer.to_payload())
                        .await?;
                }
            }
            SignalKind::Answer => {
                let answer =
                    SessionDescription::from_payload(SignalKind::Answer, &message.payload)?;
                match self.peers.get_mut(&sender) {
                    Some(session) => {
                        session.receive_answer(answer).await?;
                    }
                    None => warn!("Dropping answer from {}: no offer outstanding", sender),
                }
            }
            SignalKind::Candidate => {
                let candidate = IceCandidate::from_payload(&message.payload)?;
                let session = self
                    .peers
                    .entry(sender)
                    .or_insert_with(|| PeerSession::awaiting_offer(sender));
                session.receive_candidate(candidate).await?;
            }
        }
        Ok(())
    }

    /// Applies a poll batch in order. A message that cannot be applied is
    /// dropped without affecting the rest.
    pub async fn apply_messages(
        &mut self,
        messages: Vec<SignalingMessage>,
    ) -> Result<usize, ClientError> {
        let mut applied = 0;
        for message in messages {
            let (id, kind, sender) = (message.id, message.message_type, message.sender_id);
            match self.handle_message(message).await {
                Ok(()) => applied += 1,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!("Dropped {} {} from {}: {}", kind, id, sender, e),
            }
        }
        Ok(applied)
    }

    /// One tick of the polling loop: retry queued signals, then fetch and
    /// apply everything the relay holds for us.
    pub async fn poll_once(&mut self) -> Result<usize, ClientError> {
        if self.left {
            return Ok(0);
        }

        self.flush_outbox().await?;
        let messages = self.transport.poll(&self.class_id).await?;
        if !messages.is_empty() {
            debug!("Polled {} signal(s) in class {}", messages.len(), self.class_id);
        }
        self.apply_messages(messages).await
    }

    pub async fn handle_peer_event(&mut self, event: PeerEvent) -> Result<(), ClientError> {
        let remote = event.remote();
        let current = self.peers.get(&remote).map(PeerSession::generation);
        if current != Some(event.generation()) {
            debug!("Ignoring event from a replaced connection to {}", remote);
            return Ok(());
        }

        match event {
            PeerEvent::LocalCandidate { candidate, .. } => {
                self.dispatch(remote, SignalKind::Candidate, candidate.to_payload())
                    .await
            }
            PeerEvent::StateChanged { state, .. } if state.is_departed() => {
                if let Some(mut session) = self.peers.remove(&remote) {
                    session.close().await;
                }
                self.outbox.retain(|request| request.receiver_id != remote);
                info!("{} left class {} ({:?})", remote, self.class_id, state);
                Ok(())
            }
            PeerEvent::StateChanged { state, .. } => {
                if state == LinkState::Connected {
                    if let Some(session) = self.peers.get_mut(&remote) {
                        if session.mark_connected() {
                            info!("Connected to {} in class {}", remote, self.class_id);
                        }
                    }
                } else {
                    debug!("Connection to {} is {:?}", remote, state);
                }
                Ok(())
            }
        }
    }

    /// Handles peer events already queued, without waiting for more.
    pub async fn process_pending_events(&mut self) -> Result<usize, ClientError> {
        let Some(mut events) = self.events_rx.take() else {
            return Ok(0);
        };

        let mut handled = 0;
        let mut result = Ok(());
        while let Ok(event) = events.try_recv() {
            if let Err(e) = self.handle_peer_event(event).await {
                result = Err(e);
                break;
            }
            handled += 1;
        }

        self.events_rx = Some(events);
        result.map(|()| handled)
    }

    /// Closes every peer session. Calling it again does nothing.
    pub async fn leave(&mut self) {
        if self.left {
            return;
        }
        self.left = true;

        let peers = std::mem::take(&mut self.peers);
        let count = peers.len();
        for (_, mut session) in peers {
            session.close().await;
        }
        self.outbox.clear();

        info!("Left class {}; closed {} peer session(s)", self.class_id, count);
    }

    /// Polls until `shutdown` flips to true or the relay rejects our
    /// credentials, then leaves the class.
    pub async fn run(&mut self, shutdown: watch::Receiver<bool>) -> Result<(), ClientError> {
        let Some(mut events) = self.events_rx.take() else {
            return Err(ClientError::PeerConnection(
                "session loop is already running".into(),
            ));
        };

        let result = self.run_loop(&mut events, shutdown).await;
        self.events_rx = Some(events);
        self.leave().await;
        result
    }

    async fn run_loop(
        &mut self,
        events: &mut mpsc::Receiver<PeerEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), ClientError> {
        let mut ticker = tokio::time::interval(self.options.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Polling class {} every {:?}",
            self.class_id, self.options.poll_interval
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = shutdown.changed() => {
                    debug!("Shutdown signalled for class {}", self.class_id);
                    break;
                }
                Some(event) = events.recv() => {
                    if let Err(e) = self.handle_peer_event(event).await {
                        self.on_failure(e)?;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.flush_outbox().await {
                        self.on_failure(e)?;
                    }

                    let class_id = self.class_id;
                    let polled = tokio::select! {
                        _ = shutdown.changed() => {
                            debug!("Shutdown while polling class {}; abandoning request", class_id);
                            break;
                        }
                        polled = self.transport.poll(&class_id) => polled,
                    };
                    if *shutdown.borrow() {
                        debug!("Discarding poll results for class {} after shutdown", class_id);
                        break;
                    }

                    match polled {
                        Ok(messages) => {
                            self.consecutive_failures = 0;
                            if let Err(e) = self.apply_messages(messages).await {
                                self.on_failure(e)?;
                            }
                        }
                        Err(e) => self.on_failure(e)?,
                    }
                }
            }
        }
        Ok(())
    }

    fn on_failure(&mut self, e: ClientError) -> Result<(), ClientError> {
        match &e {
            ClientError::Unauthenticated => {
                error!("Relay rejected our session for class {}; stopping", self.class_id);
                return Err(e);
            }
            ClientError::TransientNetworkFailure(reason) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= self.options.failure_warn_threshold {
                    error!(
                        "Relay unreachable for {} consecutive polls: {}",
                        self.consecutive_failures, reason
                    );
                } else {
                    warn!("Poll failed, retrying next tick: {}", reason);
                }
            }
            other => warn!("Signaling request had no effect: {}", other),
        }
        Ok(())
    }

    async fn dispatch(
        &mut self,
        receiver: ParticipantId,
        kind: SignalKind,
        payload: serde_json::Value,
    ) -> Result<(), ClientError> {
        self.outbox.push_back(SendSignalRequest {
            class_id: self.class_id,
            receiver_id: receiver,
            message_type: kind,
            payload,
        });
        self.flush_outbox().await
    }

    /// Sends queued signals in order. Stops at the first transient failure
    /// and leaves the rest queued; only `Unauthenticated` is returned.
    async fn flush_outbox(&mut self) -> Result<(), ClientError> {
        while let Some(request) = self.outbox.front().cloned() {
            let (kind, receiver) = (request.message_type, request.receiver_id);
            match self.transport.send(request).await {
                Ok(message) => {
                    debug!("Sent {} {} to {}", kind, message.id, receiver);
                    self.outbox.pop_front();
                }
                Err(ClientError::TransientNetworkFailure(reason)) => {
                    warn!(
                        "Relay unreachable, {} signal(s) queued: {}",
                        self.outbox.len(),
                        reason
                    );
                    return Ok(());
                }
                Err(ClientError::Unauthenticated) => return Err(ClientError::Unauthenticated),
                Err(e) => {
                    warn!("Relay refused {} to {}: {}", kind, receiver, e);
                    self.outbox.pop_front();
                }
            }
        }
        Ok(())
    }
}
