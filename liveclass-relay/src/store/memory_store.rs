use crate::store::clock::{Clock, SystemClock};
use crate::store::signal_store::{NewSignal, SignalStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use liveclass_core::utils::DEFAULT_SIGNAL_TTL_SECS;
use liveclass_core::{ClassId, ParticipantId, SignalingMessage};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

type MailboxKey = (ClassId, ParticipantId);

#[derive(Default)]
struct Mailbox {
    /// Append-only; `created_at` never decreases from front to back.
    messages: VecDeque<SignalingMessage>,
}

/// In-process `SignalStore` backed by one mailbox per (class, receiver).
pub struct MemoryStore {
    mailboxes: DashMap<MailboxKey, Mailbox>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        Self {
            mailboxes: DashMap::new(),
            ttl,
            clock,
        }
    }

    fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(created_at) > self.ttl
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_SIGNAL_TTL_SECS))
    }
}

#[async_trait]
impl SignalStore for MemoryStore {
    async fn insert(&self, signal: NewSignal) -> Result<SignalingMessage, StoreError> {
        let now = self.clock.now();
        let mut mailbox = self
            .mailboxes
            .entry((signal.class_id, signal.receiver_id))
            .or_default();

        // Keep per-mailbox timestamps monotonic even if the wall clock steps back.
        let created_at = match mailbox.messages.back() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };

        let message = SignalingMessage {
            id: Uuid::new_v4(),
            class_id: signal.class_id,
            sender_id: signal.sender_id,
            receiver_id: signal.receiver_id,
            message_type: signal.message_type,
            payload: signal.payload,
            created_at,
        };
        mailbox.messages.push_back(message.clone());

        Ok(message)
    }

    async fn drain(
        &self,
        class_id: &ClassId,
        receiver_id: &ParticipantId,
    ) -> Result<Vec<SignalingMessage>, StoreError> {
        let now = self.clock.now();

        let Some((_, mailbox)) = self.mailboxes.remove(&(*class_id, *receiver_id)) else {
            return Ok(Vec::new());
        };

        let mut expired = 0usize;
        let mut reflected = 0usize;
        let delivered: Vec<SignalingMessage> = mailbox
            .messages
            .into_iter()
            .filter(|m| {
                if self.is_expired(m.created_at, now) {
                    expired += 1;
                    return false;
                }
                if m.sender_id == m.receiver_id {
                    reflected += 1;
                    return false;
                }
                true
            })
            .collect();

        if expired > 0 {
            debug!(
                "Dropped {} expired signal(s) for {} in class {}",
                expired, receiver_id, class_id
            );
        }
        if reflected > 0 {
            warn!(
                "Dropped {} self-addressed signal(s) for {} in class {}",
                reflected, receiver_id, class_id
            );
        }

        Ok(delivered)
    }

    async fn purge_expired(&self) -> Result<usize, StoreError> {
        let now = self.clock.now();
        let mut purged = 0usize;

        self.mailboxes.retain(|_, mailbox| {
            let before = mailbox.messages.len();
            mailbox
                .messages
                .retain(|m| !(now.signed_duration_since(m.created_at) > self.ttl));
            purged += before - mailbox.messages.len();
            !mailbox.messages.is_empty()
        });

        Ok(purged)
    }

    async fn pending(&self) -> usize {
        self.mailboxes
            .iter()
            .map(|entry| entry.value().messages.len())
            .sum()
    }
}
