use crate::auth::IdentityProvider;
use crate::directory::ClassDirectory;
use crate::error::RelayError;
use crate::store::{NewSignal, SignalStore};
use liveclass_core::{ClassId, ParticipantId, SendSignalRequest, SignalingMessage};
use std::sync::Arc;
use tracing::{debug, info};

struct RelayInner {
    store: Arc<dyn SignalStore>,
    identity: Arc<dyn IdentityProvider>,
    directory: Arc<dyn ClassDirectory>,
}

/// Validates signaling traffic and moves it in and out of the store.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
}

impl RelayService {
    pub fn new(
        store: Arc<dyn SignalStore>,
        identity: Arc<dyn IdentityProvider>,
        directory: Arc<dyn ClassDirectory>,
    ) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                store,
                identity,
                directory,
            }),
        }
    }

    pub fn store(&self) -> &Arc<dyn SignalStore> {
        &self.inner.store
    }

    pub fn identity(&self) -> &Arc<dyn IdentityProvider> {
        &self.inner.identity
    }

    pub fn directory(&self) -> &Arc<dyn ClassDirectory> {
        &self.inner.directory
    }

    /// Queues one signal from `sender` to the receiver named in the request.
    pub async fn send(
        &self,
        sender: ParticipantId,
        request: SendSignalRequest,
    ) -> Result<SignalingMessage, RelayError> {
        self.check_member(&request.class_id, &sender).await?;

        if request.payload.is_null() {
            return Err(RelayError::invalid("payload is required"));
        }

        if !self
            .inner
            .directory
            .is_enrolled(&request.class_id, &request.receiver_id)
            .await
        {
            return Err(RelayError::invalid(format!(
                "receiver {} is not enrolled in class {}",
                request.receiver_id, request.class_id
            )));
        }

        let message = self
            .inner
            .store
            .insert(NewSignal {
                class_id: request.class_id,
                sender_id: sender,
                receiver_id: request.receiver_id,
                message_type: request.message_type,
                payload: request.payload,
            })
            .await?;

        debug!(
            "Queued {} {} -> {} in class {}",
            message.message_type, message.sender_id, message.receiver_id, message.class_id
        );
        Ok(message)
    }

    /// Hands out, and removes, everything queued for `receiver`.
    pub async fn poll(
        &self,
        receiver: ParticipantId,
        class_id: ClassId,
    ) -> Result<Vec<SignalingMessage>, RelayError> {
        self.check_member(&class_id, &receiver).await?;

        let messages = self.inner.store.drain(&class_id, &receiver).await?;
        if !messages.is_empty() {
            info!(
                "Delivered {} signal(s) to {} in class {}",
                messages.len(),
                receiver,
                class_id
            );
        }
        Ok(messages)
    }

    pub async fn roster(
        &self,
        caller: ParticipantId,
        class_id: ClassId,
    ) -> Result<Vec<ParticipantId>, RelayError> {
        self.check_member(&class_id, &caller).await?;

        self.inner
            .directory
            .roster(&class_id)
            .await
            .ok_or(RelayError::UnknownClass(class_id))
    }

    async fn check_member(
        &self,
        class_id: &ClassId,
        participant: &ParticipantId,
    ) -> Result<(), RelayError> {
        if !self.inner.directory.class_exists(class_id).await {
            return Err(RelayError::UnknownClass(*class_id));
        }
        if !self.inner.directory.is_enrolled(class_id, participant).await {
            return Err(RelayError::NotEnrolled {
                class_id: *class_id,
                participant: *participant,
            });
        }
        Ok(())
    }
}
