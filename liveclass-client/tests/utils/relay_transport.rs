use async_trait::async_trait;
use liveclass_client::{ClientError, SignalingTransport, status_error};
use liveclass_core::{ClassId, ParticipantId, SendSignalRequest, SignalingMessage};
use liveclass_relay::{RelayError, RelayService};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn to_client_error(e: RelayError) -> ClientError {
    status_error(e.status(), e.to_string())
}

/// Talks to a `RelayService` in-process, as one authenticated participant.
pub struct RelayTransport {
    service: RelayService,
    me: ParticipantId,
    sent: AtomicUsize,
    received: AtomicUsize,
}

impl RelayTransport {
    pub fn new(service: RelayService, me: ParticipantId) -> Arc<Self> {
        Arc::new(Self {
            service,
            me,
            sent: AtomicUsize::new(0),
            received: AtomicUsize::new(0),
        })
    }

    pub fn sent(&self) -> usize {
        self.sent.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalingTransport for RelayTransport {
    async fn send(&self, request: SendSignalRequest) -> Result<SignalingMessage, ClientError> {
        let message = self
            .service
            .send(self.me, request)
            .await
            .map_err(to_client_error)?;
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(message)
    }

    async fn poll(&self, class_id: &ClassId) -> Result<Vec<SignalingMessage>, ClientError> {
        let messages = self
            .service
            .poll(self.me, *class_id)
            .await
            .map_err(to_client_error)?;
        self.received.fetch_add(messages.len(), Ordering::SeqCst);
        Ok(messages)
    }
}

/// Wraps a transport with scripted failures and an optional poll delay.
pub struct FlakyTransport {
    inner: Arc<dyn SignalingTransport>,
    poll_failures: Mutex<VecDeque<ClientError>>,
    send_failures: Mutex<VecDeque<ClientError>>,
    poll_delay: Mutex<Option<Duration>>,
    polls: AtomicUsize,
}

impl FlakyTransport {
    pub fn new(inner: Arc<dyn SignalingTransport>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            poll_failures: Mutex::new(VecDeque::new()),
            send_failures: Mutex::new(VecDeque::new()),
            poll_delay: Mutex::new(None),
            polls: AtomicUsize::new(0),
        })
    }

    pub fn fail_polls(&self, error: ClientError, times: usize) {
        let mut failures = self.poll_failures.lock().unwrap();
        failures.extend(std::iter::repeat_n(error, times));
    }

    pub fn fail_sends(&self, error: ClientError, times: usize) {
        let mut failures = self.send_failures.lock().unwrap();
        failures.extend(std::iter::repeat_n(error, times));
    }

    pub fn delay_polls(&self, delay: Duration) {
        *self.poll_delay.lock().unwrap() = Some(delay);
    }

    /// Poll attempts, including failed ones.
    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalingTransport for FlakyTransport {
    async fn send(&self, request: SendSignalRequest) -> Result<SignalingMessage, ClientError> {
        let failure = self.send_failures.lock().unwrap().pop_front();
        if let Some(e) = failure {
            return Err(e);
        }
        self.inner.send(request).await
    }

    async fn poll(&self, class_id: &ClassId) -> Result<Vec<SignalingMessage>, ClientError> {
        self.polls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.poll_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.poll_failures.lock().unwrap().pop_front();
        if let Some(e) = failure {
            return Err(e);
        }
        self.inner.poll(class_id).await
    }
}
