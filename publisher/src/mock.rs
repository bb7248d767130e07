//! In-memory transport for gate and publisher tests

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use mocap_link::{ConnectionState, Endpoint, LinkConfig, LinkError, MocapTransport};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use vision_pose::PoseEstimate;

pub(crate) struct MockTransport {
    pub states: Vec<ConnectionState>,
    pub polled: Arc<AtomicUsize>,
    pub attempts: Arc<AtomicUsize>,
    pub sent: Arc<Mutex<Vec<(PoseEstimate, Instant)>>>,
    /// 1-based send attempt that fails
    pub fail_on: Option<usize>,
    pub send_delay: Duration,
}

impl MockTransport {
    pub fn with_states(states: &[bool]) -> Self {
        Self {
            states: states
                .iter()
                .map(|&is_connected| ConnectionState { is_connected })
                .collect(),
            polled: Arc::new(AtomicUsize::new(0)),
            attempts: Arc::new(AtomicUsize::new(0)),
            sent: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
            send_delay: Duration::ZERO,
        }
    }

    pub fn sink() -> Self {
        Self::with_states(&[true])
    }

    pub fn failing_on(mut self, attempt: usize) -> Self {
        self.fail_on = Some(attempt);
        self
    }

    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    pub fn sent(&self) -> Vec<(PoseEstimate, Instant)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn polled(&self) -> usize {
        self.polled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MocapTransport for MockTransport {
    /// Serial endpoints stand in for an unreachable device
    async fn connect(config: &LinkConfig) -> mocap_link::Result<Self> {
        match &config.endpoint {
            Endpoint::Serial { path, .. } => Err(LinkError::Connect(
                path.clone(),
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such device"),
            )),
            _ => Ok(Self::with_states(&[false, false, true])),
        }
    }

    fn connection_state(&self) -> BoxStream<'static, ConnectionState> {
        let polled = Arc::clone(&self.polled);
        stream::iter(self.states.clone())
            .inspect(move |_| {
                polled.fetch_add(1, Ordering::SeqCst);
            })
            .boxed()
    }

    async fn set_vision_position_estimate(&self, estimate: &PoseEstimate) -> mocap_link::Result<()> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on == Some(attempt) {
            return Err(LinkError::Write(mavlink_write_error()));
        }
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        self.sent.lock().unwrap().push((*estimate, Instant::now()));
        Ok(())
    }
}

fn mavlink_write_error() -> mavlink::error::MessageWriteError {
    mavlink::error::MessageWriteError::Io(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        "link dropped",
    ))
}
