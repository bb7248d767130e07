//! Heartbeat-based connection detection
//!
//! A link is up while some other system's HEARTBEAT arrived within the timeout.
//! Our own heartbeats looped back (broadcast links) do not count.

use mavlink::common::MavMessage;
use mavlink::MavHeader;
use std::time::{Duration, Instant};

use crate::ConnectionState;

#[derive(Debug, Clone)]
pub struct HeartbeatMonitor {
    own_system_id: u8,
    timeout: Duration,
    last_heartbeat: Option<Instant>,
    remote_system_id: Option<u8>,
}

impl HeartbeatMonitor {
    pub fn new(own_system_id: u8, timeout: Duration) -> Self {
        Self {
            own_system_id,
            timeout,
            last_heartbeat: None,
            remote_system_id: None,
        }
    }

    /// Feed one received message
    pub fn observe(&mut self, header: &MavHeader, message: &MavMessage, now: Instant) {
        if header.system_id == self.own_system_id {
            return;
        }
        if let MavMessage::HEARTBEAT(_) = message {
            if self.remote_system_id != Some(header.system_id) {
                tracing::debug!("Heartbeat from system {}", header.system_id);
            }
            self.last_heartbeat = Some(now);
            self.remote_system_id = Some(header.system_id);
        }
    }

    pub fn snapshot(&self, now: Instant) -> ConnectionState {
        let is_connected = self
            .last_heartbeat
            .map(|seen| now.saturating_duration_since(seen) <= self.timeout)
            .unwrap_or(false);
        ConnectionState { is_connected }
    }

    /// System id of the last system that sent us a heartbeat
    pub fn remote_system_id(&self) -> Option<u8> {
        self.remote_system_id
    }
}
