//! Mocap Link Library
//!
//! The narrow slice of an autopilot SDK that a vision publisher needs:
//! 1. connect to an endpoint
//! 2. watch connection-state snapshots
//! 3. send `VISION_POSITION_ESTIMATE`
//!
//! [`MocapTransport`] is the seam; [`MavlinkTransport`] is the production
//! implementation on top of the `mavlink` crate.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use vision_pose::PoseEstimate;

pub mod endpoint;
pub mod monitor;
pub mod transport;

pub use endpoint::Endpoint;
pub use monitor::HeartbeatMonitor;
pub use transport::MavlinkTransport;

/// System id MAVSDK-style ground stations announce themselves with
pub const DEFAULT_SYSTEM_ID: u8 = 245;
/// MAV_COMP_ID_MISSIONPLANNER
pub const DEFAULT_COMPONENT_ID: u8 = 190;
/// Link counts as lost after this long without a heartbeat
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("Connect to {0} failed: {1}")]
    Connect(String, #[source] std::io::Error),
    #[error("Link read failed: {0}")]
    Read(#[from] mavlink::error::MessageReadError),
    #[error("Link write failed: {0}")]
    Write(#[from] mavlink::error::MessageWriteError),
    #[error("Link task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, LinkError>;

/// Point-in-time link health
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub is_connected: bool,
}

impl ConnectionState {
    pub const CONNECTED: Self = Self { is_connected: true };
    pub const DISCONNECTED: Self = Self { is_connected: false };
}

/// Who we are on the link and where to listen
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub endpoint: Endpoint,
    pub system_id: u8,
    pub component_id: u8,
    pub heartbeat_timeout: Duration,
}

impl LinkConfig {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            system_id: DEFAULT_SYSTEM_ID,
            component_id: DEFAULT_COMPONENT_ID,
            heartbeat_timeout: DEFAULT_HEARTBEAT_TIMEOUT,
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::new(Endpoint::default())
    }
}

/// Connection to a flight controller that accepts external vision estimates
#[async_trait]
pub trait MocapTransport: Send + Sync {
    /// Open the link; does not wait for the remote side to show up
    async fn connect(config: &LinkConfig) -> Result<Self>
    where
        Self: Sized;

    /// Lazy, unbounded snapshots of link health. Dropping the stream stops observation.
    fn connection_state(&self) -> BoxStream<'static, ConnectionState>;

    /// Send one estimate; resolves once the link has accepted it
    async fn set_vision_position_estimate(&self, estimate: &PoseEstimate) -> Result<()>;
}
