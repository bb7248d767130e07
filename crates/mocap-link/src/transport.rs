//! MAVLink implementation of [`MocapTransport`]
//!
//! `mavlink` connections are blocking, so every link call hops onto tokio's
//! blocking pool. Nothing reads the link unless the connection-state stream is
//! being polled.

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use mavlink::common::MavMessage;
use mavlink::error::MessageReadError;
use mavlink::{MavConnection, MavHeader, MavlinkVersion};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use vision_pose::{codec, PoseEstimate};

use crate::{ConnectionState, HeartbeatMonitor, LinkConfig, LinkError, MocapTransport, Result};

type Connection = Arc<dyn MavConnection<MavMessage> + Send + Sync>;

pub struct MavlinkTransport {
    connection: Connection,
    header: MavHeader,
    config: LinkConfig,
}

impl MavlinkTransport {
    /// Wrap an already-open connection
    pub fn from_connection(connection: Connection, config: LinkConfig) -> Self {
        let header = MavHeader {
            system_id: config.system_id,
            component_id: config.component_id,
            sequence: 0,
        };
        Self {
            connection,
            header,
            config,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}

#[async_trait]
impl MocapTransport for MavlinkTransport {
    async fn connect(config: &LinkConfig) -> Result<Self> {
        let address = config.endpoint.to_mavlink_address();
        let target = address.clone();
        let mut connection =
            tokio::task::spawn_blocking(move || mavlink::connect::<MavMessage>(&target))
                .await?
                .map_err(|e| LinkError::Connect(address, e))?;
        connection.set_protocol_version(MavlinkVersion::V2);

        info!(
            "📡 Link open on {} as system {}/{}",
            config.endpoint, config.system_id, config.component_id
        );
        Ok(Self::from_connection(Arc::from(connection), config.clone()))
    }

    fn connection_state(&self) -> BoxStream<'static, ConnectionState> {
        let monitor = HeartbeatMonitor::new(self.config.system_id, self.config.heartbeat_timeout);

        stream::unfold(
            (Arc::clone(&self.connection), monitor),
            |(connection, mut monitor)| async move {
                let reader = Arc::clone(&connection);
                let received = match tokio::task::spawn_blocking(move || reader.recv()).await {
                    Ok(received) => received,
                    Err(e) => {
                        warn!("Link reader task failed: {}", e);
                        return None;
                    }
                };

                let state = next_snapshot(&mut monitor, received, Instant::now())?;
                Some((state, (connection, monitor)))
            },
        )
        .boxed()
    }

    async fn set_vision_position_estimate(&self, estimate: &PoseEstimate) -> Result<()> {
        let message = codec::vision_position_estimate(estimate);
        let connection = Arc::clone(&self.connection);
        let header = self.header;

        tokio::task::spawn_blocking(move || connection.send(&header, &message)).await??;
        Ok(())
    }
}

/// Fold one read into the monitor. `None` means the link is gone; unreadable
/// frames are dropped and the current snapshot is still reported.
fn next_snapshot(
    monitor: &mut HeartbeatMonitor,
    received: std::result::Result<(MavHeader, MavMessage), MessageReadError>,
    now: Instant,
) -> Option<ConnectionState> {
    match received {
        Ok((header, message)) => monitor.observe(&header, &message, now),
        Err(MessageReadError::Io(e)) => {
            warn!("Link read failed, ending connection-state stream: {}", e);
            return None;
        }
        Err(e) => debug!("Dropping unreadable frame: {}", e),
    }
    Some(monitor.snapshot(now))
}
