//! Connection gate
//!
//! Opens the link and holds the caller until the first "connected" snapshot.
//! No timeout and no retry: wrap in `tokio::time::timeout` if a bound is needed.

use futures::{Stream, StreamExt};
use mocap_link::{ConnectionState, LinkConfig, LinkError, MocapTransport};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum GateError {
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error("Connection-state stream ended before the link came up")]
    StreamEnded,
}

/// Consume snapshots until one reports connected; later snapshots are never polled
pub async fn wait_for_connection<S>(mut states: S) -> Result<ConnectionState, GateError>
where
    S: Stream<Item = ConnectionState> + Unpin,
{
    info!("Waiting for connection...");
    while let Some(state) = states.next().await {
        if state.is_connected {
            info!("-- Connected to flight controller");
            return Ok(state);
        }
    }
    Err(GateError::StreamEnded)
}

pub struct ConnectionGate;

impl ConnectionGate {
    /// Connect, then wait for the remote side. Connect failures propagate as-is.
    pub async fn open<T: MocapTransport>(config: &LinkConfig) -> Result<T, GateError> {
        let transport = T::connect(config).await?;
        Self::wait(&transport).await?;
        Ok(transport)
    }

    pub async fn wait<T: MocapTransport>(transport: &T) -> Result<(), GateError> {
        wait_for_connection(transport.connection_state()).await?;
        Ok(())
    }
}
