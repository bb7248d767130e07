// Vision Publisher
// Streams a yaw-only external vision estimate to a PX4 flight controller at 20 Hz

use anyhow::Result;
use mocap_link::MavlinkTransport;
use tracing::info;
use vision_publisher::{ConnectionGate, PosePublisher, PublisherConfig, SineSweep};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "vision_publisher=info,mocap_link=info".to_string()),
        )
        .init();

    let config = PublisherConfig::from_env()?;
    info!(
        "🎯 Vision publisher starting on {} at {:.1} Hz",
        config.link.endpoint, config.rate_hz
    );

    // Flight controller pushes telemetry to us; wait for its heartbeat
    let transport: MavlinkTransport = ConnectionGate::open(&config.link).await?;

    // Replace SineSweep with the camera tracker's yaw (radians)
    let mut publisher = PosePublisher::new(transport, SineSweep::default(), config.period());
    publisher.run().await?;

    Ok(())
}
