// Autopilot Simulation
// Stands in for a PX4 flight controller: heartbeats out, vision estimates in

use anyhow::{anyhow, Result};
use chrono::Utc;
use mavlink::common::{HEARTBEAT_DATA, MavAutopilot, MavMessage, MavModeFlag, MavState, MavType};
use mavlink::error::MessageReadError;
use mavlink::{MavConnection, MavHeader};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, error, info, warn};
use vision_pose::{codec, PoseEstimate};

/// Seconds between rate reports
const STATS_WINDOW_S: u32 = 10;
/// Estimates older than this on arrival are counted as stale
const STALE_AFTER_USEC: u64 = 500_000;

/// Simulated flight controller configuration
#[derive(Debug, Clone)]
struct AutopilotConfig {
    link: String,
    system_id: u8,
    component_id: u8,
}

/// Vision input health, reported as JSON every window
#[derive(Debug, Clone, Default, Serialize)]
struct VisionInputStats {
    received_total: u64,
    received_window: u32,
    stale_window: u32,
    stale_last_window: u32,
    rate_hz: f64,
    last_yaw_rad: Option<f64>,
    last_time_usec: Option<u64>,
    uptime_s: u32,
}

impl VisionInputStats {
    fn record(&mut self, estimate: &PoseEstimate, now_usec: u64) {
        self.received_total += 1;
        self.received_window += 1;
        if now_usec.saturating_sub(estimate.time_usec()) > STALE_AFTER_USEC {
            self.stale_window += 1;
        }
        self.last_yaw_rad = Some(estimate.yaw());
        self.last_time_usec = Some(estimate.time_usec());
    }

    /// Close the current window; rate covers the window just ended
    fn roll_window(&mut self, window_s: u32) {
        self.rate_hz = f64::from(self.received_window) / f64::from(window_s);
        self.stale_last_window = self.stale_window;
        self.received_window = 0;
        self.stale_window = 0;
    }
}

fn heartbeat() -> MavMessage {
    MavMessage::HEARTBEAT(HEARTBEAT_DATA {
        custom_mode: 0,
        mavtype: MavType::MAV_TYPE_QUADROTOR,
        autopilot: MavAutopilot::MAV_AUTOPILOT_PX4,
        base_mode: MavModeFlag::MAV_MODE_FLAG_CUSTOM_MODE_ENABLED,
        system_status: MavState::MAV_STATE_STANDBY,
        mavlink_version: 3,
    })
}

fn now_usec() -> u64 {
    u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "autopilot_sim=info".to_string()),
        )
        .init();

    // Load configuration from environment
    let config = AutopilotConfig {
        link: std::env::var("SIM_LINK").unwrap_or_else(|_| "udpout:127.0.0.1:14571".to_string()),
        system_id: std::env::var("SIM_SYSTEM_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1),
        component_id: std::env::var("SIM_COMPONENT_ID")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1),
    };

    info!(
        "Autopilot {}/{} starting, link {}",
        config.system_id, config.component_id, config.link
    );

    let connection: Arc<dyn MavConnection<MavMessage> + Send + Sync> =
        Arc::from(mavlink::connect::<MavMessage>(&config.link)?);
    info!("Link open on {}", config.link);

    // Blocking receive loop feeds decoded estimates to the main loop
    let (tx, rx) = mpsc::channel::<PoseEstimate>(256);
    let reader = Arc::clone(&connection);
    tokio::task::spawn_blocking(move || loop {
        match reader.recv() {
            Ok((_, message)) => {
                if let Some(estimate) = codec::pose_from_message(&message) {
                    if tx.blocking_send(estimate).is_err() {
                        break;
                    }
                }
            }
            Err(MessageReadError::Io(e)) => {
                warn!("Link read failed: {}", e);
                break;
            }
            Err(e) => debug!("Dropping unreadable frame: {}", e),
        }
    });

    let header = MavHeader {
        system_id: config.system_id,
        component_id: config.component_id,
        sequence: 0,
    };
    let reason = serve(connection, header, rx).await;
    error!("Autopilot {} stopped: {}", config.system_id, reason);

    // The blocking reader may still sit in recv(), so exit without waiting for
    // the runtime to drain it
    std::process::exit(1)
}

/// Heartbeat and stats loop; returns only when the link can no longer be served
async fn serve(
    connection: Arc<dyn MavConnection<MavMessage> + Send + Sync>,
    header: MavHeader,
    mut rx: mpsc::Receiver<PoseEstimate>,
) -> anyhow::Error {
    let mut stats = VisionInputStats::default();
    let mut interval = time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = interval.tick() => {
                stats.uptime_s += 1;

                let sender = Arc::clone(&connection);
                match tokio::task::spawn_blocking(move || sender.send(&header, &heartbeat())).await {
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => warn!("Failed to send heartbeat: {}", e),
                    Err(e) => return anyhow::Error::new(e).context("heartbeat task failed"),
                }

                if stats.uptime_s % STATS_WINDOW_S == 0 {
                    stats.roll_window(STATS_WINDOW_S);
                    if stats.received_total == 0 {
                        info!("{} idle - no vision estimates yet", header.system_id);
                    } else {
                        match serde_json::to_string(&stats) {
                            Ok(json) => info!("{} vision input {}", header.system_id, json),
                            Err(e) => warn!("Failed to encode vision stats: {}", e),
                        }
                    }
                }
            }
            received = rx.recv() => {
                match received {
                    Some(estimate) => {
                        stats.record(&estimate, now_usec());
                        if let Ok(json) = estimate.to_json() {
                            debug!("{}", json);
                        }
                    }
                    None => return anyhow!("link reader stopped"),
                }
            }
        }
    }
}
