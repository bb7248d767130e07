//! Vision Publisher
//!
//! Waits for a flight controller to show up on the link, then streams a
//! yaw-only `VISION_POSITION_ESTIMATE` at a fixed rate until something fails.
//!
//! ```text
//! ConnectionGate::open ──► PosePublisher::run (forever)
//!                              │ each tick:
//!                              ├─ YawSource::sample_yaw
//!                              ├─ Clock::now_usec
//!                              ├─ PoseEstimate::yaw_only
//!                              └─ MocapTransport::set_vision_position_estimate
//! ```

pub mod clock;
pub mod config;
pub mod gate;
pub mod publisher;
pub mod yaw;

#[cfg(test)]
pub(crate) mod mock;

pub use clock::{Clock, SystemClock};
pub use config::{ConfigError, PublisherConfig};
pub use gate::{wait_for_connection, ConnectionGate, GateError};
pub use publisher::{PosePublisher, PublishError};
pub use yaw::{SineSweep, YawError, YawSource};
