//! Pose publisher loop
//!
//! One estimate per tick, never overlapping: the tick waits for the transport
//! to accept the estimate before the next one is scheduled. Ticks follow a
//! fixed deadline grid (`tokio::time::interval`), so send latency does not
//! stretch the period. Any failure ends the loop and is returned to the caller.

use mocap_link::{LinkError, MocapTransport};
use std::time::Duration;
use thiserror::Error;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};
use vision_pose::PoseEstimate;

use crate::clock::{Clock, SystemClock};
use crate::yaw::{YawError, YawSource};

/// 20 Hz
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(50);

#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Yaw source failed: {0}")]
    Yaw(#[from] YawError),
    #[error("Transmit failed: {0}")]
    Transmit(#[from] LinkError),
    #[error("Publish period must be non-zero")]
    ZeroPeriod,
}

pub type Result<T> = std::result::Result<T, PublishError>;

pub struct PosePublisher<T, Y, C = SystemClock> {
    transport: T,
    yaw_source: Y,
    clock: C,
    period: Duration,
    last_time_usec: Option<u64>,
    ticks: u64,
}

impl<T, Y> PosePublisher<T, Y, SystemClock>
where
    T: MocapTransport,
    Y: YawSource,
{
    /// A zero `period` is rejected when the loop starts
    pub fn new(transport: T, yaw_source: Y, period: Duration) -> Self {
        Self::with_clock(transport, yaw_source, SystemClock, period)
    }
}

impl<T, Y, C> PosePublisher<T, Y, C>
where
    T: MocapTransport,
    Y: YawSource,
    C: Clock,
{
    pub fn with_clock(transport: T, yaw_source: Y, clock: C, period: Duration) -> Self {
        Self {
            transport,
            yaw_source,
            clock,
            period,
            last_time_usec: None,
            ticks: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Estimates successfully sent so far
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// One iteration: sample, stamp, build, send, report
    pub async fn tick(&mut self) -> Result<PoseEstimate> {
        let yaw = self.yaw_source.sample_yaw()?;
        if !yaw.is_finite() {
            return Err(YawError::NonFinite(yaw).into());
        }

        let estimate = PoseEstimate::yaw_only(yaw, self.next_timestamp());
        self.transport.set_vision_position_estimate(&estimate).await?;
        self.ticks += 1;

        info!("Sent vision yaw: {:.2} rad", yaw);
        Ok(estimate)
    }

    /// Publish until a failure; only returns with an error
    pub async fn run(&mut self) -> Result<()> {
        self.run_ticks(None).await
    }

    /// Publish exactly `ticks` estimates on the same schedule as [`run`](Self::run)
    pub async fn run_for(&mut self, ticks: u64) -> Result<()> {
        self.run_ticks(Some(ticks)).await
    }

    async fn run_ticks(&mut self, limit: Option<u64>) -> Result<()> {
        if self.period.is_zero() {
            error!("Publisher not started: zero period");
            return Err(PublishError::ZeroPeriod);
        }
        info!(
            "-- Streaming vision yaw as VisionPositionEstimate at {:.1} Hz",
            1.0 / self.period.as_secs_f64()
        );

        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut remaining = limit;
        while remaining != Some(0) {
            interval.tick().await;
            if let Err(e) = self.tick().await {
                error!("Publisher stopped after {} estimates: {}", self.ticks, e);
                return Err(e);
            }
            remaining = remaining.map(|n| n - 1);
        }
        Ok(())
    }

    /// Wall-clock microseconds, nudged forward if the clock stalls or steps back
    fn next_timestamp(&mut self) -> u64 {
        let now = self.clock.now_usec();
        let stamp = match self.last_time_usec {
            Some(last) if now <= last => last.saturating_add(1),
            _ => now,
        };
        self.last_time_usec = Some(stamp);
        stamp
    }
}
