//! Calibration progress observer.
//!
//! Observers are optional and never required for correctness. They are
//! called synchronously from the calibration loop, so implementations must
//! return immediately: deliver or drop, never wait.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One calibration pass, reported after its measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationProgress {
    /// Zero-based iteration index.
    pub iteration: u32,

    /// Seconds measured in this pass.
    pub measured_seconds: f64,

    /// The rate the loop will use next, or the rate it stopped at.
    pub rate: f64,
}

/// Receives calibration progress.
pub trait CalibrationObserver: Send + Sync {
    /// Called once per iteration. Must not block.
    fn on_iteration(&self, progress: CalibrationProgress);
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CalibrationObserver for NoopObserver {
    fn on_iteration(&self, _progress: CalibrationProgress) {}
}

/// Forwards progress into a bounded channel, dropping updates when the
/// receiver is full or gone.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::Sender<CalibrationProgress>,
}

impl ChannelObserver {
    /// Create an observer and the receiver that drains it.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<CalibrationProgress>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl CalibrationObserver for ChannelObserver {
    fn on_iteration(&self, progress: CalibrationProgress) {
        if self.tx.try_send(progress).is_err() {
            tracing::debug!(
                iteration = progress.iteration,
                "Calibration progress dropped (receiver full or closed)"
            );
        }
    }
}
