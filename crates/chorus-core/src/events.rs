//! Audio session events published by a playback backend.
//!
//! The backend owns a [`PlaybackEvents`] broadcaster and publishes
//! interruptions and route changes to it; the clip player subscribes and
//! unsubscribes explicitly on teardown.
//!
//! # Wire Format
//!
//! ```json
//! { "type": "route_changed", "reason": "old_device_unavailable" }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Broadcast channel capacity for playback events.
const CHANNEL_CAPACITY: usize = 32;

/// Why the audio route changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteChangeReason {
    /// A new output device became available.
    NewDeviceAvailable,
    /// The previous output device went away (headphones unplugged, etc.).
    OldDeviceUnavailable,
    /// Anything else the platform reports.
    Other,
}

/// Events an audio session may raise outside the application's control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackEvent {
    /// Another client took the audio session.
    InterruptionBegan,

    /// The interruption is over.
    InterruptionEnded {
        /// Whether the platform suggests resuming playback.
        should_resume: bool,
    },

    /// The output route changed.
    RouteChanged {
        /// Reported reason.
        reason: RouteChangeReason,
    },
}

/// Publisher side of the playback event channel.
#[derive(Debug, Clone)]
pub struct PlaybackEvents {
    sender: broadcast::Sender<PlaybackEvent>,
}

impl PlaybackEvents {
    /// Create a publisher with no subscribers.
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Returns the number of subscribers that received it.
    pub fn publish(&self, event: PlaybackEvent) -> usize {
        if self.sender.receiver_count() == 0 {
            return 0;
        }
        tracing::debug!(?event, "Publishing playback event");
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to future events.
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for PlaybackEvents {
    fn default() -> Self {
        Self::new()
    }
}
