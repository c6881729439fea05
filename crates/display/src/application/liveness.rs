//! Liveness emitter - periodic outbound heartbeat.
//!
//! The device answers every heartbeat with its health status, so this is also
//! what keeps the status-indicator and memory slots fresh.

use std::time::Duration;

use spooldesk_shared::ClientMessage;

use crate::ports::CommandSink;

pub struct LivenessEmitter {
    period: Duration,
}

impl LivenessEmitter {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Send one heartbeat if the link is open. Returns whether a frame went out.
    ///
    /// A closed or missing transport is skipped silently; nothing is queued.
    pub fn tick(&self, link: &mut impl CommandSink) -> bool {
        if !link.is_open() {
            return false;
        }
        match link.send(&ClientMessage::Heartbeat) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping heartbeat");
                false
            }
        }
    }
}
