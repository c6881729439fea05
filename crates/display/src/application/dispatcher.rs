//! Message dispatcher - decodes device frames and writes presentation slots.

use spooldesk_shared::{DeviceFlag, DeviceStatus, ServerMessage};

use crate::application::tag_view::render_tag;
use crate::ports::{FrameHandler, PresentationSurface, StatusIndicator};

/// Routes each decoded frame to the slots it affects.
///
/// Malformed frames and unknown message types are dropped without touching
/// any slot.
pub struct Dispatcher<S> {
    surface: S,
}

impl<S: PresentationSurface> Dispatcher<S> {
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Decode and apply one raw text frame.
    pub fn handle(&mut self, raw: &str) {
        match ServerMessage::parse(raw) {
            Ok(message) => self.apply(message),
            Err(e) => {
                tracing::debug!(error = %e, "Dropping undecodable frame");
            }
        }
    }

    /// Apply an already decoded message.
    pub fn apply(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::NfcData { payload } => {
                self.surface.show_tag_info(render_tag(payload.as_ref()));
            }
            ServerMessage::Heartbeat(status) => self.apply_status(&status),
            ServerMessage::Weight { value } => {
                self.surface.show_weight(format!("{value}g"));
            }
            ServerMessage::NfcTag { payload } => {
                self.surface.show_tag_presence(payload.found.is_set());
            }
            ServerMessage::WriteNfcTag { success } => {
                if success.is_set() {
                    tracing::info!("Tag write succeeded");
                } else {
                    tracing::warn!("Tag write failed");
                }
            }
            ServerMessage::Scale { payload } => {
                tracing::debug!(result = ?payload, "Scale command acknowledged");
            }
            ServerMessage::Unknown => {
                tracing::debug!("Dropping frame with unknown message type");
            }
        }
    }

    fn apply_status(&mut self, status: &DeviceStatus) {
        if let Some(connected) = status.filaman_connected {
            self.surface
                .show_link_status(StatusIndicator::from_connected(connected.is_set()));
        }
        if let Some(free_heap) = &status.free_heap {
            self.surface.show_memory(format!("{free_heap}k free"));
        }
        tracing::debug!(
            registered = ?status.registered.map(DeviceFlag::is_set),
            auto_tare = ?status.auto_tare.map(DeviceFlag::is_set),
            "Device heartbeat"
        );
    }
}

impl<S: PresentationSurface> FrameHandler for Dispatcher<S> {
    fn handle_frame(&mut self, text: &str) {
        self.handle(text);
    }
}
