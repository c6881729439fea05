//! Transport abstraction shared by the connection manager and its connectors.
//!
//! A transport behaves like a browser WebSocket: construction returns at once
//! in `Connecting`, and every later lifecycle change is reported through the
//! `TransportObserver` it was constructed with. This module holds no runtime
//! specifics so tests can drive the manager with scripted transports.

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Connecting,
    Open,
    Closed,
}

impl TransportState {
    /// Convert to u8 for atomic storage.
    pub fn to_u8(self) -> u8 {
        match self {
            TransportState::Connecting => 0,
            TransportState::Open => 1,
            TransportState::Closed => 2,
        }
    }

    /// Convert from u8 (atomic storage).
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => TransportState::Connecting,
            1 => TransportState::Open,
            _ => TransportState::Closed,
        }
    }

    /// Connecting or open.
    pub fn is_live(self) -> bool {
        self != TransportState::Closed
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Invalid endpoint {url}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("Transport is not open")]
    NotOpen,
    #[error("Transport closed")]
    Closed,
}

impl TransportError {
    pub fn invalid_endpoint(url: impl ToString, reason: impl ToString) -> Self {
        Self::InvalidEndpoint {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Everything the event loop reacts to, tagged with the transport generation
/// it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    Opened { generation: u64 },
    Frame { generation: u64, text: String },
    Closed { generation: u64 },
    /// The reconnect delay armed by a close of `generation` has elapsed.
    RetryDue { generation: u64 },
}

/// Lifecycle observer bound to a single transport.
#[derive(Debug, Clone)]
pub struct TransportObserver {
    generation: u64,
    events: mpsc::UnboundedSender<LinkEvent>,
}

impl TransportObserver {
    pub fn new(generation: u64, events: mpsc::UnboundedSender<LinkEvent>) -> Self {
        Self { generation, events }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn opened(&self) {
        self.post(LinkEvent::Opened {
            generation: self.generation,
        });
    }

    pub fn frame(&self, text: String) {
        self.post(LinkEvent::Frame {
            generation: self.generation,
            text,
        });
    }

    pub fn closed(&self) {
        self.post(LinkEvent::Closed {
            generation: self.generation,
        });
    }

    fn post(&self, event: LinkEvent) {
        // The event loop is gone during shutdown; nothing is left to notify.
        let _ = self.events.send(event);
    }
}

pub trait Transport: Send {
    fn state(&self) -> TransportState;

    /// Queue a text frame. Fails unless the transport is open.
    fn send_text(&self, text: String) -> Result<(), TransportError>;

    /// Force the transport to `Closed`.
    ///
    /// Idempotent. The observer hears `closed` exactly once per transport,
    /// whichever side closed first.
    fn close(&mut self);
}

pub trait Connector: Send {
    type Transport: Transport;

    /// Start opening a transport to `url`.
    ///
    /// Returns immediately; an `Err` means the transport could not even be
    /// constructed.
    fn open(
        &self,
        url: &str,
        observer: TransportObserver,
    ) -> Result<Self::Transport, TransportError>;
}
