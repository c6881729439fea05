//! Link Ports - how frames reach the dispatcher and how commands leave.

use spooldesk_shared::{ClientMessage, ProtocolError};

/// Receives raw text frames from the current transport.
///
/// Implementations must absorb every failure: a bad frame is dropped, never
/// propagated back into the connection event loop.
pub trait FrameHandler: Send {
    fn handle_frame(&mut self, text: &str);
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("Not connected")]
    NotConnected,
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("Transport rejected frame: {0}")]
    Transport(String),
}

/// Outbound side of the connection.
#[cfg_attr(test, mockall::automock)]
pub trait CommandSink {
    /// True when a transport exists and is open.
    fn is_open(&self) -> bool;

    /// Send a command through the open transport. Nothing is queued.
    fn send(&mut self, message: &ClientMessage) -> Result<(), SendError>;
}
