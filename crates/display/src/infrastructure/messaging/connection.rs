//! Connection lifecycle state.
//!
//! The connection manager is the only writer; everything else observes.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Connection state of the display link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No open transport; a retry may be pending
    Disconnected,
    /// A transport exists but has not opened yet
    Connecting,
    /// The current transport is open
    Connected,
}

impl ConnectionState {
    /// Convert to u8 for atomic storage.
    pub fn to_u8(self) -> u8 {
        match self {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Connected => 2,
        }
    }

    /// Convert from u8 (atomic storage).
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => ConnectionState::Connecting,
            2 => ConnectionState::Connected,
            _ => ConnectionState::Disconnected,
        }
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }
}

/// Observable connection state for UI binding.
///
/// Multiple observers can share the same underlying state.
#[derive(Clone, Debug)]
pub struct ConnectionStateObserver {
    state: Arc<AtomicU8>,
}

impl ConnectionStateObserver {
    /// Create a new observer from a shared state Arc.
    pub fn new(state: Arc<AtomicU8>) -> Self {
        Self { state }
    }

    /// Get the current connection state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Check if currently connected.
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }
}

/// Internal helper to update connection state (used by the manager).
pub fn set_connection_state(state_ref: &AtomicU8, new_state: ConnectionState) {
    state_ref.store(new_state.to_u8(), Ordering::SeqCst);
}
