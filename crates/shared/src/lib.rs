//! Spooldesk Protocol - Shared types for device and display communication
//!
//! This crate contains the wire format spoken over the device's `/ws` endpoint:
//! - Inbound status frames (`ServerMessage`)
//! - Outbound commands (`ClientMessage`)
//! - NFC tag payload classification (`NfcPayload`, `TagReading`)
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, and thiserror
//! 2. **No presentation logic** - Pure data types and serialization
//! 3. **Tolerant decoding** - Firmware booleans arrive as `0/1` or `true/false`

pub mod messages;
pub mod nfc;

// =============================================================================
// WebSocket Message Types
// =============================================================================
pub use messages::{
    ClientMessage, DeviceFlag, DeviceStatus, ProtocolError, ReconnectTarget, ScaleCommand,
    ServerMessage, TagKind, TagPresence,
};

// =============================================================================
// NFC Tag Payloads
// =============================================================================
pub use nfc::{NfcPayload, TagReading};
