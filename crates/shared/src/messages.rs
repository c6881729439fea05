//! WebSocket message types for device-display communication
//!
//! These types describe every JSON text frame exchanged over the device's
//! `/ws` endpoint. The device sends `ServerMessage` frames; display clients
//! send `ClientMessage` frames.
//!
//! ## Compatibility
//!
//! - Unknown `type` discriminators deserialize to `ServerMessage::Unknown`
//! - Frames without a `type` field are rejected
//! - Optional status fields default to `None` rather than failing the frame

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::nfc::NfcPayload;

/// Errors raised while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

// =============================================================================
// Server Messages (Device → Display)
// =============================================================================

/// Messages pushed by the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Latest NFC reader state; an absent or empty payload means no tag.
    NfcData {
        #[serde(default)]
        payload: Option<NfcPayload>,
    },
    /// Reply to a client heartbeat, carrying device health.
    Heartbeat(DeviceStatus),
    /// Current scale reading in grams.
    Weight { value: Number },
    /// Whether the reader currently sees a tag.
    NfcTag { payload: TagPresence },
    /// Outcome of a tag write started by a client.
    WriteNfcTag { success: DeviceFlag },
    /// Acknowledgement of a scale command.
    Scale {
        #[serde(default)]
        payload: Option<String>,
    },

    /// Unknown message type for forward compatibility
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Decode a text frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Device health as reported in heartbeat replies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Whether the device is linked to the FilaMan backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filaman_connected: Option<DeviceFlag>,
    /// Free heap in KiB.
    #[serde(default, rename = "freeHeap", skip_serializing_if = "Option::is_none")]
    pub free_heap: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered: Option<DeviceFlag>,
    #[serde(default, rename = "autoTare", skip_serializing_if = "Option::is_none")]
    pub auto_tare: Option<DeviceFlag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPresence {
    pub found: DeviceFlag,
}

/// Boolean as the firmware encodes it: either a JSON bool or `0`/`1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceFlag {
    Bool(bool),
    Int(i64),
}

impl DeviceFlag {
    pub fn is_set(self) -> bool {
        match self {
            DeviceFlag::Bool(b) => b,
            DeviceFlag::Int(n) => n != 0,
        }
    }
}

impl From<bool> for DeviceFlag {
    fn from(value: bool) -> Self {
        DeviceFlag::Bool(value)
    }
}

// =============================================================================
// Client Messages (Display → Device)
// =============================================================================

/// Commands sent by a display client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Liveness ping; the device answers with `ServerMessage::Heartbeat`.
    Heartbeat,
    /// Scale control
    Scale {
        payload: ScaleCommand,
        /// Only meaningful for `ScaleCommand::SetAutoTare`
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enabled: Option<bool>,
    },
    /// Ask the device to re-establish an upstream link
    Reconnect { payload: ReconnectTarget },
    /// Write a JSON document onto the tag currently on the reader
    WriteNfcTag {
        #[serde(rename = "tagType")]
        tag_type: TagKind,
        payload: Value,
    },
}

impl ClientMessage {
    pub fn tare() -> Self {
        ClientMessage::Scale {
            payload: ScaleCommand::Tare,
            enabled: None,
        }
    }

    pub fn calibrate() -> Self {
        ClientMessage::Scale {
            payload: ScaleCommand::Calibrate,
            enabled: None,
        }
    }

    pub fn set_auto_tare(enabled: bool) -> Self {
        ClientMessage::Scale {
            payload: ScaleCommand::SetAutoTare,
            enabled: Some(enabled),
        }
    }

    /// Encode as a text frame.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScaleCommand {
    Tare,
    Calibrate,
    SetAutoTare,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconnectTarget {
    Filaman,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Spool,
    Location,
}
