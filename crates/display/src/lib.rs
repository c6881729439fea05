//! Spooldesk display client.
//!
//! Connects to a spool-scale device's `/ws` endpoint, keeps the link alive,
//! and mirrors tag, scale and health updates into presentation slots.

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod presentation;

// Re-export commonly used entrypoints
pub use application::{Dispatcher, LivenessEmitter};
pub use config::DisplayConfig;
pub use infrastructure::websocket::{ConnectionManager, TungsteniteConnector};
pub use presentation::{ConsoleSurface, SlotBoard};
