pub mod messaging;
pub mod websocket;

// Re-export messaging types
pub use messaging::{CommandBus, ConnectionState, ConnectionStateObserver};
