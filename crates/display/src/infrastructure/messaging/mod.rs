//! Connection state sharing and the command bus.
//!
//! - `ConnectionStateObserver`: read the link state from outside the event loop
//! - `CommandBus`: hand device commands to the event loop for sending

pub mod command_bus;
pub mod connection;

pub use command_bus::CommandBus;
pub use connection::{set_connection_state, ConnectionState, ConnectionStateObserver};
