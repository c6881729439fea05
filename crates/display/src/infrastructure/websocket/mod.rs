//! WebSocket link to the device
//!
//! - `transport`: runtime-agnostic transport and connector traits plus the
//!   lifecycle events they report
//! - `manager`: the connection state machine and event loop
//! - `desktop`: tokio-tungstenite based transport

mod desktop;
mod manager;
mod transport;

pub use desktop::{TungsteniteConnector, WsTransport};
pub use manager::ConnectionManager;
pub use transport::{
    Connector, LinkEvent, Transport, TransportError, TransportObserver, TransportState,
};
