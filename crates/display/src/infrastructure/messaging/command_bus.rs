//! Command Bus for sending device commands from outside the event loop.
//!
//! Commands are handed to the connection manager, which sends them through the
//! current transport if it is open and drops them otherwise.

use spooldesk_shared::ClientMessage;
use tokio::sync::mpsc;

/// Cloneable handle for queueing commands to the event loop.
#[derive(Clone, Debug)]
pub struct CommandBus {
    tx: mpsc::UnboundedSender<ClientMessage>,
}

impl CommandBus {
    /// Create a new CommandBus with the given channel sender.
    pub fn new(tx: mpsc::UnboundedSender<ClientMessage>) -> Self {
        Self { tx }
    }

    /// Send a fire-and-forget command.
    ///
    /// Fails only when the event loop has shut down.
    pub fn send(&self, message: ClientMessage) -> anyhow::Result<()> {
        self.tx
            .send(message)
            .map_err(|e| anyhow::anyhow!("CommandBus send failed: {}", e))
    }
}
