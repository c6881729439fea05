//! Desktop WebSocket transport using tokio-tungstenite

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;
use url::Url;

use super::transport::{Connector, Transport, TransportError, TransportObserver, TransportState};

/// Opens `ws://` / `wss://` transports on the current tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct TungsteniteConnector;

impl TungsteniteConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for TungsteniteConnector {
    type Transport = WsTransport;

    fn open(&self, url: &str, observer: TransportObserver) -> Result<WsTransport, TransportError> {
        let parsed = Url::parse(url).map_err(|e| TransportError::invalid_endpoint(url, e))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(TransportError::invalid_endpoint(
                url,
                format!("unsupported scheme {}", parsed.scheme()),
            ));
        }

        let state = Arc::new(AtomicU8::new(TransportState::Connecting.to_u8()));
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel::<String>();
        let cancel = CancellationToken::new();

        tokio::spawn(socket_task(
            parsed.to_string(),
            Arc::clone(&state),
            outbound_rx,
            cancel.clone(),
            observer.clone(),
        ));

        Ok(WsTransport {
            state,
            outbound: outbound_tx,
            cancel,
            observer,
        })
    }
}

/// Handle on one socket task.
pub struct WsTransport {
    state: Arc<AtomicU8>,
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
    observer: TransportObserver,
}

impl Transport for WsTransport {
    fn state(&self) -> TransportState {
        TransportState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn send_text(&self, text: String) -> Result<(), TransportError> {
        if self.state() != TransportState::Open {
            return Err(TransportError::NotOpen);
        }
        self.outbound
            .send(text)
            .map_err(|_| TransportError::Closed)
    }

    fn close(&mut self) {
        self.cancel.cancel();
        if mark_closed(&self.state) {
            self.observer.closed();
        }
    }
}

impl Drop for WsTransport {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Move to `Closed`; true only for the caller that made the transition.
fn mark_closed(state: &AtomicU8) -> bool {
    state.swap(TransportState::Closed.to_u8(), Ordering::SeqCst) != TransportState::Closed.to_u8()
}

async fn socket_task(
    url: String,
    state: Arc<AtomicU8>,
    mut outbound: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
    observer: TransportObserver,
) {
    let connected = tokio::select! {
        _ = cancel.cancelled() => return,
        result = connect_async(url.as_str()) => result,
    };

    let ws_stream = match connected {
        Ok((ws_stream, _)) => ws_stream,
        Err(e) => {
            tracing::warn!("Failed to connect to {}: {}", url, e);
            if mark_closed(&state) {
                observer.closed();
            }
            return;
        }
    };

    // Lost the race against close(); the observer already heard about it.
    if state
        .compare_exchange(
            TransportState::Connecting.to_u8(),
            TransportState::Open.to_u8(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        )
        .is_err()
    {
        return;
    }
    observer.opened();

    let (mut write, mut read) = ws_stream.split();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = write.send(Message::Close(None)).await;
                break;
            }
            Some(text) = outbound.recv() => {
                if let Err(e) = write.send(Message::Text(text)).await {
                    tracing::warn!("Failed to send frame: {}", e);
                    break;
                }
            }
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => observer.frame(text),
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Device closed connection");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket error: {}", e);
                    break;
                }
            },
        }
    }

    if mark_closed(&state) {
        observer.closed();
    }
}
