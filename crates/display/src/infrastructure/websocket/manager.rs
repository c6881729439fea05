//! Connection manager - owns the transport and runs the display event loop.
//!
//! State machine:
//!
//! ```text
//! Disconnected --connect()--> Connecting --opened--> Connected
//!      ^                          |                      |
//!      +--------- closed ---------+------- closed -------+
//!      |
//!      +--(reconnect delay elapsed)--> connect()
//! ```
//!
//! Every close arms exactly one retry. A retry that fires while a newer
//! transport is already live is a no-op, so overlapping retries never tear
//! down a healthy link.

use std::sync::atomic::AtomicU8;
use std::sync::Arc;
use std::time::Duration;

use spooldesk_shared::ClientMessage;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::transport::{Connector, LinkEvent, Transport, TransportObserver, TransportState};
use crate::application::LivenessEmitter;
use crate::infrastructure::messaging::{
    set_connection_state, CommandBus, ConnectionState, ConnectionStateObserver,
};
use crate::ports::{CommandSink, FrameHandler, SendError};

pub struct ConnectionManager<C: Connector, H> {
    connector: C,
    endpoint: String,
    reconnect_delay: Duration,
    handler: H,
    transport: Option<C::Transport>,
    /// Bumped on every `connect()`; lifecycle events carry the value they were
    /// created under.
    generation: u64,
    state: Arc<AtomicU8>,
    pending_retries: usize,
    events_tx: mpsc::UnboundedSender<LinkEvent>,
    events_rx: mpsc::UnboundedReceiver<LinkEvent>,
    commands_tx: mpsc::UnboundedSender<ClientMessage>,
    commands_rx: mpsc::UnboundedReceiver<ClientMessage>,
}

impl<C: Connector, H: FrameHandler> ConnectionManager<C, H> {
    pub fn new(
        connector: C,
        endpoint: impl Into<String>,
        reconnect_delay: Duration,
        handler: H,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        Self {
            connector,
            endpoint: endpoint.into(),
            reconnect_delay,
            handler,
            transport: None,
            generation: 0,
            state: Arc::new(AtomicU8::new(ConnectionState::Disconnected.to_u8())),
            pending_retries: 0,
            events_tx,
            events_rx,
            commands_tx,
            commands_rx,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.state_observer().state()
    }

    pub fn state_observer(&self) -> ConnectionStateObserver {
        ConnectionStateObserver::new(Arc::clone(&self.state))
    }

    pub fn command_bus(&self) -> CommandBus {
        CommandBus::new(self.commands_tx.clone())
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Retries armed but not yet fired.
    pub fn pending_retries(&self) -> usize {
        self.pending_retries
    }

    pub fn transport_state(&self) -> Option<TransportState> {
        self.transport.as_ref().map(Transport::state)
    }

    /// Replace the current transport with a fresh one.
    ///
    /// The previous transport is forced closed before the next one is
    /// constructed. A construction failure is handled like a close.
    pub fn connect(&mut self) {
        if let Some(mut previous) = self.transport.take() {
            previous.close();
        }

        self.generation += 1;
        let generation = self.generation;
        self.set_state(ConnectionState::Connecting);

        let observer = TransportObserver::new(generation, self.events_tx.clone());
        match self.connector.open(&self.endpoint, observer) {
            Ok(transport) => {
                tracing::debug!(generation, "Opening connection to {}", self.endpoint);
                self.transport = Some(transport);
            }
            Err(e) => {
                tracing::warn!(generation, "Failed to create transport: {}", e);
                self.set_state(ConnectionState::Disconnected);
                self.arm_retry(generation);
            }
        }
    }

    /// React to one lifecycle event.
    pub fn handle_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Opened { generation } => {
                if self.is_current(generation) {
                    tracing::info!("Connected to device at {}", self.endpoint);
                    self.set_state(ConnectionState::Connected);
                } else {
                    tracing::debug!(generation, "Ignoring open of superseded transport");
                }
            }
            LinkEvent::Frame { generation, text } => {
                if self.is_current(generation) {
                    self.handler.handle_frame(&text);
                } else {
                    tracing::debug!(generation, "Dropping frame from superseded transport");
                }
            }
            LinkEvent::Closed { generation } => {
                if self.is_current(generation) {
                    tracing::info!(
                        "Connection to {} closed, retrying in {}ms",
                        self.endpoint,
                        self.reconnect_delay.as_millis()
                    );
                    self.set_state(ConnectionState::Disconnected);
                }
                self.arm_retry(generation);
            }
            LinkEvent::RetryDue { generation } => {
                self.pending_retries = self.pending_retries.saturating_sub(1);
                if self.transport_state().is_some_and(TransportState::is_live) {
                    tracing::debug!(
                        generation,
                        current = self.generation,
                        "Transport already live, retry is a no-op"
                    );
                } else {
                    self.connect();
                }
            }
        }
    }

    /// Wait for the next lifecycle event.
    pub async fn next_event(&mut self) -> Option<LinkEvent> {
        self.events_rx.recv().await
    }

    /// Handle every event that is already queued. Returns how many were handled.
    pub fn process_ready(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Close the current transport without scheduling anything further.
    pub fn shutdown(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.set_state(ConnectionState::Disconnected);
    }

    /// Run the event loop until `shutdown` is cancelled.
    ///
    /// Connects immediately, then processes lifecycle events, queued commands
    /// and liveness ticks one at a time in arrival order.
    pub async fn run(mut self, liveness: LivenessEmitter, shutdown: CancellationToken) {
        self.connect();

        let period = liveness.period();
        let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Shutdown requested");
                    break;
                }
                Some(event) = self.events_rx.recv() => self.handle_event(event),
                Some(command) = self.commands_rx.recv() => self.send_command(command),
                _ = heartbeat.tick() => {
                    liveness.tick(&mut self);
                }
            }
        }

        self.shutdown();
    }

    fn send_command(&mut self, command: ClientMessage) {
        if let Err(e) = self.send(&command) {
            tracing::warn!(?command, "Dropping command: {}", e);
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    fn set_state(&self, state: ConnectionState) {
        set_connection_state(&self.state, state);
    }

    fn arm_retry(&mut self, generation: u64) {
        self.pending_retries += 1;
        let delay = self.reconnect_delay;
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(LinkEvent::RetryDue { generation });
        });
    }
}

impl<C: Connector, H: FrameHandler> CommandSink for ConnectionManager<C, H> {
    fn is_open(&self) -> bool {
        self.transport_state() == Some(TransportState::Open)
    }

    fn send(&mut self, message: &ClientMessage) -> Result<(), SendError> {
        let Some(transport) = self
            .transport
            .as_ref()
            .filter(|t| t.state() == TransportState::Open)
        else {
            return Err(SendError::NotConnected);
        };
        let text = message.to_json()?;
        transport
            .send_text(text)
            .map_err(|e| SendError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::websocket::TransportError;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};

    const DELAY: Duration = Duration::from_millis(5_000);

    fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().expect("lock")
    }

    /// Test-side handle on a scripted transport.
    #[derive(Clone)]
    struct FakeLink {
        observer: TransportObserver,
        state: Arc<Mutex<TransportState>>,
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl FakeLink {
        fn state(&self) -> TransportState {
            *lock(&self.state)
        }

        fn open(&self) {
            *lock(&self.state) = TransportState::Open;
            self.observer.opened();
        }

        fn deliver(&self, text: &str) {
            self.observer.frame(text.to_string());
        }

        /// Close from the remote side.
        fn drop_link(&self) {
            let mut state = lock(&self.state);
            if *state != TransportState::Closed {
                *state = TransportState::Closed;
                drop(state);
                self.observer.closed();
            }
        }

        fn sent(&self) -> Vec<String> {
            lock(&self.sent).clone()
        }
    }

    struct FakeTransport(FakeLink);

    impl Transport for FakeTransport {
        fn state(&self) -> TransportState {
            self.0.state()
        }

        fn send_text(&self, text: String) -> Result<(), TransportError> {
            if self.0.state() != TransportState::Open {
                return Err(TransportError::NotOpen);
            }
            lock(&self.0.sent).push(text);
            Ok(())
        }

        fn close(&mut self) {
            self.0.drop_link();
        }
    }

    #[derive(Clone, Default)]
    struct FakeConnector {
        links: Arc<Mutex<Vec<FakeLink>>>,
        fail: Arc<AtomicBool>,
        /// Times a transport was constructed while an earlier one was still live.
        overlaps: Arc<AtomicUsize>,
    }

    impl FakeConnector {
        fn links(&self) -> Vec<FakeLink> {
            lock(&self.links).clone()
        }

        fn last(&self) -> FakeLink {
            self.links().last().cloned().expect("no transport created")
        }

        fn fail_construction(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }
    }

    impl Connector for FakeConnector {
        type Transport = FakeTransport;

        fn open(
            &self,
            url: &str,
            observer: TransportObserver,
        ) -> Result<FakeTransport, TransportError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(TransportError::invalid_endpoint(url, "scripted failure"));
            }
            let mut links = lock(&self.links);
            if links.iter().any(|l| l.state().is_live()) {
                self.overlaps.fetch_add(1, Ordering::SeqCst);
            }
            let link = FakeLink {
                observer,
                state: Arc::new(Mutex::new(TransportState::Connecting)),
                sent: Arc::new(Mutex::new(Vec::new())),
            };
            links.push(link.clone());
            Ok(FakeTransport(link))
        }
    }

    #[derive(Clone, Default)]
    struct RecordingHandler {
        frames: Arc<Mutex<Vec<String>>>,
    }

    impl FrameHandler for RecordingHandler {
        fn handle_frame(&mut self, text: &str) {
            lock(&self.frames).push(text.to_string());
        }
    }

    fn manager(connector: &FakeConnector) -> ConnectionManager<FakeConnector, RecordingHandler> {
        ConnectionManager::new(
            connector.clone(),
            "ws://scale.local/ws",
            DELAY,
            RecordingHandler::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn connect_then_open_marks_connected() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector);
        let observer = manager.state_observer();

        manager.connect();
        assert_eq!(manager.state(), ConnectionState::Connecting);
        assert!(!manager.is_open());

        connector.last().open();
        manager.process_ready();

        assert!(observer.is_connected());
        assert!(manager.is_open());
        assert_eq!(manager.pending_retries(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn close_arms_one_retry_that_waits_the_full_delay() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector);
        manager.connect();
        connector.last().open();
        manager.process_ready();

        connector.last().drop_link();
        manager.process_ready();

        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert_eq!(manager.pending_retries(), 1);
        assert_eq!(connector.links().len(), 1);

        let started = Instant::now();
        let event = manager.next_event().await.expect("retry event");
        assert_eq!(event, LinkEvent::RetryDue { generation: 1 });
        assert!(started.elapsed() >= DELAY);

        manager.handle_event(event);
        assert_eq!(connector.links().len(), 2);
        assert_eq!(manager.generation(), 2);
        assert_eq!(manager.state(), ConnectionState::Connecting);
        assert_eq!(manager.pending_retries(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_forever_at_a_constant_interval() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector);
        manager.connect();

        for attempt in 1..=4u64 {
            connector.last().drop_link();
            manager.process_ready();

            let started = Instant::now();
            let event = manager.next_event().await.expect("retry event");
            assert_eq!(event, LinkEvent::RetryDue { generation: attempt });
            assert!(started.elapsed() >= DELAY);
            assert!(started.elapsed() < DELAY * 2);
            manager.handle_event(event);
        }

        assert_eq!(connector.links().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn replacing_closes_the_previous_transport_first() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector);
        manager.connect();
        connector.last().open();
        manager.process_ready();

        manager.connect();

        let links = connector.links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].state(), TransportState::Closed);
        assert_eq!(connector.overlaps.load(Ordering::SeqCst), 0);

        // The replaced transport's close is stale: state follows the new one.
        manager.process_ready();
        assert_eq!(manager.state(), ConnectionState::Connecting);
        assert_eq!(manager.pending_retries(), 1);

        links[1].open();
        manager.process_ready();
        assert_eq!(manager.state(), ConnectionState::Connected);

        // The stale retry fires but leaves the live transport alone.
        let event = manager.next_event().await.expect("retry event");
        assert_eq!(event, LinkEvent::RetryDue { generation: 1 });
        manager.handle_event(event);

        assert_eq!(connector.links().len(), 2);
        assert_eq!(links[1].state(), TransportState::Open);
        assert_eq!(manager.state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn construction_failure_is_treated_as_close() {
        let connector = FakeConnector::default();
        connector.fail_construction(true);
        let mut manager = manager(&connector);

        manager.connect();
        assert_eq!(manager.state(), ConnectionState::Disconnected);
        assert_eq!(manager.pending_retries(), 1);
        assert!(connector.links().is_empty());

        connector.fail_construction(false);
        let event = manager.next_event().await.expect("retry event");
        manager.handle_event(event);

        assert_eq!(connector.links().len(), 1);
        assert_eq!(manager.state(), ConnectionState::Connecting);
    }

    #[tokio::test(start_paused = true)]
    async fn frames_reach_the_handler_only_from_the_current_transport() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector);
        manager.connect();
        let first = connector.last();
        first.open();
        first.deliver(r#"{"type":"weight","value":1}"#);
        manager.process_ready();

        manager.connect();
        first.deliver(r#"{"type":"weight","value":2}"#);
        connector.last().deliver(r#"{"type":"weight","value":3}"#);
        manager.process_ready();

        let frames = lock(&manager.handler().frames).clone();
        assert_eq!(
            frames,
            vec![
                r#"{"type":"weight","value":1}"#.to_string(),
                r#"{"type":"weight","value":3}"#.to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn liveness_never_sends_unless_open() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector);
        let liveness = LivenessEmitter::new(DELAY);

        assert!(!liveness.tick(&mut manager));

        manager.connect();
        assert!(!liveness.tick(&mut manager));

        let link = connector.last();
        link.open();
        manager.process_ready();
        assert!(liveness.tick(&mut manager));
        assert_eq!(link.sent(), vec![r#"{"type":"heartbeat"}"#.to_string()]);

        link.drop_link();
        manager.process_ready();
        assert!(!liveness.tick(&mut manager));
        assert_eq!(link.sent().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn send_without_open_transport_is_rejected() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector);

        let result = manager.send(&ClientMessage::tare());
        assert!(matches!(result, Err(SendError::NotConnected)));
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_sends_heartbeats_and_commands_until_shutdown() {
        let connector = FakeConnector::default();
        let manager = manager(&connector);
        let commands = manager.command_bus();
        let observer = manager.state_observer();
        let shutdown = CancellationToken::new();

        let task = tokio::spawn(manager.run(LivenessEmitter::new(DELAY), shutdown.clone()));

        tokio::time::sleep(Duration::from_millis(1)).await;
        let link = connector.last();
        link.open();
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(observer.is_connected());

        tokio::time::sleep(DELAY).await;
        assert_eq!(link.sent(), vec![r#"{"type":"heartbeat"}"#.to_string()]);

        commands.send(ClientMessage::tare()).expect("queue command");
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(
            link.sent().last().map(String::as_str),
            Some(r#"{"type":"scale","payload":"tare"}"#)
        );

        shutdown.cancel();
        task.await.expect("event loop");
        assert_eq!(link.state(), TransportState::Closed);
        assert!(!observer.is_connected());
    }
}
