//! Live feed client: one task per client driving the connection state machine

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::connection::{Action, ConnectionState, FeedSignal};
use super::transport::{FeedConnection, FeedFrame, FeedTransport, WsTransport};
use crate::config::{FeedConfig, DEFAULT_CONNECT_TIMEOUT};
use crate::state::ClientState;
use crate::types::Event;

/// Handle to the running feed task
struct Worker {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// Keeps a live connection to the backend feed and applies each event to [`ClientState`]
///
/// Owns its transport, its task and its shutdown signal; any number of independent
/// clients can exist side by side.
pub struct LiveFeedClient<T: FeedTransport = WsTransport> {
    transport: Arc<T>,
    state: Arc<ClientState>,
    reconnect_delay: Duration,
    connect_timeout: Duration,
    connection: watch::Sender<ConnectionState>,
    worker: Mutex<Option<Worker>>,
}

impl LiveFeedClient<WsTransport> {
    /// WebSocket client for the feed URL in `config`
    pub fn from_config(config: &FeedConfig, state: Arc<ClientState>) -> Self {
        Self::new(
            WsTransport::new(config.ws_url.clone()),
            state,
            config.reconnect_delay,
        )
        .with_connect_timeout(config.connect_timeout)
    }
}

impl<T: FeedTransport> LiveFeedClient<T> {
    pub fn new(transport: T, state: Arc<ClientState>, reconnect_delay: Duration) -> Self {
        let (connection, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            transport: Arc::new(transport),
            state,
            reconnect_delay,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            connection,
            worker: Mutex::new(None),
        }
    }

    /// Deadline for one connection attempt; an attempt that runs out counts as a failed
    /// handshake and is retried after the reconnect delay.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn state(&self) -> &Arc<ClientState> {
        &self.state
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.connection.borrow()
    }

    /// Observe connection state transitions
    pub fn watch_connection(&self) -> watch::Receiver<ConnectionState> {
        self.connection.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Start connecting. A no-op while already connecting or connected.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let mut worker = self.worker.lock();
        if worker.as_ref().is_some_and(|w| !w.handle.is_finished()) {
            debug!("live feed already running");
            return;
        }

        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = FeedTask {
            transport: Arc::clone(&self.transport),
            state: Arc::clone(&self.state),
            reconnect_delay: self.reconnect_delay,
            connect_timeout: self.connect_timeout,
            connection: self.connection.clone(),
            current: ConnectionState::Disconnected,
            shutdown: shutdown_rx,
        };
        *worker = Some(Worker {
            shutdown,
            handle: tokio::spawn(task.run()),
        });
    }

    /// Close the connection, cancel any pending reconnect and wait for the task to exit.
    ///
    /// Once this returns the client state is no longer mutated by this client.
    pub async fn stop(&self) {
        let Some(worker) = self.worker.lock().take() else {
            return;
        };

        let _ = worker.shutdown.send(());
        if let Err(e) = worker.handle.await {
            if e.is_panic() {
                warn!("live feed task panicked: {}", e);
            }
        }
        // The task flips this on teardown; make sure it holds even if it died early
        self.state.set_online(false);
        self.connection.send_replace(ConnectionState::Disconnected);
    }
}

impl<T: FeedTransport> Drop for LiveFeedClient<T> {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.get_mut().take() {
            worker.handle.abort();
        }
    }
}

/// State owned by the feed task
struct FeedTask<T: FeedTransport> {
    transport: Arc<T>,
    state: Arc<ClientState>,
    reconnect_delay: Duration,
    connect_timeout: Duration,
    connection: watch::Sender<ConnectionState>,
    current: ConnectionState,
    shutdown: oneshot::Receiver<()>,
}

impl<T: FeedTransport> FeedTask<T> {
    async fn run(mut self) {
        let mut conn: Option<T::Connection> = None;
        let mut frame: Option<FeedFrame> = None;
        let mut signal = FeedSignal::Connect;

        loop {
            let action = self.transition(signal);
            signal = match action {
                Action::OpenConnection => self.open(&mut conn).await,
                Action::GoOnline => {
                    info!("live feed connected");
                    self.state.set_online(true);
                    self.receive(&mut conn, &mut frame).await
                }
                Action::ApplyMessage => {
                    if let Some(FeedFrame::Text(text)) = frame.take() {
                        self.apply(&text);
                    }
                    self.receive(&mut conn, &mut frame).await
                }
                Action::ScheduleReconnect => {
                    conn = None;
                    self.wait_for_reconnect().await
                }
                Action::GoOfflineAndReconnect => {
                    conn = None;
                    info!("live feed disconnected");
                    self.state.set_online(false);
                    self.wait_for_reconnect().await
                }
                Action::Teardown => {
                    if let Some(conn) = conn.take() {
                        conn.close().await;
                    }
                    self.state.set_online(false);
                    debug!("live feed stopped");
                    return;
                }
                Action::None => {
                    debug!(state = %self.current, ?signal, "ignoring signal");
                    match self.current {
                        ConnectionState::Connected => self.receive(&mut conn, &mut frame).await,
                        _ => self.wait_for_reconnect().await,
                    }
                }
            };
        }
    }

    fn transition(&mut self, signal: FeedSignal) -> Action {
        let (next, action) = self.current.on(signal);
        if next != self.current {
            debug!(from = %self.current, to = %next, ?signal, "feed transition");
            self.current = next;
            self.connection.send_replace(next);
        }
        action
    }

    async fn open(&mut self, conn: &mut Option<T::Connection>) -> FeedSignal {
        tokio::select! {
            biased;
            _ = &mut self.shutdown => FeedSignal::Shutdown,
            result = tokio::time::timeout(self.connect_timeout, self.transport.connect()) => match result {
                Ok(Ok(opened)) => {
                    *conn = Some(opened);
                    FeedSignal::HandshakeSucceeded
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "live feed connection failed");
                    FeedSignal::HandshakeFailed
                }
                Err(_) => {
                    warn!(
                        timeout_ms = self.connect_timeout.as_millis() as u64,
                        "live feed handshake timed out"
                    );
                    FeedSignal::HandshakeFailed
                }
            },
        }
    }

    async fn receive(
        &mut self,
        conn: &mut Option<T::Connection>,
        frame: &mut Option<FeedFrame>,
    ) -> FeedSignal {
        let Some(open) = conn.as_mut() else {
            return FeedSignal::Closed;
        };

        tokio::select! {
            biased;
            _ = &mut self.shutdown => FeedSignal::Shutdown,
            next = open.next_frame() => match next {
                Some(Ok(received)) => {
                    *frame = Some(received);
                    FeedSignal::Message
                }
                Some(Err(e)) => {
                    warn!(error = %e, "live feed connection error");
                    FeedSignal::Closed
                }
                None => FeedSignal::Closed,
            },
        }
    }

    /// Single pending retry after the fixed delay, cancelled by shutdown
    async fn wait_for_reconnect(&mut self) -> FeedSignal {
        debug!(delay_ms = self.reconnect_delay.as_millis() as u64, "scheduling reconnect");
        tokio::select! {
            biased;
            _ = &mut self.shutdown => FeedSignal::Shutdown,
            _ = tokio::time::sleep(self.reconnect_delay) => FeedSignal::Connect,
        }
    }

    /// Decode and apply one message; malformed payloads are dropped
    fn apply(&self, text: &str) {
        match Event::from_message(text) {
            Ok(event) => {
                debug!(
                    severity = %event.severity,
                    event_type = %event.event_type,
                    pid = event.pid,
                    "feed event"
                );
                self.state.apply_live_event(event);
            }
            Err(e) => warn!(error = %e, "dropping malformed feed message"),
        }
    }
}
