//! Push channel to the monitoring backend
//!
//! This module keeps exactly one WebSocket open to `/ws`, decodes every
//! inbound message in arrival order into the [`DashboardStore`], and
//! reconnects after a fixed delay whenever the channel closes. The retry
//! loop is an explicit state machine so the infinite, fixed-delay retry
//! policy is a testable contract:
//!
//! ```text
//! Connecting --Opened--> Open --Closed--> ClosedPendingRetry
//!      ^                                        |
//!      +---------------RetryElapsed-------------+
//! any --Teardown--> Stopped
//! ```

use crate::alert_sound::AlertSound;
use crate::store::DashboardStore;
use crowd_monitor_shared::{CrowdMonitorError, MonitorResult, PushMessage};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Fixed delay between a close and the next connection attempt
pub const RECONNECT_DELAY: Duration = Duration::from_millis(2000);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Connecting,
    Open,
    ClosedPendingRetry,
    Stopped,
}

/// Inputs to the reconnect state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened,
    /// Normal close, error, or a failed connection attempt
    Closed,
    RetryElapsed,
    Teardown,
}

/// Work the driver must perform after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    OpenChannel,
    ScheduleRetry(Duration),
    CloseChannel,
}

/// Pure reconnect state machine. The retry timer is the only way out of
/// `ClosedPendingRetry`; there is no backoff growth and no attempt limit.
#[derive(Debug, Clone)]
pub struct ReconnectMachine {
    phase: ConnectionPhase,
    delay: Duration,
    retries_scheduled: u64,
}

impl ReconnectMachine {
    pub fn new(delay: Duration) -> Self {
        Self {
            phase: ConnectionPhase::Connecting,
            delay,
            retries_scheduled: 0,
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.phase
    }

    pub fn retries_scheduled(&self) -> u64 {
        self.retries_scheduled
    }

    pub fn handle(&mut self, event: ChannelEvent) -> Effect {
        use ChannelEvent::*;
        use ConnectionPhase::*;

        let (next, effect) = match (self.phase, event) {
            (Stopped, _) => (Stopped, Effect::None),
            (_, Teardown) => (Stopped, Effect::CloseChannel),
            (Connecting, Opened) => (Open, Effect::None),
            (Connecting | Open, Closed) => {
                self.retries_scheduled += 1;
                (ClosedPendingRetry, Effect::ScheduleRetry(self.delay))
            }
            (ClosedPendingRetry, RetryElapsed) => (Connecting, Effect::OpenChannel),
            // Duplicate opens, repeated closes and stray timers change nothing
            (phase, _) => (phase, Effect::None),
        };

        if next != self.phase {
            log::debug!("Push channel {:?} -> {:?} on {:?}", self.phase, next, event);
        }
        self.phase = next;
        effect
    }
}

/// Applies decoded push messages to the store
#[derive(Clone)]
pub struct PushHandler {
    store: DashboardStore,
    sound: Arc<dyn AlertSound>,
}

impl PushHandler {
    pub fn new(store: DashboardStore, sound: Arc<dyn AlertSound>) -> Self {
        Self { store, sound }
    }

    /// Decode and apply one text message. Undecodable payloads are logged
    /// and dropped.
    pub fn handle_text(&self, text: &str) -> MonitorResult<()> {
        let message = PushMessage::decode(text).map_err(|e| {
            log::error!("[WS] Parse error: {e}");
            e
        })?;

        match message {
            PushMessage::FrameUpdate { areas, perf } => {
                log::trace!("[WS] frame_update with {} areas", areas.len());
                self.store.replace_areas(areas, perf);
            }
            PushMessage::Alert(alert) => {
                log::info!("[WS] Alert for {}: {}", alert.area, alert.reason);
                if self.store.push_alert(alert) {
                    self.sound.play_alert();
                }
            }
        }
        Ok(())
    }
}

/// Owner of the single push channel
pub struct ConnectionManager {
    url: String,
    handler: PushHandler,
    machine: Arc<Mutex<ReconnectMachine>>,
    task: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl ConnectionManager {
    pub fn new(url: String, delay: Duration, handler: PushHandler) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            url,
            handler,
            machine: Arc::new(Mutex::new(ReconnectMachine::new(delay))),
            task: Mutex::new(None),
            shutdown_tx,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.machine.lock().phase()
    }

    pub fn retries_scheduled(&self) -> u64 {
        self.machine.lock().retries_scheduled()
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Start the connection loop. Returns false, without opening anything,
    /// if a channel is already live or the manager was torn down.
    pub fn start(&self) -> bool {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            log::debug!("[WS] Channel already active, not opening another");
            return false;
        }
        if *self.shutdown_tx.borrow() {
            log::debug!("[WS] Manager torn down, not connecting");
            return false;
        }

        let url = self.url.clone();
        let handler = self.handler.clone();
        let machine = Arc::clone(&self.machine);
        let shutdown_rx = self.shutdown_tx.subscribe();

        *task = Some(tokio::spawn(async move {
            Self::run(url, handler, machine, shutdown_rx).await;
        }));
        true
    }

    /// Close the channel and cancel any pending retry timer
    pub async fn shutdown(&self) {
        self.machine.lock().handle(ChannelEvent::Teardown);
        self.shutdown_tx.send_replace(true);

        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    log::error!("[WS] Connection task failed: {e}");
                }
            }
        }
    }

    async fn run(
        url: String,
        handler: PushHandler,
        machine: Arc<Mutex<ReconnectMachine>>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let attempt = tokio::select! {
                result = connect_async(url.as_str()) => result,
                _ = shutdown_rx.changed() => break,
            };

            match attempt {
                Ok((ws_stream, _)) => {
                    machine.lock().handle(ChannelEvent::Opened);
                    handler.store.set_connected(true);
                    log::info!("[WS] Connected to {url}");

                    match Self::pump(ws_stream, &handler, &mut shutdown_rx).await {
                        Ok(PumpExit::Teardown) => break,
                        Ok(PumpExit::Closed) => {}
                        Err(e) => log::warn!("{e}"),
                    }
                }
                Err(e) => log::warn!("[WS] Connection to {url} failed: {e}"),
            }

            handler.store.set_connected(false);

            let delay = match machine.lock().handle(ChannelEvent::Closed) {
                Effect::ScheduleRetry(delay) => delay,
                _ => break,
            };
            log::info!("[WS] Disconnected, reconnecting in {}ms...", delay.as_millis());

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown_rx.changed() => break,
            }

            if machine.lock().handle(ChannelEvent::RetryElapsed) != Effect::OpenChannel {
                break;
            }
        }

        log::debug!("[WS] Connection loop stopped");
    }

    /// Read messages until the channel closes or teardown is requested
    async fn pump(
        ws_stream: WsStream,
        handler: &PushHandler,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> MonitorResult<PumpExit> {
        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            // Decode failures are logged by the handler; the channel stays up
                            let _ = handler.handle_text(&text);
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await.map_err(|e| {
                                CrowdMonitorError::Channel {
                                    message: format!("Failed to send pong: {e}"),
                                }
                            })?;
                        }
                        Some(Ok(Message::Close(_))) => {
                            log::info!("[WS] Closed by server");
                            return Ok(PumpExit::Closed);
                        }
                        Some(Ok(_)) => {
                            // Binary, pong and raw frames carry nothing for us
                        }
                        Some(Err(e)) => {
                            return Err(CrowdMonitorError::Channel {
                                message: format!("[WS] Error: {e}"),
                            });
                        }
                        None => return Ok(PumpExit::Closed),
                    }
                }
                _ = shutdown_rx.changed() => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(PumpExit::Teardown);
                }
            }
        }
    }
}

enum PumpExit {
    Closed,
    Teardown,
}
