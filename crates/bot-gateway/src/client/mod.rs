//! Gateway client transport wiring
//!
//! Owns the connection lifecycle: dial, split, writer task, heartbeat
//! watchdog, and the inline read loop that feeds the dispatcher one frame at
//! a time. Every failure path ends in "attempt to reconnect"; only an
//! external close terminates the loop.

use crate::cache::CacheStore;
use crate::dispatch::EventDispatcher;
use crate::error::{GatewayError, GatewayResult};
use crate::events::EventSink;
use crate::heartbeat::{HeartbeatMonitor, HeartbeatState};
use crate::protocol::{ClientProperties, Envelope};
use crate::session::{Session, SessionCommand, SessionMachine};
use bot_common::BotConfig;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::{Error as WsError, Message as WsMessage};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Cheap handle for interacting with a running client
#[derive(Clone)]
pub struct ClientHandle {
    cache: Arc<CacheStore>,
    session: Arc<Session>,
    control: mpsc::UnboundedSender<SessionCommand>,
}

impl ClientHandle {
    /// Fire-and-forget send toward the gateway; queued until a session exists
    pub fn send(&self, envelope: Envelope) {
        self.session.send(envelope);
    }

    /// Read access to the entity cache
    #[must_use]
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// The authenticated user, once READY has been seen
    #[must_use]
    pub fn current_user(&self) -> Option<bot_core::User> {
        self.session.user()
    }

    /// Close the client; the run loop exits instead of reconnecting
    pub fn close(&self, reason: &str) {
        tracing::info!(reason = %reason, "closing gateway client");
        let _ = self.control.send(SessionCommand::Shutdown);
    }
}

/// Persistent gateway client
///
/// `run` maintains one connection at a time, reconnecting on every fault
/// until externally closed.
pub struct GatewayClient {
    config: BotConfig,
    cache: Arc<CacheStore>,
    session: Arc<Session>,
    heartbeat: Arc<HeartbeatState>,
    sink: Arc<dyn EventSink>,
    control_tx: mpsc::UnboundedSender<SessionCommand>,
    control_rx: mpsc::UnboundedReceiver<SessionCommand>,
}

impl GatewayClient {
    /// Create a client that will deliver semantic events to `sink`
    #[must_use]
    pub fn new(config: BotConfig, sink: Arc<dyn EventSink>) -> Self {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        Self {
            config,
            cache: Arc::new(CacheStore::new()),
            session: Arc::new(Session::new()),
            heartbeat: Arc::new(HeartbeatState::new()),
            sink,
            control_tx,
            control_rx,
        }
    }

    /// Get a handle usable from other tasks
    #[must_use]
    pub fn handle(&self) -> ClientHandle {
        ClientHandle {
            cache: self.cache.clone(),
            session: self.session.clone(),
            control: self.control_tx.clone(),
        }
    }

    /// Run until externally closed
    ///
    /// Remote-requested restarts reconnect immediately; only consecutive
    /// dial failures back off, bounded by the configured maximum.
    pub async fn run(mut self) -> GatewayResult<()> {
        let properties = ClientProperties::new(&self.config.app.name);
        let mut dial_failures: u32 = 0;

        loop {
            if self.poll_shutdown() {
                self.session.clear_id();
                return Ok(());
            }

            tracing::info!(url = %self.config.gateway_url, "connecting to gateway");
            let socket = match connect_async(self.config.gateway_url.as_str()).await {
                Ok((socket, _response)) => {
                    dial_failures = 0;
                    socket
                }
                Err(err) => {
                    dial_failures += 1;
                    let delay = self.dial_delay(dial_failures);
                    tracing::warn!(
                        error = %GatewayError::from(err),
                        attempt = dial_failures,
                        delay_ms = delay.as_millis() as u64,
                        "gateway dial failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
            };

            match self.drive_connection(socket, &properties).await {
                Ok(()) => {
                    // External close: the next start must identify fresh
                    self.session.clear_id();
                    tracing::info!("gateway client closed");
                    return Ok(());
                }
                Err(err) => {
                    if !err.preserves_session() {
                        self.session.clear_id();
                    }
                    tracing::warn!(error = %err, "gateway connection lost, reconnecting");
                }
            }
        }
    }

    /// Drive one connection until it ends
    ///
    /// Ok means an external close; Err carries the fault that forces the
    /// reconnect.
    async fn drive_connection(
        &mut self,
        socket: Socket,
        properties: &ClientProperties,
    ) -> GatewayResult<()> {
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Envelope>();
        self.heartbeat.reset();
        self.session.attach_outbound(outbound_tx.clone());

        let machine = SessionMachine::new(
            self.config.token.clone(),
            properties.clone(),
            self.session.clone(),
            self.heartbeat.clone(),
        );
        let mut dispatcher = EventDispatcher::new(
            self.cache.clone(),
            self.sink.clone(),
            self.heartbeat.clone(),
            machine,
        );

        let (mut ws_sink, mut ws_stream) = socket.split();

        // Writer task drains the outbound queue; sends are fire-and-forget
        // with no ordering guarantee beyond the transport's write order.
        let writer = tokio::spawn(async move {
            while let Some(envelope) = outbound_rx.recv().await {
                match envelope.to_json() {
                    Ok(json) => {
                        if ws_sink.send(WsMessage::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to encode outbound envelope");
                    }
                }
            }
            let _ = ws_sink.close().await;
        });

        let monitor = tokio::spawn(
            HeartbeatMonitor::new(
                self.heartbeat.clone(),
                outbound_tx,
                self.control_tx.clone(),
            )
            .run(),
        );

        dispatcher.machine_mut().on_open();

        let result = self.read_loop(&mut ws_stream, &mut dispatcher).await;

        dispatcher.machine_mut().close();
        writer.abort();
        monitor.abort();
        result
    }

    /// Read frames until the connection ends
    ///
    /// The dispatcher runs inline here, so all cache mutation is serialized
    /// by construction: no frame is processed until the prior dispatch (and
    /// its synchronous sink calls) completes.
    async fn read_loop(
        &mut self,
        stream: &mut futures_util::stream::SplitStream<Socket>,
        dispatcher: &mut EventDispatcher,
    ) -> GatewayResult<()> {
        loop {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        match Envelope::from_json(&text) {
                            Ok(envelope) => {
                                tracing::trace!(envelope = %envelope, "frame received");
                                match dispatcher.handle(envelope) {
                                    Some(SessionCommand::Fault(err)) => return Err(err),
                                    Some(SessionCommand::Shutdown) => return Ok(()),
                                    None => {}
                                }
                            }
                            Err(err) => {
                                tracing::debug!(
                                    error = %GatewayError::Protocol(err.to_string()),
                                    "dropping undecodable frame"
                                );
                            }
                        }
                    }
                    Some(Ok(WsMessage::Binary(_))) => {
                        tracing::debug!("binary frames not supported, dropping");
                    }
                    Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_) | WsMessage::Frame(_))) => {}
                    Some(Ok(WsMessage::Close(frame))) => {
                        tracing::info!(frame = ?frame, "gateway closed the connection");
                        return Err(GatewayError::Transport(WsError::ConnectionClosed));
                    }
                    Some(Err(err)) => return Err(GatewayError::Transport(err)),
                    None => return Err(GatewayError::Transport(WsError::ConnectionClosed)),
                },
                Some(command) = self.control_rx.recv() => match command {
                    SessionCommand::Fault(err) => return Err(err),
                    SessionCommand::Shutdown => return Ok(()),
                },
            }
        }
    }

    // Drain queued control commands; stale watchdog faults from a finished
    // connection must not kill the next one. Only Shutdown survives.
    fn poll_shutdown(&mut self) -> bool {
        while let Ok(command) = self.control_rx.try_recv() {
            if matches!(command, SessionCommand::Shutdown) {
                return true;
            }
        }
        false
    }

    fn dial_delay(&self, failures: u32) -> Duration {
        let base = self.config.reconnect.base_delay_ms.max(1);
        let max = self.config.reconnect.max_delay_ms.max(base);
        let shift = failures.saturating_sub(1).min(16);
        Duration::from_millis(base.saturating_mul(1u64 << shift).min(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventRegistry, SemanticEvent};
    use bot_common::{AppSettings, Environment, ReconnectConfig};

    fn test_config(url: &str) -> BotConfig {
        BotConfig {
            app: AppSettings {
                name: "test-bot".to_string(),
                env: Environment::Development,
            },
            gateway_url: url.to_string(),
            token: "token123".to_string(),
            reconnect: ReconnectConfig {
                base_delay_ms: 1_000,
                max_delay_ms: 60_000,
            },
        }
    }

    fn test_client(url: &str) -> GatewayClient {
        GatewayClient::new(test_config(url), Arc::new(EventRegistry::new()))
    }

    #[test]
    fn test_dial_delay_backs_off_bounded() {
        let client = test_client("ws://localhost:0");

        assert_eq!(client.dial_delay(1), Duration::from_millis(1_000));
        assert_eq!(client.dial_delay(2), Duration::from_millis(2_000));
        assert_eq!(client.dial_delay(3), Duration::from_millis(4_000));
        // Bounded by the configured maximum
        assert_eq!(client.dial_delay(12), Duration::from_millis(60_000));
        assert_eq!(client.dial_delay(40), Duration::from_millis(60_000));
    }

    #[test]
    fn test_poll_shutdown_discards_stale_faults() {
        let mut client = test_client("ws://localhost:0");
        let handle = client.handle();

        client
            .control_tx
            .send(SessionCommand::Fault(GatewayError::Liveness))
            .unwrap();
        assert!(!client.poll_shutdown());

        handle.close("test");
        client
            .control_tx
            .send(SessionCommand::Fault(GatewayError::Liveness))
            .unwrap();
        assert!(client.poll_shutdown());
    }

    #[test]
    fn test_handle_queues_sends_before_session() {
        let client = test_client("ws://localhost:0");
        let handle = client.handle();

        handle.send(Envelope::heartbeat(0));
        assert_eq!(client.session.drain_pending().len(), 1);
        assert!(handle.current_user().is_none());
    }

    #[tokio::test]
    async fn test_close_stops_run_loop() {
        // Port 1 refuses connections, so the client cycles through dial
        // failures until the shutdown command is observed.
        let mut config = test_config("ws://127.0.0.1:1");
        config.reconnect.base_delay_ms = 10;
        config.reconnect.max_delay_ms = 10;
        let client = GatewayClient::new(config, Arc::new(EventRegistry::new()));
        let handle = client.handle();

        let task = tokio::spawn(client.run());
        handle.close("test over");

        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("run loop did not stop")
            .expect("run task panicked");
        assert!(result.is_ok());
    }

    #[test]
    fn test_registry_is_a_sink() {
        // The registry used by the binary satisfies the sink contract
        let registry: Arc<dyn EventSink> = Arc::new(EventRegistry::new());
        registry.emit(SemanticEvent::Connected);
    }
}
