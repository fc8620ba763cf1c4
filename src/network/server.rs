//! WebSocket Transport
//!
//! Async WebSocket implementation of [`Transport`]. Socket tasks never
//! touch the simulation: the accept loop and per-client reader tasks feed
//! bounded queues, and the tick loop drains them through the trait's
//! non-blocking polls. Connect and disconnect land in the same per-tick
//! event queue as everything else.
//!
//! Channel qualities map onto the single ordered socket by backpressure
//! policy: reliable traffic that cannot be queued is logged loudly,
//! unreliable per-tick state is shed silently.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::game::state::PlayerId;
use crate::network::protocol::{Channel, ClientMessage, MoveUpdate, ServerMessage};
use crate::network::transport::{ClientIndex, InboundMessage, PeerEvent, Transport};

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Tick rate for the simulation (Hz).
    pub tick_rate: u32,
    /// Maximum concurrent connections (two-player game: 2).
    pub max_clients: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:9090".parse().unwrap(),
            tick_rate: crate::TICK_RATE,
            max_clients: 2,
        }
    }
}

/// Transport errors. Bind failure is fatal: the tick loop never starts.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to bind the listener.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket protocol error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
}

// =============================================================================
// INTERNAL PLUMBING
// =============================================================================

/// Socket-task -> tick-loop link lifecycle notifications.
enum LinkEvent {
    Open {
        client: ClientIndex,
        identity: PlayerId,
        sender: mpsc::Sender<Message>,
    },
    Closed {
        client: ClientIndex,
    },
}

/// One connected client as seen from the tick loop.
struct ClientLink {
    identity: PlayerId,
    sender: mpsc::Sender<Message>,
}

enum OutboundTarget {
    One(ClientIndex),
    All,
}

/// A message queued by `send`/`broadcast`, delivered on `flush`.
struct Outbound {
    target: OutboundTarget,
    channel: Channel,
    message: ServerMessage,
}

// =============================================================================
// WEBSOCKET SERVER
// =============================================================================

/// WebSocket-backed [`Transport`].
pub struct WsServer {
    local_addr: SocketAddr,
    links: BTreeMap<ClientIndex, ClientLink>,
    link_rx: mpsc::Receiver<LinkEvent>,
    inbound_rx: mpsc::Receiver<InboundMessage>,
    outbox: Vec<Outbound>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl WsServer {
    /// Bind the listener and start accepting connections.
    pub async fn bind(config: &ServerConfig) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(&config.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        let (link_tx, link_rx) = mpsc::channel(64);
        let (inbound_tx, inbound_rx) = mpsc::channel(1024);
        let (shutdown_tx, _) = broadcast::channel(1);
        let running = Arc::new(AtomicBool::new(true));

        tokio::spawn(run_accept_loop(
            listener,
            link_tx,
            inbound_tx,
            config.max_clients,
            running.clone(),
            shutdown_tx.clone(),
        ));

        Ok(Self {
            local_addr,
            links: BTreeMap::new(),
            link_rx,
            inbound_rx,
            outbox: Vec::new(),
            running,
            shutdown_tx,
        })
    }

    /// The address the listener actually bound.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Number of clients with a live link.
    pub fn client_count(&self) -> usize {
        self.links.len()
    }
}

impl Transport for WsServer {
    fn poll_events(&mut self) -> Vec<PeerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.link_rx.try_recv() {
            match event {
                LinkEvent::Open {
                    client,
                    identity,
                    sender,
                } => {
                    self.links.insert(client, ClientLink { identity, sender });
                    events.push(PeerEvent::Connected { client, identity });
                }
                LinkEvent::Closed { client } => {
                    if let Some(link) = self.links.remove(&client) {
                        events.push(PeerEvent::Disconnected {
                            client,
                            identity: link.identity,
                        });
                    }
                }
            }
        }
        events
    }

    fn drain_batch(&mut self) -> Vec<InboundMessage> {
        let mut batch = Vec::new();
        while let Ok(message) = self.inbound_rx.try_recv() {
            batch.push(message);
        }
        batch
    }

    fn send(&mut self, client: ClientIndex, channel: Channel, message: ServerMessage) {
        self.outbox.push(Outbound {
            target: OutboundTarget::One(client),
            channel,
            message,
        });
    }

    fn broadcast(&mut self, channel: Channel, message: ServerMessage) {
        self.outbox.push(Outbound {
            target: OutboundTarget::All,
            channel,
            message,
        });
    }

    fn flush(&mut self) {
        for outbound in self.outbox.drain(..) {
            let text = match outbound.message.to_json() {
                Ok(t) => t,
                Err(e) => {
                    error!("Failed to serialize outbound message: {}", e);
                    continue;
                }
            };

            match outbound.target {
                OutboundTarget::One(client) => {
                    if let Some(link) = self.links.get(&client) {
                        queue_frame(link, client, outbound.channel, Message::Text(text));
                    }
                }
                OutboundTarget::All => {
                    for (client, link) in &self.links {
                        queue_frame(link, *client, outbound.channel, Message::Text(text.clone()));
                    }
                }
            }
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn shutdown(&mut self) {
        let _ = self.shutdown_tx.send(());
        self.running.store(false, Ordering::SeqCst);
        self.links.clear();
        info!("Transport shut down");
    }
}

/// Hand one frame to a client's writer task, honoring channel quality on
/// backpressure: unreliable state is shed silently, reliable drops are
/// loud.
fn queue_frame(link: &ClientLink, client: ClientIndex, channel: Channel, frame: Message) {
    if link.sender.try_send(frame).is_err() {
        match channel {
            Channel::Reliable => warn!("Dropping reliable message to client {}", client),
            Channel::Unreliable => debug!("Shedding state broadcast to client {}", client),
        }
    }
}

// =============================================================================
// SOCKET TASKS
// =============================================================================

/// Accept connections until shutdown or listener failure.
async fn run_accept_loop(
    listener: TcpListener,
    link_tx: mpsc::Sender<LinkEvent>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    max_clients: usize,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
) {
    let connected = Arc::new(AtomicUsize::new(0));
    let mut shutdown_rx = shutdown_tx.subscribe();
    let mut next_index: ClientIndex = 0;

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, addr)) => {
                        if connected.load(Ordering::SeqCst) >= max_clients {
                            warn!("Connection limit reached, rejecting {}", addr);
                            continue;
                        }

                        let client = next_index;
                        next_index += 1;
                        connected.fetch_add(1, Ordering::SeqCst);
                        info!("New connection from {} as client {}", addr, client);

                        tokio::spawn(run_client(
                            stream,
                            addr,
                            client,
                            link_tx.clone(),
                            inbound_tx.clone(),
                            connected.clone(),
                            shutdown_tx.clone(),
                        ));
                    }
                    Err(e) => {
                        error!("Accept error: {}", e);
                        break;
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    running.store(false, Ordering::SeqCst);
}

/// Drive one client connection: handshake, identity, reader loop, writer
/// task. Unknown message kinds fail decoding here and are dropped.
async fn run_client(
    stream: TcpStream,
    addr: SocketAddr,
    client: ClientIndex,
    link_tx: mpsc::Sender<LinkEvent>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    connected: Arc<AtomicUsize>,
    shutdown_tx: broadcast::Sender<()>,
) {
    let mut shutdown_rx = shutdown_tx.subscribe();

    let ws_stream = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(e) => {
            error!("WebSocket handshake failed for {}: {}", addr, e);
            connected.fetch_sub(1, Ordering::SeqCst);
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (msg_tx, mut msg_rx) = mpsc::channel::<Message>(64);
    let identity = PlayerId::new(*uuid::Uuid::new_v4().as_bytes());

    if link_tx
        .send(LinkEvent::Open {
            client,
            identity,
            sender: msg_tx,
        })
        .await
        .is_err()
    {
        connected.fetch_sub(1, Ordering::SeqCst);
        return;
    }

    // Writer task: pushes queued frames onto the socket.
    let sender_task = tokio::spawn(async move {
        while let Some(frame) = msg_rx.recv().await {
            if ws_sender.send(frame).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match ClientMessage::from_json(&text) {
                            Ok(message) => forward(&inbound_tx, client, message),
                            Err(e) => debug!("Ignoring message from {}: {}", addr, e),
                        }
                    }
                    Some(Ok(Message::Binary(data))) => {
                        // Compact movement path.
                        match MoveUpdate::from_bytes(&data) {
                            Ok(update) => {
                                forward(&inbound_tx, client, ClientMessage::Move(update));
                            }
                            Err(e) => debug!("Ignoring binary frame from {}: {}", addr, e),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!("Client {} disconnected", addr);
                        break;
                    }
                    Some(Err(e)) => {
                        warn!("WebSocket error for {}: {}", addr, e);
                        break;
                    }
                    _ => {}
                }
            }
            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }

    sender_task.abort();
    connected.fetch_sub(1, Ordering::SeqCst);
    let _ = link_tx
        .send(LinkEvent::Closed { client })
        .await;
    info!("Client {} cleaned up", addr);
}

/// Non-blocking hand-off to the tick loop's inbound queue. A full queue
/// means the loop is behind; shed rather than stall the socket task.
fn forward(inbound_tx: &mpsc::Sender<InboundMessage>, client: ClientIndex, message: ClientMessage) {
    if inbound_tx
        .try_send(InboundMessage { client, message })
        .is_err()
    {
        warn!("Inbound queue full, dropping message from client {}", client);
    }
}

// =============================================================================
// TESTS
// =============================================================================
