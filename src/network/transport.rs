//! Transport Boundary
//!
//! The seam between the simulation and whatever carries its packets. The
//! tick engine consumes this trait and nothing else from `network/`, so
//! the simulation can be driven by the WebSocket server in production and
//! by a scripted in-memory transport in tests.
//!
//! All methods are non-blocking polls: the tick loop never suspends on
//! transport I/O. Connect/disconnect notifications are queued by the
//! transport and surfaced through [`Transport::poll_events`], so world
//! state is only ever mutated from the tick loop.

use crate::game::state::PlayerId;
use crate::network::protocol::{Channel, ClientMessage, ServerMessage};

/// Index of a connected client, assigned by the transport at accept time.
pub type ClientIndex = u32;

/// One decoded inbound message.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Originating client.
    pub client: ClientIndex,
    /// The decoded message.
    pub message: ClientMessage,
}

/// Connection lifecycle notification, drained once per tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    /// A client finished connecting.
    Connected {
        /// Transport-assigned client index.
        client: ClientIndex,
        /// Stable identity for the connection's lifetime.
        identity: PlayerId,
    },
    /// A client disconnected or its socket failed.
    Disconnected {
        /// Transport-assigned client index.
        client: ClientIndex,
        /// Identity the connection carried.
        identity: PlayerId,
    },
}

/// Message carrier consumed by the tick engine.
pub trait Transport {
    /// Receive pass: surface connection events queued since the last tick.
    fn poll_events(&mut self) -> Vec<PeerEvent>;

    /// Take the batch of messages that arrived since the last call.
    /// Arrival order within the batch carries no meaning.
    fn drain_batch(&mut self) -> Vec<InboundMessage>;

    /// Queue a message to one client.
    fn send(&mut self, client: ClientIndex, channel: Channel, message: ServerMessage);

    /// Queue a message to every connected client.
    fn broadcast(&mut self, channel: Channel, message: ServerMessage);

    /// Send pass: push everything queued by `send`/`broadcast` out.
    fn flush(&mut self);

    /// False once the transport has failed or been shut down; the tick
    /// loop exits after its next send pass.
    fn is_running(&self) -> bool;

    /// Tear the transport down. Called once, after the loop exits.
    fn shutdown(&mut self);
}

// =============================================================================
// TEST TRANSPORT
// =============================================================================

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-memory transport for driving the tick body in tests.

    use super::*;

    /// Records outbound traffic and feeds pre-scripted batches and events.
    #[derive(Debug, Default)]
    pub struct TestTransport {
        /// Events returned (and cleared) by the next `poll_events`.
        pub pending_events: Vec<PeerEvent>,
        /// Batch returned (and cleared) by the next `drain_batch`.
        pub pending_batch: Vec<InboundMessage>,
        /// Every `broadcast` call, in order.
        pub broadcasts: Vec<(Channel, ServerMessage)>,
        /// Every `send` call, in order.
        pub sent: Vec<(ClientIndex, Channel, ServerMessage)>,
        /// Number of completed send passes.
        pub flushes: usize,
        /// Simulated mid-loop transport failure when true.
        pub failed: bool,
        /// Set by `shutdown`.
        pub shut_down: bool,
    }

    impl TestTransport {
        /// Fresh transport with nothing scripted.
        pub fn new() -> Self {
            Self::default()
        }

        /// Script the batch the next tick will drain.
        pub fn push_batch(&mut self, messages: Vec<ClientMessage>) {
            self.pending_batch
                .extend(messages.into_iter().map(|message| InboundMessage {
                    client: 0,
                    message,
                }));
        }

        /// Broadcasts recorded so far, dropping channel tags.
        pub fn broadcast_messages(&self) -> Vec<&ServerMessage> {
            self.broadcasts.iter().map(|(_, m)| m).collect()
        }
    }

    impl Transport for TestTransport {
        fn poll_events(&mut self) -> Vec<PeerEvent> {
            std::mem::take(&mut self.pending_events)
        }

        fn drain_batch(&mut self) -> Vec<InboundMessage> {
            std::mem::take(&mut self.pending_batch)
        }

        fn send(&mut self, client: ClientIndex, channel: Channel, message: ServerMessage) {
            self.sent.push((client, channel, message));
        }

        fn broadcast(&mut self, channel: Channel, message: ServerMessage) {
            self.broadcasts.push((channel, message));
        }

        fn flush(&mut self) {
            self.flushes += 1;
        }

        fn is_running(&self) -> bool {
            !self.failed
        }

        fn shutdown(&mut self) {
            self.shut_down = true;
        }
    }
}
