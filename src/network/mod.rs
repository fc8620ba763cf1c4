//! Network Layer
//!
//! Everything outside the simulation: the wire protocol, the transport
//! boundary the tick engine consumes, and the WebSocket implementation of
//! that boundary. Nothing in here runs game logic.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{Channel, ClientMessage, ServerMessage, WorldStateUpdate};
pub use server::{ServerConfig, TransportError, WsServer};
pub use transport::{ClientIndex, InboundMessage, PeerEvent, Transport};
