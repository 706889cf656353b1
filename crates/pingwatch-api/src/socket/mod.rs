// Real-time event channel: Engine.IO/Socket.IO framing, the typed event
// union, and the reconnecting client.

mod client;
mod events;
pub mod packet;

pub use client::{EventSocket, ReconnectConfig, socket_url};
pub use events::{ClientCommand, ServerEvent, SocketEvent, TransportState};
