// pingwatch-api: Async Rust client for the PingWatch monitoring server
// (Socket.IO event channel + REST site registry)

pub mod error;
pub mod models;
pub mod sites;
pub mod socket;
pub mod transport;

pub use error::Error;
pub use models::{
    ActionAck, ConnectResponse, MqttMessage, MqttStatus, SiteRecord, SiteStatus, SiteSubmission,
    UnconfiguredSite,
};
pub use sites::SiteRegistryClient;
pub use socket::{
    ClientCommand, EventSocket, ReconnectConfig, ServerEvent, SocketEvent, TransportState,
    socket_url,
};
pub use transport::{TlsMode, TransportConfig};
