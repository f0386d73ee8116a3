pub mod error;
pub mod memory;
pub mod transport;
pub mod types;
pub mod udp;

pub use error::{NetworkError, NetworkResult};
pub use memory::{MemoryConnector, MemoryStats};
pub use transport::{Connector, PacketTransport};
pub use types::UdpConfig;
pub use udp::{UdpConnector, UdpTransport};
