//! Transport seam between the pacing loop and the wire

use crate::config::TargetAddress;
use crate::network::error::NetworkResult;
use async_trait::async_trait;

/// A connected, unacknowledged datagram sink
#[async_trait]
pub trait PacketTransport: Send {
    /// Send one datagram, returning the number of bytes written
    async fn send(&mut self, payload: &[u8]) -> NetworkResult<usize>;
}

/// Opens a transport towards a target at the start of each run
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, target: &TargetAddress) -> NetworkResult<Box<dyn PacketTransport>>;
}
