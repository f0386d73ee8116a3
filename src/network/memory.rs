//! In-process blackhole target
//!
//! Counts what would have been sent. Backs `--dry-run` and lets tests
//! inject connect or send failures at a chosen point.

use crate::config::TargetAddress;
use crate::network::error::{NetworkError, NetworkResult};
use crate::network::transport::{Connector, PacketTransport};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct MemoryStats {
    connects: AtomicU64,
    packets: AtomicU64,
    bytes: AtomicU64,
    last_target: Mutex<Option<TargetAddress>>,
}

impl MemoryStats {
    pub fn connects(&self) -> u64 {
        self.connects.load(Ordering::Relaxed)
    }

    pub fn packets(&self) -> u64 {
        self.packets.load(Ordering::Relaxed)
    }

    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    pub fn last_target(&self) -> Option<TargetAddress> {
        self.last_target.lock().clone()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    stats: Arc<MemoryStats>,
    fail_connect: bool,
    /// Packets accepted before every further send fails
    fail_after_packets: Option<u64>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every connect attempt fails
    pub fn failing_connect() -> Self {
        Self {
            fail_connect: true,
            ..Default::default()
        }
    }

    /// Sends start failing once `packets` datagrams have been accepted
    pub fn failing_after(packets: u64) -> Self {
        Self {
            fail_after_packets: Some(packets),
            ..Default::default()
        }
    }

    pub fn stats(&self) -> Arc<MemoryStats> {
        self.stats.clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn connect(&self, target: &TargetAddress) -> NetworkResult<Box<dyn PacketTransport>> {
        if self.fail_connect {
            return Err(NetworkError::ConnectionFailed(format!(
                "{target}: connect refused by memory connector"
            )));
        }

        self.stats.connects.fetch_add(1, Ordering::Relaxed);
        *self.stats.last_target.lock() = Some(target.clone());

        Ok(Box::new(MemoryTransport {
            stats: self.stats.clone(),
            fail_after_packets: self.fail_after_packets,
        }))
    }
}

struct MemoryTransport {
    stats: Arc<MemoryStats>,
    fail_after_packets: Option<u64>,
}

#[async_trait]
impl PacketTransport for MemoryTransport {
    async fn send(&mut self, payload: &[u8]) -> NetworkResult<usize> {
        if let Some(limit) = self.fail_after_packets {
            if self.stats.packets() >= limit {
                return Err(NetworkError::SendFailed("memory transport closed".into()));
            }
        }

        self.stats.packets.fetch_add(1, Ordering::Relaxed);
        self.stats
            .bytes
            .fetch_add(payload.len() as u64, Ordering::Relaxed);
        Ok(payload.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_packets_and_bytes() {
        let connector = MemoryConnector::new();
        let stats = connector.stats();
        let target = TargetAddress::new("10.1.1.1", 4000);

        let mut transport = connector.connect(&target).await.unwrap();
        for _ in 0..5 {
            transport.send(&[0u8; 100]).await.unwrap();
        }

        assert_eq!(stats.connects(), 1);
        assert_eq!(stats.packets(), 5);
        assert_eq!(stats.bytes(), 500);
        assert_eq!(stats.last_target(), Some(target));
    }

    #[tokio::test]
    async fn test_failing_after_limit() {
        let connector = MemoryConnector::failing_after(2);
        let mut transport = connector
            .connect(&TargetAddress::new("127.0.0.1", 1))
            .await
            .unwrap();

        assert!(transport.send(b"a").await.is_ok());
        assert!(transport.send(b"b").await.is_ok());
        assert!(matches!(
            transport.send(b"c").await,
            Err(NetworkError::SendFailed(_))
        ));
        assert_eq!(connector.stats().packets(), 2);
    }

    #[tokio::test]
    async fn test_failing_connect() {
        let connector = MemoryConnector::failing_connect();
        let result = connector.connect(&TargetAddress::new("127.0.0.1", 1)).await;
        assert!(matches!(result, Err(NetworkError::ConnectionFailed(_))));
        assert_eq!(connector.stats().connects(), 0);
    }
}
