use crate::config::TargetAddress;
use crate::network::error::{NetworkError, NetworkResult};
use crate::network::transport::{Connector, PacketTransport};
use crate::network::types::UdpConfig;
use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;

/// Opens connected UDP sockets
#[derive(Debug, Clone, Default)]
pub struct UdpConnector {
    config: UdpConfig,
}

impl UdpConnector {
    pub fn new(config: UdpConfig) -> Self {
        Self { config }
    }

    async fn resolve(target: &TargetAddress) -> NetworkResult<SocketAddr> {
        let host = target.host.trim_start_matches('[').trim_end_matches(']');
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, target.port));
        }

        tokio::net::lookup_host((host, target.port))
            .await
            .map_err(|e| NetworkError::ResolveFailed(format!("{target}: {e}")))?
            .next()
            .ok_or_else(|| NetworkError::ResolveFailed(target.to_string()))
    }

    fn bind_addr_for(&self, remote: &SocketAddr) -> SocketAddr {
        self.config.bind_addr.unwrap_or_else(|| match remote {
            SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        })
    }

    fn open_socket(&self, remote: &SocketAddr) -> NetworkResult<UdpSocket> {
        let socket = Socket::new(Domain::for_address(*remote), Type::DGRAM, Some(Protocol::UDP))?;

        if let Some(size) = self.config.send_buffer_bytes {
            socket.set_send_buffer_size(size)?;
        }

        socket.bind(&self.bind_addr_for(remote).into())?;
        socket.set_nonblocking(true)?;

        Ok(UdpSocket::from_std(socket.into())?)
    }
}

#[async_trait]
impl Connector for UdpConnector {
    async fn connect(&self, target: &TargetAddress) -> NetworkResult<Box<dyn PacketTransport>> {
        let remote = Self::resolve(target).await?;
        let socket = self.open_socket(&remote)?;
        socket
            .connect(remote)
            .await
            .map_err(|e| NetworkError::ConnectionFailed(format!("{remote}: {e}")))?;

        tracing::debug!(%remote, local = ?socket.local_addr().ok(), "UDP transport connected");

        Ok(Box::new(UdpTransport { socket, remote }))
    }
}

pub struct UdpTransport {
    socket: UdpSocket,
    remote: SocketAddr,
}

impl UdpTransport {
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }
}

#[async_trait]
impl PacketTransport for UdpTransport {
    async fn send(&mut self, payload: &[u8]) -> NetworkResult<usize> {
        let written = self
            .socket
            .send(payload)
            .await
            .map_err(|e| NetworkError::SendFailed(format!("{}: {e}", self.remote)))?;

        if written != payload.len() {
            return Err(NetworkError::ShortWrite {
                expected: payload.len(),
                written,
            });
        }

        Ok(written)
    }
}
