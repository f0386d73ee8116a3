use std::net::SocketAddr;

#[derive(Debug, Clone, Default)]
pub struct UdpConfig {
    /// Local address to send from. Defaults to the unspecified address of
    /// the target's family with an ephemeral port.
    pub bind_addr: Option<SocketAddr>,
    /// SO_SNDBUF override
    pub send_buffer_bytes: Option<usize>,
}

impl UdpConfig {
    pub fn with_bind_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: Some(addr),
            ..Default::default()
        }
    }
}
