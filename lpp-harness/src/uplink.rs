use std::io::ErrorKind;
use std::net::SocketAddr;

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::info;

#[derive(Debug, Error)]
pub enum UplinkError {
    #[error("payload of {size} bytes exceeds the {max} byte ceiling")]
    PayloadTooLarge { size: usize, max: usize },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transport that carries a finished payload off the device.
#[async_trait]
pub trait Uplink: Send + Sync {
    async fn send(&self, payload: &[u8]) -> Result<(), UplinkError>;

    /// Returns a downlink that has already arrived, without waiting for one.
    /// The bytes are opaque to the harness.
    async fn poll_downlink(&self) -> Result<Option<Vec<u8>>, UplinkError>;
}

/// Largest downlink read per poll; longer datagrams are cut short.
pub const MAX_DOWNLINK: usize = 64;

/// Enforces the link's payload ceiling. A `max` of 0 means unlimited.
pub fn check_payload(payload: &[u8], max: usize) -> Result<(), UplinkError> {
    if max != 0 && payload.len() > max {
        return Err(UplinkError::PayloadTooLarge {
            size: payload.len(),
            max,
        });
    }
    Ok(())
}

pub fn to_hex(payload: &[u8]) -> String {
    payload.iter().map(|b| format!("{b:02X}")).collect()
}

/// Prints each payload as one line of hex.
pub struct StdoutUplink;

#[async_trait]
impl Uplink for StdoutUplink {
    async fn send(&self, payload: &[u8]) -> Result<(), UplinkError> {
        println!("{}", to_hex(payload));
        Ok(())
    }

    async fn poll_downlink(&self) -> Result<Option<Vec<u8>>, UplinkError> {
        Ok(None)
    }
}

/// Sends each payload as a single datagram.
pub struct UdpUplink {
    socket: UdpSocket,
}

impl UdpUplink {
    pub async fn connect(addr: SocketAddr) -> Result<Self, UplinkError> {
        let bind: SocketAddr = if addr.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0_u16; 8], 0).into()
        };

        let socket = UdpSocket::bind(bind).await?;
        socket.connect(addr).await?;
        info!(local = %socket.local_addr()?, remote = %addr, "UDP uplink ready");

        Ok(Self { socket })
    }
}

#[async_trait]
impl Uplink for UdpUplink {
    async fn send(&self, payload: &[u8]) -> Result<(), UplinkError> {
        self.socket.send(payload).await?;
        Ok(())
    }

    async fn poll_downlink(&self) -> Result<Option<Vec<u8>>, UplinkError> {
        let mut buf = [0_u8; MAX_DOWNLINK];
        match self.socket.try_recv(&mut buf) {
            Ok(len) => Ok(Some(buf[..len].to_vec())),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
