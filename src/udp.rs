//! InfluxDB UDP write client.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::{UdpSocket, lookup_host};
use tracing::debug;

use crate::error::{Error, Result};
use crate::point::Point;
use crate::precision::Precision;
use crate::writer::LineProtocolWriter;

/// Sends encoded batches to an InfluxDB UDP listener, one datagram per batch.
///
/// The UDP listener cannot be told the timestamp precision, so batches are always encoded
/// in nanoseconds, its fixed default.
#[derive(Debug)]
pub struct UdpClient {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpClient {
    /// Resolve `server:port` and bind a local socket of the matching address family.
    pub async fn connect(server: &str, port: u16) -> Result<Self> {
        let target = resolve(server, port).await?;
        let socket = bind_for(&target).await?;
        debug!(peer = %target, local = %socket.local_addr()?, "udp client ready");
        Ok(Self { socket, target })
    }

    /// Address datagrams are sent to.
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Point the client at a different server.
    ///
    /// Rebinds the local socket when the address family changes.
    pub async fn set_target(&mut self, server: &str, port: u16) -> Result<()> {
        let target = resolve(server, port).await?;
        if target.is_ipv4() != self.target.is_ipv4() {
            self.socket = bind_for(&target).await?;
        }
        self.target = target;
        Ok(())
    }

    /// Encode `points` and send them as one datagram. Returns the number of bytes sent.
    ///
    /// An empty iterator sends nothing.
    pub async fn write<'a, I>(&self, points: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut writer = LineProtocolWriter::new(Precision::Nanosecond);
        writer.write_all(points)?;
        if writer.is_empty() {
            return Ok(0);
        }

        let lines = writer.line_count();
        let payload = writer.into_bytes();
        let sent = self.socket.send_to(&payload, self.target).await?;
        debug!(peer = %self.target, lines, bytes = sent, "sent datagram");
        Ok(sent)
    }
}

async fn resolve(server: &str, port: u16) -> Result<SocketAddr> {
    if server.trim().is_empty() {
        return Err(Error::Config {
            message: "server must not be empty".to_string(),
        });
    }
    if port == 0 {
        return Err(Error::Config {
            message: "port must be between 1 and 65535".to_string(),
        });
    }

    lookup_host((server, port))
        .await?
        .next()
        .ok_or_else(|| Error::Config {
            message: format!("could not resolve '{}'", server),
        })
}

async fn bind_for(target: &SocketAddr) -> Result<UdpSocket> {
    let local: SocketAddr = if target.is_ipv4() {
        (Ipv4Addr::UNSPECIFIED, 0).into()
    } else {
        (Ipv6Addr::UNSPECIFIED, 0).into()
    };
    Ok(UdpSocket::bind(local).await?)
}
