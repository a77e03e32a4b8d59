//! Datagram source trait

use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;

/// Trait for things the receiver can pull datagrams from
///
/// Production code uses a bound [`UdpSocket`]; tests drive the receiver from
/// in-memory sources.
#[async_trait::async_trait]
pub trait DatagramSource: Send + 'static {
    /// Wait for the next datagram and copy its payload into `buf`.
    ///
    /// Returns the number of bytes written. Payloads larger than `buf` are
    /// truncated to `buf.len()`. Must be cancel safe: dropping the future
    /// before it completes must not lose a datagram that was not returned.
    async fn recv_datagram(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Local address the source is bound to, if it has one.
    fn local_addr(&self) -> Option<SocketAddr> {
        None
    }
}

#[async_trait::async_trait]
impl DatagramSource for UdpSocket {
    async fn recv_datagram(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let (len, peer) = self.recv_from(buf).await?;
        tracing::trace!(%peer, len, "Datagram received");
        Ok(len)
    }

    fn local_addr(&self) -> Option<SocketAddr> {
        UdpSocket::local_addr(self).ok()
    }
}
