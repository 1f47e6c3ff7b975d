use std::io;
use std::net::SocketAddr;

/// Where outbound datagrams go.
///
/// The session layer never owns a socket directly; all sends flow through
/// this seam so tests can substitute recording or failing transports.
/// Sends are fire-and-forget: there is no retry and no backpressure.
pub trait DatagramSink: Send + Sync {
    fn send_to(&self, payload: &[u8], target: SocketAddr) -> io::Result<()>;
}

impl DatagramSink for std::net::UdpSocket {
    fn send_to(&self, payload: &[u8], target: SocketAddr) -> io::Result<()> {
        std::net::UdpSocket::send_to(self, payload, target).map(|_| ())
    }
}
