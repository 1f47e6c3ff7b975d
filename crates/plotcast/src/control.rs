use std::sync::Arc;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use plotcast_session::{DatagramSink, Session};

const RECV_BUFFER_SIZE: usize = 4096;

/// Receive control messages until the token is cancelled.
///
/// Each inbound datagram is decoded as (lossy) UTF-8, trimmed and handed
/// to the session. Receive errors are logged and the loop keeps going;
/// only cancellation stops it.
pub async fn run<D: DatagramSink>(
    socket: UdpSocket,
    session: Arc<Session<D>>,
    shutdown: CancellationToken,
) {
    let mut buf = [0u8; RECV_BUFFER_SIZE];

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut buf) => match received {
                Ok((len, from)) => {
                    let msg = String::from_utf8_lossy(&buf[..len]);
                    let msg = msg.trim();
                    debug!(%from, %msg, "control message");
                    session.handle_control(msg, from);
                }
                Err(err) => {
                    warn!(%err, "control socket receive failed");
                }
            }
        }
    }

    debug!("control receiver stopped");
}
