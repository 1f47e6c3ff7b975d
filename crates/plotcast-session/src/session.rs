use std::net::{IpAddr, SocketAddr};

use tracing::{info, warn};

use plotcast_wire::{connected_ack, disconnected_ack, parse_control, ControlCommand};

use crate::sink::DatagramSink;
use crate::target::TargetHandle;

/// The single-subscriber session state machine.
///
/// Two states: idle (no target) and active (one target). Control messages
/// drive the explicit transitions; a transport failure on any send to the
/// target drives the implicit demotion back to idle. Acknowledgements go
/// out over the data sink, not back on the control socket.
pub struct Session<S> {
    target: TargetHandle,
    sink: S,
    server_ip: IpAddr,
    cmd_port: u16,
}

impl<S: DatagramSink> Session<S> {
    pub fn new(sink: S, server_ip: IpAddr, cmd_port: u16) -> Self {
        Self {
            target: TargetHandle::new(),
            sink,
            server_ip,
            cmd_port,
        }
    }

    /// A clone of the shared target handle.
    pub fn target(&self) -> TargetHandle {
        self.target.clone()
    }

    /// True when a subscriber is connected.
    pub fn is_active(&self) -> bool {
        self.target.is_active()
    }

    /// Apply one control message to the session.
    ///
    /// Malformed input is logged and ignored; the session never leaves a
    /// valid state because of bad bytes on the control socket.
    pub fn handle_control(&self, msg: &str, from: SocketAddr) {
        match parse_control(msg) {
            Ok(ControlCommand::Connect(addr)) => {
                // Last writer wins: a new CONNECT silently replaces any
                // existing subscriber.
                self.target.set(addr);
                info!(subscriber = %addr, %from, "subscriber connected");

                let ack = connected_ack(self.server_ip, self.cmd_port);
                self.send_to_target(ack.as_bytes());
            }
            Ok(ControlCommand::Disconnect) => {
                let Some(prev) = self.target.take() else {
                    // Already idle; nothing to notify.
                    return;
                };

                let ack = disconnected_ack(self.server_ip, self.cmd_port);
                if let Err(err) = self.sink.send_to(ack.as_bytes(), prev) {
                    warn!(subscriber = %prev, %err, "disconnect ack send failed");
                }
                info!(subscriber = %prev, "subscriber disconnected");
            }
            Err(err) => {
                warn!(%from, %err, "ignoring control message");
            }
        }
    }

    /// Send one datagram to the current target.
    ///
    /// Returns false when idle or when the send fails. A failed send drops
    /// the subscriber immediately; the caller should abort whatever else it
    /// intended to send this tick.
    pub fn send_to_target(&self, payload: &[u8]) -> bool {
        let Some(target) = self.target.get() else {
            return false;
        };

        match self.sink.send_to(payload, target) {
            Ok(()) => true,
            Err(err) => {
                warn!(subscriber = %target, %err, "send failed, dropping subscriber");
                self.target.take();
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use super::*;

    /// Records every datagram it is asked to send.
    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
    }

    impl RecordingSink {
        fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl DatagramSink for RecordingSink {
        fn send_to(&self, payload: &[u8], target: SocketAddr) -> io::Result<()> {
            self.sent.lock().unwrap().push((payload.to_vec(), target));
            Ok(())
        }
    }

    /// Fails every send, simulating an unreachable subscriber.
    struct FailingSink;

    impl DatagramSink for FailingSink {
        fn send_to(&self, _payload: &[u8], _target: SocketAddr) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::ConnectionRefused))
        }
    }

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    fn session() -> Session<RecordingSink> {
        Session::new(
            RecordingSink::default(),
            "192.168.0.2".parse().unwrap(),
            47268,
        )
    }

    const CONTROL_FROM: &str = "10.0.0.5:55555";

    #[test]
    fn test_connect_sets_target_and_acks() {
        let session = session();
        session.handle_control("CONNECT:10.0.0.5:9000", addr(CONTROL_FROM));

        assert_eq!(session.target().get(), Some(addr("10.0.0.5:9000")));
        assert_eq!(
            session.sink.sent(),
            vec![(b"CONNECTED:192.168.0.2:47268".to_vec(), addr("10.0.0.5:9000"))]
        );
    }

    #[test]
    fn test_last_writer_wins() {
        let session = session();
        session.handle_control("CONNECT:10.0.0.5:9000", addr(CONTROL_FROM));
        session.handle_control("CONNECT:10.0.0.6:9001", addr("10.0.0.6:55555"));

        assert_eq!(session.target().get(), Some(addr("10.0.0.6:9001")));
    }

    #[test]
    fn test_connect_then_disconnect_two_acks() {
        let session = session();
        session.handle_control("CONNECT:10.0.0.5:9000", addr(CONTROL_FROM));
        session.handle_control("DISCONNECT", addr(CONTROL_FROM));

        let sent = session.sink.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].0, b"CONNECTED:192.168.0.2:47268");
        assert_eq!(sent[1].0, b"DISCONNECTED:192.168.0.2:47268");
        assert_eq!(sent[0].1, addr("10.0.0.5:9000"));
        assert_eq!(sent[1].1, addr("10.0.0.5:9000"));
        assert!(!session.is_active());
    }

    #[test]
    fn test_disconnect_when_idle_is_silent() {
        let session = session();
        session.handle_control("DISCONNECT", addr(CONTROL_FROM));

        assert!(!session.is_active());
        assert!(session.sink.sent().is_empty());
    }

    #[test]
    fn test_malformed_message_leaves_state_unchanged() {
        let session = session();
        session.handle_control("CONNECT:10.0.0.5:9000", addr(CONTROL_FROM));

        session.handle_control("CONNECT:10.0.0.6", addr(CONTROL_FROM));
        session.handle_control("CONNECT:10.0.0.6:not-a-port", addr(CONTROL_FROM));
        session.handle_control("garbage", addr(CONTROL_FROM));

        assert_eq!(session.target().get(), Some(addr("10.0.0.5:9000")));
        assert_eq!(session.sink.sent().len(), 1);
    }

    #[test]
    fn test_send_failure_demotes_to_idle() {
        let session = Session::new(FailingSink, "192.168.0.2".parse().unwrap(), 47268);
        session.target().set(addr("10.0.0.5:9000"));

        assert!(!session.send_to_target(b"payload"));
        assert!(!session.is_active());

        // Subsequent ticks have no target and perform no send.
        assert!(!session.send_to_target(b"payload"));
    }

    #[test]
    fn test_failed_connect_ack_clears_fresh_target() {
        let session = Session::new(FailingSink, "192.168.0.2".parse().unwrap(), 47268);
        session.handle_control("CONNECT:10.0.0.5:9000", addr(CONTROL_FROM));

        assert!(!session.is_active());
    }

    #[test]
    fn test_send_when_idle_returns_false() {
        let session = session();
        assert!(!session.send_to_target(b"payload"));
        assert!(session.sink.sent().is_empty());
    }
}
