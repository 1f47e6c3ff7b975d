//! Control-channel commands and acknowledgement messages.
//!
//! The control protocol is plain colon-delimited ASCII:
//! - `CONNECT:<ip>:<port>` — subscribe the given endpoint. Exactly three
//!   tokens; anything else is malformed.
//! - `DISCONNECT` — unsubscribe (prefix match, trailing text tolerated).
//!
//! Known limitation: IPv6 literals contain colons, fail the token-count
//! check, and are rejected as malformed.

use std::net::{IpAddr, SocketAddr};

use crate::error::{Result, WireError};

/// A parsed control-channel command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Subscribe the given endpoint to the data stream.
    Connect(SocketAddr),
    /// Drop the current subscriber, if any.
    Disconnect,
}

/// Parse one control message.
///
/// The input should already be trimmed; interior whitespace around the
/// CONNECT tokens is tolerated.
pub fn parse_control(msg: &str) -> Result<ControlCommand> {
    if msg.starts_with("DISCONNECT") {
        return Ok(ControlCommand::Disconnect);
    }

    if msg.starts_with("CONNECT:") {
        let parts: Vec<&str> = msg.split(':').collect();
        if parts.len() != 3 {
            return Err(WireError::MalformedControl(msg.to_string()));
        }

        let ip: IpAddr = parts[1]
            .trim()
            .parse()
            .map_err(|_| WireError::InvalidAddress(parts[1].trim().to_string()))?;
        let port: u16 = parts[2]
            .trim()
            .parse()
            .map_err(|_| WireError::InvalidPort(parts[2].trim().to_string()))?;

        return Ok(ControlCommand::Connect(SocketAddr::new(ip, port)));
    }

    Err(WireError::MalformedControl(msg.to_string()))
}

/// Acknowledgement sent to a freshly connected subscriber.
pub fn connected_ack(server_ip: IpAddr, cmd_port: u16) -> String {
    format!("CONNECTED:{server_ip}:{cmd_port}")
}

/// Acknowledgement sent to a subscriber being dropped.
pub fn disconnected_ack(server_ip: IpAddr, cmd_port: u16) -> String {
    format!("DISCONNECTED:{server_ip}:{cmd_port}")
}
