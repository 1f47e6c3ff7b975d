use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Best-effort discovery of the local outbound IP, announced to
/// subscribers in connect/disconnect acks.
///
/// Connecting a UDP socket routes it without sending anything; the chosen
/// local address is the one peers can reach us on. Hosts with no default
/// route fall back to loopback.
pub fn local_ip() -> IpAddr {
    fn probe() -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(("8.8.8.8", 9))?;
        Ok(socket.local_addr()?.ip())
    }

    probe().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ip_is_not_unspecified() {
        let ip = local_ip();
        assert!(!ip.is_unspecified());
    }
}
