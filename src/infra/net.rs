use std::net::{IpAddr, UdpSocket};

use tracing::warn;

/// Preferred outbound IPv4 address of this machine, discovered by opening a
/// UDP socket toward a public resolver. No packet is actually sent.
pub fn outbound_ipv4() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

/// Host address used in connection summaries. Discovery is cosmetic, so a
/// failure falls back to "localhost" instead of failing the operation.
pub fn display_host() -> String {
    match outbound_ipv4() {
        Some(ip) => ip.to_string(),
        None => {
            warn!("could not detect the host address, using localhost");
            "localhost".to_string()
        }
    }
}
