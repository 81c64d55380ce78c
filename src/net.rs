use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use tracing::debug;

/// Address the discovery socket "connects" to. UDP connect only records a
/// default destination locally; no packet leaves the machine.
const PROBE_ADDR: &str = "8.8.8.8:80";

/// Best-effort local-network IP of this machine, for building the URL other
/// devices open. Falls back to loopback on any failure; never errors.
pub fn local_ip() -> IpAddr {
    match probe_local_ip() {
        Ok(ip) => ip,
        Err(e) => {
            debug!(error = %e, "local IP discovery failed, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

fn probe_local_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect(PROBE_ADDR)?;
    Ok(socket.local_addr()?.ip())
}

/// The URL handed to other devices (clipboard, QR code, ...).
pub fn share_url(ip: IpAddr, port: u16) -> String {
    format!("http://{ip}:{port}")
}
