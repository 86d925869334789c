use std::net::TcpListener;

use crate::domain::ContainerError;

/// How many successive ports to try before giving up.
pub const PROBE_WINDOW: u16 = 100;

/// Finds an available host port by binding and immediately releasing local
/// listeners on successive ports starting at `start`.
///
/// Best effort only: the probe does not coordinate with the engine's own
/// port allocation, and the port can be taken again between release and the
/// actual container launch.
pub fn find_available_port(start: u16) -> Result<u16, ContainerError> {
    let end = start.saturating_add(PROBE_WINDOW);
    for port in start..end {
        if TcpListener::bind(("0.0.0.0", port)).is_ok() {
            return Ok(port);
        }
    }
    Err(ContainerError::NoAvailablePort { start, end })
}
