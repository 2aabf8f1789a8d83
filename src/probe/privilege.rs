use crate::probe::error::{ProbeError, Result};
use nix::unistd::Uid;
use tracing::debug;

/// Raw ICMP sockets are opened as root only
pub fn ensure_raw_socket_privilege() -> Result<()> {
    check_uid(Uid::effective())
}

fn check_uid(uid: Uid) -> Result<()> {
    if uid.is_root() {
        debug!("Running as root");
        Ok(())
    } else {
        Err(ProbeError::Permission(format!(
            "raw ICMP sockets need root, running as uid {}",
            uid
        )))
    }
}
