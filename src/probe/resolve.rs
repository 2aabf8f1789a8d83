use crate::probe::error::{ProbeError, Result};
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};
use tracing::{debug, warn};

/// Resolve `host` to an IPv4 address.
///
/// Dotted-quad input is taken as is; anything else goes through the system
/// resolver and the first IPv4 answer wins.
pub fn resolve_target(host: &str) -> Result<Ipv4Addr> {
    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        return Ok(addr);
    }

    debug!(host, "Resolving host name");
    let addrs = (host, 0).to_socket_addrs().map_err(|e| {
        warn!(host, error = %e, "Host name lookup failed");
        ProbeError::Resolution {
            host: host.to_string(),
        }
    })?;

    let resolved = addrs
        .filter_map(|addr| match addr.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .next()
        .ok_or_else(|| ProbeError::Resolution {
            host: host.to_string(),
        })?;

    debug!(host, address = %resolved, "Host name resolved");
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_quad() {
        assert_eq!(
            resolve_target("192.0.2.33").unwrap(),
            Ipv4Addr::new(192, 0, 2, 33)
        );
    }

    #[test]
    fn test_localhost() {
        assert!(resolve_target("localhost").unwrap().is_loopback());
    }

    #[test]
    fn test_unresolvable() {
        assert!(matches!(
            resolve_target("no-such-host.invalid"),
            Err(ProbeError::Resolution { .. })
        ));
    }

    #[test]
    fn test_ipv6_literal_is_not_a_target() {
        assert!(resolve_target("::1").is_err());
    }
}
