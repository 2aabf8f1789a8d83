//! Superping - one-shot ICMP reachability check
//!
//! Sends a single echo request to one IPv4 host, waits a bounded time for
//! the matching reply and reports the round-trip time. The result is meant
//! to be consumed through the process exit code.

pub mod probe;
pub mod protocol;
