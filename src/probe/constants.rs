//! Constants used throughout the probe

use crate::protocol::{IPV4_MAX_HEADER_SIZE, REQUEST_SIZE};

/// Wait budget when no timeout is given, in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Sequence number of the single echo request
pub const ECHO_SEQUENCE: u16 = 0;

/// Receive buffer: largest IPv4 header plus one echo reply
pub const RECV_BUFFER_SIZE: usize = IPV4_MAX_HEADER_SIZE + REQUEST_SIZE;

/// Default log level; stdout is reserved for `-v` and `-p` output
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Accepted values for `--log-level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
