use thiserror::Error;

/// Protocol-level errors for datagram parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Truncated datagram: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Not an IPv4 datagram (version {0})")]
    NotIpv4(u8),

    #[error("Invalid IPv4 header length: {0} bytes")]
    InvalidHeaderLength(usize),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
