use crate::probe::outcome::ExitStatus;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Bad parameter: {0}")]
    Parameter(String),

    #[error("Bad IP address or host name: {host}")]
    Resolution { host: String },

    #[error("Insufficient privilege: {0}")]
    Permission(String),

    #[error("Could not create raw ICMP socket: {0}")]
    TransportOpen(io::Error),

    #[error("Could not set non blocking mode: {0}")]
    NonBlocking(io::Error),

    #[error("Could not register socket for readiness notification: {0}")]
    WaitRegistration(io::Error),

    #[error("Error waiting for reply: {0}")]
    WaitFailed(io::Error),

    #[error("Error sending ICMP echo request: {0}")]
    SendFailed(String),

    #[error("Transport already closed")]
    Closed,
}

impl ProbeError {
    /// Exit status reported for this error
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            ProbeError::Parameter(_) => ExitStatus::BadParameter,
            ProbeError::Resolution { .. } => ExitStatus::BadAddress,
            ProbeError::Permission(_) => ExitStatus::NotPermitted,
            ProbeError::TransportOpen(_) | ProbeError::Closed => ExitStatus::SocketFailed,
            ProbeError::NonBlocking(_) => ExitStatus::NonBlockingFailed,
            ProbeError::WaitRegistration(_) | ProbeError::WaitFailed(_) => ExitStatus::WaitFailed,
            ProbeError::SendFailed(_) => ExitStatus::SendFailed,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProbeError>;
