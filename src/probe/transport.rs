use crate::probe::error::{ProbeError, Result};
use crate::protocol::EchoRequest;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{self, Read};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::os::fd::{AsFd, BorrowedFd};
use tracing::{debug, warn};

/// Trait for raw echo transport operations
pub trait EchoTransport {
    /// Transmit the whole request to `destination`.
    ///
    /// A short write is a failure; nothing is retried.
    fn send_request(&mut self, destination: Ipv4Addr, request: &EchoRequest) -> Result<()>;

    /// Attempt one non-blocking read of a datagram (network header included).
    ///
    /// Returns `Ok(None)` when nothing could be read.
    fn recv_datagram(&mut self, buf: &mut [u8]) -> Result<Option<usize>>;

    /// Release the endpoint. Safe to call more than once.
    fn close(&mut self);
}

/// Raw ICMPv4 socket in non-blocking mode
#[derive(Debug)]
pub struct RawIcmpTransport {
    socket: Option<Socket>,
}

impl RawIcmpTransport {
    /// Open a raw ICMP socket and switch it to non-blocking mode
    pub fn open() -> Result<Self> {
        debug!("Opening raw ICMP socket");
        let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4)).map_err(|e| {
            warn!(error = %e, "Failed to create raw socket");
            ProbeError::TransportOpen(e)
        })?;

        // On failure the socket is dropped here, closing it
        socket.set_nonblocking(true).map_err(|e| {
            warn!(error = %e, "Failed to set non-blocking mode");
            ProbeError::NonBlocking(e)
        })?;

        debug!("Raw ICMP socket ready");
        Ok(Self {
            socket: Some(socket),
        })
    }

    /// Handle to register with a readiness waiter
    pub fn handle(&self) -> Result<BorrowedFd<'_>> {
        self.socket
            .as_ref()
            .map(|socket| socket.as_fd())
            .ok_or(ProbeError::Closed)
    }

    pub fn is_open(&self) -> bool {
        self.socket.is_some()
    }
}

impl EchoTransport for RawIcmpTransport {
    fn send_request(&mut self, destination: Ipv4Addr, request: &EchoRequest) -> Result<()> {
        let socket = self.socket.as_ref().ok_or(ProbeError::Closed)?;
        let bytes = request.as_bytes();
        let addr = SockAddr::from(SocketAddrV4::new(destination, 0));

        let bytes_sent = socket.send_to(bytes, &addr).map_err(|e| {
            warn!(error = %e, destination = %destination, "Failed to send echo request");
            ProbeError::SendFailed(e.to_string())
        })?;

        if bytes_sent != bytes.len() {
            warn!(bytes_sent, expected = bytes.len(), "Short send");
            return Err(ProbeError::SendFailed(format!(
                "sent {} of {} bytes",
                bytes_sent,
                bytes.len()
            )));
        }

        debug!(bytes_sent, destination = %destination, "Echo request sent");
        Ok(())
    }

    fn recv_datagram(&mut self, buf: &mut [u8]) -> Result<Option<usize>> {
        let mut socket = self.socket.as_ref().ok_or(ProbeError::Closed)?;
        match socket.read(buf) {
            Ok(len) => {
                debug!(bytes_received = len, "Datagram received");
                Ok(Some(len))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                debug!("No datagram despite readiness");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Failed to receive datagram");
                Ok(None)
            }
        }
    }

    fn close(&mut self) {
        if self.socket.take().is_some() {
            debug!("Raw ICMP socket closed");
        }
    }
}


#[cfg(test)]
pub use tests::MockEchoTransport;
