use crate::protocol::checksum::internet_checksum;
use crate::protocol::error::{ProtocolError, Result};
use std::net::Ipv4Addr;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// ICMP echo header size (type, code, checksum, identifier, sequence)
pub const ICMP_HEADER_SIZE: usize = 8;

/// Echo payload size: a timeval-sized send timestamp
pub const PAYLOAD_SIZE: usize = 16;

/// Size of the echo request datagram on the wire
pub const REQUEST_SIZE: usize = ICMP_HEADER_SIZE + PAYLOAD_SIZE;

/// IPv4 header size without options
pub const IPV4_MIN_HEADER_SIZE: usize = 20;

/// IPv4 header size with the maximum amount of options
pub const IPV4_MAX_HEADER_SIZE: usize = 60;

pub const ICMP_ECHO_REPLY: u8 = 0;
pub const ICMP_ECHO_REQUEST: u8 = 8;

/// Wall-clock time with microsecond resolution, carried as the echo payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub secs: u64,
    pub micros: u64,
}

impl Timestamp {
    pub fn now() -> Self {
        // A clock set before 1970 yields the epoch; the value only has to be echoed back
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            secs: since_epoch.as_secs(),
            micros: u64::from(since_epoch.subsec_micros()),
        }
    }

    pub fn to_bytes(self) -> [u8; PAYLOAD_SIZE] {
        let mut buf = [0u8; PAYLOAD_SIZE];
        buf[..8].copy_from_slice(&self.secs.to_be_bytes());
        buf[8..].copy_from_slice(&self.micros.to_be_bytes());
        buf
    }

    pub fn from_bytes(bytes: &[u8; PAYLOAD_SIZE]) -> Self {
        let mut secs = [0u8; 8];
        let mut micros = [0u8; 8];
        secs.copy_from_slice(&bytes[..8]);
        micros.copy_from_slice(&bytes[8..]);
        Self {
            secs: u64::from_be_bytes(secs),
            micros: u64::from_be_bytes(micros),
        }
    }
}

/// An ICMP echo request, encoded once and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoRequest {
    bytes: [u8; REQUEST_SIZE],
}

impl EchoRequest {
    /// Build the request and store its checksum.
    pub fn new(identifier: u16, sequence: u16, timestamp: Timestamp) -> Self {
        let mut bytes = [0u8; REQUEST_SIZE];
        bytes[0] = ICMP_ECHO_REQUEST;
        bytes[1] = 0;
        bytes[4..6].copy_from_slice(&identifier.to_be_bytes());
        bytes[6..8].copy_from_slice(&sequence.to_be_bytes());
        bytes[ICMP_HEADER_SIZE..].copy_from_slice(&timestamp.to_bytes());

        let checksum = internet_checksum(&bytes);
        bytes[2..4].copy_from_slice(&checksum.to_be_bytes());

        debug!(identifier, sequence, checksum, "Echo request encoded");
        Self { bytes }
    }

    pub fn identifier(&self) -> u16 {
        u16::from_be_bytes([self.bytes[4], self.bytes[5]])
    }

    pub fn sequence(&self) -> u16 {
        u16::from_be_bytes([self.bytes[6], self.bytes[7]])
    }

    pub fn checksum(&self) -> u16 {
        u16::from_be_bytes([self.bytes[2], self.bytes[3]])
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[ICMP_HEADER_SIZE..]
    }

    pub fn timestamp(&self) -> Timestamp {
        let mut payload = [0u8; PAYLOAD_SIZE];
        payload.copy_from_slice(self.payload());
        Timestamp::from_bytes(&payload)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// First correlation check an inbound reply failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    Source,
    Type,
    Identifier,
    Sequence,
    Payload,
}

/// Parsed view over a received IPv4 datagram carrying an ICMP message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoReply<'a> {
    pub source: Ipv4Addr,
    pub header_len: usize,
    pub icmp_type: u8,
    pub code: u8,
    pub identifier: u16,
    pub sequence: u16,
    pub payload: &'a [u8],
}

impl<'a> EchoReply<'a> {
    /// Parse a raw-socket read: IPv4 header followed by a full echo message.
    pub fn parse(datagram: &'a [u8]) -> Result<Self> {
        let first = *datagram.first().ok_or(ProtocolError::Truncated {
            expected: IPV4_MIN_HEADER_SIZE + REQUEST_SIZE,
            actual: 0,
        })?;

        let version = first >> 4;
        if version != 4 {
            return Err(ProtocolError::NotIpv4(version));
        }

        let header_len = usize::from(first & 0x0F) * 4;
        if header_len < IPV4_MIN_HEADER_SIZE {
            return Err(ProtocolError::InvalidHeaderLength(header_len));
        }

        let expected = header_len + REQUEST_SIZE;
        if datagram.len() < expected {
            return Err(ProtocolError::Truncated {
                expected,
                actual: datagram.len(),
            });
        }

        let source = Ipv4Addr::new(datagram[12], datagram[13], datagram[14], datagram[15]);
        let icmp = &datagram[header_len..expected];

        Ok(Self {
            source,
            header_len,
            icmp_type: icmp[0],
            code: icmp[1],
            identifier: u16::from_be_bytes([icmp[4], icmp[5]]),
            sequence: u16::from_be_bytes([icmp[6], icmp[7]]),
            payload: &icmp[ICMP_HEADER_SIZE..],
        })
    }

    /// Check whether this is the reply to `request` sent to `target`.
    ///
    /// Checks run in order: source address, type, identifier, sequence and
    /// payload. The first failing check is returned.
    pub fn answers(
        &self,
        request: &EchoRequest,
        target: Ipv4Addr,
    ) -> std::result::Result<(), Mismatch> {
        if self.source != target {
            return Err(Mismatch::Source);
        }
        if self.icmp_type != ICMP_ECHO_REPLY {
            return Err(Mismatch::Type);
        }
        if self.identifier != request.identifier() {
            return Err(Mismatch::Identifier);
        }
        if self.sequence != request.sequence() {
            return Err(Mismatch::Sequence);
        }
        if self.payload != request.payload() {
            return Err(Mismatch::Payload);
        }
        Ok(())
    }
}
