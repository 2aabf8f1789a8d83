//! Protocol module for Superping: ICMP echo wire format

pub mod checksum;
pub mod error;
pub mod message;

pub use checksum::{internet_checksum, verify_checksum};
pub use error::{ProtocolError, Result as ProtocolResult};
pub use message::{
    EchoReply, EchoRequest, Mismatch, Timestamp, ICMP_ECHO_REPLY, ICMP_ECHO_REQUEST,
    ICMP_HEADER_SIZE, IPV4_MAX_HEADER_SIZE, IPV4_MIN_HEADER_SIZE, PAYLOAD_SIZE, REQUEST_SIZE,
};
