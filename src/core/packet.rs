//! # Packet
//!
//! One framed sub-message. A packet carries exactly one typed range.
//!
//! ```text
//! [Magic(4)] [Version(1)] [Kind(1)] [Length(4, BE)] [Payload(N)]
//! ```
//!
//! The header length is validated against the payload limit before any
//! allocation happens.

use bytes::Bytes;

use crate::config::{MAGIC_BYTES, MAX_PAYLOAD_SIZE, PROTOCOL_VERSION};
use crate::core::range::ElementKind;
use crate::error::{ExchangeError, Result};

/// Size of the fixed frame header in bytes
pub const HEADER_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub version: u8,
    pub kind: ElementKind,
    pub payload: Bytes,
}

/// Parsed frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Header {
    pub version: u8,
    pub kind: ElementKind,
    pub length: usize,
}

impl Packet {
    pub fn new(kind: ElementKind, payload: Bytes) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            kind,
            payload,
        }
    }

    /// Number of elements in the payload
    pub fn element_count(&self) -> usize {
        self.payload.len() / self.kind.width()
    }

    /// Serialize packet to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        self.write_header(&mut out);
        out.extend_from_slice(&self.payload);
        out
    }

    /// Parse a complete frame using the default payload limit
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        Self::from_bytes_with_limit(buf, MAX_PAYLOAD_SIZE)
    }

    /// Parse a complete frame; trailing bytes are rejected
    pub fn from_bytes_with_limit(buf: &[u8], max_payload_size: usize) -> Result<Self> {
        let header = Self::parse_header(buf, max_payload_size)?;
        if buf.len() != HEADER_SIZE + header.length {
            return Err(ExchangeError::InvalidHeader);
        }
        Ok(Self {
            version: header.version,
            kind: header.kind,
            payload: Bytes::copy_from_slice(&buf[HEADER_SIZE..]),
        })
    }

    pub(crate) fn write_header(&self, out: &mut impl Extend<u8>) {
        out.extend(MAGIC_BYTES);
        out.extend([self.version, self.kind.to_byte()]);
        out.extend((self.payload.len() as u32).to_be_bytes());
    }

    pub(crate) fn parse_header(buf: &[u8], max_payload_size: usize) -> Result<Header> {
        if buf.len() < HEADER_SIZE || buf[0..4] != MAGIC_BYTES {
            return Err(ExchangeError::InvalidHeader);
        }

        let version = buf[4];
        if version != PROTOCOL_VERSION {
            return Err(ExchangeError::UnsupportedVersion(version));
        }

        let kind = ElementKind::from_byte(buf[5]).ok_or(ExchangeError::InvalidHeader)?;

        let length = u32::from_be_bytes([buf[6], buf[7], buf[8], buf[9]]) as usize;
        if length > max_payload_size {
            return Err(ExchangeError::OversizedPacket(length));
        }

        Ok(Header {
            version,
            kind,
            length,
        })
    }
}
