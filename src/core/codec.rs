//! Stream framing for [`Packet`]s.
//!
//! `PacketCodec` works with any `BytesMut` buffer, so it serves both
//! `tokio_util::codec::Framed` and the blocking transports in this crate.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::config::MAX_PAYLOAD_SIZE;
use crate::core::packet::{Packet, HEADER_SIZE};
use crate::error::{ExchangeError, Result};

#[derive(Debug, Clone, Copy)]
pub struct PacketCodec {
    max_payload_size: usize,
}

impl Default for PacketCodec {
    fn default() -> Self {
        Self::new(MAX_PAYLOAD_SIZE)
    }
}

impl PacketCodec {
    pub fn new(max_payload_size: usize) -> Self {
        Self { max_payload_size }
    }

    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = ExchangeError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        let header = Packet::parse_header(&src[..HEADER_SIZE], self.max_payload_size)?;
        let frame_len = HEADER_SIZE + header.length;
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        src.advance(HEADER_SIZE);
        let payload = src.split_to(header.length).freeze();
        Ok(Some(Packet {
            version: header.version,
            kind: header.kind,
            payload,
        }))
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = ExchangeError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<()> {
        if item.payload.len() > self.max_payload_size {
            return Err(ExchangeError::OversizedPacket(item.payload.len()));
        }
        dst.reserve(HEADER_SIZE + item.payload.len());
        item.write_header(dst);
        dst.put_slice(&item.payload);
        Ok(())
    }
}
