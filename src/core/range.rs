//! Typed ranges: the element sequences a mesh exchange is made of.
//!
//! Every element is fixed-width and big-endian, so independently built
//! senders and receivers agree on the bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::core::packet::Packet;
use crate::error::{ExchangeError, Result};

/// Element type tag of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// 32-bit signed integers (`sizes`, `ids`)
    Int32,
    /// 64-bit IEEE-754 floats (`coords`)
    Float64,
}

impl ElementKind {
    /// Get the kind identifier byte for the frame header
    pub fn to_byte(self) -> u8 {
        match self {
            ElementKind::Int32 => 0x01,
            ElementKind::Float64 => 0x02,
        }
    }

    /// Detect kind from identifier byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(ElementKind::Int32),
            0x02 => Some(ElementKind::Float64),
            _ => None,
        }
    }

    /// Encoded width of one element in bytes
    pub fn width(self) -> usize {
        match self {
            ElementKind::Int32 => 4,
            ElementKind::Float64 => 8,
        }
    }
}

/// A primitive that can travel inside a range
pub trait WireElement: Copy {
    const KIND: ElementKind;

    fn put(self, buf: &mut BytesMut);

    fn get(buf: &mut Bytes) -> Self;
}

impl WireElement for i32 {
    const KIND: ElementKind = ElementKind::Int32;

    #[inline]
    fn put(self, buf: &mut BytesMut) {
        buf.put_i32(self);
    }

    #[inline]
    fn get(buf: &mut Bytes) -> Self {
        buf.get_i32()
    }
}

impl WireElement for f64 {
    const KIND: ElementKind = ElementKind::Float64;

    #[inline]
    fn put(self, buf: &mut BytesMut) {
        buf.put_f64(self);
    }

    #[inline]
    fn get(buf: &mut Bytes) -> Self {
        buf.get_f64()
    }
}

/// Pack a sequence into a single frame
pub fn encode_range<T: WireElement>(values: &[T]) -> Packet {
    let mut payload = BytesMut::with_capacity(values.len() * T::KIND.width());
    for &value in values {
        value.put(&mut payload);
    }
    Packet::new(T::KIND, payload.freeze())
}

/// Unpack a frame, checking that it carries elements of type `T`
pub fn decode_range<T: WireElement>(packet: &Packet) -> Result<Vec<T>> {
    if packet.kind != T::KIND {
        return Err(ExchangeError::UnexpectedElementKind {
            expected: T::KIND,
            found: packet.kind,
        });
    }
    let width = T::KIND.width();
    if packet.payload.len() % width != 0 {
        return Err(ExchangeError::MalformedPayload {
            len: packet.payload.len(),
            width,
        });
    }

    let mut payload = packet.payload.clone();
    let mut values = Vec::with_capacity(payload.len() / width);
    while payload.has_remaining() {
        values.push(T::get(&mut payload));
    }
    Ok(values)
}
