//! In-process transport.
//!
//! [`LocalCommunication::group`] builds a fully connected group of ranks
//! with one unbounded FIFO channel per ordered rank pair. Frames cross the
//! channels fully encoded by [`PacketCodec`], so the wire format is the same
//! as on a real stream.
//!
//! Receiving blocks the calling thread. Do not call it from inside an async
//! runtime; give each rank its own thread instead.

use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::config::TransportConfig;
use crate::core::codec::PacketCodec;
use crate::core::packet::Packet;
use crate::error::{ExchangeError, Result};
use crate::transport::{check_peer, Communication, Rank};

/// One member of an in-process communicator
pub struct LocalCommunication {
    rank: Rank,
    size: usize,
    codec: PacketCodec,
    outgoing: Vec<Option<UnboundedSender<Bytes>>>,
    incoming: Vec<Option<UnboundedReceiver<Bytes>>>,
}

impl LocalCommunication {
    /// Create `size` connected members; element `i` has rank `i`
    pub fn group(size: usize) -> Vec<Self> {
        Self::group_with_config(size, &TransportConfig::default())
    }

    pub fn group_with_config(size: usize, config: &TransportConfig) -> Vec<Self> {
        let mut members: Vec<Self> = (0..size)
            .map(|rank| Self {
                rank,
                size,
                codec: PacketCodec::new(config.max_payload_size),
                outgoing: (0..size).map(|_| None).collect(),
                incoming: (0..size).map(|_| None).collect(),
            })
            .collect();

        for from in 0..size {
            for to in (0..size).filter(|&to| to != from) {
                let (tx, rx) = unbounded_channel();
                members[from].outgoing[to] = Some(tx);
                members[to].incoming[from] = Some(rx);
            }
        }
        members
    }
}

impl Communication for LocalCommunication {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send_packet(&mut self, packet: Packet, destination: Rank) -> Result<()> {
        check_peer(self.rank, self.size, destination)?;

        let mut frame = BytesMut::new();
        self.codec.encode(packet, &mut frame)?;
        trace!(from = self.rank, to = destination, bytes = frame.len(), "Frame queued");

        let sender = self.outgoing[destination]
            .as_ref()
            .ok_or(ExchangeError::ConnectionClosed)?;
        sender
            .send(frame.freeze())
            .map_err(|_| ExchangeError::ConnectionClosed)
    }

    fn receive_packet(&mut self, source: Rank) -> Result<Packet> {
        check_peer(self.rank, self.size, source)?;

        let receiver = self.incoming[source]
            .as_mut()
            .ok_or(ExchangeError::ConnectionClosed)?;
        let frame = receiver
            .blocking_recv()
            .ok_or(ExchangeError::ConnectionClosed)?;
        trace!(from = source, to = self.rank, bytes = frame.len(), "Frame received");

        let mut buf = BytesMut::from(&frame[..]);
        let packet = self
            .codec
            .decode(&mut buf)?
            .ok_or(ExchangeError::InvalidHeader)?;
        if !buf.is_empty() {
            return Err(ExchangeError::InvalidHeader);
        }
        Ok(packet)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::core::range::ElementKind;

    #[test]
    fn test_fifo_per_pair() {
        let mut group = LocalCommunication::group(2);
        let mut b = group.pop().unwrap();
        let mut a = group.pop().unwrap();

        a.send_range(&[1i32, 2], 1).unwrap();
        a.send_range(&[3.5f64], 1).unwrap();
        a.send_range(&[4i32], 1).unwrap();

        assert_eq!(b.receive_range::<i32>(0).unwrap(), vec![1, 2]);
        assert_eq!(b.receive_range::<f64>(0).unwrap(), vec![3.5]);
        assert_eq!(b.receive_range::<i32>(0).unwrap(), vec![4]);
    }

    #[test]
    fn test_broadcast_reaches_every_rank() {
        let mut group = LocalCommunication::group(4);
        group[0].broadcast_send_range(&[9i32, 8, 7]).unwrap();
        for member in group.iter_mut().skip(1) {
            assert_eq!(member.broadcast_receive_range::<i32>(0).unwrap(), vec![9, 8, 7]);
        }
    }

    #[test]
    fn test_wrong_type_is_reported() {
        let mut group = LocalCommunication::group(2);
        group[0].send_range(&[1.0f64], 1).unwrap();
        assert!(matches!(
            group[1].receive_range::<i32>(0),
            Err(ExchangeError::UnexpectedElementKind {
                expected: ElementKind::Int32,
                found: ElementKind::Float64
            })
        ));
    }

    #[test]
    fn test_closed_peer() {
        let mut group = LocalCommunication::group(2);
        let mut b = group.pop().unwrap();
        drop(group);
        assert!(matches!(
            b.receive_range::<i32>(0),
            Err(ExchangeError::ConnectionClosed)
        ));
        assert!(matches!(
            b.send_range(&[1i32], 0),
            Err(ExchangeError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_invalid_ranks() {
        let mut group = LocalCommunication::group(2);
        assert!(matches!(
            group[0].send_range(&[1i32], 0),
            Err(ExchangeError::InvalidRank { rank: 0, size: 2 })
        ));
        assert!(matches!(
            group[0].receive_range::<i32>(5),
            Err(ExchangeError::InvalidRank { rank: 5, size: 2 })
        ));
    }

    #[test]
    fn test_payload_limit_applies() {
        let config = TransportConfig {
            max_payload_size: 32,
        };
        let mut group = LocalCommunication::group_with_config(2, &config);
        assert!(matches!(
            group[0].send_range(&[0.0f64; 5], 1),
            Err(ExchangeError::OversizedPacket(40))
        ));
        group[0].send_range(&[0.0f64; 4], 1).unwrap();
        assert_eq!(group[1].receive_range::<f64>(0).unwrap().len(), 4);
    }
}
