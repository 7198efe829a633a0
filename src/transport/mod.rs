//! # Transport Layer
//!
//! The [`Communication`] collaborator the exchange driver talks to, plus two
//! blocking implementations.
//!
//! ## Implementations
//! - **Local**: in-process group of ranks connected by FIFO channels
//! - **Stream**: one byte stream per peer (TCP or Unix sockets)
//!
//! ## Ordering
//! Implementations must deliver packets between one sender and one receiver
//! in the order they were sent. The exchange protocol adds no sequence numbers.

pub mod local;
pub mod stream;

use crate::core::packet::Packet;
use crate::core::range::{decode_range, encode_range, WireElement};
use crate::error::{ExchangeError, Result};

/// Index of a process within a communicator
pub type Rank = usize;

/// Well-known root of every mesh broadcast
pub const BROADCAST_ROOT: Rank = 0;

/// Blocking point-to-point and broadcast transfer of typed ranges
pub trait Communication {
    /// Rank of the calling process
    fn rank(&self) -> Rank;

    /// Number of ranks in the communicator
    fn size(&self) -> usize;

    fn send_packet(&mut self, packet: Packet, destination: Rank) -> Result<()>;

    /// Block until the next packet from `source` arrives
    fn receive_packet(&mut self, source: Rank) -> Result<Packet>;

    fn send_range<T: WireElement>(&mut self, values: &[T], destination: Rank) -> Result<()> {
        self.send_packet(encode_range(values), destination)
    }

    fn receive_range<T: WireElement>(&mut self, source: Rank) -> Result<Vec<T>> {
        let packet = self.receive_packet(source)?;
        decode_range(&packet)
    }

    /// Broadcast from the calling rank to every other rank, in rank order
    fn broadcast_send_range<T: WireElement>(&mut self, values: &[T]) -> Result<()> {
        let packet = encode_range(values);
        let root = self.rank();
        for destination in (0..self.size()).filter(|&rank| rank != root) {
            self.send_packet(packet.clone(), destination)?;
        }
        Ok(())
    }

    /// Receive the counterpart of a broadcast issued by `root`
    fn broadcast_receive_range<T: WireElement>(&mut self, root: Rank) -> Result<Vec<T>> {
        self.receive_range(root)
    }
}

/// Reject peers outside the communicator and self-addressed transfers
pub(crate) fn check_peer(rank: Rank, size: usize, peer: Rank) -> Result<()> {
    if peer >= size || peer == rank {
        return Err(ExchangeError::InvalidRank { rank: peer, size });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_peer() {
        assert!(check_peer(0, 3, 1).is_ok());
        assert!(check_peer(0, 3, 2).is_ok());
        assert!(matches!(
            check_peer(0, 3, 0),
            Err(ExchangeError::InvalidRank { rank: 0, size: 3 })
        ));
        assert!(matches!(
            check_peer(1, 3, 3),
            Err(ExchangeError::InvalidRank { rank: 3, size: 3 })
        ));
    }
}
