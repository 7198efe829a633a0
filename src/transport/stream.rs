//! Blocking transport over byte streams.
//!
//! Each peer rank is reached through its own stream (`TcpStream`,
//! `UnixStream`, or anything `Read + Write`). Frames are written whole and
//! read back through a per-peer buffer, so partial reads are handled by the
//! codec.

use std::collections::HashMap;
use std::io::{ErrorKind, Read, Write};

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use crate::config::TransportConfig;
use crate::core::codec::PacketCodec;
use crate::core::packet::Packet;
use crate::error::{ExchangeError, Result};
use crate::transport::{check_peer, Communication, Rank};

const READ_CHUNK: usize = 8 * 1024;

struct Peer<S> {
    stream: S,
    buffer: BytesMut,
}

/// Communicator whose peers are connected by individual streams
pub struct StreamCommunication<S> {
    rank: Rank,
    size: usize,
    codec: PacketCodec,
    peers: HashMap<Rank, Peer<S>>,
}

impl<S: Read + Write> StreamCommunication<S> {
    pub fn new(rank: Rank, size: usize) -> Self {
        Self::with_config(rank, size, &TransportConfig::default())
    }

    pub fn with_config(rank: Rank, size: usize, config: &TransportConfig) -> Self {
        Self {
            rank,
            size,
            codec: PacketCodec::new(config.max_payload_size),
            peers: HashMap::new(),
        }
    }

    /// Two-rank communicator pair from the two ends of a connection
    pub fn pair(first: S, second: S) -> Result<(Self, Self)> {
        let mut rank0 = Self::new(0, 2);
        let mut rank1 = Self::new(1, 2);
        rank0.add_peer(1, first)?;
        rank1.add_peer(0, second)?;
        Ok((rank0, rank1))
    }

    /// Register the stream leading to `peer`, replacing any previous one
    pub fn add_peer(&mut self, peer: Rank, stream: S) -> Result<()> {
        check_peer(self.rank, self.size, peer)?;
        debug!(rank = self.rank, peer, "Peer stream registered");
        self.peers.insert(
            peer,
            Peer {
                stream,
                buffer: BytesMut::with_capacity(READ_CHUNK),
            },
        );
        Ok(())
    }

    /// Remove and return the stream leading to `peer`
    pub fn remove_peer(&mut self, peer: Rank) -> Option<S> {
        self.peers.remove(&peer).map(|p| p.stream)
    }

    fn peer_mut(peers: &mut HashMap<Rank, Peer<S>>, rank: Rank) -> Result<&mut Peer<S>> {
        peers
            .get_mut(&rank)
            .ok_or_else(|| ExchangeError::TransportError(format!("No stream to rank {rank}")))
    }
}

impl<S: Read + Write> Communication for StreamCommunication<S> {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send_packet(&mut self, packet: Packet, destination: Rank) -> Result<()> {
        check_peer(self.rank, self.size, destination)?;
        let peer = Self::peer_mut(&mut self.peers, destination)?;

        let mut frame = BytesMut::new();
        self.codec.encode(packet, &mut frame)?;
        peer.stream.write_all(&frame)?;
        peer.stream.flush()?;
        trace!(to = destination, bytes = frame.len(), "Frame written");
        Ok(())
    }

    fn receive_packet(&mut self, source: Rank) -> Result<Packet> {
        check_peer(self.rank, self.size, source)?;
        let peer = Self::peer_mut(&mut self.peers, source)?;

        let mut chunk = [0u8; READ_CHUNK];
        loop {
            if let Some(packet) = self.codec.decode(&mut peer.buffer)? {
                trace!(from = source, elements = packet.element_count(), "Frame read");
                return Ok(packet);
            }
            match peer.stream.read(&mut chunk) {
                Ok(0) => return Err(ExchangeError::ConnectionClosed),
                Ok(n) => peer.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}
