//! # Error Types
//!
//! Error handling for mesh serialization and exchange.
//!
//! ## Error Categories
//! - **Validation Errors**: wire values that break the layout invariants
//!   (sizes, buffer lengths, local identifier uniqueness, dangling references)
//! - **Reconstruction Errors**: connectivity that cannot be resolved while
//!   populating a target mesh
//! - **Framing Errors**: bad magic, unknown versions, oversized or truncated frames
//! - **Transport Errors**: I/O failures, closed channels, invalid ranks
//!
//! Validation failures are reported through the dedicated [`ValidationError`]
//! enum so callers can tell a protocol defect apart from a broken transport.
//!
//! ## Example Usage
//! ```rust
//! use mesh_exchange::core::serialized::SerializedMesh;
//! use mesh_exchange::error::{ExchangeError, ValidationError};
//!
//! // Two vertices claim the same local identifier.
//! let result = SerializedMesh::from_parts(
//!     vec![1, 2, 1, 0, 0],
//!     vec![0.0, 1.0],
//!     vec![10, 7, 11, 7, 7, 7],
//! );
//! assert!(matches!(
//!     result,
//!     Err(ExchangeError::Validation(ValidationError::DuplicateLocalId(7)))
//! ));
//! ```

use std::io;
use thiserror::Error;

use crate::core::range::ElementKind;
use crate::mesh::VertexId;
use crate::transport::Rank;

/// Violations of the wire layout invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("sizes must hold exactly 5 entries, got {0}")]
    SizesLength(usize),

    #[error("invalid dimension {0} (expected 1..=3)")]
    InvalidDimension(i32),

    #[error("negative {what} count: {count}")]
    NegativeCount { what: &'static str, count: i32 },

    #[error("mesh without vertices declares connectivity")]
    ConnectivityWithoutVertices,

    #[error("mesh without vertices carries {coords} coordinates and {ids} ids")]
    PayloadWithoutVertices { coords: usize, ids: usize },

    #[error("expected {expected} coordinates, got {actual}")]
    CoordsLength { expected: usize, actual: usize },

    #[error("expected {expected} ids, got {actual}")]
    IdsLength { expected: usize, actual: usize },

    #[error("duplicate local id {0} in vertex block")]
    DuplicateLocalId(i32),

    #[error("connectivity references unknown local id {0}")]
    UnknownLocalId(i32),

    #[error("wire dimension {wire} does not match mesh dimension {mesh}")]
    DimensionMismatch { wire: i32, mesh: i32 },
}

/// Primary error type for codec, transport and exchange operations
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid serialized mesh: {0}")]
    Validation(#[from] ValidationError),

    #[error("Local id {0} does not resolve to a reconstructed vertex")]
    UnresolvedVertex(i32),

    #[error("Mesh has no vertex {0}")]
    UnknownVertex(VertexId),

    #[error("Vertex needs {expected} coordinates, got {actual}")]
    CoordinateCount { expected: usize, actual: usize },

    #[error("Unsupported mesh dimension: {0}")]
    UnsupportedDimension(usize),

    #[error("Value {0} does not fit the 32-bit wire integer")]
    CountOverflow(usize),

    #[error("Invalid frame header")]
    InvalidHeader,

    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    #[error("Frame too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Expected {expected:?} range, got {found:?}")]
    UnexpectedElementKind {
        expected: ElementKind,
        found: ElementKind,
    },

    #[error("Payload of {len} bytes is not a whole number of {width}-byte elements")]
    MalformedPayload { len: usize, width: usize },

    #[error("Invalid rank {rank} for communicator of size {size}")]
    InvalidRank { rank: Rank, size: usize },

    #[error("Rank {0} is not the broadcast root")]
    NotBroadcastRoot(Rank),

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ExchangeError
pub type Result<T> = std::result::Result<T, ExchangeError>;
