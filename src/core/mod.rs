//! # Core Codec Components
//!
//! Mesh flattening, typed ranges and sub-message framing.
//!
//! ## Components
//! - **SerializedMesh**: the five-buffer wire form of a mesh, with validation
//!   and reconstruction into a target mesh
//! - **Range**: fixed-width big-endian encoding of `i32` / `f64` sequences
//! - **Packet**: one framed sub-message carrying a single range
//! - **Codec**: `tokio_util` codec for framing packets over byte streams
//!
//! ## Wire Format
//! ```text
//! [Magic(4)] [Version(1)] [Kind(1)] [Length(4)] [Payload(N)]
//! ```
//! A mesh travels as `sizes` (Int32), then `coords` (Float64) and `ids`
//! (Int32); the last two are omitted when `sizes` announces no vertices.

pub mod codec;
pub mod packet;
pub mod range;
pub mod serialized;
