//! # mesh-exchange
//!
//! Converts an unstructured mesh (vertices plus optional edges, triangles and
//! tetrahedra) into a compact, self-describing wire representation and
//! rebuilds an equivalent mesh from it on another rank.
//!
//! ## Layout
//! - [`mesh`]: owned in-memory mesh store
//! - [`core`]: `SerializedMesh` codec, typed ranges and sub-message framing
//! - [`transport`]: the `Communication` collaborator plus in-process and
//!   stream-backed implementations
//! - [`exchange`]: the four transfer operations (send, receive, broadcast
//!   send, broadcast receive)
//! - [`config`], [`error`], [`utils`]: configuration, errors, logging and metrics
//!
//! ## Example
//! ```rust
//! use mesh_exchange::exchange::MeshExchange;
//! use mesh_exchange::mesh::Mesh;
//! use mesh_exchange::transport::local::LocalCommunication;
//!
//! let mut group = LocalCommunication::group(2).into_iter();
//! let (Some(first), Some(second)) = (group.next(), group.next()) else {
//!     unreachable!();
//! };
//! let mut sender = MeshExchange::new(first);
//! let mut receiver = MeshExchange::new(second);
//!
//! let mut mesh = Mesh::new("Fluid", 2)?;
//! mesh.create_vertex(&[0.0, 0.0])?.set_global_index(10);
//! mesh.create_vertex(&[1.0, 0.0])?.set_global_index(11);
//!
//! sender.send_mesh(&mesh, 1)?;
//!
//! let mut received = Mesh::new("Fluid", 2)?;
//! receiver.receive_mesh(&mut received, 0)?;
//! assert_eq!(received.vertices().len(), 2);
//! # Ok::<(), mesh_exchange::error::ExchangeError>(())
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod exchange;
pub mod mesh;
pub mod transport;
pub mod utils;

pub use crate::core::serialized::SerializedMesh;
pub use crate::error::{ExchangeError, Result, ValidationError};
pub use crate::exchange::MeshExchange;
pub use crate::mesh::Mesh;
