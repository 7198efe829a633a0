//! # Mesh Exchange Driver
//!
//! Moves meshes between ranks by pairing [`SerializedMesh`] with a
//! [`Communication`] implementation.
//!
//! ## Protocol
//! Every exchange is one blocking round of one or three ranges, always in
//! this order:
//!
//! 1. `sizes` (5 × i32)
//! 2. `coords` (f64), only if `sizes` announces vertices
//! 3. `ids` (i32), only if `sizes` announces vertices
//!
//! Receivers decide whether ranges 2 and 3 follow purely from the `sizes`
//! they already hold. Received meshes are validated before anything is
//! inserted into the target mesh. A failed receive may still leave the
//! target partially populated; discard it rather than retrying in place.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::core::range::WireElement;
use crate::core::serialized::{SerializedMesh, SIZES_LEN};
use crate::error::{ExchangeError, Result, ValidationError};
use crate::mesh::Mesh;
use crate::transport::{Communication, Rank, BROADCAST_ROOT};
use crate::utils::metrics::ExchangeMetrics;

/// Where a range goes to or comes from
#[derive(Debug, Clone, Copy)]
enum Route {
    Peer(Rank),
    Broadcast { root: Rank },
}

impl Route {
    fn is_broadcast(self) -> bool {
        matches!(self, Route::Broadcast { .. })
    }
}

/// Sends and receives meshes over a communicator
pub struct MeshExchange<C> {
    communication: C,
    metrics: Arc<ExchangeMetrics>,
}

impl<C: Communication> MeshExchange<C> {
    pub fn new(communication: C) -> Self {
        Self::with_metrics(communication, Arc::new(ExchangeMetrics::new()))
    }

    /// Share a metrics collector between several drivers
    pub fn with_metrics(communication: C, metrics: Arc<ExchangeMetrics>) -> Self {
        Self {
            communication,
            metrics,
        }
    }

    pub fn communication(&self) -> &C {
        &self.communication
    }

    pub fn communication_mut(&mut self) -> &mut C {
        &mut self.communication
    }

    pub fn metrics(&self) -> &Arc<ExchangeMetrics> {
        &self.metrics
    }

    pub fn into_inner(self) -> C {
        self.communication
    }

    /// Send `mesh` to `receiver`; does not wait for a reply
    #[instrument(skip(self, mesh), fields(mesh = %mesh.name()))]
    pub fn send_mesh(&mut self, mesh: &Mesh, receiver: Rank) -> Result<()> {
        let serialized = SerializedMesh::encode(mesh)?;
        self.transmit(&serialized, Route::Peer(receiver))
    }

    /// Receive a mesh from `sender` and add it to `mesh`
    #[instrument(skip(self, mesh), fields(mesh = %mesh.name()))]
    pub fn receive_mesh(&mut self, mesh: &mut Mesh, sender: Rank) -> Result<()> {
        let route = Route::Peer(sender);
        let serialized = self.collect(route)?;
        self.apply(&serialized, mesh, route)
    }

    /// Broadcast `mesh` from this rank, which must be [`BROADCAST_ROOT`]
    #[instrument(skip(self, mesh), fields(mesh = %mesh.name()))]
    pub fn broadcast_send_mesh(&mut self, mesh: &Mesh) -> Result<()> {
        let rank = self.communication.rank();
        if rank != BROADCAST_ROOT {
            return Err(ExchangeError::NotBroadcastRoot(rank));
        }
        let serialized = SerializedMesh::encode(mesh)?;
        self.transmit(&serialized, Route::Broadcast { root: rank })
    }

    /// Receive a mesh broadcast by [`BROADCAST_ROOT`] and add it to `mesh`
    #[instrument(skip(self, mesh), fields(mesh = %mesh.name()))]
    pub fn broadcast_receive_mesh(&mut self, mesh: &mut Mesh) -> Result<()> {
        let route = Route::Broadcast {
            root: BROADCAST_ROOT,
        };
        let serialized = self.collect(route)?;
        self.apply(&serialized, mesh, route)
    }

    fn transmit(&mut self, serialized: &SerializedMesh, route: Route) -> Result<()> {
        self.put(&serialized.sizes()[..], route)?;
        let mut ranges = 1;
        if serialized.vertex_count() > 0 {
            self.put(serialized.coords(), route)?;
            self.put(serialized.ids(), route)?;
            ranges += 2;
        }

        self.metrics.mesh_sent(
            route.is_broadcast(),
            serialized.vertex_count(),
            serialized.element_count(),
            ranges,
        );
        debug!(
            vertices = serialized.vertex_count(),
            elements = serialized.element_count(),
            ranges,
            "Mesh transmitted"
        );
        Ok(())
    }

    fn put<T: WireElement>(&mut self, values: &[T], route: Route) -> Result<()> {
        match route {
            Route::Peer(rank) => self.communication.send_range(values, rank),
            Route::Broadcast { .. } => self.communication.broadcast_send_range(values),
        }
    }

    fn take<T: WireElement>(&mut self, route: Route) -> Result<Vec<T>> {
        let values = match route {
            Route::Peer(rank) => self.communication.receive_range(rank)?,
            Route::Broadcast { root } => self.communication.broadcast_receive_range(root)?,
        };
        self.metrics.range_received();
        Ok(values)
    }

    fn collect(&mut self, route: Route) -> Result<SerializedMesh> {
        let sizes: Vec<i32> = self.take(route)?;
        if sizes.len() != SIZES_LEN {
            return Err(self.rejected(ValidationError::SizesLength(sizes.len()).into()));
        }

        let (coords, ids) = if sizes[1] > 0 {
            let coords: Vec<f64> = self.take(route)?;
            let ids: Vec<i32> = self.take(route)?;
            (coords, ids)
        } else {
            (Vec::new(), Vec::new())
        };

        SerializedMesh::from_parts(sizes, coords, ids).map_err(|e| self.rejected(e))
    }

    fn apply(&self, serialized: &SerializedMesh, mesh: &mut Mesh, route: Route) -> Result<()> {
        if let Err(e) = serialized.add_to_mesh(mesh) {
            return Err(self.rejected(e));
        }

        self.metrics.mesh_received(
            route.is_broadcast(),
            serialized.vertex_count(),
            serialized.element_count(),
        );
        debug!(
            vertices = serialized.vertex_count(),
            elements = serialized.element_count(),
            "Mesh reconstructed"
        );
        Ok(())
    }

    fn rejected(&self, error: ExchangeError) -> ExchangeError {
        if matches!(error, ExchangeError::Validation(_)) {
            self.metrics.validation_failed();
        }
        warn!(error = %error, "Rejected incoming mesh");
        error
    }
}
