//! Observability and Metrics
//!
//! Counters for mesh exchange traffic. Uses atomic counters so a single
//! collector can be shared between exchange drivers on different threads.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Metrics collector for exchange operations
#[derive(Debug)]
pub struct ExchangeMetrics {
    /// Meshes sent point-to-point
    pub meshes_sent: AtomicU64,
    /// Meshes received point-to-point
    pub meshes_received: AtomicU64,
    /// Meshes broadcast from this rank
    pub broadcasts_sent: AtomicU64,
    /// Meshes received through a broadcast
    pub broadcasts_received: AtomicU64,
    /// Vertices encoded for sending
    pub vertices_sent: AtomicU64,
    /// Vertices added to target meshes
    pub vertices_received: AtomicU64,
    /// Edges, triangles and tetrahedra encoded for sending
    pub elements_sent: AtomicU64,
    /// Edges, triangles and tetrahedra added to target meshes
    pub elements_received: AtomicU64,
    /// Ranges handed to the transport
    pub ranges_sent: AtomicU64,
    /// Ranges taken from the transport
    pub ranges_received: AtomicU64,
    /// Received meshes rejected by validation
    pub validation_failures: AtomicU64,
    start_time: Instant,
}

/// Point-in-time copy of all counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub meshes_sent: u64,
    pub meshes_received: u64,
    pub broadcasts_sent: u64,
    pub broadcasts_received: u64,
    pub vertices_sent: u64,
    pub vertices_received: u64,
    pub elements_sent: u64,
    pub elements_received: u64,
    pub ranges_sent: u64,
    pub ranges_received: u64,
    pub validation_failures: u64,
}

impl ExchangeMetrics {
    pub fn new() -> Self {
        Self {
            meshes_sent: AtomicU64::new(0),
            meshes_received: AtomicU64::new(0),
            broadcasts_sent: AtomicU64::new(0),
            broadcasts_received: AtomicU64::new(0),
            vertices_sent: AtomicU64::new(0),
            vertices_received: AtomicU64::new(0),
            elements_sent: AtomicU64::new(0),
            elements_received: AtomicU64::new(0),
            ranges_sent: AtomicU64::new(0),
            ranges_received: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a mesh handed to the transport
    pub fn mesh_sent(&self, broadcast: bool, vertices: usize, elements: usize, ranges: usize) {
        let counter = if broadcast {
            &self.broadcasts_sent
        } else {
            &self.meshes_sent
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.vertices_sent.fetch_add(vertices as u64, Ordering::Relaxed);
        self.elements_sent.fetch_add(elements as u64, Ordering::Relaxed);
        self.ranges_sent.fetch_add(ranges as u64, Ordering::Relaxed);
    }

    /// Record a mesh added to a target mesh
    pub fn mesh_received(&self, broadcast: bool, vertices: usize, elements: usize) {
        let counter = if broadcast {
            &self.broadcasts_received
        } else {
            &self.meshes_received
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.vertices_received.fetch_add(vertices as u64, Ordering::Relaxed);
        self.elements_received.fetch_add(elements as u64, Ordering::Relaxed);
    }

    pub fn range_received(&self) {
        self.ranges_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn validation_failed(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            meshes_sent: self.meshes_sent.load(Ordering::Relaxed),
            meshes_received: self.meshes_received.load(Ordering::Relaxed),
            broadcasts_sent: self.broadcasts_sent.load(Ordering::Relaxed),
            broadcasts_received: self.broadcasts_received.load(Ordering::Relaxed),
            vertices_sent: self.vertices_sent.load(Ordering::Relaxed),
            vertices_received: self.vertices_received.load(Ordering::Relaxed),
            elements_sent: self.elements_sent.load(Ordering::Relaxed),
            elements_received: self.elements_received.load(Ordering::Relaxed),
            ranges_sent: self.ranges_sent.load(Ordering::Relaxed),
            ranges_received: self.ranges_received.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
        }
    }

    /// Log a summary of all counters
    pub fn log_summary(&self) {
        let s = self.snapshot();
        info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            meshes_sent = s.meshes_sent,
            meshes_received = s.meshes_received,
            broadcasts_sent = s.broadcasts_sent,
            broadcasts_received = s.broadcasts_received,
            vertices_sent = s.vertices_sent,
            vertices_received = s.vertices_received,
            ranges_sent = s.ranges_sent,
            ranges_received = s.ranges_received,
            validation_failures = s.validation_failures,
            "Mesh exchange metrics"
        );
    }
}

impl Default for ExchangeMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = ExchangeMetrics::new();
        metrics.mesh_sent(false, 3, 1, 3);
        metrics.mesh_sent(true, 0, 0, 1);
        metrics.range_received();
        metrics.mesh_received(true, 3, 1);
        metrics.validation_failed();

        let s = metrics.snapshot();
        assert_eq!(s.meshes_sent, 1);
        assert_eq!(s.broadcasts_sent, 1);
        assert_eq!(s.vertices_sent, 3);
        assert_eq!(s.elements_sent, 1);
        assert_eq!(s.ranges_sent, 4);
        assert_eq!(s.ranges_received, 1);
        assert_eq!(s.broadcasts_received, 1);
        assert_eq!(s.meshes_received, 0);
        assert_eq!(s.vertices_received, 3);
        assert_eq!(s.validation_failures, 1);
    }
}
