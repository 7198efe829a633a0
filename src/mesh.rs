//! # Mesh Store
//!
//! Owned, in-memory unstructured mesh: vertices in 1 to 3 dimensions plus
//! optional edges, triangles and tetrahedra.
//!
//! Vertices live in an arena and are addressed by [`VertexId`], their local
//! identifier. Elements reference vertices by `VertexId` only, and keep the
//! vertex order they were created with (this is the element orientation).

use std::fmt;

use crate::error::{ExchangeError, Result};

/// Global index carried by vertices that were never assigned one.
pub const UNDEFINED_GLOBAL_INDEX: i32 = -1;

/// Local identifier of a vertex within one [`Mesh`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub usize);

impl VertexId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    id: VertexId,
    coords: Vec<f64>,
    global_index: i32,
}

impl Vertex {
    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    pub fn global_index(&self) -> i32 {
        self.global_index
    }

    pub fn set_global_index(&mut self, global_index: i32) {
        self.global_index = global_index;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge(pub [VertexId; 2]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle(pub [VertexId; 3]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tetrahedron(pub [VertexId; 4]);

impl Edge {
    pub fn vertices(&self) -> &[VertexId] {
        &self.0
    }
}

impl Triangle {
    pub fn vertices(&self) -> &[VertexId] {
        &self.0
    }
}

impl Tetrahedron {
    pub fn vertices(&self) -> &[VertexId] {
        &self.0
    }
}

/// Named mesh with a fixed spatial dimension
#[derive(Debug, Clone)]
pub struct Mesh {
    name: String,
    dimensions: usize,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    triangles: Vec<Triangle>,
    tetrahedra: Vec<Tetrahedron>,
}

impl Mesh {
    /// Create an empty mesh; `dimensions` must be 1, 2 or 3
    pub fn new(name: impl Into<String>, dimensions: usize) -> Result<Self> {
        if !(1..=3).contains(&dimensions) {
            return Err(ExchangeError::UnsupportedDimension(dimensions));
        }
        Ok(Self {
            name: name.into(),
            dimensions,
            vertices: Vec::new(),
            edges: Vec::new(),
            triangles: Vec::new(),
            tetrahedra: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn tetrahedra(&self) -> &[Tetrahedron] {
        &self.tetrahedra
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.index())
    }

    /// True if the mesh holds any edge, triangle or tetrahedron
    pub fn has_connectivity(&self) -> bool {
        !self.edges.is_empty() || !self.triangles.is_empty() || !self.tetrahedra.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append a vertex and hand it back for further setup.
    ///
    /// The new vertex gets the next free local identifier and
    /// [`UNDEFINED_GLOBAL_INDEX`] as its global index.
    pub fn create_vertex(&mut self, coords: &[f64]) -> Result<&mut Vertex> {
        if coords.len() != self.dimensions {
            return Err(ExchangeError::CoordinateCount {
                expected: self.dimensions,
                actual: coords.len(),
            });
        }
        let id = VertexId(self.vertices.len());
        self.vertices.push(Vertex {
            id,
            coords: coords.to_vec(),
            global_index: UNDEFINED_GLOBAL_INDEX,
        });
        let index = id.index();
        Ok(&mut self.vertices[index])
    }

    pub fn create_edge(&mut self, v0: VertexId, v1: VertexId) -> Result<&Edge> {
        self.check_vertices(&[v0, v1])?;
        self.edges.push(Edge([v0, v1]));
        Ok(&self.edges[self.edges.len() - 1])
    }

    pub fn create_triangle(&mut self, v0: VertexId, v1: VertexId, v2: VertexId) -> Result<&Triangle> {
        self.check_vertices(&[v0, v1, v2])?;
        self.triangles.push(Triangle([v0, v1, v2]));
        Ok(&self.triangles[self.triangles.len() - 1])
    }

    pub fn create_tetrahedron(
        &mut self,
        v0: VertexId,
        v1: VertexId,
        v2: VertexId,
        v3: VertexId,
    ) -> Result<&Tetrahedron> {
        self.check_vertices(&[v0, v1, v2, v3])?;
        self.tetrahedra.push(Tetrahedron([v0, v1, v2, v3]));
        Ok(&self.tetrahedra[self.tetrahedra.len() - 1])
    }

    /// Drop all vertices and elements, keeping name and dimension
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.triangles.clear();
        self.tetrahedra.clear();
    }

    fn check_vertices(&self, ids: &[VertexId]) -> Result<()> {
        match ids.iter().find(|id| id.index() >= self.vertices.len()) {
            Some(&missing) => Err(ExchangeError::UnknownVertex(missing)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn test_rejects_unsupported_dimension() {
        assert!(matches!(
            Mesh::new("m", 0),
            Err(ExchangeError::UnsupportedDimension(0))
        ));
        assert!(matches!(
            Mesh::new("m", 4),
            Err(ExchangeError::UnsupportedDimension(4))
        ));
        assert!(Mesh::new("m", 3).is_ok());
    }

    #[test]
    fn test_vertex_ids_are_sequential() {
        let mut mesh = Mesh::new("m", 2).unwrap();
        let a = mesh.create_vertex(&[0.0, 0.0]).unwrap().id();
        let b = mesh.create_vertex(&[1.0, 0.0]).unwrap().id();
        assert_eq!(a, VertexId(0));
        assert_eq!(b, VertexId(1));
        assert_eq!(
            mesh.vertex(a).unwrap().global_index(),
            UNDEFINED_GLOBAL_INDEX
        );
    }

    #[test]
    fn test_coordinate_count_must_match_dimension() {
        let mut mesh = Mesh::new("m", 3).unwrap();
        let err = mesh.create_vertex(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::CoordinateCount {
                expected: 3,
                actual: 2
            }
        ));
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_elements_require_existing_vertices() {
        let mut mesh = Mesh::new("m", 2).unwrap();
        let a = mesh.create_vertex(&[0.0, 0.0]).unwrap().id();
        let err = mesh.create_edge(a, VertexId(5)).unwrap_err();
        assert!(matches!(err, ExchangeError::UnknownVertex(VertexId(5))));
        assert!(!mesh.has_connectivity());
    }

    #[test]
    fn test_connectivity_flag_and_order() {
        let mut mesh = Mesh::new("m", 3).unwrap();
        let ids: Vec<VertexId> = (0..4)
            .map(|i| mesh.create_vertex(&[i as f64, 0.0, 0.0]).unwrap().id())
            .collect();
        assert!(!mesh.has_connectivity());

        mesh.create_tetrahedron(ids[3], ids[1], ids[2], ids[0]).unwrap();
        assert!(mesh.has_connectivity());
        assert_eq!(
            mesh.tetrahedra()[0].vertices(),
            &[ids[3], ids[1], ids[2], ids[0]]
        );

        mesh.clear();
        assert!(mesh.is_empty());
        assert!(!mesh.has_connectivity());
        assert_eq!(mesh.dimensions(), 3);
    }
}
