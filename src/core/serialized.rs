//! # Serialized Mesh
//!
//! Flattened, transport-ready form of a [`Mesh`].
//!
//! ## Layout
//! - `sizes`: `[dimension, vertices, edges, triangles, tetrahedra]`
//! - `coords`: `vertices * dimension` coordinates, vertex-major
//! - `ids`, without connectivity: one global index per vertex
//! - `ids`, with connectivity: `(global, local)` per vertex, then 2 local ids
//!   per edge, 3 per triangle and 4 per tetrahedron
//!
//! Local ids on the wire are the sender's. They only have meaning inside one
//! serialized value and are mapped onto freshly created vertices when the
//! value is added to a target mesh.
//!
//! Global indices may repeat when there is no connectivity, since vertices
//! without connectivity can still carry the undefined placeholder index.

use std::collections::{HashMap, HashSet};

use crate::error::{ExchangeError, Result, ValidationError};
use crate::mesh::{Mesh, VertexId};

/// Number of entries in the `sizes` range
pub const SIZES_LEN: usize = 5;

/// Validated wire form of a mesh; immutable once built
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedMesh {
    sizes: [i32; SIZES_LEN],
    coords: Vec<f64>,
    ids: Vec<i32>,
}

/// Counts taken from a `sizes` range that passed the sign checks
#[derive(Debug, Clone, Copy)]
struct Counts {
    dimensions: usize,
    vertices: usize,
    edges: usize,
    triangles: usize,
    tetrahedra: usize,
}

impl Counts {
    fn parse(sizes: &[i32]) -> std::result::Result<Self, ValidationError> {
        if sizes.len() != SIZES_LEN {
            return Err(ValidationError::SizesLength(sizes.len()));
        }
        let dimensions = sizes[0];
        if !(1..=3).contains(&dimensions) {
            return Err(ValidationError::InvalidDimension(dimensions));
        }

        let count = |what: &'static str, value: i32| {
            usize::try_from(value).map_err(|_| ValidationError::NegativeCount { what, count: value })
        };
        Ok(Self {
            dimensions: dimensions as usize,
            vertices: count("vertex", sizes[1])?,
            edges: count("edge", sizes[2])?,
            triangles: count("triangle", sizes[3])?,
            tetrahedra: count("tetrahedron", sizes[4])?,
        })
    }

    fn has_connectivity(&self) -> bool {
        self.edges + self.triangles + self.tetrahedra > 0
    }

    fn connectivity_ids(&self) -> usize {
        2 * self.edges + 3 * self.triangles + 4 * self.tetrahedra
    }
}

/// Check the wire invariants of a `(sizes, coords, ids)` triple
pub fn validate_parts(
    sizes: &[i32],
    coords: &[f64],
    ids: &[i32],
) -> std::result::Result<(), ValidationError> {
    let counts = Counts::parse(sizes)?;

    if counts.vertices == 0 {
        if counts.has_connectivity() {
            return Err(ValidationError::ConnectivityWithoutVertices);
        }
        if !coords.is_empty() || !ids.is_empty() {
            return Err(ValidationError::PayloadWithoutVertices {
                coords: coords.len(),
                ids: ids.len(),
            });
        }
        return Ok(());
    }

    let expected_coords = counts.vertices * counts.dimensions;
    if coords.len() != expected_coords {
        return Err(ValidationError::CoordsLength {
            expected: expected_coords,
            actual: coords.len(),
        });
    }

    if !counts.has_connectivity() {
        if ids.len() != counts.vertices {
            return Err(ValidationError::IdsLength {
                expected: counts.vertices,
                actual: ids.len(),
            });
        }
        return Ok(());
    }

    let expected_ids = 2 * counts.vertices + counts.connectivity_ids();
    if ids.len() != expected_ids {
        return Err(ValidationError::IdsLength {
            expected: expected_ids,
            actual: ids.len(),
        });
    }

    let (vertex_block, element_block) = ids.split_at(2 * counts.vertices);
    let mut local_ids = HashSet::with_capacity(counts.vertices);
    for pair in vertex_block.chunks_exact(2) {
        if !local_ids.insert(pair[1]) {
            return Err(ValidationError::DuplicateLocalId(pair[1]));
        }
    }
    if let Some(&unknown) = element_block.iter().find(|id| !local_ids.contains(id)) {
        return Err(ValidationError::UnknownLocalId(unknown));
    }

    Ok(())
}

/// Validate the three ranges and add their content to `mesh`
pub fn decode_into(sizes: Vec<i32>, coords: Vec<f64>, ids: Vec<i32>, mesh: &mut Mesh) -> Result<()> {
    SerializedMesh::from_parts(sizes, coords, ids)?.add_to_mesh(mesh)
}

fn to_wire(value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| ExchangeError::CountOverflow(value))
}

/// Append the local ids of one element, in element order
fn push_local_ids(ids: &mut Vec<i32>, vertices: &[VertexId]) -> Result<()> {
    for vertex in vertices {
        ids.push(to_wire(vertex.index())?);
    }
    Ok(())
}

/// Map one element's sender-side local ids onto reconstructed vertices
fn resolve<const N: usize>(lookup: &HashMap<i32, VertexId>, local_ids: &[i32]) -> Result<[VertexId; N]> {
    let mut resolved = [VertexId(0); N];
    for (slot, local) in resolved.iter_mut().zip(local_ids) {
        *slot = *lookup
            .get(local)
            .ok_or(ExchangeError::UnresolvedVertex(*local))?;
    }
    Ok(resolved)
}

impl SerializedMesh {
    /// Flatten a mesh snapshot.
    ///
    /// Local ids are interleaved and connectivity appended only when the mesh
    /// reports connectivity. The result is validated before it is returned.
    pub fn encode(mesh: &Mesh) -> Result<Self> {
        let vertices = mesh.vertices();
        let sizes = [
            to_wire(mesh.dimensions())?,
            to_wire(vertices.len())?,
            to_wire(mesh.edges().len())?,
            to_wire(mesh.triangles().len())?,
            to_wire(mesh.tetrahedra().len())?,
        ];

        if vertices.is_empty() {
            return Ok(Self {
                sizes,
                coords: Vec::new(),
                ids: Vec::new(),
            });
        }

        let has_connectivity = mesh.has_connectivity();
        let mut total_ids = vertices.len();
        if has_connectivity {
            total_ids += vertices.len()
                + 2 * mesh.edges().len()
                + 3 * mesh.triangles().len()
                + 4 * mesh.tetrahedra().len();
        }

        let mut coords = Vec::with_capacity(vertices.len() * mesh.dimensions());
        let mut ids = Vec::with_capacity(total_ids);
        for vertex in vertices {
            coords.extend_from_slice(vertex.coords());
            ids.push(vertex.global_index());
            if has_connectivity {
                ids.push(to_wire(vertex.id().index())?);
            }
        }

        if has_connectivity {
            for edge in mesh.edges() {
                push_local_ids(&mut ids, edge.vertices())?;
            }
            for triangle in mesh.triangles() {
                push_local_ids(&mut ids, triangle.vertices())?;
            }
            for tetrahedron in mesh.tetrahedra() {
                push_local_ids(&mut ids, tetrahedron.vertices())?;
            }
        }

        let serialized = Self { sizes, coords, ids };
        serialized.validate()?;
        Ok(serialized)
    }

    /// Build from received ranges, rejecting anything that breaks the layout
    pub fn from_parts(sizes: Vec<i32>, coords: Vec<f64>, ids: Vec<i32>) -> Result<Self> {
        validate_parts(&sizes, &coords, &ids)?;
        let sizes: [i32; SIZES_LEN] = sizes
            .try_into()
            .map_err(|sizes: Vec<i32>| ValidationError::SizesLength(sizes.len()))?;
        Ok(Self { sizes, coords, ids })
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        validate_parts(&self.sizes, &self.coords, &self.ids)
    }

    pub fn sizes(&self) -> &[i32; SIZES_LEN] {
        &self.sizes
    }

    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    pub fn into_parts(self) -> (Vec<i32>, Vec<f64>, Vec<i32>) {
        (self.sizes.to_vec(), self.coords, self.ids)
    }

    pub fn dimensions(&self) -> usize {
        self.sizes[0] as usize
    }

    pub fn vertex_count(&self) -> usize {
        self.sizes[1] as usize
    }

    pub fn edge_count(&self) -> usize {
        self.sizes[2] as usize
    }

    pub fn triangle_count(&self) -> usize {
        self.sizes[3] as usize
    }

    pub fn tetrahedron_count(&self) -> usize {
        self.sizes[4] as usize
    }

    /// Total number of connectivity elements
    pub fn element_count(&self) -> usize {
        self.edge_count() + self.triangle_count() + self.tetrahedron_count()
    }

    pub fn has_connectivity(&self) -> bool {
        self.element_count() > 0
    }

    /// Insert the serialized vertices and elements into `mesh`.
    ///
    /// Existing mesh content is left untouched. New vertices get local ids
    /// from `mesh`; connectivity is resolved through a lookup from the
    /// sender's local ids that lives only for this call. On error the mesh
    /// may already hold part of the content.
    pub fn add_to_mesh(&self, mesh: &mut Mesh) -> Result<()> {
        let wire_dimensions = self.sizes[0];
        if wire_dimensions as usize != mesh.dimensions() {
            return Err(ValidationError::DimensionMismatch {
                wire: wire_dimensions,
                mesh: mesh.dimensions() as i32,
            }
            .into());
        }

        let vertex_count = self.vertex_count();
        if vertex_count == 0 {
            return Ok(());
        }

        let has_connectivity = self.has_connectivity();
        let mut lookup = HashMap::with_capacity(if has_connectivity { vertex_count } else { 0 });

        for (i, coords) in self.coords.chunks_exact(self.dimensions()).enumerate() {
            let vertex = mesh.create_vertex(coords)?;
            if has_connectivity {
                vertex.set_global_index(self.ids[2 * i]);
                lookup.insert(self.ids[2 * i + 1], vertex.id());
            } else {
                vertex.set_global_index(self.ids[i]);
            }
        }

        if !has_connectivity {
            return Ok(());
        }

        let offset_edges = 2 * vertex_count;
        let offset_triangles = offset_edges + 2 * self.edge_count();
        let offset_tetrahedra = offset_triangles + 3 * self.triangle_count();

        for local_ids in self.ids[offset_edges..offset_triangles].chunks_exact(2) {
            let [v0, v1] = resolve::<2>(&lookup, local_ids)?;
            mesh.create_edge(v0, v1)?;
        }
        for local_ids in self.ids[offset_triangles..offset_tetrahedra].chunks_exact(3) {
            let [v0, v1, v2] = resolve::<3>(&lookup, local_ids)?;
            mesh.create_triangle(v0, v1, v2)?;
        }
        for local_ids in self.ids[offset_tetrahedra..].chunks_exact(4) {
            let [v0, v1, v2, v3] = resolve::<4>(&lookup, local_ids)?;
            mesh.create_tetrahedron(v0, v1, v2, v3)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    fn unit_triangle() -> Mesh {
        let mut mesh = Mesh::new("Triangle", 2).unwrap();
        let mut ids = Vec::new();
        for (coords, global) in [([0.0, 0.0], 10), ([1.0, 0.0], 11), ([0.0, 1.0], 12)] {
            let vertex = mesh.create_vertex(&coords).unwrap();
            vertex.set_global_index(global);
            ids.push(vertex.id());
        }
        mesh.create_triangle(ids[0], ids[1], ids[2]).unwrap();
        mesh
    }

    fn validation_error(result: Result<SerializedMesh>) -> ValidationError {
        match result {
            Err(ExchangeError::Validation(err)) => err,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_triangle_layout() {
        let serialized = SerializedMesh::encode(&unit_triangle()).unwrap();
        assert_eq!(serialized.sizes(), &[2, 3, 0, 1, 0]);
        assert_eq!(serialized.coords(), &[0.0, 0.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(serialized.ids(), &[10, 0, 11, 1, 12, 2, 0, 1, 2]);
    }

    #[test]
    fn test_triangle_reconstruction() {
        let serialized = SerializedMesh::encode(&unit_triangle()).unwrap();
        let mut target = Mesh::new("Target", 2).unwrap();
        serialized.add_to_mesh(&mut target).unwrap();

        let globals: Vec<i32> = target.vertices().iter().map(|v| v.global_index()).collect();
        assert_eq!(globals, vec![10, 11, 12]);
        assert_eq!(target.triangles().len(), 1);
        let triangle_globals: Vec<i32> = target.triangles()[0]
            .vertices()
            .iter()
            .map(|&id| target.vertex(id).unwrap().global_index())
            .collect();
        assert_eq!(triangle_globals, vec![10, 11, 12]);
    }

    #[test]
    fn test_local_ids_are_remapped() {
        let serialized = SerializedMesh::encode(&unit_triangle()).unwrap();
        let mut target = Mesh::new("Target", 2).unwrap();
        target.create_vertex(&[5.0, 5.0]).unwrap().set_global_index(99);
        target.create_vertex(&[6.0, 6.0]).unwrap().set_global_index(98);

        serialized.add_to_mesh(&mut target).unwrap();

        assert_eq!(target.vertices().len(), 5);
        assert_eq!(target.vertices()[0].global_index(), 99);
        assert_eq!(
            target.triangles()[0].vertices(),
            &[VertexId(2), VertexId(3), VertexId(4)]
        );
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::new("Empty", 3).unwrap();
        let serialized = SerializedMesh::encode(&mesh).unwrap();
        assert_eq!(serialized.sizes(), &[3, 0, 0, 0, 0]);
        assert!(serialized.coords().is_empty());
        assert!(serialized.ids().is_empty());

        let mut target = Mesh::new("Target", 3).unwrap();
        target.create_vertex(&[1.0, 2.0, 3.0]).unwrap();
        serialized.add_to_mesh(&mut target).unwrap();
        assert_eq!(target.vertices().len(), 1);
    }

    #[test]
    fn test_point_cloud_sends_only_global_ids() {
        let mut mesh = Mesh::new("Cloud", 1).unwrap();
        mesh.create_vertex(&[0.5]).unwrap().set_global_index(4);
        mesh.create_vertex(&[1.5]).unwrap();
        mesh.create_vertex(&[2.5]).unwrap();

        let serialized = SerializedMesh::encode(&mesh).unwrap();
        assert_eq!(serialized.sizes(), &[1, 3, 0, 0, 0]);
        assert_eq!(serialized.ids(), &[4, -1, -1]);
        assert!(!serialized.has_connectivity());

        let mut target = Mesh::new("Target", 1).unwrap();
        serialized.add_to_mesh(&mut target).unwrap();
        let globals: Vec<i32> = target.vertices().iter().map(|v| v.global_index()).collect();
        assert_eq!(globals, vec![4, -1, -1]);
        assert!(!target.has_connectivity());
    }

    #[test]
    fn test_element_orientation_preserved() {
        let mut mesh = Mesh::new("Tets", 3).unwrap();
        let ids: Vec<VertexId> = (0..4)
            .map(|i| {
                let vertex = mesh.create_vertex(&[i as f64, 1.0, 2.0]).unwrap();
                vertex.set_global_index(100 + i);
                vertex.id()
            })
            .collect();
        mesh.create_edge(ids[2], ids[0]).unwrap();
        mesh.create_tetrahedron(ids[3], ids[2], ids[1], ids[0]).unwrap();

        let serialized = SerializedMesh::encode(&mesh).unwrap();
        assert_eq!(serialized.sizes(), &[3, 4, 1, 0, 1]);
        assert_eq!(&serialized.ids()[8..], &[2, 0, 3, 2, 1, 0]);

        let mut target = Mesh::new("Target", 3).unwrap();
        serialized.add_to_mesh(&mut target).unwrap();
        let global = |id: VertexId| target.vertex(id).unwrap().global_index();
        let edge: Vec<i32> = target.edges()[0].vertices().iter().map(|&v| global(v)).collect();
        let tet: Vec<i32> = target.tetrahedra()[0].vertices().iter().map(|&v| global(v)).collect();
        assert_eq!(edge, vec![102, 100]);
        assert_eq!(tet, vec![103, 102, 101, 100]);
    }

    #[test]
    fn test_duplicate_local_id_rejected() {
        let err = validation_error(SerializedMesh::from_parts(
            vec![2, 2, 1, 0, 0],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![1, 5, 2, 5, 5, 5],
        ));
        assert_eq!(err, ValidationError::DuplicateLocalId(5));
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let err = validation_error(SerializedMesh::from_parts(
            vec![2, 2, 1, 0, 0],
            vec![0.0, 0.0, 1.0, 1.0],
            vec![1, 0, 2, 1, 0, 7],
        ));
        assert_eq!(err, ValidationError::UnknownLocalId(7));
    }

    #[test]
    fn test_duplicate_globals_allowed_without_connectivity() {
        let serialized =
            SerializedMesh::from_parts(vec![2, 2, 0, 0, 0], vec![0.0, 0.0, 1.0, 1.0], vec![-1, -1])
                .unwrap();
        assert_eq!(serialized.vertex_count(), 2);
    }

    #[test]
    fn test_structural_checks() {
        let cases: Vec<(Vec<i32>, Vec<f64>, Vec<i32>, ValidationError)> = vec![
            (vec![2, 0, 0, 0], vec![], vec![], ValidationError::SizesLength(4)),
            (vec![0, 0, 0, 0, 0], vec![], vec![], ValidationError::InvalidDimension(0)),
            (vec![4, 0, 0, 0, 0], vec![], vec![], ValidationError::InvalidDimension(4)),
            (
                vec![2, -1, 0, 0, 0],
                vec![],
                vec![],
                ValidationError::NegativeCount {
                    what: "vertex",
                    count: -1,
                },
            ),
            (
                vec![2, 0, 1, 0, 0],
                vec![],
                vec![],
                ValidationError::ConnectivityWithoutVertices,
            ),
            (
                vec![2, 0, 0, 0, 0],
                vec![1.0],
                vec![],
                ValidationError::PayloadWithoutVertices { coords: 1, ids: 0 },
            ),
            (
                vec![2, 1, 0, 0, 0],
                vec![1.0],
                vec![3],
                ValidationError::CoordsLength {
                    expected: 2,
                    actual: 1,
                },
            ),
            (
                vec![2, 1, 0, 0, 0],
                vec![1.0, 2.0],
                vec![3, 0],
                ValidationError::IdsLength {
                    expected: 1,
                    actual: 2,
                },
            ),
            (
                vec![1, 2, 1, 0, 0],
                vec![1.0, 2.0],
                vec![3, 0, 4, 1],
                ValidationError::IdsLength {
                    expected: 6,
                    actual: 4,
                },
            ),
        ];

        for (sizes, coords, ids, expected) in cases {
            assert_eq!(validate_parts(&sizes, &coords, &ids), Err(expected.clone()));
            assert_eq!(
                validation_error(SerializedMesh::from_parts(sizes, coords, ids)),
                expected
            );
        }
    }

    #[test]
    fn test_dimension_mismatch_leaves_target_untouched() {
        let serialized = SerializedMesh::encode(&unit_triangle()).unwrap();
        let mut target = Mesh::new("Target", 3).unwrap();
        let err = serialized.add_to_mesh(&mut target).unwrap_err();
        assert!(matches!(
            err,
            ExchangeError::Validation(ValidationError::DimensionMismatch { wire: 2, mesh: 3 })
        ));
        assert!(target.is_empty());
    }

    #[test]
    fn test_resolve_reports_missing_local_id() {
        let lookup = HashMap::from([(3, VertexId(0))]);
        assert!(matches!(
            resolve::<2>(&lookup, &[3, 4]),
            Err(ExchangeError::UnresolvedVertex(4))
        ));
        assert_eq!(resolve::<2>(&lookup, &[3, 3]).unwrap(), [VertexId(0); 2]);
    }

    #[test]
    fn test_decode_into() {
        let mut target = Mesh::new("Target", 2).unwrap();
        decode_into(
            vec![2, 3, 0, 1, 0],
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            vec![10, 0, 11, 1, 12, 2, 0, 1, 2],
            &mut target,
        )
        .unwrap();
        assert_eq!(target.vertices().len(), 3);
        assert_eq!(target.triangles().len(), 1);
        assert_eq!(target.vertices()[2].coords(), &[0.0, 1.0]);
    }
}
