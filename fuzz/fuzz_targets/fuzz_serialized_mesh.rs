#![no_main]

use libfuzzer_sys::fuzz_target;
use mesh_exchange::core::serialized::SerializedMesh;
use mesh_exchange::mesh::Mesh;

fuzz_target!(|data: &[u8]| {
    // Split the input into sizes, coords and ids the way a receiver would see them
    let ints: Vec<i32> = data
        .chunks_exact(4)
        .map(|c| i32::from_be_bytes([c[0], c[1], c[2], c[3]]) % 16)
        .collect();
    if ints.len() < 5 {
        return;
    }
    let (sizes, rest) = ints.split_at(5);
    let coord_count = rest.len() / 2;
    let coords: Vec<f64> = rest[..coord_count].iter().map(|&v| v as f64).collect();
    let ids = rest[coord_count..].to_vec();

    if let Ok(serialized) = SerializedMesh::from_parts(sizes.to_vec(), coords, ids) {
        if let Ok(mut mesh) = Mesh::new("Fuzz", serialized.dimensions()) {
            let _ = serialized.add_to_mesh(&mut mesh);
        }
    }
});
