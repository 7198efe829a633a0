#![no_main]

use libfuzzer_sys::fuzz_target;
use mesh_exchange::core::packet::Packet;
use mesh_exchange::core::range::decode_range;

fuzz_target!(|data: &[u8]| {
    // Frame parsing must reject, never panic
    if let Ok(packet) = Packet::from_bytes(data) {
        let _ = decode_range::<i32>(&packet);
        let _ = decode_range::<f64>(&packet);
    }
});
