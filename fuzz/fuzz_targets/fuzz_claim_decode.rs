#![no_main]

use libfuzzer_sys::fuzz_target;

// Stored records are decoded with bincode; corrupt bytes must not panic.
fuzz_target!(|data: &[u8]| {
    let _ = bincode::deserialize::<counterstake_types::Claim>(data);
    let _ = bincode::deserialize::<counterstake_types::ClaimId>(data);
    let _ = bincode::deserialize::<counterstake_types::Timestamp>(data);
});
