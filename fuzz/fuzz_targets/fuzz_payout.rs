#![no_main]

use libfuzzer_sys::fuzz_target;

use counterstake_engine::payout::distribute;

// Distributing a pot never pays out more than it holds.
fuzz_target!(|data: &[u8]| {
    if data.len() < 16 {
        return;
    }
    let mut losing = [0u8; 16];
    losing.copy_from_slice(&data[..16]);
    let losing = u128::from_le_bytes(losing);

    let stakes: Vec<u128> = data[16..]
        .chunks_exact(8)
        .map(|c| {
            let mut b = [0u8; 8];
            b.copy_from_slice(c);
            u64::from_le_bytes(b) as u128
        })
        .filter(|s| *s > 0)
        .collect();
    if stakes.is_empty() {
        return;
    }

    if let Some(d) = distribute(&stakes, losing) {
        assert!(d.paid <= d.pot);
        assert!(d.dust() < stakes.len() as u128);
    }
});
