#![no_main]

use libfuzzer_sys::fuzz_target;

use counterstake_types::Ratio;

// Parsing and rounding a ratio must never panic, and whatever parses must
// print back to an equal value.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(ratio) = text.parse::<Ratio>() else {
        return;
    };

    let reparsed: Ratio = ratio.to_string().parse().expect("display output must parse");
    assert_eq!(reparsed, ratio);

    for x in [0u128, 1, 7, 1_000_000, u64::MAX as u128, u128::MAX] {
        if let (Some(floor), Some(ceil)) = (ratio.floor_mul(x), ratio.ceil_mul(x)) {
            assert!(floor <= ceil);
            assert!(ceil - floor <= 1);
        }
    }
});
