#![no_main]

use libfuzzer_sys::fuzz_target;

// Malformed journals must produce an error, never a panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = counterstake_node::parse_journal(text);
    }
});
