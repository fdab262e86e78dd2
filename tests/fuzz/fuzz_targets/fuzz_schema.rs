#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Validation and consolidation must not panic on any input.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(shards) = covdelta::schema::parse_shard_set_str(s) {
            let _ = covdelta::stats::coverage_of(&shards);
        }
    }
});
