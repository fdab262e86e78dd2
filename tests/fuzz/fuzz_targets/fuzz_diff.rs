#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Diffing a result set against any other must not panic.
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let mid = (0..=s.len() / 2)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0);
    let (left, right) = s.split_at(mid);
    let coverage = |text: &str| {
        covdelta::schema::parse_shard_set_str(text)
            .ok()
            .and_then(|shards| covdelta::stats::coverage_of(&shards).ok())
            .unwrap_or_default()
    };
    let (baseline, current) = (coverage(left), coverage(right));
    if let Some(diff) = covdelta::diff::diff(&baseline, &current, None) {
        let _ = covdelta::report::CoverageReport::new(diff)
            .format(&covdelta::report::MarkdownFormatter);
    }
});
