#![no_main]

use libfuzzer_sys::fuzz_target;
use scholar_harvest::RawPublication;

fuzz_target!(|data: &[u8]| {
    // Saved raw files are arrays, but single objects show up too
    if let Ok(records) = serde_json::from_slice::<Vec<RawPublication>>(data) {
        sentinel_fuzz::exercise_records(&records);
    } else if let Ok(record) = serde_json::from_slice::<RawPublication>(data) {
        sentinel_fuzz::exercise_records(&[record]);
    }
});
