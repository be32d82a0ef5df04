#![no_main]

use libfuzzer_sys::fuzz_target;
use scholar_harvest::extract::{RecordExtractor, ScholarExtractor};

fuzz_target!(|data: &[u8]| {
    let page = String::from_utf8_lossy(data);
    let extraction = ScholarExtractor.extract(&page);
    let _ = ScholarExtractor.has_more(&page);
    sentinel_fuzz::exercise_records(&extraction.records);
});
