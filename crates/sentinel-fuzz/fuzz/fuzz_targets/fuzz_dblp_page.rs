#![no_main]

use libfuzzer_sys::fuzz_target;
use scholar_harvest::extract::{DblpExtractor, RecordExtractor};

fuzz_target!(|data: &[u8]| {
    let page = String::from_utf8_lossy(data);
    let extraction = DblpExtractor.extract(&page);
    sentinel_fuzz::exercise_records(&extraction.records);
});
