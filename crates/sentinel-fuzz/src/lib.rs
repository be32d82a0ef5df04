//! Fuzzing library for scholar-harvest.
//!
//! Targets feed arbitrary bytes to the listing extractors and to the raw
//! record loader, then push whatever comes out through normalization. None
//! of these paths may panic.
//!
//! # Usage
//!
//! ```bash
//! cd crates/sentinel-fuzz
//! cargo +nightly fuzz run fuzz_scholar_page -- -max_total_time=60
//! ```

pub use scholar_harvest::{extract, models, processing};

/// Run extracted records through the pure stages.
pub fn exercise_records(records: &[models::RawPublication]) -> usize {
    let publications = processing::deduplicate(processing::normalize_all(records));
    processing::organize(publications).len()
}
