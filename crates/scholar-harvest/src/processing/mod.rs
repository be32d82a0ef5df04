//! Pure pipeline stages: normalize, deduplicate, filter, organize.
//!
//! None of these touch the network or fail on odd data. The only error is an
//! inverted [`YearRange`], which is rejected before any processing happens.

mod dedup;
mod filter;
mod normalize;
mod organize;

pub use dedup::deduplicate;
pub use filter::{YearRange, filter_by_year};
pub use normalize::{normalize, normalize_all, normalize_authors, parse_citations, parse_year};
pub use organize::{group_by_year, organize, report_order};
