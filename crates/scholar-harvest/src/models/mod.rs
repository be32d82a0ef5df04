//! Data models for listing records and canonical publications.
//!
//! Raw records use `#[serde(default)]` and untagged enums so saved
//! extractor output in either shape loads back without loss.

mod enums;
mod publication;

pub use enums::{Category, ClassifierMode, ListingSource, ReportFormat};
pub use publication::{
    IdentityKey, NOT_AVAILABLE, Publication, RawAuthors, RawCitations, RawPublication,
};
