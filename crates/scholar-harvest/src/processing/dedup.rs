//! Identity-key deduplication.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::models::{IdentityKey, Publication};

/// Collapse records sharing an identity key.
///
/// One pass, no sorting. Among duplicates the record with strictly more
/// citations replaces the retained one, so ties keep the first seen. Output
/// follows the order in which each key first appeared. Records without a
/// year take part like any other; their key just carries `None`.
#[must_use]
pub fn deduplicate(publications: Vec<Publication>) -> Vec<Publication> {
    let mut slots: HashMap<IdentityKey, usize> = HashMap::with_capacity(publications.len());
    let mut retained: Vec<Publication> = Vec::with_capacity(publications.len());

    for publication in publications {
        match slots.entry(publication.identity_key()) {
            Entry::Vacant(slot) => {
                slot.insert(retained.len());
                retained.push(publication);
            }
            Entry::Occupied(slot) => {
                let current = &mut retained[*slot.get()];
                if publication.citations > current.citations {
                    *current = publication;
                }
            }
        }
    }

    retained
}
