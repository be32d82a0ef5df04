//! Final report ordering.

use std::cmp::{Ordering, Reverse};

use crate::models::Publication;

/// Order by year descending, then citations descending.
///
/// Unknown years form a trailing bucket. The sort is stable, so records
/// equal on (year, citations) keep their input order.
#[must_use]
pub fn organize(mut publications: Vec<Publication>) -> Vec<Publication> {
    publications.sort_by(report_order);
    publications
}

/// Comparator behind [`organize`].
#[must_use]
pub fn report_order(a: &Publication, b: &Publication) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

fn sort_key(p: &Publication) -> (bool, Reverse<Option<i32>>, Reverse<u32>) {
    (p.year.is_none(), Reverse(p.year), Reverse(p.citations))
}

/// Group an ordered set into consecutive year buckets (`None` = unknown).
#[must_use]
pub fn group_by_year(publications: &[Publication]) -> Vec<(Option<i32>, Vec<&Publication>)> {
    let mut groups: Vec<(Option<i32>, Vec<&Publication>)> = Vec::new();
    for publication in publications {
        match groups.last_mut() {
            Some((year, members)) if *year == publication.year => members.push(publication),
            _ => groups.push((publication.year, vec![publication])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, year: Option<i32>, citations: u32) -> Publication {
        Publication {
            title: title.into(),
            year,
            citations,
            ..Default::default()
        }
    }

    #[test]
    fn test_year_then_citations_descending() {
        let ordered = organize(vec![
            entry("a", Some(2020), 10),
            entry("b", Some(2019), 5),
            entry("c", Some(2020), 20),
        ]);
        let titles: Vec<_> = ordered.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_unknown_year_sorts_last() {
        let ordered = organize(vec![
            entry("unknown", None, 1000),
            entry("old", Some(1999), 0),
            entry("new", Some(2024), 1),
        ]);
        let titles: Vec<_> = ordered.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "old", "unknown"]);
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let ordered = organize(vec![
            entry("first", Some(2020), 3),
            entry("other", Some(2021), 3),
            entry("second", Some(2020), 3),
        ]);
        let titles: Vec<_> = ordered.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["other", "first", "second"]);
    }

    #[test]
    fn test_group_by_year() {
        let ordered = organize(vec![
            entry("a", Some(2020), 1),
            entry("b", None, 1),
            entry("c", Some(2020), 2),
            entry("d", Some(2018), 2),
        ]);
        let groups = group_by_year(&ordered);
        let shape: Vec<_> = groups.iter().map(|(y, m)| (*y, m.len())).collect();
        assert_eq!(shape, vec![(Some(2020), 2), (Some(2018), 1), (None, 1)]);
    }
}
