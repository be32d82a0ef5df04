//! Closed year-interval filtering.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::models::Publication;

/// Inclusive range of publication years. Always `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    start: i32,
    end: i32,
}

impl YearRange {
    /// Build a range, rejecting `start > end` rather than swapping.
    pub fn new(start: i32, end: i32) -> PipelineResult<Self> {
        if start > end {
            return Err(PipelineError::InvalidYearRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First year included.
    #[must_use]
    pub const fn start(&self) -> i32 {
        self.start
    }

    /// Last year included.
    #[must_use]
    pub const fn end(&self) -> i32 {
        self.end
    }

    /// Check if a year lies inside the range.
    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        self.start <= year && year <= self.end
    }
}

impl std::fmt::Display for YearRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Keep publications whose year falls in `range`. Unknown years are dropped.
#[must_use]
pub fn filter_by_year(publications: Vec<Publication>, range: YearRange) -> Vec<Publication> {
    publications
        .into_iter()
        .filter(|p| p.year.is_some_and(|year| range.contains(year)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_year(year: Option<i32>) -> Publication {
        Publication {
            title: format!("{year:?}"),
            year,
            ..Default::default()
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let range = YearRange::new(2005, 2013).unwrap();
        let mut input: Vec<_> = [2004, 2005, 2010, 2013, 2014]
            .into_iter()
            .map(|year| with_year(Some(year)))
            .collect();
        input.push(with_year(None));

        let years: Vec<_> = filter_by_year(input, range)
            .iter()
            .map(|p| p.year)
            .collect();
        assert_eq!(years, vec![Some(2005), Some(2010), Some(2013)]);
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = YearRange::new(2014, 2005).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidYearRange {
                start: 2014,
                end: 2005
            }
        ));
    }

    #[test]
    fn test_single_year_range() {
        let range = YearRange::new(2020, 2020).unwrap();
        assert!(range.contains(2020));
        assert!(!range.contains(2021));
        assert_eq!(range.to_string(), "2020-2020");
    }
}
