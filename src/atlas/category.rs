use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::Serialize;

/// Ordinal bucket for a syntactic distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DistanceCategory {
    VeryClose,
    Close,
    SlightlyClose,
    SlightlyFar,
    Far,
    VeryFar,
}

impl DistanceCategory {
    pub const ALL: [Self; 6] = [
        Self::VeryClose,
        Self::Close,
        Self::SlightlyClose,
        Self::SlightlyFar,
        Self::Far,
        Self::VeryFar,
    ];

    /// Lower-inclusive bucket boundaries; anything past the last one is `VeryFar`.
    const UPPER_BOUNDS: [(f64, Self); 5] = [
        (0.05, Self::VeryClose),
        (0.10, Self::Close),
        (0.30, Self::SlightlyClose),
        (0.50, Self::SlightlyFar),
        (0.70, Self::Far),
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::VeryClose => "Very close",
            Self::Close => "Close",
            Self::SlightlyClose => "Slightly close",
            Self::SlightlyFar => "Slightly far",
            Self::Far => "Far",
            Self::VeryFar => "Very far",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::VeryClose => "very-close",
            Self::Close => "close",
            Self::SlightlyClose => "slightly-close",
            Self::SlightlyFar => "slightly-far",
            Self::Far => "far",
            Self::VeryFar => "very-far",
        }
    }

    /// Smallest distance that lands in this bucket.
    pub fn lower_bound(self) -> f64 {
        match self {
            Self::VeryClose => 0.0,
            Self::Close => 0.05,
            Self::SlightlyClose => 0.10,
            Self::SlightlyFar => 0.30,
            Self::Far => 0.50,
            Self::VeryFar => 0.70,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DistanceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DistanceCategory {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|category| category.slug() == normalized)
            .ok_or_else(|| anyhow!("unknown distance category: {value}"))
    }
}

/// Buckets a finite, non-negative distance. Missing or NaN distances must be
/// dropped by the caller.
pub fn categorize(distance: f64) -> DistanceCategory {
    DistanceCategory::UPPER_BOUNDS
        .iter()
        .find(|(bound, _)| distance < *bound)
        .map(|(_, category)| *category)
        .unwrap_or(DistanceCategory::VeryFar)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DistanceFilter {
    enabled: [bool; 6],
}

impl Default for DistanceFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl DistanceFilter {
    pub fn all() -> Self {
        Self { enabled: [true; 6] }
    }

    pub fn none() -> Self {
        Self { enabled: [false; 6] }
    }

    /// A filter that passes a single category.
    pub fn only(category: DistanceCategory) -> Self {
        let mut filter = Self::none();
        filter.set(category, true);
        filter
    }

    pub fn is_enabled(&self, category: DistanceCategory) -> bool {
        self.enabled[category.index()]
    }

    pub fn set(&mut self, category: DistanceCategory, enabled: bool) {
        self.enabled[category.index()] = enabled;
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled.iter().filter(|enabled| **enabled).count()
    }
}

impl fmt::Display for DistanceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enabled_count() == DistanceCategory::ALL.len() {
            return f.write_str("all");
        }
        let slugs = DistanceCategory::ALL
            .into_iter()
            .filter(|category| self.is_enabled(*category))
            .map(DistanceCategory::slug)
            .collect::<Vec<_>>();
        f.write_str(&slugs.join(","))
    }
}

impl FromStr for DistanceFilter {
    type Err = anyhow::Error;

    /// Parses a comma-separated list such as `very-close,far`; `all` enables everything.
    fn from_str(value: &str) -> Result<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }

        let mut filter = Self::none();
        for part in value.split(',').map(str::trim).filter(|part| !part.is_empty()) {
            filter.set(part.parse()?, true);
        }
        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn boundaries_are_lower_inclusive() {
        assert_eq!(categorize(0.0), DistanceCategory::VeryClose);
        assert_eq!(categorize(0.049_999), DistanceCategory::VeryClose);
        assert_eq!(categorize(0.05), DistanceCategory::Close);
        assert_eq!(categorize(0.10), DistanceCategory::SlightlyClose);
        assert_eq!(categorize(0.30), DistanceCategory::SlightlyFar);
        assert_eq!(categorize(0.50), DistanceCategory::Far);
        assert_eq!(categorize(0.70), DistanceCategory::VeryFar);
        assert_eq!(categorize(0.82), DistanceCategory::VeryFar);
        assert_eq!(categorize(3.0), DistanceCategory::VeryFar);
    }

    #[test]
    fn lower_bounds_categorize_into_their_own_bucket() {
        for category in DistanceCategory::ALL {
            assert_eq!(categorize(category.lower_bound()), category);
        }
    }

    #[test]
    fn filter_flags_are_independent() {
        let mut filter = DistanceFilter::all();
        filter.set(DistanceCategory::Far, false);
        assert!(!filter.is_enabled(DistanceCategory::Far));
        assert!(filter.is_enabled(DistanceCategory::VeryFar));
        assert_eq!(filter.enabled_count(), 5);

        let only = DistanceFilter::only(DistanceCategory::Close);
        assert_eq!(only.enabled_count(), 1);
        assert!(only.is_enabled(DistanceCategory::Close));
        assert!(!only.is_enabled(DistanceCategory::VeryClose));
        assert_eq!(only.to_string(), "close");
    }

    #[test]
    fn filter_parses_comma_lists() {
        let filter: DistanceFilter = "very-close, far,Very_Far".parse().unwrap();
        assert!(filter.is_enabled(DistanceCategory::VeryClose));
        assert!(filter.is_enabled(DistanceCategory::Far));
        assert!(filter.is_enabled(DistanceCategory::VeryFar));
        assert_eq!(filter.enabled_count(), 3);

        assert_eq!("all".parse::<DistanceFilter>().unwrap(), DistanceFilter::all());
        assert!("nearby".parse::<DistanceFilter>().is_err());

        assert_eq!(filter.to_string(), "very-close,far,very-far");
        assert_eq!(DistanceFilter::all().to_string(), "all");
    }

    proptest! {
        #[test]
        fn very_close_covers_the_first_bucket(d in 0.0f64..0.05) {
            prop_assert_eq!(categorize(d), DistanceCategory::VeryClose);
        }

        #[test]
        fn categorize_is_monotonic(a in 0.0f64..2.0, b in 0.0f64..2.0) {
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(categorize(low) <= categorize(high));
        }
    }
}
