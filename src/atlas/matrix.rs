use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::{Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Metric {
    Upos,
    Deprel,
    Phrase,
    HeadDirectionRaw,
    HeadDirectionMerged,
}

impl Metric {
    pub const ALL: [Self; 5] = [
        Self::Upos,
        Self::Deprel,
        Self::Phrase,
        Self::HeadDirectionRaw,
        Self::HeadDirectionMerged,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Upos => "UPOS n-grams",
            Self::Deprel => "DEPREL n-grams",
            Self::Phrase => "Phrase heads",
            Self::HeadDirectionRaw => "Head direction (raw)",
            Self::HeadDirectionMerged => "Head direction (merged)",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Self::Upos => "upos",
            Self::Deprel => "deprel",
            Self::Phrase => "phrase",
            Self::HeadDirectionRaw => "head-raw",
            Self::HeadDirectionMerged => "head-merged",
        }
    }

    /// File name of the distance matrix inside the results directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Upos => "upos_distance.csv",
            Self::Deprel => "deprel_distance.csv",
            Self::Phrase => "phrase_distance.csv",
            Self::HeadDirectionRaw => "head_direction_distance_cosine_raw.csv",
            Self::HeadDirectionMerged => "head_direction_distance_cosine_merged.csv",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.slug())
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|metric| metric.slug() == normalized)
            .ok_or_else(|| {
                anyhow!("unknown metric {value:?}; expected upos, deprel, phrase, head-raw or head-merged")
            })
    }
}

/// Pairwise distances keyed by language display name. Rows need not be
/// symmetric and a missing cell means "no data".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimilarityMatrix {
    rows: HashMap<String, HashMap<String, f64>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LanguagePair {
    pub first: String,
    pub second: String,
    pub distance: f64,
}

impl SimilarityMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a cell; non-finite values are treated as missing.
    pub fn insert(&mut self, from: &str, to: &str, distance: f64) {
        if !distance.is_finite() {
            return;
        }
        self.rows
            .entry(from.to_owned())
            .or_default()
            .insert(to.to_owned(), distance);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.values().all(HashMap::is_empty)
    }

    pub fn cell_count(&self) -> usize {
        self.rows.values().map(HashMap::len).sum()
    }

    pub fn get(&self, from: &str, to: &str) -> Option<f64> {
        self.rows.get(from)?.get(to).copied()
    }

    /// Row `from` wins when both directions are present; the reverse cell is
    /// the fallback.
    pub fn distance(&self, from: &str, to: &str) -> Option<f64> {
        self.get(from, to).or_else(|| self.get(to, from))
    }

    /// Every language mentioned as a row or a column, sorted.
    pub fn languages(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for (row, cells) in &self.rows {
            names.insert(row.as_str());
            names.extend(cells.keys().map(String::as_str));
        }
        names.into_iter().map(str::to_owned).collect()
    }

    pub fn closest_pairs(&self, limit: usize) -> Vec<LanguagePair> {
        let languages = self.languages();
        let mut pairs = Vec::new();

        for (index, first) in languages.iter().enumerate() {
            for second in &languages[index + 1..] {
                if let Some(distance) = self.distance(first, second) {
                    pairs.push(LanguagePair {
                        first: first.clone(),
                        second: second.clone(),
                        distance,
                    });
                }
            }
        }

        pairs.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.first.cmp(&b.first))
                .then_with(|| a.second.cmp(&b.second))
        });
        pairs.truncate(limit);
        pairs
    }
}
