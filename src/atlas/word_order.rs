use std::collections::HashMap;
use std::fmt;

use super::nodes::NodeRegistry;

/// Verb heads with nominal core arguments: the subject/object order signal.
pub const WORD_ORDER_KEY: &str = "VERBAL,NOMINAL,CORE_ARG";

const HEAD_INITIAL_THRESHOLD: f64 = 0.7;
const HEAD_FINAL_THRESHOLD: f64 = 0.3;
const SIMILAR_RATE_TOLERANCE: f64 = 0.15;
const SIMILAR_LANGUAGE_LIMIT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeadDirection {
    HeadInitial,
    HeadFinal,
    Mixed,
    Unknown,
}

impl HeadDirection {
    pub fn label(self) -> &'static str {
        match self {
            Self::HeadInitial => "Head-Initial",
            Self::HeadFinal => "Head-Final",
            Self::Mixed => "Mixed",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for HeadDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify(rate: Option<f64>) -> HeadDirection {
    match rate {
        Some(rate) if rate > HEAD_INITIAL_THRESHOLD => HeadDirection::HeadInitial,
        Some(rate) if rate < HEAD_FINAL_THRESHOLD => HeadDirection::HeadFinal,
        Some(_) => HeadDirection::Mixed,
        None => HeadDirection::Unknown,
    }
}

/// Head-initial rates per "head,dependent,relation" key and language name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeadDirectionRates {
    rows: HashMap<String, HashMap<String, f64>>,
}

impl HeadDirectionRates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, language: &str, rate: f64) {
        if !rate.is_finite() {
            return;
        }
        self.rows
            .entry(key.to_owned())
            .or_default()
            .insert(language.to_owned(), rate);
    }

    pub fn rate(&self, key: &str, language: &str) -> Option<f64> {
        self.rows.get(key)?.get(language).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.values().all(HashMap::is_empty)
    }

    pub fn key_count(&self) -> usize {
        self.rows.len()
    }

    /// Every key with a rate for `language`, sorted by key.
    pub fn profile(&self, language: &str) -> Vec<(String, f64)> {
        let mut profile = self
            .rows
            .iter()
            .filter_map(|(key, rates)| rates.get(language).map(|rate| (key.clone(), *rate)))
            .collect::<Vec<_>>();
        profile.sort_by(|a, b| a.0.cmp(&b.0));
        profile
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimilarWordOrder {
    pub code: String,
    pub display_name: String,
    pub rate: f64,
    pub difference: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WordOrderSummary {
    pub code: String,
    pub display_name: String,
    pub localized_name: String,
    pub non_standard_corpus: bool,
    pub rate: Option<f64>,
    pub direction: HeadDirection,
    pub similar: Vec<SimilarWordOrder>,
}

/// Word-order popup for the node `code`; `None` when the code is unknown or
/// its language cannot be resolved.
pub fn summarize(nodes: &NodeRegistry, rates: &HeadDirectionRates, code: &str) -> Option<WordOrderSummary> {
    let node = nodes.get(code)?;
    let language = nodes.representative(node)?;
    let rate = rates.rate(WORD_ORDER_KEY, &language.display_name);

    let similar = match rate {
        Some(target) => {
            let mut similar = nodes
                .primaries()
                .filter(|candidate| candidate.code != language.code)
                .filter_map(|candidate| {
                    let rate = rates.rate(WORD_ORDER_KEY, &candidate.display_name)?;
                    let difference = (rate - target).abs();
                    (difference < SIMILAR_RATE_TOLERANCE).then(|| SimilarWordOrder {
                        code: candidate.code.clone(),
                        display_name: candidate.display_name.clone(),
                        rate,
                        difference,
                    })
                })
                .collect::<Vec<_>>();
            similar.sort_by(|a, b| {
                a.difference
                    .total_cmp(&b.difference)
                    .then_with(|| a.code.cmp(&b.code))
            });
            similar.truncate(SIMILAR_LANGUAGE_LIMIT);
            similar
        }
        None => Vec::new(),
    };

    Some(WordOrderSummary {
        code: node.code.clone(),
        display_name: node.display_name.clone(),
        localized_name: node.localized_name.clone(),
        non_standard_corpus: node.non_standard_corpus,
        rate,
        direction: classify(rate),
        similar,
    })
}
