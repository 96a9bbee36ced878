//! Weighted heuristic scoring of a catalog item against a request query.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::dictionary::MatchDictionary;
use crate::text::{normalize, numeric_tokens};

/// Weights for the scoring components. Design parameters, not per-call
/// tunables: pick one of the named presets and keep it for the whole run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Query token is an exact member of the item's token set.
    pub exact_token: f64,
    /// Prefix-or-suffix token hit, query token length >= 3.
    pub partial_token: f64,
    /// Every query token hit exactly or by prefix/suffix.
    pub full_coverage: f64,
    /// Item's search blob contains the full query as a substring.
    pub blob_contains_query: f64,
    /// Query contains the item's name (request more verbose than catalog).
    pub query_contains_name: f64,
    /// Per numeric query token also present among the item's numeric tokens.
    pub numeric_agreement: f64,
    /// Scale for the edit-distance similarity component.
    pub distance_scale: f64,
    /// Multiplier applied when no query token hit exactly.
    pub no_overlap_penalty: f64,
}

impl ScoringWeights {
    /// Calibration used by the primary front end of the original system.
    pub const BALANCED: Self = Self {
        exact_token: 18.0,
        partial_token: 8.0,
        full_coverage: 25.0,
        blob_contains_query: 20.0,
        query_contains_name: 10.0,
        numeric_agreement: 10.0,
        distance_scale: 15.0,
        no_overlap_penalty: 0.6,
    };

    /// Stricter sibling calibration: heavier substring and numeric rewards.
    pub const STRICT: Self = Self {
        exact_token: 18.0,
        partial_token: 8.0,
        full_coverage: 25.0,
        blob_contains_query: 25.0,
        query_contains_name: 10.0,
        numeric_agreement: 15.0,
        distance_scale: 15.0,
        no_overlap_penalty: 0.6,
    };
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::BALANCED
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ItemScore {
    pub score: f64,
    /// `round(score)` clamped to 0..=100.
    pub confidence: u8,
}

impl ItemScore {
    const ZERO: Self = Self { score: 0.0, confidence: 0 };
}

/// Scores one catalog item against a query. Pure; never touches the item.
pub fn score_item(
    dictionary: &MatchDictionary,
    weights: &ScoringWeights,
    query: &str,
    item: &CatalogItem,
) -> ItemScore {
    let query_norm = normalize(dictionary, query);
    let query_tokens: Vec<&str> = query_norm.split_whitespace().collect();
    if query_tokens.is_empty() {
        return ItemScore::ZERO;
    }

    let item_tokens: HashSet<&str> = item.tokens.iter().map(String::as_str).collect();

    let mut score = 0.0;
    let mut overlap = 0usize;
    let mut all_covered = true;
    for token in &query_tokens {
        let exact = item_tokens.contains(token);
        let partial =
            item.tokens.iter().any(|it| it.starts_with(token) || token.starts_with(it.as_str()));
        if exact {
            score += weights.exact_token;
            overlap += 1;
        } else if partial && token.chars().count() >= 3 {
            score += weights.partial_token;
        }
        if !exact && !partial {
            all_covered = false;
        }
    }
    if all_covered {
        score += weights.full_coverage;
    }

    if item.search_blob.contains(&query_norm) {
        score += weights.blob_contains_query;
    }

    let name_norm = normalize(dictionary, &item.name);
    if !name_norm.is_empty() && query_norm.contains(&name_norm) {
        score += weights.query_contains_name;
    }

    let item_numbers = numeric_tokens(&item.search_blob);
    for number in numeric_tokens(&query_norm) {
        if item_numbers.contains(&number) {
            score += weights.numeric_agreement;
        }
    }

    // Compare against a query-length-biased prefix of the blob so long
    // catalog descriptions are not penalized.
    let query_len = query_norm.chars().count();
    let blob_prefix: String = item.search_blob.chars().take(query_len.max(1) + 10).collect();
    let distance = levenshtein(&query_norm, &blob_prefix);
    let similarity = (1.0 - distance as f64 / query_len.max(1) as f64).max(0.0);
    score += similarity * weights.distance_scale;

    if overlap == 0 {
        score *= weights.no_overlap_penalty;
    }

    let confidence = score.round().clamp(0.0, 100.0) as u8;
    ItemScore { score, confidence }
}

/// Character-level Levenshtein distance, two-row dynamic programming.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
