//! Order matching engine
//!
//! Runs the full pipeline over a dirty-text block: line splitting, quantity
//! extraction, query normalization, catalog scoring, and ranking. The engine
//! holds only immutable configuration; `match_order` is a pure function of
//! its inputs.

mod scoring;
mod types;

pub use scoring::{levenshtein, score_item, ItemScore, ScoringWeights};
pub use types::{MatchCandidate, ResolvedOrderLine};

use std::collections::HashMap;

use tracing::debug;

use crate::catalog::{self, CatalogItem};
use crate::dictionary::MatchDictionary;
use crate::errors::CatalogError;
use crate::extract;
use crate::text;

/// Minimum confidence at which the top candidate is auto-selected.
pub const RESOLUTION_THRESHOLD: u8 = 40;

/// Ranked candidates kept per line.
pub const DEFAULT_TOP_N: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatcherOptions {
    pub top_n: usize,
    pub resolution_threshold: u8,
    pub weights: ScoringWeights,
    /// Also split request lines on conjunctions (`и`, `плюс`) and commas.
    pub split_conjunctions: bool,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            resolution_threshold: RESOLUTION_THRESHOLD,
            weights: ScoringWeights::BALANCED,
            split_conjunctions: false,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MatchEngine {
    dictionary: MatchDictionary,
    options: MatcherOptions,
}

impl MatchEngine {
    pub fn new(dictionary: MatchDictionary, options: MatcherOptions) -> Self {
        Self { dictionary, options }
    }

    pub fn dictionary(&self) -> &MatchDictionary {
        &self.dictionary
    }

    pub fn options(&self) -> &MatcherOptions {
        &self.options
    }

    /// Loads catalog rows with this engine's dictionary. A successful load
    /// replaces the previous catalog wholesale; there is no partial state.
    pub fn load_catalog(
        &self,
        rows: &[HashMap<String, String>],
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        catalog::load_catalog(rows, &self.dictionary)
    }

    /// Runs the full pipeline. Never fails: empty dirty text yields an empty
    /// result list, an empty catalog yields unresolved lines with no
    /// candidates.
    pub fn match_order(&self, dirty_text: &str, catalog: &[CatalogItem]) -> Vec<ResolvedOrderLine> {
        let lines = extract::split_lines(dirty_text, self.options.split_conjunctions);
        debug!(lines = lines.len(), catalog = catalog.len(), "parsing order request");
        lines.iter().map(|line| self.resolve_line(line, catalog)).collect()
    }

    fn resolve_line(&self, line: &str, catalog: &[CatalogItem]) -> ResolvedOrderLine {
        let request = extract::extract_request(&self.dictionary, line);
        let normalized_query = self.normalize_query(&request.item_text);
        let candidates = self.rank(&normalized_query, catalog);

        let best = candidates.first();
        let confidence = best.map(|candidate| candidate.confidence).unwrap_or(0);
        let selected_id = best
            .filter(|candidate| candidate.confidence >= self.options.resolution_threshold)
            .map(|candidate| candidate.item_id.clone());

        debug!(
            raw = %request.raw,
            query = %normalized_query,
            confidence,
            selected = selected_id.is_some(),
            "resolved order line"
        );

        ResolvedOrderLine { request, normalized_query, candidates, selected_id, confidence }
    }

    /// Normalization, noise filtering, and alias rewriting applied in order.
    pub fn normalize_query(&self, item_text: &str) -> String {
        let normalized = text::normalize(&self.dictionary, item_text);
        let filtered = text::remove_noise(&self.dictionary, &normalized);
        text::apply_aliases(&self.dictionary, &filtered)
    }

    /// Scores every catalog item against the query and keeps the top N.
    /// The sort is stable, so ties keep catalog iteration order.
    pub fn rank(&self, query: &str, catalog: &[CatalogItem]) -> Vec<MatchCandidate> {
        let mut ranked: Vec<MatchCandidate> = catalog
            .iter()
            .map(|item| {
                let scored = score_item(&self.dictionary, &self.options.weights, query, item);
                MatchCandidate {
                    item_id: item.id.clone(),
                    sku: item.sku.clone(),
                    name: item.name.clone(),
                    score: scored.score,
                    confidence: scored.confidence,
                }
            })
            .collect();
        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(self.options.top_n);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{MatchEngine, MatcherOptions, RESOLUTION_THRESHOLD};
    use crate::catalog::{demo_rows, CatalogItem};
    use crate::dictionary::MatchDictionary;

    fn engine() -> MatchEngine {
        MatchEngine::new(MatchDictionary::default(), MatcherOptions::default())
    }

    fn demo_catalog(engine: &MatchEngine) -> Vec<CatalogItem> {
        engine.load_catalog(&demo_rows()).expect("demo catalog loads")
    }

    #[test]
    fn empty_dirty_text_yields_no_lines() {
        let engine = engine();
        let catalog = demo_catalog(&engine);
        assert!(engine.match_order("", &catalog).is_empty());
        assert!(engine.match_order(" \n \n ", &catalog).is_empty());
    }

    #[test]
    fn empty_catalog_yields_unresolved_lines_without_candidates() {
        let engine = engine();
        let results = engine.match_order("цемент м500 10 мешков", &[]);

        assert_eq!(results.len(), 1);
        assert!(results[0].candidates.is_empty());
        assert_eq!(results[0].confidence, 0);
        assert!(results[0].selected_id.is_none());
    }

    #[test]
    fn alias_rewriting_feeds_the_query() {
        let engine = engine();
        let catalog = demo_catalog(&engine);
        let results = engine.match_order("юсб 9 8 листов", &catalog);

        assert_eq!(results[0].normalized_query, "осб 9");
        let selected = results[0].selected_id.as_ref().expect("line resolves");
        assert!(selected.0.starts_with("OSB-9"), "selected {selected:?}");
        assert_eq!(results[0].request.quantity, Decimal::from(8));
        assert_eq!(results[0].request.unit, "лист");
    }

    #[test]
    fn candidates_are_capped_and_sorted() {
        let engine = engine();
        let catalog = demo_catalog(&engine);
        let results = engine.match_order("осб", &catalog);

        let candidates = &results[0].candidates;
        assert_eq!(candidates.len(), 3);
        for pair in candidates.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn low_confidence_line_keeps_candidates_but_no_selection() {
        let engine = engine();
        let catalog = demo_catalog(&engine);
        let results = engine.match_order("непонятный товар xyz123", &catalog);

        assert_eq!(results.len(), 1);
        assert!(results[0].selected_id.is_none());
        assert!(results[0].confidence < RESOLUTION_THRESHOLD);
        assert!(!results[0].candidates.is_empty());
        assert!(results[0].candidates.len() <= 3);
    }

    #[test]
    fn threshold_gates_auto_selection() {
        let strict_gate = MatchEngine::new(
            MatchDictionary::default(),
            MatcherOptions { resolution_threshold: 100, ..MatcherOptions::default() },
        );
        let catalog = demo_catalog(&strict_gate);
        let results = strict_gate.match_order("минвата", &catalog);

        assert!(results[0].selected_id.is_none());
        assert!(results[0].confidence > 0);
    }
}
