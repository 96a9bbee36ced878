use serde::Serialize;

use crate::catalog::CatalogItemId;
use crate::extract::OrderRequestLine;

/// One ranked catalog candidate for a request line. Ephemeral; recomputed on
/// every run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MatchCandidate {
    pub item_id: CatalogItemId,
    pub sku: String,
    pub name: String,
    pub score: f64,
    pub confidence: u8,
}

/// Externally visible result for one extracted line. An editor may override
/// `selected_id`, `request.quantity`, or `request.unit` afterwards; the
/// engine never re-scores an overridden line.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ResolvedOrderLine {
    pub request: OrderRequestLine,
    /// Query actually scored: item text after normalization, noise removal,
    /// and alias rewriting.
    pub normalized_query: String,
    /// Ranked candidates, best first, at most `top_n`.
    pub candidates: Vec<MatchCandidate>,
    /// Auto-selected catalog item, present only above the resolution
    /// threshold.
    pub selected_id: Option<CatalogItemId>,
    /// Confidence of the best candidate; 0 when the catalog is empty.
    pub confidence: u8,
}

impl ResolvedOrderLine {
    pub fn is_resolved(&self) -> bool {
        self.selected_id.is_some()
    }
}
