//! Order-line extraction and fuzzy catalog matching.
//!
//! Turns free-form customer text ("минвата 300 6 пачек") into a priced order
//! draft against a merchant catalog: normalization, dictionary-driven alias
//! rewriting, quantity/unit extraction, weighted candidate scoring, and
//! grouping of resolved lines. Every stage is a pure computation over
//! immutable tables; the engine does no I/O.

pub mod catalog;
pub mod dictionary;
pub mod errors;
pub mod extract;
pub mod matching;
pub mod order;
pub mod text;

pub use catalog::{demo_rows, load_catalog, CatalogItem, CatalogItemId};
pub use dictionary::{AliasKind, AliasRule, MatchDictionary, PIECE_UNIT};
pub use errors::{CatalogError, DictionaryError};
pub use extract::OrderRequestLine;
pub use matching::{
    MatchCandidate, MatchEngine, MatcherOptions, ResolvedOrderLine, ScoringWeights,
    DEFAULT_TOP_N, RESOLUTION_THRESHOLD,
};
pub use order::{group_order, GroupedOrder, OrderBucket};
