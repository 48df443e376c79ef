//! Domain types shared by the lexical ranker, the vector index and the merger.

use serde::{Deserialize, Serialize};

/// External item identifier. Not necessarily contiguous.
pub type ItemId = i64;

/// One catalog item.
///
/// - `position`: dense 0-based row index; the only join key between the
///   mapping, the lexical model and the vector index
/// - `id`: external identifier reported to callers
/// - `name`: display name, also the text the lexical model is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub position: usize,
    pub id: ItemId,
    pub name: String,
}

/// Which ranker produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Semantic,
    Lexical,
}

/// A candidate returned to the caller.
///
/// `score` is in the native units of the ranker named by `source`: a squared
/// distance (lower is better) for `Semantic`, a BM25 relevance (higher is
/// better) for `Lexical`. `confidence` stays `None` until calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: ItemId,
    pub name: String,
    pub score: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub source: SourceKind,
}

impl SearchResult {
    pub fn from_entry(entry: &CatalogEntry, score: f32, source: SourceKind) -> Self {
        Self { id: entry.id, name: entry.name.clone(), score, confidence: None, source }
    }
}

/// A vector index hit. `distance` is non-negative; closer is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// A lexical hit. `score` is a relevance; higher is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPosition {
    pub position: usize,
    pub score: f32,
}
