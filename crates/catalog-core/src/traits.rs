use crate::error::Result;
use crate::types::{Neighbor, ScoredPosition};

/// Text to fixed-length vector. Must be deterministic for a given model.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Read-only nearest-neighbour index keyed by catalog position.
pub trait VectorIndex: Send + Sync {
    fn dim(&self) -> usize;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Up to `k` neighbours ordered by ascending distance.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;
}

/// Term-overlap ranking over every catalog name.
pub trait LexicalRanker: Send + Sync {
    /// Number of documents the model was built from.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top `k` positions by descending score, ties by ascending position.
    fn score_all(&self, query_tokens: &[String], k: usize) -> Vec<ScoredPosition>;
}
