//! catalog-text
//!
//! In-memory BM25 Okapi ranking over catalog display names. See `bm25` for the
//! scoring model and `tokenize` for the shared tokenizer.

pub mod bm25;
pub mod tokenize;

pub use bm25::{Bm25Params, Bm25Ranker};
pub use tokenize::tokenize;
