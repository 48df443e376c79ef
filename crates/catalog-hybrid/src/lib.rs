//! catalog-hybrid
//!
//! Runs the semantic and lexical rankers for a query, merges their candidates
//! by id with semantic-first precedence and calibrates the merged list.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use catalog_core::config::Config;
use catalog_core::error::{Error, Result};
use catalog_core::traits::{Embedder, LexicalRanker, VectorIndex};
use catalog_core::types::{SearchResult, SourceKind};
use catalog_core::CatalogMapping;
use catalog_embed::get_default_embedder;
use catalog_text::{tokenize, Bm25Params, Bm25Ranker};
use catalog_vector::FlatIndex;

pub mod calibrate;

pub use calibrate::{calibrate, sigmoid};

/// Matcher over the on-disk artifacts: BM25 plus a flat vector index.
pub type CatalogMatcher = HybridMatcher<Bm25Ranker, FlatIndex>;

pub struct HybridMatcher<L, V>
where
    L: LexicalRanker,
    V: VectorIndex,
{
    catalog: CatalogMapping,
    lexical: L,
    vector: V,
    embedder: Box<dyn Embedder>,
    default_top_k: usize,
}

impl<L, V> HybridMatcher<L, V>
where
    L: LexicalRanker,
    V: VectorIndex,
{
    /// Rejects collaborators whose row counts disagree with the catalog.
    pub fn new(catalog: CatalogMapping, lexical: L, vector: V, embedder: Box<dyn Embedder>) -> Result<Self> {
        if vector.len() != catalog.len() {
            return Err(Error::Load(format!(
                "vector index holds {} rows but the catalog has {} entries",
                vector.len(),
                catalog.len()
            )));
        }
        if lexical.len() != catalog.len() {
            return Err(Error::Load(format!(
                "lexical model holds {} documents but the catalog has {} entries",
                lexical.len(),
                catalog.len()
            )));
        }
        if embedder.dim() != vector.dim() {
            warn!(
                embedder_dim = embedder.dim(),
                index_dim = vector.dim(),
                "embedder and index dimensions differ; queries will fail"
            );
        }
        Ok(Self { catalog, lexical, vector, embedder, default_top_k: 5 })
    }

    pub fn with_default_top_k(mut self, top_k: usize) -> Self {
        self.default_top_k = top_k;
        self
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    pub fn catalog(&self) -> &CatalogMapping {
        &self.catalog
    }

    /// Nearest catalog entries by embedding distance, closest first.
    pub fn semantic_search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed(query).map_err(|e| Error::Search(e.to_string()))?;
        self.vector
            .search(&embedding, top_k)?
            .into_iter()
            .map(|n| Ok(SearchResult::from_entry(self.catalog.entry_at(n.position)?, n.distance, SourceKind::Semantic)))
            .collect()
    }

    /// Best BM25 matches, highest score first.
    pub fn lexical_search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let tokens = tokenize(query);
        self.lexical
            .score_all(&tokens, top_k)
            .into_iter()
            .map(|s| Ok(SearchResult::from_entry(self.catalog.entry_at(s.position)?, s.score, SourceKind::Lexical)))
            .collect()
    }

    /// Merged, uncalibrated candidates.
    pub fn merge_candidates(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if top_k == 0 {
            return Err(Error::InvalidArgument("top_k must be at least 1".to_string()));
        }
        let semantic = self.semantic_search(query, top_k)?;
        let lexical = self.lexical_search(query, top_k)?;
        debug!(query, semantic = semantic.len(), lexical = lexical.len(), "candidates collected");
        Ok(merge_by_id(semantic, lexical, top_k))
    }

    pub fn hybrid_search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let merged = self.merge_candidates(query, top_k)?;
        let results = calibrate(merged)?;
        debug!(query, top_k, returned = results.len(), "hybrid search");
        Ok(results)
    }

    /// `hybrid_search` with the configured default `top_k`.
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        self.hybrid_search(query, self.default_top_k)
    }
}

impl CatalogMatcher {
    /// Load the mapping and flat index named in `config`, build the BM25 model
    /// from the catalog names and load the configured embedder.
    pub fn open(config: &Config) -> Result<Self> {
        let settings = config.settings()?;
        let catalog = CatalogMapping::load(&config.resolve(&settings.catalog.mapping_path))?;
        let vector = FlatIndex::load(&config.resolve(&settings.catalog.index_path))?;
        let lexical = Bm25Ranker::new(catalog.names(), Bm25Params::from(&settings.lexical));
        let embedder = get_default_embedder(&settings.embedding).map_err(|e| Error::load("embedder", e))?;
        let matcher = Self::new(catalog, lexical, vector, embedder)?.with_default_top_k(settings.search.default_top_k);
        info!(entries = matcher.catalog.len(), "catalog matcher ready");
        Ok(matcher)
    }
}

/// Semantic candidates first, then lexical; the first occurrence of each id
/// wins. At most `top_k` results.
pub fn merge_by_id(semantic: Vec<SearchResult>, lexical: Vec<SearchResult>, top_k: usize) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    semantic
        .into_iter()
        .chain(lexical)
        .filter(|r| seen.insert(r.id))
        .take(top_k)
        .collect()
}
