//! BM25 Okapi over tokenized catalog names.
//!
//! `idf(t) = ln((N - n_t + 0.5) / (n_t + 0.5))`. Terms present in more than half
//! of the documents would get a negative IDF; they are floored to
//! `epsilon * average_idf` instead, where the average runs over every corpus
//! term before flooring.

use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use catalog_core::config::LexicalSettings;
use catalog_core::traits::LexicalRanker;
use catalog_core::types::ScoredPosition;

use crate::tokenize::tokenize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
    pub epsilon: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75, epsilon: 0.25 }
    }
}

impl From<&LexicalSettings> for Bm25Params {
    fn from(s: &LexicalSettings) -> Self {
        Self { k1: s.k1, b: s.b, epsilon: s.epsilon }
    }
}

pub struct Bm25Ranker {
    params: Bm25Params,
    /// term -> (position, term frequency) for every document containing it
    postings: HashMap<String, Vec<(usize, u32)>>,
    idf: HashMap<String, f32>,
    doc_lens: Vec<usize>,
    avgdl: f32,
}

impl Bm25Ranker {
    /// Build the model from names given in position order.
    pub fn new<I, S>(names: I, params: Bm25Params) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut doc_lens = Vec::new();
        for (position, name) in names.into_iter().enumerate() {
            let tokens = tokenize(name.as_ref());
            doc_lens.push(tokens.len());
            let mut tf: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *tf.entry(token).or_insert(0) += 1;
            }
            for (term, freq) in tf {
                postings.entry(term).or_default().push((position, freq));
            }
        }

        let corpus_size = doc_lens.len();
        let total_tokens: usize = doc_lens.iter().sum();
        let avgdl = if corpus_size == 0 { 0.0 } else { total_tokens as f32 / corpus_size as f32 };
        let idf = compute_idf(&postings, corpus_size, params.epsilon);
        debug!(documents = corpus_size, terms = idf.len(), avgdl, "bm25 model built");

        Self { params, postings, idf, doc_lens, avgdl }
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.idf.get(term).copied()
    }

    /// Relevance of every document, indexed by position.
    pub fn scores(&self, query_tokens: &[String]) -> Vec<f32> {
        let mut scores = vec![0.0f32; self.doc_lens.len()];
        if self.avgdl <= 0.0 {
            return scores;
        }
        let Bm25Params { k1, b, .. } = self.params;
        for token in query_tokens {
            let (Some(idf), Some(docs)) = (self.idf.get(token), self.postings.get(token)) else {
                continue;
            };
            for &(position, freq) in docs {
                let tf = freq as f32;
                let len_norm = 1.0 - b + b * self.doc_lens[position] as f32 / self.avgdl;
                scores[position] += idf * (tf * (k1 + 1.0)) / (tf + k1 * len_norm);
            }
        }
        scores
    }
}

impl LexicalRanker for Bm25Ranker {
    fn len(&self) -> usize {
        self.doc_lens.len()
    }

    fn score_all(&self, query_tokens: &[String], k: usize) -> Vec<ScoredPosition> {
        let scores = self.scores(query_tokens);
        let mut ranked: Vec<ScoredPosition> = scores
            .into_iter()
            .enumerate()
            .map(|(position, score)| ScoredPosition { position, score })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.position.cmp(&b.position))
        });
        ranked.truncate(k);
        ranked
    }
}

fn compute_idf(
    postings: &HashMap<String, Vec<(usize, u32)>>,
    corpus_size: usize,
    epsilon: f32,
) -> HashMap<String, f32> {
    let n = corpus_size as f32;
    let mut idf = HashMap::with_capacity(postings.len());
    let mut idf_sum = 0.0f32;
    let mut negative = Vec::new();
    for (term, docs) in postings {
        let df = docs.len() as f32;
        let value = ((n - df + 0.5) / (df + 0.5)).ln();
        idf_sum += value;
        if value < 0.0 {
            negative.push(term.clone());
        }
        idf.insert(term.clone(), value);
    }
    if idf.is_empty() {
        return idf;
    }
    let floor = epsilon * idf_sum / idf.len() as f32;
    for term in negative {
        idf.insert(term, floor);
    }
    idf
}
