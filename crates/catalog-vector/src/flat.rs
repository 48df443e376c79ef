//! Exhaustive squared-L2 index over row-major `f32` storage.
//!
//! Persisted as JSON: `{"dim": D, "vectors": [[...], ...]}` where row `i` is
//! the embedding of catalog position `i`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use catalog_core::error::{Error, Result};
use catalog_core::traits::VectorIndex;
use catalog_core::types::Neighbor;

use crate::sort_neighbors;

#[derive(Serialize, Deserialize)]
struct IndexFile {
    dim: usize,
    vectors: Vec<Vec<f32>>,
}

#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidArgument("index dimension must be at least 1".to_string()));
        }
        Ok(Self { dim, data: Vec::new() })
    }

    pub fn from_vectors(dim: usize, vectors: &[Vec<f32>]) -> Result<Self> {
        let mut index = Self::new(dim)?;
        index.data.reserve(dim * vectors.len());
        for v in vectors {
            index.add(v)?;
        }
        Ok(index)
    }

    /// Append one row; its position is the current length.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: vector.len() });
        }
        self.data.extend_from_slice(vector);
        Ok(self.len() - 1)
    }

    pub fn row(&self, position: usize) -> Option<&[f32]> {
        self.data.chunks_exact(self.dim).nth(position)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| Error::load(path.display(), e))?;
        let file: IndexFile = serde_json::from_str(&raw).map_err(|e| Error::load(path.display(), e))?;
        let index = Self::from_vectors(file.dim, &file.vectors)
            .map_err(|e| Error::load(path.display(), e))?;
        info!(path = %path.display(), dim = index.dim, rows = index.len(), "vector index loaded");
        Ok(index)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::load(parent.display(), e))?;
        }
        let file = IndexFile {
            dim: self.dim,
            vectors: self.data.chunks_exact(self.dim).map(<[f32]>::to_vec).collect(),
        };
        let json = serde_json::to_string(&file).map_err(|e| Error::load(path.display(), e))?;
        fs::write(path, json).map_err(|e| Error::load(path.display(), e))
    }
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl VectorIndex for FlatIndex {
    fn dim(&self) -> usize {
        self.dim
    }

    fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.len() });
        }
        if k == 0 {
            return Ok(Vec::new());
        }
        let mut hits: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(position, row)| Neighbor { position, distance: squared_l2(query, row) })
            .collect();
        if k < hits.len() {
            hits.select_nth_unstable_by(k - 1, |a, b| {
                a.distance.total_cmp(&b.distance).then_with(|| a.position.cmp(&b.position))
            });
            hits.truncate(k);
        }
        sort_neighbors(&mut hits);
        debug!(k, returned = hits.len(), "flat search");
        Ok(hits)
    }
}
