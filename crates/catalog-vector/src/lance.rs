//! LanceDB-backed `VectorIndex`.
//!
//! Queries run with `DistanceType::L2`, so `_distance` is the squared L2
//! distance, the same unit `FlatIndex` reports. The trait is synchronous; each
//! index owns a small tokio runtime and blocks on it, so `search` must not be
//! called from inside an async context.

use anyhow::anyhow;
use arrow_array::{Float32Array, Int32Array};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{connect, DistanceType, Table};
use tokio::runtime::Runtime;
use tracing::{debug, info};

use catalog_core::error::{Error, Result};
use catalog_core::traits::VectorIndex;
use catalog_core::types::Neighbor;

use crate::schema::{vector_dim, POSITION_COLUMN};
use crate::sort_neighbors;

pub struct LanceIndex {
    runtime: Runtime,
    table: Table,
    dim: usize,
    len: usize,
}

impl LanceIndex {
    pub fn open(uri: &str, table_name: &str) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| Error::load(uri, e))?;
        let (table, dim, len) = runtime
            .block_on(async {
                let db = connect(uri).execute().await?;
                let table = db.open_table(table_name).execute().await?;
                let schema = table.schema().await?;
                let dim = vector_dim(&schema).ok_or_else(|| anyhow!("table {table_name} has no fixed-size vector column"))?;
                let len = table.count_rows(None).await?;
                Ok::<_, anyhow::Error>((table, dim, len))
            })
            .map_err(|e| Error::load(format!("{uri}/{table_name}"), e))?;
        info!(uri, table = table_name, dim, rows = len, "lance index opened");
        Ok(Self { runtime, table, dim, len })
    }

    async fn query(&self, query: &[f32], k: usize) -> anyhow::Result<Vec<Neighbor>> {
        let mut stream = self
            .table
            .vector_search(query.to_vec())?
            .distance_type(DistanceType::L2)
            .limit(k)
            .execute()
            .await?;
        let mut hits = Vec::with_capacity(k);
        while let Some(batch) = stream.try_next().await? {
            let positions = batch
                .column_by_name(POSITION_COLUMN)
                .and_then(|c| c.as_any().downcast_ref::<Int32Array>())
                .ok_or_else(|| anyhow!("position column missing"))?;
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| anyhow!("_distance column missing"))?;
            for i in 0..batch.num_rows() {
                hits.push(Neighbor {
                    position: usize::try_from(positions.value(i))?,
                    distance: distances.value(i),
                });
            }
        }
        Ok(hits)
    }
}

impl VectorIndex for LanceIndex {
    fn dim(&self) -> usize {
        self.dim
    }

    fn len(&self) -> usize {
        self.len
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.len() });
        }
        if k == 0 {
            return Ok(Vec::new());
        }
        let mut hits = self
            .runtime
            .block_on(self.query(query, k))
            .map_err(|e| Error::Index(e.to_string()))?;
        sort_neighbors(&mut hits);
        hits.truncate(k);
        debug!(k, returned = hits.len(), "lance search");
        Ok(hits)
    }
}
