//! Writes catalog embeddings into a LanceDB table, one row per position.

use anyhow::{anyhow, Result};
use arrow_array::{types::Float32Type, FixedSizeListArray, Int32Array, RecordBatch, RecordBatchIterator};
use lancedb::connect;
use std::sync::Arc;
use tracing::info;

use crate::schema::build_arrow_schema;

const BATCH_SIZE: usize = 1000;

/// Create `table_name` under `uri` holding `vectors[i]` at position `i`.
/// Appends when the table already exists.
pub async fn write_vectors(uri: &str, table_name: &str, vectors: &[Vec<f32>]) -> Result<()> {
    let dim = vectors.first().map(Vec::len).ok_or_else(|| anyhow!("no vectors to write"))?;
    if let Some(bad) = vectors.iter().position(|v| v.len() != dim) {
        return Err(anyhow!("vector {bad} has length {}, expected {dim}", vectors[bad].len()));
    }
    let dim_i32 = i32::try_from(dim)?;
    let db = connect(uri).execute().await?;

    for (batch_no, chunk) in vectors.chunks(BATCH_SIZE).enumerate() {
        let offset = batch_no * BATCH_SIZE;
        let record_batch = to_record_batch(offset, chunk, dim_i32)?;
        let schema = record_batch.schema();
        let reader = Box::new(RecordBatchIterator::new(vec![Ok(record_batch)].into_iter(), schema));
        if db.table_names().execute().await?.iter().any(|n| n == table_name) {
            db.open_table(table_name).execute().await?.add(reader).execute().await?;
        } else {
            db.create_table(table_name, reader).execute().await?;
        }
    }
    info!(uri, table = table_name, rows = vectors.len(), dim, "lance table written");
    Ok(())
}

fn to_record_batch(offset: usize, vectors: &[Vec<f32>], dim: i32) -> Result<RecordBatch> {
    let positions = (offset..offset + vectors.len())
        .map(i32::try_from)
        .collect::<std::result::Result<Vec<i32>, _>>()?;
    let values = vectors.iter().map(|v| Some(v.iter().copied().map(Some).collect::<Vec<_>>()));
    Ok(RecordBatch::try_new(
        build_arrow_schema(dim),
        vec![
            Arc::new(Int32Array::from(positions)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(values, dim)),
        ],
    )?)
}
