//! catalog-vector
//!
//! Read-only nearest-neighbour access over catalog embeddings, keyed by
//! catalog position. `FlatIndex` is an exhaustive squared-L2 index stored as a
//! JSON artifact; with the `lance` feature, `LanceIndex` serves the same
//! contract from a LanceDB table.

pub mod flat;
#[cfg(feature = "lance")]
pub mod lance;
#[cfg(feature = "lance")]
pub mod schema;
#[cfg(feature = "lance")]
pub mod writer;

pub use catalog_core::traits::VectorIndex;
pub use flat::FlatIndex;
#[cfg(feature = "lance")]
pub use lance::LanceIndex;

use catalog_core::types::Neighbor;

/// Ascending distance, ties by ascending position.
pub(crate) fn sort_neighbors(hits: &mut [Neighbor]) {
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.position.cmp(&b.position)));
}
