use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A catalog or index artifact is missing, malformed or inconsistent.
    #[error("Load failed: {0}")]
    Load(String),

    #[error("Position {position} out of range (catalog holds {len} entries)")]
    OutOfRange { position: usize, len: usize },

    #[error("Embedding dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The vector index backend failed while answering a query.
    #[error("Index search failed: {0}")]
    Index(String),

    /// Computing the query embedding failed.
    #[error("Search failed: {0}")]
    Search(String),

    #[error("Cannot calibrate an empty result set")]
    EmptyInput,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub fn load(context: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        Self::Load(format!("{context}: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
