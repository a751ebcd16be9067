use animerec_core::RecommenderError;
use thiserror::Error;

/// Errors that can occur while building or querying the vector store.
#[derive(Debug, Error)]
pub enum VecDbError {
    /// The requested collection has not been built.
    #[error("collection {0:?} not found, build the vector store first")]
    CollectionNotFound(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The corpus CSV could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The SQLite backend failed.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Metadata or model configuration could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The embedding model could not be loaded.
    #[error("failed to load embedding model: {0}")]
    ModelLoad(String),

    /// Embedding inference failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// A vector does not match the collection's dimension.
    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension {
        /// Dimension the collection was built with.
        expected: usize,
        /// Dimension that was supplied.
        actual: usize,
    },

    /// Chunking parameters are unusable.
    #[error("invalid chunker configuration: {0}")]
    InvalidChunker(String),

    /// A thread panicked while holding the store lock.
    #[error("vector store lock poisoned")]
    Poisoned,
}

impl From<candle_core::Error> for VecDbError {
    fn from(err: candle_core::Error) -> Self {
        Self::Embedding(err.to_string())
    }
}

impl From<VecDbError> for RecommenderError {
    fn from(err: VecDbError) -> Self {
        match err {
            VecDbError::CollectionNotFound(collection) => Self::IndexNotBuilt { collection },
            other => Self::search(other),
        }
    }
}

/// Result type alias for vector store operations.
pub type Result<T> = std::result::Result<T, VecDbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_collection_maps_to_index_not_built() {
        let err: RecommenderError =
            VecDbError::CollectionNotFound("anime_collection".into()).into();
        match err {
            RecommenderError::IndexNotBuilt { collection } => {
                assert_eq!(collection, "anime_collection");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn other_errors_map_to_search() {
        let err: RecommenderError = VecDbError::Embedding("boom".into()).into();
        assert!(matches!(err, RecommenderError::Search(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VecDbError>();
    }
}
