use thiserror::Error;

/// Boxed error raised by an injected collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while producing a recommendation.
///
/// The context selection itself is total over its input; every variant here
/// originates from a collaborator or from building a prompt template.
#[derive(Debug, Error)]
pub enum RecommenderError {
    /// The similarity-search collaborator has no index for the collection.
    #[error("collection {collection:?} not found, build the vector store first")]
    IndexNotBuilt {
        /// Name of the missing collection.
        collection: String,
    },

    /// The similarity search failed for a reason other than a missing index.
    #[error("similarity search failed: {0}")]
    Search(#[source] BoxError),

    /// The text-generation collaborator failed (transport, auth, or API).
    #[error("text generation failed: {0}")]
    Generation(#[source] BoxError),

    /// A prompt template is malformed.
    #[error("invalid prompt template: {0}")]
    InvalidTemplate(String),
}

impl RecommenderError {
    /// Wraps any search backend error.
    pub fn search(err: impl Into<BoxError>) -> Self {
        Self::Search(err.into())
    }

    /// Wraps any generation backend error.
    pub fn generation(err: impl Into<BoxError>) -> Self {
        Self::Generation(err.into())
    }
}

/// Result type alias for recommender operations.
pub type Result<T> = std::result::Result<T, RecommenderError>;
