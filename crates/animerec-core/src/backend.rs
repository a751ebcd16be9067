//! Collaborator seams: similarity search and text generation.
//!
//! Both calls block. Timeouts and retries belong to the implementations or
//! the caller.

use std::sync::Arc;

use crate::error::Result;
use crate::types::SearchResults;

/// Returns the nearest stored chunks for a query.
pub trait SimilaritySearch {
    /// Returns up to `k` hits ordered by ascending distance.
    ///
    /// # Errors
    ///
    /// [`RecommenderError::IndexNotBuilt`](crate::RecommenderError::IndexNotBuilt)
    /// when there is nothing to search, otherwise
    /// [`RecommenderError::Search`](crate::RecommenderError::Search).
    fn query_similar(&self, query: &str, k: usize) -> Result<SearchResults>;
}

/// Single-turn text completion.
pub trait TextGenerator {
    /// Completes the prompt.
    ///
    /// # Errors
    ///
    /// [`RecommenderError::Generation`](crate::RecommenderError::Generation)
    /// on transport, credential, or API failures.
    fn complete(&self, prompt: &str) -> Result<String>;
}

impl<T: SimilaritySearch + ?Sized> SimilaritySearch for &T {
    fn query_similar(&self, query: &str, k: usize) -> Result<SearchResults> {
        (**self).query_similar(query, k)
    }
}

impl<T: SimilaritySearch + ?Sized> SimilaritySearch for Box<T> {
    fn query_similar(&self, query: &str, k: usize) -> Result<SearchResults> {
        (**self).query_similar(query, k)
    }
}

impl<T: SimilaritySearch + ?Sized> SimilaritySearch for Arc<T> {
    fn query_similar(&self, query: &str, k: usize) -> Result<SearchResults> {
        (**self).query_similar(query, k)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Box<T> {
    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt)
    }
}
