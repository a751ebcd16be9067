//! # Recommendation Pipeline
//!
//! query → similarity search → context selection → prompt → generation.

use tracing::{error, info};

use crate::backend::{SimilaritySearch, TextGenerator};
use crate::error::Result;
use crate::prompt::{PreparedPrompt, PromptTemplate};
use crate::selection::{ContextSelector, SelectionConfig};

/// Neighbors requested per query. The selector caps the context on its own,
/// so this only widens the candidate pool.
pub const DEFAULT_TOP_K: usize = 15;

/// Retrieval-augmented recommender over injected collaborators.
///
/// Holds no per-query state; it is `Send + Sync` whenever both collaborators
/// are, and may then serve concurrent queries.
pub struct Recommender<S, G> {
    search: S,
    generator: G,
    selector: ContextSelector,
    template: PromptTemplate,
    top_k: usize,
}

impl<S, G> Recommender<S, G> {
    /// Create a recommender with the default selection, template and `k`.
    pub fn new(search: S, generator: G) -> Self {
        Self {
            search,
            generator,
            selector: ContextSelector::default(),
            template: PromptTemplate::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set how many neighbors to request per query (at least one).
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Set the selection configuration.
    pub fn with_selection(mut self, config: SelectionConfig) -> Self {
        self.selector = ContextSelector::new(config);
        self
    }

    /// Set the prompt template.
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Neighbors requested per query.
    pub fn top_k(&self) -> usize {
        self.top_k
    }
}

impl<S: SimilaritySearch, G> Recommender<S, G> {
    /// Runs retrieval and selection and returns the filled-in prompt.
    ///
    /// # Errors
    ///
    /// Propagates search failures unchanged.
    pub fn prepare(&self, query: &str) -> Result<PreparedPrompt> {
        let results = self.search.query_similar(query, self.top_k)?;
        let hits = results.hits();
        Ok(self.selector.prepare(query, &hits, &self.template))
    }
}

impl<S: SimilaritySearch, G: TextGenerator> Recommender<S, G> {
    /// Produces a recommendation for the query.
    ///
    /// Fails as a whole if either collaborator fails; no partial text is
    /// returned.
    ///
    /// # Errors
    ///
    /// Propagates search and generation failures unchanged.
    pub fn recommend(&self, query: &str) -> Result<String> {
        info!(query, "received a query");

        let outcome = self.prepare(query).and_then(|prepared| {
            info!(
                items = prepared.context.blocks.len(),
                chunks = prepared.context.chunk_count(),
                "context selected"
            );
            self.generator.complete(&prepared.prompt)
        });

        match outcome {
            Ok(text) => {
                info!("recommendation generated successfully");
                Ok(text)
            }
            Err(err) => {
                error!(%err, "failed to get recommendation");
                Err(err)
            }
        }
    }
}
