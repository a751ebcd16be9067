//! # Animerec Core
//!
//! The heart of the anime recommender. Turns nearest-neighbor search hits
//! into a bounded, relevance-ranked context and drives the
//! retrieval-augmented generation pipeline over injected collaborators.
//!
//! ## Quick Start
//!
//! ```rust
//! use animerec_core::{ContextSelector, PromptTemplate, SearchResults};
//! use serde_json::json;
//!
//! let results = SearchResults {
//!     documents: vec!["Bounty hunters drift through space.".into()],
//!     metadatas: Some(vec![json!({"anime_id": "0", "anime_title": "Cowboy Bebop"})
//!         .as_object()
//!         .cloned()]),
//!     distances: Some(vec![0.25]),
//! };
//!
//! let prepared = ContextSelector::default().prepare(
//!     "a laid-back sci-fi show",
//!     &results.hits(),
//!     &PromptTemplate::default(),
//! );
//!
//! assert_eq!(prepared.context.render(), "[Cowboy Bebop]: Bounty hunters drift through space.");
//! assert!(prepared.prompt.contains("a laid-back sci-fi show"));
//! ```
pub mod backend;
pub mod error;
pub mod prompt;
pub mod recommender;
pub mod selection;
pub mod types;

// Re-export primary API
pub use backend::{SimilaritySearch, TextGenerator};
pub use error::{BoxError, RecommenderError, Result};
pub use prompt::{PreparedPrompt, PromptTemplate, ANIME_RECOMMENDATION_TEMPLATE};
pub use recommender::{Recommender, DEFAULT_TOP_K};
pub use selection::{group_hits, ContextSelector, SelectionConfig, Thresholds};
pub use types::{
    ChunkHit, ContextBlock, ItemGroup, Metadata, ScoredChunk, SearchResults, SelectedContext,
};
