//! # Animerec
//!
//! Anime recommendations by retrieval-augmented generation. This crate ties
//! the pieces together:
//!
//! - [`core`]: context selection and the recommendation pipeline
//! - [`vecdb`]: corpus ingestion, embeddings and the vector store
//! - [`llm`]: the chat completion client
//!
//! ```rust,no_run
//! use animerec::{AnimeRecommender, LlmConfig, MiniLmEmbedder, OpenAiClient, StoreConfig, VectorStore};
//!
//! let store = VectorStore::open(
//!     "chroma_db",
//!     MiniLmEmbedder::load(animerec::vecdb::DEFAULT_MODEL_DIR).unwrap(),
//!     StoreConfig::default(),
//! )
//! .unwrap();
//! let llm = OpenAiClient::new(LlmConfig::new("sk-...")).unwrap();
//!
//! let recommender: AnimeRecommender = animerec::Recommender::new(store, llm);
//! println!("{}", recommender.recommend("dark fantasy with a strong lead").unwrap());
//! ```
pub use animerec_core as core;
pub use animerec_llm as llm;
pub use animerec_vecdb as vecdb;

pub use animerec_core::{
    ContextSelector, PreparedPrompt, PromptTemplate, Recommender, RecommenderError,
    SelectedContext, SelectionConfig,
};
pub use animerec_llm::{LlmConfig, OpenAiClient};
pub use animerec_vecdb::{MiniLmEmbedder, StoreConfig, VectorStore};

/// The recommender wired with the bundled store and client.
pub type AnimeRecommender = Recommender<VectorStore<MiniLmEmbedder>, OpenAiClient>;
