//! # Animerec VecDB
//!
//! Builds the searchable anime corpus and answers similarity queries.
//! Rows of the catalog CSV are flattened to text, split into overlapping
//! chunks, embedded with a local sentence-transformer and persisted in an
//! embedded SQLite collection.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use animerec_vecdb::{MiniLmEmbedder, StoreConfig, VectorStore, DEFAULT_MODEL_DIR};
//!
//! let embedder = MiniLmEmbedder::load(DEFAULT_MODEL_DIR).unwrap();
//! let store = VectorStore::open("chroma_db", embedder, StoreConfig::default()).unwrap();
//! store.build_from_csv("data/anime_with_synopsis.csv").unwrap();
//!
//! let results = store.query("space cowboys", 15).unwrap();
//! println!("{} hits", results.len());
//! ```
pub mod chunker;
pub mod corpus;
pub mod distance;
pub mod embeddings;
pub mod error;
pub mod store;

// Re-export primary API
pub use chunker::{ChunkerConfig, TextChunker};
pub use corpus::{
    AnimeRecord, ChunkMetadata, CorpusChunk, chunk_records, extract_title, load_csv, read_csv,
};
pub use distance::DistanceMetric;
pub use embeddings::{DEFAULT_MODEL_DIR, Embedder, MiniLmEmbedder};
pub use error::{Result, VecDbError};
pub use store::{DATABASE_FILE, DEFAULT_COLLECTION, StoreConfig, VectorStore};
