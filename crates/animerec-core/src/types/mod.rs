pub mod context;
pub mod group;
pub mod hit;

pub use context::{ContextBlock, SelectedContext};
pub use group::{ItemGroup, ScoredChunk};
pub use hit::{ChunkHit, Metadata, SearchResults};
