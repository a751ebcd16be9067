//! # Context Selection
//!
//! Turns raw nearest-neighbor hits into a bounded, relevance-ranked context:
//! hits are grouped per item, adaptive thresholds are derived from the score
//! distribution, and each item contributes its best chunks until the item
//! cap is reached.

pub mod config;
pub mod grouping;
pub mod selector;
pub mod thresholds;

pub use config::SelectionConfig;
pub use grouping::group_hits;
pub use selector::ContextSelector;
pub use thresholds::Thresholds;
