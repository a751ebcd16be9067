use serde::{Deserialize, Serialize};

/// Maximum number of items in a context.
pub const MAX_ITEMS: usize = 5;
/// Maximum number of chunks taken from one item.
pub const MAX_CHUNKS_PER_ITEM: usize = 3;
/// Rank fraction of the high threshold in the sorted relevance list.
pub const HIGH_RANK_FRACTION: f64 = 0.2;
/// Rank fraction of the minimum threshold (the median).
pub const MIN_RANK_FRACTION: f64 = 0.5;
/// Result sets up to this size use the fallback thresholds.
pub const SMALL_SET_LEN: usize = 5;
/// Fallback high threshold as a fraction of the top relevance.
pub const FALLBACK_HIGH_RATIO: f64 = 0.8;
/// High threshold when there are no hits at all.
pub const EMPTY_HIGH_THRESHOLD: f64 = 0.5;
/// Minimum threshold when there are no hits at all.
pub const EMPTY_MIN_THRESHOLD: f64 = 0.3;
/// A continuity chunk must reach this fraction of the item's best relevance.
pub const CONTINUITY_RATIO: f64 = 0.85;
/// Continuity chunks are only added while fewer than this many are selected.
pub const CONTINUITY_LIMIT: usize = 2;

/// Tunables of the context selection.
///
/// The defaults are the reference values; changing them changes which
/// chunks end up in the context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub max_items: usize,
    pub max_chunks_per_item: usize,
    pub high_rank_fraction: f64,
    pub min_rank_fraction: f64,
    pub small_set_len: usize,
    pub fallback_high_ratio: f64,
    pub empty_high_threshold: f64,
    pub empty_min_threshold: f64,
    pub continuity_ratio: f64,
    pub continuity_limit: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_items: MAX_ITEMS,
            max_chunks_per_item: MAX_CHUNKS_PER_ITEM,
            high_rank_fraction: HIGH_RANK_FRACTION,
            min_rank_fraction: MIN_RANK_FRACTION,
            small_set_len: SMALL_SET_LEN,
            fallback_high_ratio: FALLBACK_HIGH_RATIO,
            empty_high_threshold: EMPTY_HIGH_THRESHOLD,
            empty_min_threshold: EMPTY_MIN_THRESHOLD,
            continuity_ratio: CONTINUITY_RATIO,
            continuity_limit: CONTINUITY_LIMIT,
        }
    }
}

impl SelectionConfig {
    /// Create a configuration with the reference values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of items in the context.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Set the maximum number of chunks per item.
    pub fn with_max_chunks_per_item(mut self, max_chunks: usize) -> Self {
        self.max_chunks_per_item = max_chunks;
        self
    }

    /// Set the rank fractions of the high and minimum thresholds.
    ///
    /// Both are clamped to `[0.0, 1.0)`.
    pub fn with_rank_fractions(mut self, high: f64, min: f64) -> Self {
        self.high_rank_fraction = high.clamp(0.0, 0.999);
        self.min_rank_fraction = min.clamp(0.0, 0.999);
        self
    }

    /// Set the continuity ratio.
    pub fn with_continuity_ratio(mut self, ratio: f64) -> Self {
        self.continuity_ratio = ratio;
        self
    }
}
