use std::fmt;

use serde::Serialize;

use crate::selection::Thresholds;

/// Separator placed between item blocks in the rendered context.
pub const BLOCK_SEPARATOR: &str = "\n\n";

/// The selected chunks of one accepted item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextBlock {
    /// Item identifier.
    pub item_id: String,
    /// Item title.
    pub title: String,
    /// Selected chunk texts, most relevant first.
    pub chunks: Vec<String>,
}

impl fmt::Display for ContextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.title, self.chunks.join(" "))
    }
}

/// Outcome of context selection for one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedContext {
    /// Accepted blocks in rank order.
    pub blocks: Vec<ContextBlock>,
    /// Thresholds the selection was made with.
    pub thresholds: Thresholds,
}

impl SelectedContext {
    /// Renders the blocks as the context text handed to the generator.
    #[must_use]
    pub fn render(&self) -> String {
        self.blocks
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR)
    }

    /// Returns `true` if no item was accepted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Total number of chunks across all blocks.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.blocks.iter().map(|b| b.chunks.len()).sum()
    }
}

impl fmt::Display for SelectedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
