use serde::Serialize;

/// A chunk text paired with its relevance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    /// Chunk text.
    pub text: String,
    /// `1.0 - distance`.
    pub relevance: f64,
}

/// All chunks of one search result set that belong to the same item.
///
/// Chunks are kept in arrival order; the title is the first one seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemGroup {
    /// Identifier shared by every chunk in the group.
    pub item_id: String,
    /// Display title.
    pub title: String,
    /// Chunks in arrival order.
    pub chunks: Vec<ScoredChunk>,
}

impl ItemGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new(item_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            title: title.into(),
            chunks: Vec::new(),
        }
    }

    /// Appends a chunk, keeping arrival order.
    pub fn push(&mut self, text: impl Into<String>, relevance: f64) {
        self.chunks.push(ScoredChunk {
            text: text.into(),
            relevance,
        });
    }

    /// Highest chunk relevance, or negative infinity for an empty group.
    #[must_use]
    pub fn best_relevance(&self) -> f64 {
        self.chunks
            .iter()
            .map(|c| c.relevance)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Chunks ordered by relevance, highest first. Ties keep arrival order.
    #[must_use]
    pub fn ranked_chunks(&self) -> Vec<&ScoredChunk> {
        let mut ranked: Vec<&ScoredChunk> = self.chunks.iter().collect();
        // `sort_by` is stable
        ranked.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_relevance_of_group() {
        let mut group = ItemGroup::new("1", "A");
        assert_eq!(group.best_relevance(), f64::NEG_INFINITY);
        group.push("x", 0.3);
        group.push("y", 0.8);
        group.push("z", -0.2);
        assert_eq!(group.best_relevance(), 0.8);
    }

    #[test]
    fn ranked_chunks_are_stable() {
        let mut group = ItemGroup::new("1", "A");
        group.push("first", 0.5);
        group.push("top", 0.9);
        group.push("second", 0.5);
        group.push("third", 0.5);

        let texts: Vec<&str> = group.ranked_chunks().iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["top", "first", "second", "third"]);
        // arrival order is untouched
        assert_eq!(group.chunks[0].text, "first");
    }
}
