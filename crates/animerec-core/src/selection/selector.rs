use tracing::debug;

use crate::prompt::{PreparedPrompt, PromptTemplate};
use crate::selection::config::SelectionConfig;
use crate::selection::grouping::group_hits;
use crate::selection::thresholds::Thresholds;
use crate::types::{ChunkHit, ContextBlock, ItemGroup, SelectedContext};

/// Builds the generation context from nearest-neighbor hits.
///
/// Stateless between calls: every call owns its groups and thresholds.
#[derive(Debug, Clone, Default)]
pub struct ContextSelector {
    config: SelectionConfig,
}

impl ContextSelector {
    /// Create a selector with the given configuration.
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    /// Get the selector configuration.
    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    /// Selects a bounded, relevance-ranked context from the hits.
    ///
    /// # Examples
    /// ```
    /// use animerec_core::{ChunkHit, ContextSelector};
    ///
    /// let hits = vec![
    ///     ChunkHit::new("Pirates chase a legendary treasure.", "7", "ShowA", 0.1),
    ///     ChunkHit::new("A long-running adventure.", "7", "ShowA", 0.4),
    /// ];
    /// let context = ContextSelector::default().select(&hits);
    ///
    /// assert_eq!(context.render(), "[ShowA]: Pirates chase a legendary treasure.");
    /// ```
    #[must_use]
    pub fn select(&self, hits: &[ChunkHit]) -> SelectedContext {
        let groups = group_hits(hits);
        let thresholds = Thresholds::from_groups(&groups, &self.config);
        debug!(
            hits = hits.len(),
            groups = groups.len(),
            high = thresholds.high,
            min = thresholds.min,
            "computed relevance thresholds"
        );

        let mut ranked: Vec<&ItemGroup> = groups.iter().collect();
        // stable: equal best relevance keeps first-seen order
        ranked.sort_by(|a, b| b.best_relevance().total_cmp(&a.best_relevance()));

        let mut blocks = Vec::new();
        for group in ranked {
            if blocks.len() >= self.config.max_items {
                break;
            }

            let chunks = self.select_chunks(group, &thresholds);
            if chunks.is_empty() {
                debug!(item = %group.item_id, "no chunk cleared the thresholds");
                continue;
            }

            blocks.push(ContextBlock {
                item_id: group.item_id.clone(),
                title: group.title.clone(),
                chunks,
            });
        }

        debug!(items = blocks.len(), "selected context");
        SelectedContext { blocks, thresholds }
    }

    /// Selects context and fills the template with it and the query.
    #[must_use]
    pub fn prepare(
        &self,
        query: &str,
        hits: &[ChunkHit],
        template: &PromptTemplate,
    ) -> PreparedPrompt {
        let context = self.select(hits);
        let prompt = template.format(&context.render(), query);
        PreparedPrompt {
            query: query.to_string(),
            context,
            prompt,
        }
    }

    /// Walks an item's chunks best-first and stops at the first one that
    /// qualifies under none of the rules, or once the per-item cap is met.
    fn select_chunks(&self, group: &ItemGroup, thresholds: &Thresholds) -> Vec<String> {
        let ranked = group.ranked_chunks();
        let Some(best) = ranked.first().map(|c| c.relevance) else {
            return Vec::new();
        };

        let mut selected: Vec<String> = Vec::new();
        for (i, chunk) in ranked.iter().enumerate() {
            let taken = selected.len();
            if taken >= self.config.max_chunks_per_item {
                break;
            }
            let lead = i == 0 && chunk.relevance >= thresholds.min;
            let top_tier = chunk.relevance >= thresholds.high;
            let continuity = taken > 0
                && taken < self.config.continuity_limit
                && chunk.relevance >= best * self.config.continuity_ratio;

            if lead || top_tier || continuity {
                selected.push(chunk.text.clone());
            } else {
                break;
            }
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(text: &str, id: &str, distance: f64) -> ChunkHit {
        ChunkHit::new(text, id, format!("Show{id}"), distance)
    }

    #[test]
    fn two_hits_same_item() {
        let hits = vec![
            ChunkHit::new("chunk zero", "7", "ShowA", 0.1),
            ChunkHit::new("chunk one", "7", "ShowA", 0.4),
        ];
        let context = ContextSelector::default().select(&hits);

        assert!((context.thresholds.high - 0.72).abs() < 1e-12);
        assert!((context.thresholds.min - 0.6).abs() < 1e-12);
        assert_eq!(context.blocks.len(), 1);
        assert_eq!(context.render(), "[ShowA]: chunk zero");
    }

    #[test]
    fn empty_hits_give_empty_context() {
        let context = ContextSelector::default().select(&[]);
        assert!(context.is_empty());
        assert_eq!(context.render(), "");
        assert_eq!(context.thresholds, Thresholds { high: 0.5, min: 0.3 });
    }

    #[test]
    fn missing_metadata_hit_is_grouped_as_unknown() {
        let results = crate::types::SearchResults {
            documents: vec!["known".into(), "orphan".into()],
            metadatas: Some(vec![
                serde_json::json!({"anime_id": "1", "anime_title": "Known"})
                    .as_object()
                    .cloned(),
                None,
            ]),
            distances: Some(vec![0.2, 0.3]),
        };
        let hits = results.hits();
        assert_eq!(hits[1].item_id, "unknown");
        assert_eq!(hits[1].item_title, "Unknown");
        assert_eq!(hits[1].relevance(), 1.0 - 0.3);

        // small set: min = lowest = 0.7, so both items clear it
        let context = ContextSelector::default().select(&hits);
        assert_eq!(context.render(), "[Known]: known\n\n[Unknown]: orphan");
    }

    #[test]
    fn missing_distance_defaults_to_zero_relevance() {
        let results = crate::types::SearchResults {
            documents: vec!["x".into()],
            metadatas: None,
            distances: None,
        };
        let context = ContextSelector::default().select(&results.hits());
        // single score 0.0: min = 0.0, so the chunk is still selected
        assert_eq!(context.render(), "[Unknown]: x");
    }

    #[test]
    fn groups_ranked_by_best_chunk_with_stable_ties() {
        let hits = vec![
            hit("a", "1", 0.30),
            hit("b", "2", 0.10),
            hit("c", "3", 0.30),
            hit("d", "4", 0.20),
        ];
        let context = ContextSelector::default().select(&hits);
        let order: Vec<&str> = context.blocks.iter().map(|b| b.item_id.as_str()).collect();
        assert_eq!(order, vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn at_most_five_items_and_three_chunks() {
        let mut hits = Vec::new();
        for item in 0..8 {
            for c in 0..5 {
                let distance = 0.01 * f64::from(c);
                hits.push(hit(&format!("i{item}c{c}"), &item.to_string(), distance));
            }
        }
        let context = ContextSelector::default().select(&hits);
        assert_eq!(context.blocks.len(), 5);
        assert!(context.blocks.iter().all(|b| b.chunks.len() <= 3));
        assert!(context.blocks.iter().all(|b| !b.chunks.is_empty()));
    }

    #[test]
    fn chunk_cap_binds_with_equal_scores() {
        let hits: Vec<ChunkHit> = (0..6).map(|i| hit(&format!("c{i}"), "1", 0.0)).collect();
        let context = ContextSelector::default().select(&hits);
        assert_eq!(context.blocks.len(), 1);
        assert_eq!(context.blocks[0].chunks, vec!["c0", "c1", "c2"]);
    }

    #[test]
    fn chunk_cap_also_bounds_continuity() {
        let hits = vec![hit("c0", "1", 0.10), hit("c1", "1", 0.15)];

        let default = ContextSelector::default().select(&hits);
        assert_eq!(default.blocks[0].chunks, vec!["c0", "c1"]);

        let selector = ContextSelector::new(SelectionConfig::new().with_max_chunks_per_item(1));
        let context = selector.select(&hits);
        assert_eq!(context.blocks.len(), 1);
        assert_eq!(context.blocks[0].chunks, vec!["c0"]);
    }

    #[test]
    fn top_tier_chunks_stack_up_to_three() {
        // 10 scores: high = r[2], min = r[5]
        let hits = vec![
            hit("a0", "1", 0.00),
            hit("a1", "1", 0.01),
            hit("a2", "1", 0.02),
            hit("a3", "1", 0.03),
            hit("b0", "2", 0.50),
            hit("b1", "2", 0.51),
            hit("b2", "2", 0.52),
            hit("b3", "2", 0.53),
            hit("b4", "2", 0.54),
            hit("b5", "2", 0.55),
        ];
        let context = ContextSelector::default().select(&hits);
        assert_eq!(context.blocks.len(), 2);
        assert_eq!(context.blocks[0].chunks, vec!["a0", "a1", "a2"]);
        // b0 clears min, b1 rides the continuity window
        assert_eq!(context.blocks[1].chunks, vec!["b0", "b1"]);
    }

    #[test]
    fn groups_below_min_are_excluded() {
        // 7 scores; min = r[3] = 0.6
        let hits = vec![
            hit("a", "1", 0.05),
            hit("b", "2", 0.10),
            hit("c", "3", 0.20),
            hit("d", "4", 0.40),
            hit("e", "5", 0.70),
            hit("f", "6", 0.80),
            hit("g", "7", 0.90),
        ];
        let context = ContextSelector::default().select(&hits);
        let ids: Vec<&str> = context.blocks.iter().map(|b| b.item_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn continuity_adds_a_single_close_chunk() {
        // 6 scores: high = r[1] = 0.95, min = r[3] = 0.85
        let hits = vec![
            hit("a0", "1", 0.00),
            hit("b0", "2", 0.05),
            hit("c0", "3", 0.10),
            hit("c1", "3", 0.15),
            hit("c2", "3", 0.16),
            hit("d0", "4", 0.50),
        ];
        let context = ContextSelector::default().select(&hits);
        let c = context.blocks.iter().find(|b| b.item_id == "3").unwrap();
        // c1 (0.85 >= 0.9 * 0.85) bridges; c2 would need the window again
        assert_eq!(c.chunks, vec!["c0", "c1"]);
    }

    #[test]
    fn window_closes_after_top_tier() {
        // 6 scores; high = r[1] = 0.9, min = r[3] = 0.5
        let hits = vec![
            hit("a0", "1", 0.00),
            hit("a1", "1", 0.50),
            hit("a2", "1", 0.10),
            hit("b0", "2", 0.60),
            hit("c0", "3", 0.70),
            hit("d0", "4", 0.80),
        ];
        let context = ContextSelector::default().select(&hits);
        // a2 (0.9) is top tier; a1 (0.5) is below high and the continuity window is closed
        assert_eq!(context.blocks[0].chunks, vec!["a0", "a2"]);
    }

    #[test]
    fn selection_is_idempotent() {
        let hits: Vec<ChunkHit> = (0..15)
            .map(|i| hit(&format!("c{i}"), &(i % 6).to_string(), f64::from(i) * 0.03))
            .collect();
        let selector = ContextSelector::default();
        let first = selector.select(&hits).render();
        let second = selector.select(&hits).render();
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn prepare_fills_template() {
        let template = PromptTemplate::new("C={context};Q={question}").unwrap();
        let hits = vec![ChunkHit::new("body", "1", "Title", 0.2)];
        let prepared = ContextSelector::default().prepare("what?", &hits, &template);
        assert_eq!(prepared.prompt, "C=[Title]: body;Q=what?");
        assert_eq!(prepared.query, "what?");

        let prepared = ContextSelector::default().prepare("what?", &[], &template);
        assert_eq!(prepared.prompt, "C=;Q=what?");
    }
}
