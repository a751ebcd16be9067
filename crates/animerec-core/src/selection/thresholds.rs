use serde::{Deserialize, Serialize};

use crate::selection::config::SelectionConfig;
use crate::types::ItemGroup;

/// Adaptive relevance cut-offs derived from one result set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Chunks at or above this are "top tier" and may be stacked per item.
    pub high: f64,
    /// The best chunk of an item must reach this to be selected at all.
    pub min: f64,
}

impl Thresholds {
    /// Computes thresholds over every chunk of every group.
    #[must_use]
    pub fn from_groups(groups: &[ItemGroup], config: &SelectionConfig) -> Self {
        let relevances: Vec<f64> = groups
            .iter()
            .flat_map(|g| g.chunks.iter().map(|c| c.relevance))
            .collect();
        Self::from_relevances(relevances, config)
    }

    /// Computes thresholds from a relevance distribution.
    ///
    /// Scores are sorted descending. Above `small_set_len` scores, `high` is
    /// the score at rank `floor(len * high_rank_fraction)` and `min` the
    /// score at rank `floor(len * min_rank_fraction)`. Otherwise `high` is
    /// the top score times `fallback_high_ratio` and `min` the lowest score,
    /// with fixed values for an empty distribution.
    #[must_use]
    pub fn from_relevances(mut relevances: Vec<f64>, config: &SelectionConfig) -> Self {
        relevances.sort_by(|a, b| b.total_cmp(a));
        let len = relevances.len();

        if len > config.small_set_len {
            Self {
                high: relevances[rank(len, config.high_rank_fraction)],
                min: relevances[rank(len, config.min_rank_fraction)],
            }
        } else {
            Self {
                high: relevances
                    .first()
                    .map_or(config.empty_high_threshold, |top| top * config.fallback_high_ratio),
                min: relevances
                    .last()
                    .copied()
                    .unwrap_or(config.empty_min_threshold),
            }
        }
    }
}

fn rank(len: usize, fraction: f64) -> usize {
    ((len as f64 * fraction) as usize).min(len - 1)
}
