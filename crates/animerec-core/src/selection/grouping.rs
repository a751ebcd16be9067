use std::collections::HashMap;

use crate::types::{ChunkHit, ItemGroup};

/// Partitions hits by item id.
///
/// Groups come back in first-seen order. Inside a group, chunks keep their
/// arrival order and the title of the first hit wins.
#[must_use]
pub fn group_hits(hits: &[ChunkHit]) -> Vec<ItemGroup> {
    let mut groups: Vec<ItemGroup> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for hit in hits {
        let slot = *index.entry(hit.item_id.as_str()).or_insert_with(|| {
            groups.push(ItemGroup::new(&hit.item_id, &hit.item_title));
            groups.len() - 1
        });
        groups[slot].push(&hit.text, hit.relevance());
    }

    groups
}
