//! Shuffle: the barrier between the map and reduce phases
//!
//! Runs on the calling task once every map batch has finished. Groups keep
//! the order in which their token was first seen, which makes the table
//! identical across runs regardless of how map batches were scheduled.

use super::types::{CountPair, GroupedEntry, GroupedTable};
use std::collections::HashMap;
use tracing::debug;

/// Group every pair by token
pub fn shuffle(pairs: Vec<CountPair>) -> GroupedTable {
    let pair_count = pairs.len();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<GroupedEntry> = Vec::new();

    for pair in pairs {
        match positions.get(&pair.token) {
            Some(&position) => entries[position].counts.push(pair.count),
            None => {
                positions.insert(pair.token.clone(), entries.len());
                entries.push(GroupedEntry {
                    token: pair.token,
                    counts: vec![pair.count],
                });
            }
        }
    }

    debug!(
        "Shuffled {} pairs into {} groups",
        pair_count,
        entries.len()
    );
    GroupedTable::from_entries(entries)
}
