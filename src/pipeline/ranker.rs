//! Ranking of the final frequency table

use super::types::{FrequencyMap, RankedEntry};
use std::cmp::Ordering;

/// Top `n` entries by count descending, ties broken by token ascending
///
/// Returns every entry when `n` exceeds the number of distinct tokens and an
/// empty list when `n == 0` or the map is empty.
pub fn rank(frequencies: &FrequencyMap, n: usize) -> Vec<RankedEntry> {
    if n == 0 || frequencies.is_empty() {
        return Vec::new();
    }

    let mut entries: Vec<RankedEntry> = frequencies
        .iter()
        .map(|(token, count)| RankedEntry::new(token, count))
        .collect();

    if n < entries.len() {
        entries.select_nth_unstable_by(n - 1, compare_ranked);
        entries.truncate(n);
    }
    entries.sort_unstable_by(compare_ranked);
    entries
}

fn compare_ranked(a: &RankedEntry, b: &RankedEntry) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token))
}
