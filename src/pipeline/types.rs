//! Data passed between pipeline stages
//!
//! Each stage produces a fresh structure that the next stage consumes;
//! nothing here is mutated once built.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A normalized word produced by the normalizer
pub type Token = String;

/// Unit emitted by the map phase, one per token occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountPair {
    pub token: Token,
    pub count: u64,
}

impl CountPair {
    /// The `(token, 1)` pair for a single occurrence
    pub fn unit(token: impl Into<Token>) -> Self {
        Self {
            token: token.into(),
            count: 1,
        }
    }
}

/// All counts gathered for one token by the shuffle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupedEntry {
    pub token: Token,
    pub counts: Vec<u64>,
}

/// Output of the shuffle: one entry per distinct token in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedTable {
    entries: Vec<GroupedEntry>,
}

impl GroupedTable {
    pub(crate) fn from_entries(entries: Vec<GroupedEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, token: &str) -> Option<&GroupedEntry> {
        self.entries.iter().find(|entry| entry.token == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupedEntry> {
        self.entries.iter()
    }

    /// Total number of pairs held across all groups
    pub fn pair_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.counts.len()).sum()
    }

    pub fn into_entries(self) -> Vec<GroupedEntry> {
        self.entries
    }
}

/// Final `token -> total count` table produced by the reduce phase
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyMap {
    counts: HashMap<Token, u64>,
}

impl FrequencyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn get(&self, token: &str) -> Option<u64> {
        self.counts.get(token).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(token, count)| (token.as_str(), *count))
    }

    /// Sum of every count in the table
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

impl FromIterator<(Token, u64)> for FrequencyMap {
    fn from_iter<T: IntoIterator<Item = (Token, u64)>>(iter: T) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// A `(token, count)` row of the ranked output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub token: Token,
    pub count: u64,
}

impl RankedEntry {
    pub fn new(token: impl Into<Token>, count: u64) -> Self {
        Self {
            token: token.into(),
            count,
        }
    }
}
