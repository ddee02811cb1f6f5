//! Chained hash tables over the lump directory.
//!
//! Four independent tables are kept, each a `(first, next)` pair of index arrays
//! with one bucket per lump:
//!
//! 1. short name
//! 2. full long name
//! 3. long name without its extension
//! 4. resource id
//!
//! Within a bucket the chain runs newest first, so the first match a lookup
//! meets is the one loaded last. That ordering is what makes later containers
//! override earlier ones.

use crate::name::{hash_str, strip_extension};
use crate::record::LumpRecord;

/// Terminates a chain.
pub(crate) const NULL_INDEX: u32 = u32::MAX;

#[derive(Debug, Default, Clone)]
pub(crate) struct Chain {
    first: Vec<u32>,
    next: Vec<u32>,
}

impl Chain {
    fn with_buckets(count: usize) -> Self {
        Self {
            first: vec![NULL_INDEX; count],
            next: vec![NULL_INDEX; count],
        }
    }

    fn link(&mut self, key: u32, index: usize) {
        let bucket = key as usize % self.first.len();
        self.next[index] = self.first[bucket];
        self.first[bucket] = index as u32;
    }

    /// Walk the chain of the bucket `key` falls into.
    pub(crate) fn iter(&self, key: u32) -> ChainIter<'_> {
        let current = if self.first.is_empty() {
            NULL_INDEX
        } else {
            self.first[key as usize % self.first.len()]
        };
        ChainIter {
            next: &self.next,
            current,
        }
    }
}

pub(crate) struct ChainIter<'a> {
    next: &'a [u32],
    current: u32,
}

impl Iterator for ChainIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.current == NULL_INDEX {
            return None;
        }
        let index = self.current as usize;
        self.current = self.next.get(index).copied().unwrap_or(NULL_INDEX);
        Some(index)
    }
}

/// The four lookup tables.
#[derive(Debug, Default, Clone)]
pub(crate) struct HashChains {
    pub short_name: Chain,
    pub full_name: Chain,
    pub no_extension: Chain,
    pub resource_id: Chain,
}

impl HashChains {
    /// Build every table from scratch. Bucket count equals the record count.
    pub(crate) fn build(records: &[LumpRecord]) -> Self {
        let count = records.len();
        let mut chains = Self {
            short_name: Chain::with_buckets(count),
            full_name: Chain::with_buckets(count),
            no_extension: Chain::with_buckets(count),
            resource_id: Chain::with_buckets(count),
        };

        for (index, record) in records.iter().enumerate() {
            chains.short_name.link(record.short_name.hash(), index);

            if record.long_name.is_empty() {
                continue;
            }
            chains.full_name.link(hash_str(&record.long_name), index);
            chains
                .no_extension
                .link(hash_str(strip_extension(&record.long_name)), index);
            if let Some(id) = record.resource_id {
                chains.resource_id.link(id, index);
            }
        }

        chains
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.short_name.first.is_empty()
    }
}
