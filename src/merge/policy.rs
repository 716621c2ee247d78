// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::segment::SegmentMeta;
use std::collections::BTreeMap;

/// Decides which segments, if any, should be merged after a flush.
pub trait MergePolicy: Send + Sync {
    /// Given the current segment list, returns indices into it naming the
    /// segments to merge into one, or an empty list to do nothing.
    ///
    /// At most one merge proposal is expected per call; repeated
    /// invocations must converge because each merge strictly reduces the
    /// offending tier's occupancy.
    fn find_merges(&self, segments: &[SegmentMeta]) -> Vec<usize>;
}

/// Size-tiered merge policy: segments are bucketed into tiers by
/// `floor(log2(block_count))`. When any tier holds more than `tier_width`
/// segments, every segment in the smallest such tier is proposed for
/// merging — bounding read amplification to `O(log total_postings)` at
/// amortized write amplification `O(log total_postings)`.
#[derive(Clone, Copy, Debug)]
pub struct TieredMergePolicy {
    /// Maximum number of segments allowed per tier before a merge triggers.
    pub tier_width: usize,
}

impl Default for TieredMergePolicy {
    fn default() -> Self {
        Self { tier_width: 4 }
    }
}

fn tier_of(block_count: u32) -> u32 {
    if block_count <= 1 {
        0
    } else {
        u32::BITS - 1 - block_count.leading_zeros()
    }
}

impl MergePolicy for TieredMergePolicy {
    fn find_merges(&self, segments: &[SegmentMeta]) -> Vec<usize> {
        let mut tiers: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (idx, segment) in segments.iter().enumerate() {
            tiers.entry(tier_of(segment.block_count)).or_default().push(idx);
        }

        for indices in tiers.into_values() {
            if indices.len() > self.tier_width {
                return indices;
            }
        }

        Vec::new()
    }
}
