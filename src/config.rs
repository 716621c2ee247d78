// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Tunables for an [`IndexWriter`](crate::writer::IndexWriter): block size,
//! how much to buffer before flushing, and the merge policy to run after
//! each flush.

use crate::merge::{MergePolicy, TieredMergePolicy};
use std::sync::Arc;

/// Configuration for opening an index. Unlike the directory it is opened
/// against, a `Config` carries no storage handle — the same config can be
/// reused across an [`FsDirectory`](crate::directory::FsDirectory) and a
/// [`RamDirectory`](crate::directory::RamDirectory) alike.
#[derive(Clone)]
pub struct Config {
    /// Size, in bytes, of each segment data block. Every segment written by
    /// this writer uses the same block size; reopening a directory with a
    /// different block size than the one its segments were written with
    /// produces garbage reads.
    pub block_size: usize,

    /// Flush the write buffer into a new segment once it holds at least
    /// this many postings.
    pub max_buffer_size: usize,

    /// Proposes which segments to merge after each flush.
    pub merge_policy: Arc<dyn MergePolicy>,
}

impl Config {
    /// A config with the given block size and the defaults for everything
    /// else.
    #[must_use]
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size,
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: 4096,
            max_buffer_size: 1_000_000,
            merge_policy: Arc::new(TieredMergePolicy::default()),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("block_size", &self.block_size)
            .field("max_buffer_size", &self.max_buffer_size)
            .finish_non_exhaustive()
    }
}
