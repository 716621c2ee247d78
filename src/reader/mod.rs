// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The snapshot reader: loads a manifest generation once, opens
//! every live segment's skip index, and fans a query fingerprint across all
//! of them, collector-side deduplication aside.

mod collector;

pub use collector::{CountCollector, VecCollector};

use crate::directory::Directory;
use crate::error::{Error, Result};
use crate::manifest::{self, Manifest, ReaderTracker};
use crate::segment::Segment;
use std::sync::Arc;

/// Sink for matching doc ids during a search. The same doc id may be
/// collected more than once per query (once per matching term); counting or
/// deduplicating is the collector's job.
pub trait Collector {
    /// Receives one matching doc id.
    fn collect(&mut self, doc_id: u32);
}

/// A point-in-time view of the index: the manifest generation it was opened
/// against, and every segment that generation names, each holding a shared
/// reference that keeps its files alive even if a concurrent writer commits
/// and garbage-collects a newer generation.
pub struct IndexReader {
    dir: Arc<dyn Directory>,
    generation: u32,
    manifest: Manifest,
    segments: Vec<Segment>,
    tracker: ReaderTracker,
}

impl IndexReader {
    /// Opens a fresh snapshot of the latest committed generation in `dir`.
    ///
    /// This reader is not protected against a writer's GC sweep in another
    /// `IndexWriter` instance in the same process; use
    /// [`crate::writer::IndexWriter::open_reader`] when a writer and reader
    /// coexist so the writer's GC observes this reader's reference.
    pub fn open(dir: Arc<dyn Directory>, block_size: usize) -> Result<Self> {
        let generation = manifest::current_generation(&*dir)?.ok_or(Error::NoIndex)?;
        Self::open_generation(dir, generation, block_size, ReaderTracker::new())
    }

    pub(crate) fn open_generation(
        dir: Arc<dyn Directory>,
        generation: u32,
        block_size: usize,
        tracker: ReaderTracker,
    ) -> Result<Self> {
        let manifest = manifest::load(&*dir, generation)?;
        tracker.register(generation);

        let mut segments = Vec::with_capacity(manifest.segments().len());
        for meta in manifest.segments() {
            segments.push(Segment::open(&*dir, *meta, block_size)?);
        }

        Ok(Self {
            dir,
            generation,
            manifest,
            segments,
            tracker,
        })
    }

    /// The manifest generation this snapshot was opened against.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Number of live segments in this snapshot.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Searches every live segment for the terms in `fingerprint`,
    /// forwarding matches to `collector`. `fingerprint` need not be
    /// pre-sorted or deduplicated; this is done once here before fanning
    /// out to segments, which require it.
    pub fn search(&mut self, fingerprint: &[u32], collector: &mut dyn Collector) -> Result<()> {
        let mut query = fingerprint.to_vec();
        query.sort_unstable();
        query.dedup();

        for segment in &mut self.segments {
            segment.search(&query, collector)?;
        }

        Ok(())
    }
}

impl Drop for IndexReader {
    fn drop(&mut self) {
        self.tracker.release(self.generation);
    }
}

impl std::fmt::Debug for IndexReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexReader")
            .field("generation", &self.generation)
            .field("segment_count", &self.segments.len())
            .finish()
    }
}
