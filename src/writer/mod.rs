// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The single writer: buffers incoming documents, and on [`IndexWriter::flush`]
//! sorts and deduplicates the buffer, writes it as one new immutable
//! segment, and runs the merge policy — all as an in-memory working
//! manifest. [`IndexWriter::commit`] is what publishes that working
//! manifest as a new, durable generation.

use crate::config::Config;
use crate::directory::Directory;
use crate::error::{Error, Result};
use crate::manifest::{self, Manifest, ReaderTracker};
use crate::merge::{PostingSource, SegmentMerger};
use crate::posting;
use crate::reader::IndexReader;
use crate::segment::data::SegmentDataWriter;
use crate::segment::index::SegmentIndexWriter;
use crate::segment::{Segment, SegmentId, SegmentMeta};
use log::{debug, info};
use std::collections::HashSet;
use std::sync::Arc;

/// The sole writer for an index directory. Not `Clone`; the manifest's
/// commit protocol assumes a single writer per directory.
pub struct IndexWriter {
    dir: Arc<dyn Directory>,
    config: Config,
    manifest: Manifest,
    generation: u32,
    tracker: ReaderTracker,
    buffer: Vec<u64>,
    /// Segments dropped by a merge during a [`flush`](Self::flush) that
    /// hasn't been committed yet. Drained into `retired` by the next
    /// [`commit`](Self::commit).
    pending_removed: HashSet<SegmentId>,
    /// Segments dropped by a merge, grouped by the last manifest generation
    /// that still names them. Their files are deleted once no open reader
    /// holds that generation.
    retired: Vec<(u32, HashSet<SegmentId>)>,
}

impl IndexWriter {
    /// Opens the writer for `dir`. If no manifest exists yet, `create`
    /// controls whether a fresh, empty one is initialized and committed as
    /// generation 0, or [`Error::NoIndex`] is returned.
    pub fn open(dir: Arc<dyn Directory>, config: Config, create: bool) -> Result<Self> {
        let generation = manifest::current_generation(&*dir)?;
        let (generation, manifest) = match generation {
            Some(generation) => (generation, manifest::load(&*dir, generation)?),
            None if create => {
                info!("initializing new index in empty directory");
                let manifest = Manifest::empty();
                manifest::commit(&*dir, 0, &manifest)?;
                (0, manifest)
            }
            None => return Err(Error::NoIndex),
        };

        // A prior writer may have crashed between writing a segment's files
        // and committing the manifest that names it; such orphans are safe
        // to remove since no committed manifest generation can reference
        // them.
        let keep: HashSet<_> = manifest.segments().iter().map(|s| s.id).collect();
        manifest::gc_segments(&*dir, &keep)?;

        Ok(Self {
            dir,
            config,
            manifest,
            generation,
            tracker: ReaderTracker::new(),
            buffer: Vec::new(),
            pending_removed: HashSet::new(),
            retired: Vec::new(),
        })
    }

    /// Buffers one document's fingerprint terms, flushing first if the
    /// buffer has already grown past the configured threshold. `terms` need
    /// not be sorted or deduplicated.
    pub fn add_document(&mut self, doc_id: u32, terms: &[u32]) -> Result<()> {
        self.buffer
            .extend(terms.iter().map(|&term| posting::pack(term, doc_id)));

        if self.buffer.len() > self.config.max_buffer_size {
            debug!(
                "write buffer reached {} postings, flushing",
                self.buffer.len()
            );
            self.flush()?;
        }

        Ok(())
    }

    /// Number of postings currently buffered.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer has grown past the configured flush threshold.
    #[must_use]
    pub fn should_flush(&self) -> bool {
        self.buffer.len() > self.config.max_buffer_size
    }

    /// The manifest generation most recently committed by this writer.
    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Opens a snapshot reader against the generation this writer most
    /// recently committed, registered against the same reference tracker
    /// this writer's GC consults — so this writer's own GC sweep never
    /// removes a segment the reader still depends on.
    pub fn open_reader(&self) -> Result<IndexReader> {
        IndexReader::open_generation(
            Arc::clone(&self.dir),
            self.generation,
            self.config.block_size,
            self.tracker.clone(),
        )
    }

    /// Sorts and deduplicates the buffered postings, writes them as one new
    /// segment, and runs the merge policy, updating the in-memory working
    /// manifest. A no-op if the buffer is empty. Does **not** persist
    /// anything to the manifest file; the new segment and any merge are
    /// invisible to a fresh reader until [`commit`](Self::commit) is called.
    pub fn flush(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        self.buffer.sort_unstable();
        self.buffer.dedup();

        let postings: Vec<Result<(u32, u32)>> = self
            .buffer
            .iter()
            .map(|&p| Ok((posting::term_of(p), posting::doc_id_of(p))))
            .collect();
        let meta = self.write_segment(postings.into_iter())?;
        self.buffer.clear();
        self.manifest.add_segment(meta);

        info!("flushed segment {} with {} blocks", meta.id, meta.block_count);

        let removed = self.maybe_merge()?;
        self.pending_removed.extend(removed);
        Ok(())
    }

    fn write_segment<I>(&mut self, postings: I) -> Result<SegmentMeta>
    where
        I: Iterator<Item = Result<(u32, u32)>>,
    {
        let id = self.manifest.next_segment_id();
        let stub = SegmentMeta {
            id,
            block_count: 0,
            last_key: 0,
        };

        let data_out = self.dir.create_file(&stub.data_file_name())?;
        let index_out = self.dir.create_file(&stub.index_file_name())?;
        let mut writer = SegmentDataWriter::new(data_out, SegmentIndexWriter::new(index_out), self.config.block_size);

        for posting in postings {
            let (key, value) = posting?;
            writer.add(key, value)?;
        }

        let (block_count, last_key) = writer.close()?;
        Ok(SegmentMeta {
            id,
            block_count,
            last_key,
        })
    }

    /// Asks the merge policy for a proposal and, if any, merges those
    /// segments into one new segment, updating the manifest in place.
    /// Returns the ids of segments the merge dropped.
    fn maybe_merge(&mut self) -> Result<Vec<SegmentId>> {
        let proposal = self.config.merge_policy.find_merges(self.manifest.segments());
        if proposal.is_empty() {
            return Ok(Vec::new());
        }

        let to_merge: Vec<SegmentMeta> = proposal.iter().map(|&i| self.manifest.segments()[i]).collect();
        debug!("merging {} segments", to_merge.len());

        let mut opened: Vec<Segment> = to_merge
            .iter()
            .map(|&meta| Segment::open(&*self.dir, meta, self.config.block_size))
            .collect::<Result<_>>()?;

        let sources: Vec<Box<dyn PostingSource + '_>> = opened
            .iter_mut()
            .map(|segment| Box::new(segment.iter()) as Box<dyn PostingSource + '_>)
            .collect();

        let id = self.manifest.next_segment_id();
        let stub = SegmentMeta {
            id,
            block_count: 0,
            last_key: 0,
        };
        let data_out = self.dir.create_file(&stub.data_file_name())?;
        let index_out = self.dir.create_file(&stub.index_file_name())?;
        let mut writer = SegmentDataWriter::new(data_out, SegmentIndexWriter::new(index_out), self.config.block_size);
        SegmentMerger::new(sources).merge_into(&mut writer)?;
        let (block_count, last_key) = writer.close()?;

        drop(opened);

        let removed: Vec<SegmentId> = to_merge.iter().map(|m| m.id).collect();
        self.manifest.remove_segments(&removed);
        self.manifest.add_segment(SegmentMeta {
            id,
            block_count,
            last_key,
        });

        info!("merged {} segments into segment {}", removed.len(), id);
        Ok(removed)
    }

    /// Flushes any buffered documents, then publishes the working manifest
    /// as a new generation, making every segment added since the last
    /// commit visible to readers opened against this writer from now on.
    /// Calling `commit` again with nothing added or flushed in between still
    /// bumps the generation, but publishes byte-identical manifest content.
    pub fn commit(&mut self) -> Result<()> {
        self.flush()?;

        let old_generation = self.generation;
        let new_generation = old_generation + 1;

        manifest::commit(&*self.dir, new_generation, &self.manifest)?;
        self.generation = new_generation;

        let removed_this_commit = std::mem::take(&mut self.pending_removed);
        if !removed_this_commit.is_empty() {
            self.retired.push((old_generation, removed_this_commit));
        }

        self.sweep()
    }

    /// Deletes the segment files of any retired generation no longer held
    /// open by a reader, then asks the directory's GC pass to remove
    /// whatever segment files aren't kept.
    fn sweep(&mut self) -> Result<()> {
        self.retired.retain(|(generation, _)| self.tracker.is_open(*generation));

        let mut keep: HashSet<SegmentId> = self.manifest.segments().iter().map(|s| s.id).collect();
        for (_, ids) in &self.retired {
            keep.extend(ids.iter().copied());
        }

        manifest::gc_segments(&*self.dir, &keep)
    }
}
