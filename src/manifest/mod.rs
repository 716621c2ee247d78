// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The index info (manifest): the ordered list of live segments and the
//! monotone segment id counter, plus its atomic commit protocol.
//!
//! On disk, generation `G` is the file `info_<G>`:
//!
//! ```text
//! last_segment_id: u32 LE
//! segment_count:   u32 LE
//! [ id: u32 LE, block_count: u32 LE, last_key: u32 LE ] * segment_count
//! ```

mod tracker;

pub use tracker::ReaderTracker;

use crate::coding::{Decode, Encode, EncodeError};
use crate::directory::Directory;
use crate::error::{Error, Result};
use crate::segment::{SegmentId, SegmentMeta};
use byteorder::{ByteOrder, LittleEndian};
use log::{error, warn};
use std::io::{Read, Write};

const MANIFEST_PREFIX: &str = "info_";

/// The ordered list of live segments and the last assigned segment id.
///
/// Segments need not be disjoint in key space; the same term may legally
/// appear in more than one segment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Manifest {
    last_segment_id: SegmentId,
    segments: Vec<SegmentMeta>,
}

impl Manifest {
    /// An empty manifest with no segments and no assigned ids.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The live segments, in manifest order.
    #[must_use]
    pub fn segments(&self) -> &[SegmentMeta] {
        &self.segments
    }

    /// The last assigned segment id.
    #[must_use]
    pub fn last_segment_id(&self) -> SegmentId {
        self.last_segment_id
    }

    /// Allocates and returns the next segment id, advancing the counter.
    pub fn next_segment_id(&mut self) -> SegmentId {
        self.last_segment_id += 1;
        self.last_segment_id
    }

    /// Appends a newly created segment.
    pub fn add_segment(&mut self, meta: SegmentMeta) {
        self.segments.push(meta);
    }

    /// Removes the segments with the given ids (used after a merge replaces
    /// them with one new segment).
    pub fn remove_segments(&mut self, ids: &[SegmentId]) {
        self.segments.retain(|s| !ids.contains(&s.id));
    }
}

impl Encode for Manifest {
    fn encode_into<W: Write>(&self, writer: &mut W) -> std::result::Result<(), EncodeError> {
        let mut header = [0u8; 8];
        LittleEndian::write_u32(&mut header[0..4], self.last_segment_id);
        LittleEndian::write_u32(&mut header[4..8], self.segments.len() as u32);
        writer.write_all(&header)?;

        for segment in &self.segments {
            let mut buf = [0u8; 12];
            LittleEndian::write_u32(&mut buf[0..4], segment.id);
            LittleEndian::write_u32(&mut buf[4..8], segment.block_count);
            LittleEndian::write_u32(&mut buf[8..12], segment.last_key);
            writer.write_all(&buf)?;
        }

        Ok(())
    }
}

impl Decode for Manifest {
    fn decode_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header = [0u8; 8];
        reader.read_exact(&mut header)?;
        let last_segment_id = LittleEndian::read_u32(&header[0..4]);
        let segment_count = LittleEndian::read_u32(&header[4..8]) as usize;

        let mut segments = Vec::with_capacity(segment_count);
        for _ in 0..segment_count {
            let mut buf = [0u8; 12];
            reader.read_exact(&mut buf).map_err(|_| {
                error!("manifest truncated before listed segment count");
                Error::FormatCorruption("manifest truncated before listed segment count".into())
            })?;
            segments.push(SegmentMeta {
                id: LittleEndian::read_u32(&buf[0..4]),
                block_count: LittleEndian::read_u32(&buf[4..8]),
                last_key: LittleEndian::read_u32(&buf[8..12]),
            });
        }

        Ok(Self {
            last_segment_id,
            segments,
        })
    }
}

fn manifest_file_name(generation: u32) -> String {
    format!("{MANIFEST_PREFIX}{generation}")
}

fn parse_generation(name: &str) -> Option<u32> {
    name.strip_prefix(MANIFEST_PREFIX)?.parse().ok()
}

/// Finds the highest manifest generation published in `dir`, if any.
pub fn current_generation(dir: &dyn Directory) -> Result<Option<u32>> {
    Ok(dir
        .list_files()?
        .iter()
        .filter_map(|name| parse_generation(name))
        .max())
}

/// Loads the manifest at the given generation.
pub fn load(dir: &dyn Directory, generation: u32) -> Result<Manifest> {
    let mut input = dir.open_file(&manifest_file_name(generation))?;
    let len = input.len()?;
    let mut buf = vec![0u8; len as usize];
    input.read_at(&mut buf, 0)?;
    Manifest::decode_from(&mut buf.as_slice())
}

/// Publishes `manifest` as a new generation, then deletes every older
/// manifest file (the in-memory manifest content already fully describes
/// the index, so once the new generation is durable, old manifest files
/// carry no information a reader still needs — unlike segment files, which
/// readers may still have open).
pub fn commit(dir: &dyn Directory, generation: u32, manifest: &Manifest) -> Result<()> {
    let mut output = dir.create_file(&manifest_file_name(generation))?;
    output.write_all(&manifest.encode_into_vec())?;
    output.close()?;

    for name in dir.list_files()? {
        if let Some(existing_generation) = parse_generation(&name) {
            if existing_generation != generation {
                dir.delete_file(&name)?;
            }
        }
    }

    Ok(())
}

/// Deletes segment files that are not referenced by `keep` — used by the
/// writer after a commit to reclaim segments dropped by a merge, and on
/// `open()` to sweep orphans left behind by a flush that was never
/// committed.
pub fn gc_segments(dir: &dyn Directory, keep: &std::collections::HashSet<SegmentId>) -> Result<()> {
    for name in dir.list_files()? {
        let Some(id) = parse_segment_id_from_file_name(&name) else {
            continue;
        };
        if !keep.contains(&id) {
            warn!("gc: deleting unreferenced segment file {name}");
            dir.delete_file(&name)?;
        }
    }
    Ok(())
}

fn parse_segment_id_from_file_name(name: &str) -> Option<SegmentId> {
    let rest = name.strip_prefix("segment_")?;
    let id_str = rest
        .strip_suffix(&format!(".{}", crate::segment::meta::INDEX_FILE_EXT))
        .or_else(|| rest.strip_suffix(&format!(".{}", crate::segment::meta::DATA_FILE_EXT)))?;
    id_str.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{Directory, RamDirectory};

    fn meta(id: u32) -> SegmentMeta {
        SegmentMeta {
            id,
            block_count: 1,
            last_key: id * 10,
        }
    }

    #[test]
    fn encode_decode_roundtrip() -> Result<()> {
        let mut manifest = Manifest::empty();
        manifest.next_segment_id();
        manifest.add_segment(meta(1));
        manifest.add_segment(meta(2));

        let bytes = manifest.encode_into_vec();
        let decoded = Manifest::decode_from(&mut bytes.as_slice())?;
        assert_eq!(manifest, decoded);
        Ok(())
    }

    #[test]
    fn commit_replaces_old_generations() -> Result<()> {
        let dir = RamDirectory::new();
        commit(&dir, 1, &Manifest::empty())?;
        assert_eq!(current_generation(&dir)?, Some(1));

        let mut m = Manifest::empty();
        m.add_segment(meta(1));
        commit(&dir, 2, &m)?;

        assert_eq!(current_generation(&dir)?, Some(2));
        assert!(!dir.exists("info_1")?);
        assert!(dir.exists("info_2")?);
        Ok(())
    }

    #[test]
    fn gc_removes_unreferenced_segment_files() -> Result<()> {
        let dir = RamDirectory::new();
        for id in [1, 2, 3] {
            let m = meta(id);
            dir.create_file(&m.data_file_name())?.close()?;
            dir.create_file(&m.index_file_name())?.close()?;
        }

        let keep: std::collections::HashSet<_> = [1u32, 3].into_iter().collect();
        gc_segments(&dir, &keep)?;

        assert!(dir.exists(&meta(1).data_file_name())?);
        assert!(!dir.exists(&meta(2).data_file_name())?);
        assert!(!dir.exists(&meta(2).index_file_name())?);
        assert!(dir.exists(&meta(3).index_file_name())?);
        Ok(())
    }
}
