// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Segment identity, file naming, and the small metadata record persisted
//! for each segment in the manifest.

/// A monotonically assigned, never-reused segment id.
pub type SegmentId = u32;

/// File extension for a segment's index file.
pub const INDEX_FILE_EXT: &str = "fii";

/// File extension for a segment's data file.
pub const DATA_FILE_EXT: &str = "fid";

/// The deterministic index-file name for segment `id`.
#[must_use]
pub fn index_file_name(id: SegmentId) -> String {
    format!("segment_{id}.{INDEX_FILE_EXT}")
}

/// The deterministic data-file name for segment `id`.
#[must_use]
pub fn data_file_name(id: SegmentId) -> String {
    format!("segment_{id}.{DATA_FILE_EXT}")
}

/// Metadata describing one immutable segment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SegmentMeta {
    /// This segment's id.
    pub id: SegmentId,

    /// Number of blocks in the segment's data file.
    pub block_count: u32,

    /// The largest key present in the segment (the last key of its last
    /// block).
    pub last_key: u32,
}

impl SegmentMeta {
    /// This segment's index file name.
    #[must_use]
    pub fn index_file_name(&self) -> String {
        index_file_name(self.id)
    }

    /// This segment's data file name.
    #[must_use]
    pub fn data_file_name(&self) -> String {
        data_file_name(self.id)
    }
}
