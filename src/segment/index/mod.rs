// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! The segment index (skip index) is the array of first keys of each block
//! in a segment, kept fully in memory. On disk it is:
//!
//! ```text
//! block_count: u32 LE
//! first_key[0..block_count]: u32 LE each
//! ```

mod reader;
mod writer;

pub use reader::SegmentIndexReader;
pub use writer::SegmentIndexWriter;
