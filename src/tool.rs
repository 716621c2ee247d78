// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! CLI tool for building and querying a fingerprint index directory.

use clap::{ArgAction, Parser, Subcommand};
use fprint_index::directory::FsDirectory;
use fprint_index::merge::TieredMergePolicy;
use fprint_index::reader::CountCollector;
use fprint_index::{Config, Error, IndexReader, IndexWriter};
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

macro_rules! die {
    ($fmt:literal, $($arg:tt)*) => {{
        eprintln!($fmt, $($arg)*);
        std::process::exit(1);
    }};
    ($msg:literal) => {{
        eprintln!($msg);
        std::process::exit(1);
    }};
}

/// CLI tool for building and querying a fingerprint index directory
#[derive(Parser, Debug)]
#[command(name = "fpi")]
#[command(about = "CLI tool for building and querying a fingerprint index directory")]
struct ToolArgs {
    /// Suppress all output except for errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Turn on verbose output. Supply -v multiple times to increase verbosity.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to the index directory (created automatically by `add`/`add-file`).
    index_path: PathBuf,

    /// Block size, in bytes, for newly written segments. Only takes effect
    /// when the directory is first created.
    #[arg(long, default_value_t = 4096)]
    block_size: usize,

    /// Maximum number of segments per merge tier before the writer merges
    /// the smallest offending tier.
    #[arg(long, default_value_t = 4)]
    tier_width: usize,

    #[command(subcommand)]
    command: ToolCommand,
}

#[derive(Subcommand, Debug)]
enum ToolCommand {
    /// Add one document's fingerprint terms and commit
    Add {
        /// The document id
        doc_id: u32,
        /// The fingerprint's terms
        terms: Vec<u32>,
    },
    /// Add every document described in a file (one per line: "doc_id term...")
    AddFile {
        /// Path to the input file, or "-" for stdin
        path: String,
    },
    /// Search for documents sharing terms with a query fingerprint
    Search {
        /// The query fingerprint's terms
        terms: Vec<u32>,
        /// Only print the top N ranked results
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Commit any buffered or flushed documents, publishing a new generation
    Flush,
    /// Show manifest and segment statistics
    Info,
}

fn config(args: &ToolArgs) -> Config {
    Config {
        block_size: args.block_size,
        merge_policy: Arc::new(TieredMergePolicy {
            tier_width: args.tier_width,
        }),
        ..Config::default()
    }
}

fn open_writer(args: &ToolArgs, create: bool) -> IndexWriter {
    let dir = match FsDirectory::open(&args.index_path) {
        Ok(dir) => Arc::new(dir),
        Err(e) => die!("Error opening directory: {}", e),
    };
    match IndexWriter::open(dir, config(args), create) {
        Ok(writer) => writer,
        Err(Error::NoIndex) => die!(
            "No index found at {}. Run `add` or `add-file` to create one.",
            args.index_path.display()
        ),
        Err(e) => die!("Error opening index: {}", e),
    }
}

fn open_reader(args: &ToolArgs) -> IndexReader {
    let dir = match FsDirectory::open(&args.index_path) {
        Ok(dir) => Arc::new(dir),
        Err(e) => die!("Error opening directory: {}", e),
    };
    match IndexReader::open(dir, args.block_size) {
        Ok(reader) => reader,
        Err(Error::NoIndex) => die!(
            "No index found at {}. Run `add` or `add-file` to create one.",
            args.index_path.display()
        ),
        Err(e) => die!("Error opening index: {}", e),
    }
}

fn handle_add(args: &ToolArgs, doc_id: u32, terms: &[u32]) {
    let mut writer = open_writer(args, true);
    if let Err(e) = writer.add_document(doc_id, terms) {
        die!("Error adding document: {}", e);
    }
    if let Err(e) = writer.commit() {
        die!("Error committing: {}", e);
    }
    println!("OK (added document {doc_id} with {} terms)", terms.len());
}

fn parse_line(line: &str) -> Option<(u32, Vec<u32>)> {
    let mut fields = line.split_whitespace();
    let doc_id: u32 = fields.next()?.parse().ok()?;
    let terms: Option<Vec<u32>> = fields.map(|f| f.parse().ok()).collect();
    Some((doc_id, terms?))
}

fn handle_add_file(args: &ToolArgs, path: &str) {
    let mut writer = open_writer(args, true);
    let mut count = 0usize;

    let read_lines = |lines: &mut dyn Iterator<Item = io::Result<String>>, writer: &mut IndexWriter, count: &mut usize| {
        for (lineno, line) in lines.enumerate() {
            let line = match line {
                Ok(line) => line,
                Err(e) => die!("Error reading line {}: {}", lineno + 1, e),
            };
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Some((doc_id, terms)) => {
                    if let Err(e) = writer.add_document(doc_id, &terms) {
                        die!("Error adding document: {}", e);
                    }
                    *count += 1;
                }
                None => die!("Malformed line {}: {:?}", lineno + 1, line),
            }
        }
    };

    if path == "-" {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        read_lines(&mut lines, &mut writer, &mut count);
    } else {
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) => die!("Error opening {}: {}", path, e),
        };
        let mut lines = io::BufReader::new(file).lines();
        read_lines(&mut lines, &mut writer, &mut count);
    }

    if let Err(e) = writer.commit() {
        die!("Error committing: {}", e);
    }
    println!("OK (added {count} documents)");
}

fn handle_search(args: &ToolArgs, terms: &[u32], limit: usize) {
    let mut reader = open_reader(args);
    let mut collector = CountCollector::new();
    if let Err(e) = reader.search(terms, &mut collector) {
        die!("Error searching: {}", e);
    }

    let ranked = collector.ranked();
    for (doc_id, count) in ranked.iter().take(limit) {
        println!("{doc_id}\t{count}");
    }
    println!("({} matching documents)", ranked.len());
}

fn handle_flush(args: &ToolArgs) {
    let mut writer = open_writer(args, false);
    match writer.commit() {
        Ok(()) => println!("OK (committed, generation {})", writer.generation()),
        Err(e) => die!("Error committing: {}", e),
    }
}

fn handle_info(args: &ToolArgs) {
    let reader = open_reader(args);
    println!("Path: {}", args.index_path.display());
    println!("Generation: {}", reader.generation());
    println!("Segments: {}", reader.segment_count());
}

fn main() {
    let args = ToolArgs::parse();

    let level = if args.quiet {
        log::LevelFilter::Error
    } else {
        match args.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new().filter_level(level).init();

    match &args.command {
        ToolCommand::Add { doc_id, terms } => handle_add(&args, *doc_id, terms),
        ToolCommand::AddFile { path } => handle_add_file(&args, path),
        ToolCommand::Search { terms, limit } => handle_search(&args, terms, *limit),
        ToolCommand::Flush => handle_flush(&args),
        ToolCommand::Info => handle_info(&args),
    }
}
