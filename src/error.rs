// Copyright (c) 2024-present, fprint-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::coding::EncodeError;

/// Errors that can occur while operating the index.
#[derive(Debug)]
pub enum Error {
    /// A directory/file operation failed.
    Io(std::io::Error),

    /// A block, segment index, or manifest failed a structural check.
    FormatCorruption(String),

    /// `open(create = false)` found no manifest in the directory.
    NoIndex,

    /// An internal invariant was violated (a bug, not a runtime condition).
    InvariantViolation(&'static str),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IndexError(io): {e}"),
            Self::FormatCorruption(reason) => write!(f, "IndexError(corruption): {reason}"),
            Self::NoIndex => write!(f, "IndexError: no index in directory"),
            Self::InvariantViolation(reason) => {
                write!(f, "IndexError(invariant violated): {reason}")
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<EncodeError> for Error {
    fn from(value: EncodeError) -> Self {
        match value {
            EncodeError::Io(e) => Self::Io(e),
        }
    }
}

/// Index result type.
pub type Result<T> = std::result::Result<T, Error>;
