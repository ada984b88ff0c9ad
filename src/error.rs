//! Error types shared by the codec, the merger and the commit step.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::profile::{CountingMode, Range};

/// Which boundary check rejected an incoming range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapKind {
    /// Same start position, different end position.
    SizeMismatch,
    /// The preceding range ends after the incoming range starts.
    StartOverrun,
    /// The incoming range ends after the following range starts.
    EndOverrun,
}

impl fmt::Display for OverlapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SizeMismatch => "conflicting merge overlap",
            Self::StartOverrun => "conflicting start of merge overlap",
            Self::EndOverrun => "conflicting end of merge overlap",
        })
    }
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CovError {
    #[error("cannot merge profiles with different modes: {expected} != {found}")]
    ModeMismatch {
        expected: CountingMode,
        found: CountingMode,
    },
    #[error("unsupported covermode: {0}")]
    UnsupportedMode(String),
    #[error("{kind}: {file} {existing} {incoming}")]
    ConflictingOverlap {
        kind: OverlapKind,
        file: String,
        existing: Range,
        incoming: Range,
    },
    #[error("inconsistent statement count in {file} at {range}: changed from {previous} to {}", .range.statements)]
    InconsistentStatements {
        file: String,
        range: Range,
        previous: u32,
    },
    #[error("{}:{line}: {reason}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no input profiles given")]
    NoInputs,
    #[error("configuration error: {0}")]
    Config(#[from] ortho_config::OrthoError),
}

impl CovError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The overlap kind when this error is a range conflict.
    #[must_use]
    pub fn overlap_kind(&self) -> Option<OverlapKind> {
        match self {
            Self::ConflictingOverlap { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
