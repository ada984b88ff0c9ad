//! Range merging and per-file aggregation.
//!
//! Both the accumulated ranges of a file and the ranges of each incoming
//! profile are ascending by start position. [`merge_range`] therefore takes a
//! cursor: the index just past the previous insertion. Each call only
//! searches the remaining suffix, so folding one profile into another is a
//! single forward pass with point binary searches.

use log::debug;

use crate::error::{CovError, OverlapKind};
use crate::profile::{CountingMode, FileProfile, Range};

/// Fold one incoming range into `target`, starting the search at `cursor`.
///
/// Returns the cursor for the next incoming range of the same profile.
///
/// # Errors
///
/// Returns [`CovError::ConflictingOverlap`] when the incoming range shares a
/// start with an existing range of a different size, or when inserting it
/// would overlap its neighbours.
pub fn merge_range(
    target: &mut FileProfile,
    incoming: Range,
    cursor: usize,
) -> Result<usize, CovError> {
    let cursor = cursor.min(target.ranges.len());
    let suffix = target.ranges.get(cursor..).unwrap_or_default();
    let idx = cursor + suffix.partition_point(|r| r.start < incoming.start);
    let mode = target.mode;

    let exact = target
        .ranges
        .get_mut(idx)
        .filter(|r| r.start == incoming.start);
    if let Some(existing) = exact {
        if existing.end != incoming.end {
            let existing = *existing;
            return Err(conflict(target, OverlapKind::SizeMismatch, existing, incoming));
        }
        existing.hits = mode.combine(existing.hits, incoming.hits);
        return Ok(idx + 1);
    }

    let prev = idx.checked_sub(1).and_then(|i| target.ranges.get(i)).copied();
    if let Some(prev) = prev.filter(|p| p.end > incoming.start) {
        return Err(conflict(target, OverlapKind::StartOverrun, prev, incoming));
    }
    let next = target.ranges.get(idx).copied();
    if let Some(next) = next.filter(|n| n.start < incoming.end) {
        return Err(conflict(target, OverlapKind::EndOverrun, next, incoming));
    }

    target.ranges.insert(idx, incoming);
    Ok(idx + 1)
}

fn conflict(
    target: &FileProfile,
    kind: OverlapKind,
    existing: Range,
    incoming: Range,
) -> CovError {
    CovError::ConflictingOverlap {
        kind,
        file: target.path.clone(),
        existing,
        incoming,
    }
}

/// Fold every range of `incoming` into `target`, in stored order.
///
/// # Errors
///
/// Returns [`CovError::ModeMismatch`] before touching any range when the two
/// profiles disagree on their counting mode, and otherwise the first error
/// from [`merge_range`].
pub fn merge_file_profile(
    target: &mut FileProfile,
    incoming: &FileProfile,
) -> Result<(), CovError> {
    if target.mode != incoming.mode {
        return Err(CovError::ModeMismatch {
            expected: target.mode,
            found: incoming.mode,
        });
    }
    incoming
        .ranges
        .iter()
        .try_fold(0, |cursor, range| merge_range(target, *range, cursor))
        .map(drop)
}

/// The accumulated profiles of one merge, ordered and unique by file path.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProfileSet {
    mode: Option<CountingMode>,
    files: Vec<FileProfile>,
}

impl ProfileSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The mode shared by every input folded in so far.
    #[must_use]
    pub const fn mode(&self) -> Option<CountingMode> {
        self.mode
    }

    #[must_use]
    pub fn files(&self) -> &[FileProfile] {
        &self.files
    }

    /// Total number of ranges across all files.
    #[must_use]
    pub fn range_count(&self) -> usize {
        self.files.iter().map(|f| f.ranges.len()).sum()
    }

    /// Record the run-wide mode of an input, rejecting a change of mode.
    ///
    /// # Errors
    ///
    /// Returns [`CovError::ModeMismatch`] when a different mode was already
    /// recorded.
    pub fn declare_mode(&mut self, mode: CountingMode) -> Result<(), CovError> {
        match self.mode {
            Some(expected) if expected != mode => Err(CovError::ModeMismatch {
                expected,
                found: mode,
            }),
            Some(_) => Ok(()),
            None => {
                self.mode = Some(mode);
                Ok(())
            }
        }
    }

    /// Fold one file's profile into the set.
    ///
    /// A path seen for the first time is folded into an empty entry at its
    /// place in path order, so its own ranges pass the same overlap checks as
    /// a repeated path's do.
    ///
    /// # Errors
    ///
    /// Returns the first mode or overlap conflict; the set must then be
    /// discarded.
    pub fn add(&mut self, file: FileProfile) -> Result<(), CovError> {
        self.declare_mode(file.mode)?;
        let idx = self
            .files
            .partition_point(|f| f.path.as_str() < file.path.as_str());
        match self.files.get_mut(idx).filter(|f| f.path == file.path) {
            Some(existing) => {
                debug!("merging {} ranges into {}", file.ranges.len(), file.path);
                merge_file_profile(existing, &file)
            }
            None => {
                let mut fresh = FileProfile::new(file.path.clone(), file.mode, Vec::new());
                merge_file_profile(&mut fresh, &file)?;
                self.files.insert(idx, fresh);
                Ok(())
            }
        }
    }

    /// Fold every file of one parsed input into the set.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Self::declare_mode`] or [`Self::add`].
    pub fn absorb(&mut self, parsed: ParsedProfile) -> Result<(), CovError> {
        if let Some(mode) = parsed.mode {
            self.declare_mode(mode)?;
        }
        parsed.files.into_iter().try_for_each(|file| self.add(file))
    }
}

/// The contents of one profile artifact: its declared mode and its files.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParsedProfile {
    /// `None` only for an empty artifact.
    pub mode: Option<CountingMode>,
    pub files: Vec<FileProfile>,
}
