//! Coverage profile data model.
//!
//! A profile is a per-file list of annotated source ranges. Ranges carry no
//! knowledge of the code they cover: only positions, a statement count and a
//! hit count.

use std::fmt;
use std::str::FromStr;

use crate::error::CovError;

/// How hit counts are recorded, and therefore how they combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountingMode {
    /// Boolean coverage; counts combine with logical OR.
    Set,
    /// Integer counters; counts combine by addition.
    Count,
    /// Integer counters written atomically by the producer; combine by addition.
    Atomic,
}

impl CountingMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Count => "count",
            Self::Atomic => "atomic",
        }
    }

    /// Combine two hit counts recorded under this mode.
    ///
    /// Counters saturate at `u64::MAX` rather than wrapping.
    #[must_use]
    pub const fn combine(self, existing: u64, incoming: u64) -> u64 {
        match self {
            Self::Set => existing | incoming,
            Self::Count | Self::Atomic => existing.saturating_add(incoming),
        }
    }
}

impl fmt::Display for CountingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CountingMode {
    type Err = CovError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set" => Ok(Self::Set),
            "count" => Ok(Self::Count),
            "atomic" => Ok(Self::Atomic),
            other => Err(CovError::UnsupportedMode(other.to_owned())),
        }
    }
}

/// A source position. Lines are 1-based; ordering is by line, then column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub col: u32,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.line, self.col)
    }
}

/// One contiguous span within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: Position,
    pub end: Position,
    /// Number of instrumentable statements in the span.
    pub statements: u32,
    pub hits: u64,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position, statements: u32, hits: u64) -> Self {
        Self {
            start,
            end,
            statements,
            hits,
        }
    }

    /// Whether `other` covers exactly the same span.
    #[must_use]
    pub fn same_span(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

/// Formats as `startLine.startCol,endLine.endCol statements hits`.
impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{} {} {}",
            self.start, self.end, self.statements, self.hits
        )
    }
}

/// All ranges recorded for one source file.
///
/// Ranges are kept ordered by start position and pairwise non-overlapping;
/// only [`crate::merge`] mutates them after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProfile {
    pub(crate) path: String,
    pub(crate) mode: CountingMode,
    pub(crate) ranges: Vec<Range>,
}

impl FileProfile {
    /// Build a profile, sorting `ranges` by start position.
    #[must_use]
    pub fn new(path: impl Into<String>, mode: CountingMode, mut ranges: Vec<Range>) -> Self {
        ranges.sort_by_key(|r| r.start);
        Self {
            path: path.into(),
            mode,
            ranges,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn mode(&self) -> CountingMode {
        self.mode
    }

    #[must_use]
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CountingMode::Set, 1, 1, 1)]
    #[case(CountingMode::Set, 0, 1, 1)]
    #[case(CountingMode::Set, 0, 0, 0)]
    #[case(CountingMode::Count, 3, 2, 5)]
    #[case(CountingMode::Atomic, 7, 0, 7)]
    #[case(CountingMode::Count, u64::MAX, 1, u64::MAX)]
    #[case(CountingMode::Atomic, u64::MAX - 1, 5, u64::MAX)]
    fn combine_follows_mode(
        #[case] mode: CountingMode,
        #[case] a: u64,
        #[case] b: u64,
        #[case] expected: u64,
    ) {
        assert_eq!(mode.combine(a, b), expected);
    }

    #[test]
    fn unknown_mode_is_unsupported() {
        let err = "sometimes".parse::<CountingMode>().expect_err("reject mode");
        assert!(matches!(err, CovError::UnsupportedMode(ref m) if m == "sometimes"));
    }

    #[test]
    fn positions_order_by_line_then_column() {
        assert!(Position::new(1, 9) < Position::new(2, 1));
        assert!(Position::new(2, 1) < Position::new(2, 3));
    }

    #[test]
    fn new_sorts_ranges_by_start() {
        let late = Range::new(Position::new(5, 1), Position::new(6, 1), 1, 0);
        let early = Range::new(Position::new(1, 1), Position::new(2, 1), 1, 0);
        let profile = FileProfile::new("f.go", CountingMode::Set, vec![late, early]);
        assert_eq!(profile.ranges(), &[early, late]);
    }

    #[test]
    fn range_display_matches_profile_line_shape() {
        let range = Range::new(Position::new(10, 2), Position::new(12, 14), 3, 9);
        assert_eq!(range.to_string(), "10.2,12.14 3 9");
    }
}
