//! Textual profile format.
//!
//! ```text
//! mode: <set|count|atomic>
//! <path>:<startLine>.<startCol>,<endLine>.<endCol> <statements> <hits>
//! ```
//!
//! Parsing groups lines by path, sorts each file's ranges by start position
//! and coalesces repeated identical ranges. Writing emits the header followed
//! by every range in set order; it performs no merging.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::CovError;
use crate::merge::{ParsedProfile, ProfileSet};
use crate::profile::{CountingMode, FileProfile, Position, Range};

const MODE_PREFIX: &str = "mode: ";

// The path is greedy so a path containing ':' binds to the last separator.
static LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<path>.+):(?P<sl>\d+)\.(?P<sc>\d+),(?P<el>\d+)\.(?P<ec>\d+) (?P<stmts>\d+) (?P<hits>\d+)$")
        .expect("valid regex")
});

/// Read and parse the profile stored at `path`.
///
/// # Errors
///
/// Returns [`CovError::Io`] when the file cannot be read, and any error from
/// [`parse_profiles`].
pub fn read_profile(path: &Path) -> Result<ParsedProfile, CovError> {
    let file = File::open(path).map_err(|e| CovError::io(path, e))?;
    parse_profiles(BufReader::new(file), path)
}

/// Parse profile text. `origin` is only used to label errors.
///
/// # Errors
///
/// Returns [`CovError::Parse`] for a missing header or a malformed line,
/// [`CovError::UnsupportedMode`] for an unknown mode word, and
/// [`CovError::InconsistentStatements`] when one input repeats a range with
/// a different statement count.
pub fn parse_profiles<R: BufRead>(reader: R, origin: &Path) -> Result<ParsedProfile, CovError> {
    let parse_err = |line: usize, reason: String| CovError::Parse {
        path: origin.to_path_buf(),
        line,
        reason,
    };

    let mut lines = reader.lines().enumerate();
    let mode = match lines.next() {
        None => return Ok(ParsedProfile::default()),
        Some((_, header)) => {
            let header = header.map_err(|e| CovError::io(origin, e))?;
            match header.strip_prefix(MODE_PREFIX) {
                Some(word) if !word.is_empty() => word.parse::<CountingMode>()?,
                _ => return Err(parse_err(1, format!("bad mode line: {header}"))),
            }
        }
    };

    let mut by_path: BTreeMap<String, Vec<Range>> = BTreeMap::new();
    for (idx, line) in lines {
        let line = line.map_err(|e| CovError::io(origin, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let (path, range) = parse_line(&line).ok_or_else(|| {
            parse_err(
                idx + 1,
                format!("line {line:?} doesn't match expected format"),
            )
        })?;
        by_path.entry(path).or_default().push(range);
    }

    let files = by_path
        .into_iter()
        .map(|(path, ranges)| coalesce(FileProfile::new(path, mode, ranges)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ParsedProfile {
        mode: Some(mode),
        files,
    })
}

fn parse_line(line: &str) -> Option<(String, Range)> {
    let caps = LINE_RE.captures(line)?;
    let num = |name: &str| caps.name(name)?.as_str().parse::<u32>().ok();
    let range = Range::new(
        Position::new(num("sl")?, num("sc")?),
        Position::new(num("el")?, num("ec")?),
        num("stmts")?,
        caps.name("hits")?.as_str().parse().ok()?,
    );
    Some((caps.name("path")?.as_str().to_owned(), range))
}

/// Combine repeated identical ranges produced within one input.
fn coalesce(mut profile: FileProfile) -> Result<FileProfile, CovError> {
    let mode = profile.mode;
    let ranges = std::mem::take(&mut profile.ranges);
    let mut out: Vec<Range> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match out.last_mut() {
            Some(last) if last.same_span(&range) => {
                if last.statements != range.statements {
                    return Err(CovError::InconsistentStatements {
                        file: profile.path,
                        range,
                        previous: last.statements,
                    });
                }
                last.hits = mode.combine(last.hits, range.hits);
            }
            _ => out.push(range),
        }
    }
    profile.ranges = out;
    Ok(profile)
}

/// Serialize `set`: one header line, then one line per range.
///
/// Nothing is written for a set that never saw a mode.
///
/// # Errors
///
/// Returns the first I/O error from `out`.
pub fn write_profiles<W: Write>(set: &ProfileSet, mut out: W) -> std::io::Result<()> {
    let Some(mode) = set.mode() else {
        return Ok(());
    };
    writeln!(out, "{MODE_PREFIX}{mode}")?;
    for file in set.files() {
        for range in file.ranges() {
            writeln!(out, "{}:{range}", file.path())?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests;
