//! Numbered sibling artifacts.
//!
//! A run that writes its profile to `P` lets each measured subprocess write
//! to `P.1`, `P.2`, and so on. Discovery walks those suffixes densely from 1
//! and stops at the first gap. [`SubprofileSequence`] hands out the suffixes
//! so concurrently spawned subprocesses never share one.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use log::debug;

use crate::error::CovError;

/// Flag naming the profile the instrumented process writes.
pub const COVERPROFILE_FLAG: &str = "-test.coverprofile=";
/// Flag selecting the counting mode.
pub const COVERMODE_FLAG: &str = "-test.covermode=";
/// Flag selecting the instrumented packages.
pub const COVERPKG_FLAG: &str = "-test.coverpkg=";
/// End-of-options marker; nothing after it is inspected.
pub const END_OF_OPTIONS: &str = "--";

/// `base` with `.n` appended to its final component.
#[must_use]
pub fn sibling_path(base: &Path, n: u32) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!(".{n}"));
    PathBuf::from(name)
}

/// List `base` followed by its dense run of numbered siblings.
///
/// Returns `Ok(None)` when `base` itself does not exist.
///
/// # Errors
///
/// Returns [`CovError::Io`] when probing a path fails for a reason other
/// than the path not existing.
pub fn discover_subprofiles(base: &Path) -> Result<Option<Vec<PathBuf>>, CovError> {
    if !exists(base)? {
        return Ok(None);
    }
    let mut found = vec![base.to_path_buf()];
    for n in 1.. {
        let sibling = sibling_path(base, n);
        if !exists(&sibling)? {
            break;
        }
        debug!("found subprofile {}", sibling.display());
        found.push(sibling);
    }
    Ok(Some(found))
}

fn exists(path: &Path) -> Result<bool, CovError> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CovError::io(path, e)),
    }
}

/// Thread-safe source of subprofile suffixes. The first value is 1.
#[derive(Debug, Default)]
pub struct SubprofileSequence {
    issued: AtomicU32,
}

impl SubprofileSequence {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: AtomicU32::new(0),
        }
    }

    /// Continue after `issued` suffixes already handed out elsewhere.
    #[must_use]
    pub const fn starting_after(issued: u32) -> Self {
        Self {
            issued: AtomicU32::new(issued),
        }
    }

    /// Claim the next unused suffix.
    pub fn next_suffix(&self) -> u32 {
        self.issued.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }
}

/// Arguments before the end-of-options marker.
fn options<S: AsRef<str>>(args: &[S]) -> impl Iterator<Item = &str> {
    args.iter()
        .map(|arg| arg.as_ref())
        .take_while(|arg| *arg != END_OF_OPTIONS)
}

/// Base name of the profile named by the first `-test.coverprofile=` flag.
///
/// The test binary runs in its package directory, so only the final path
/// component is kept.
#[must_use]
pub fn coverprofile_from_args<S: AsRef<str>>(args: &[S]) -> Option<PathBuf> {
    options(args)
        .find_map(|arg| arg.strip_prefix(COVERPROFILE_FLAG))
        .and_then(|value| Path::new(value).file_name())
        .map(PathBuf::from)
}

/// Append the coverage flags a measured subprocess must receive.
///
/// A profile flag in `parent_args` yields a profile flag naming the next
/// numbered sibling; mode and package flags are forwarded verbatim. With no
/// coverage flags present, `flags` is returned unchanged.
#[must_use]
pub fn subprofile_flags<S: AsRef<str>>(
    parent_args: &[S],
    sequence: &SubprofileSequence,
    mut flags: Vec<String>,
) -> Vec<String> {
    for arg in options(parent_args) {
        if let Some(value) = arg.strip_prefix(COVERPROFILE_FLAG) {
            let base = Path::new(value)
                .file_name()
                .map_or_else(|| PathBuf::from(value), PathBuf::from);
            let sibling = sibling_path(&base, sequence.next_suffix());
            flags.push(format!("{COVERPROFILE_FLAG}{}", sibling.display()));
        }
        if arg.starts_with(COVERMODE_FLAG) || arg.starts_with(COVERPKG_FLAG) {
            flags.push(arg.to_owned());
        }
    }
    flags
}
