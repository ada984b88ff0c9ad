//! Merging artifacts on disk and publishing the result atomically.
//!
//! The merged profile is written to a temporary file beside the output and
//! renamed over it, so readers of the output see either the old or the new
//! content. Any failure removes the temporary file and leaves the output as
//! it was.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::NamedTempFile;

use crate::codec::{read_profile, write_profiles};
use crate::discovery::discover_subprofiles;
use crate::error::CovError;
use crate::merge::ProfileSet;

/// What a merge consumed and produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeSummary {
    pub inputs: usize,
    pub files: usize,
    pub ranges: usize,
}

/// Fold every input, in order, into one [`ProfileSet`].
///
/// # Errors
///
/// Returns the first read, parse or merge error.
pub fn merge_inputs<P: AsRef<Path>>(inputs: &[P]) -> Result<ProfileSet, CovError> {
    let mut set = ProfileSet::new();
    for input in inputs {
        let input = input.as_ref();
        debug!("reading {}", input.display());
        set.absorb(read_profile(input)?)?;
    }
    Ok(set)
}

/// Merge `inputs` into `output`, then delete the inputs.
///
/// `output` may itself be one of the inputs. Inputs are removed on a
/// best-effort basis once the merged profile is fully written, before it is
/// renamed into place.
///
/// # Errors
///
/// Returns [`CovError`] from reading, merging, writing or renaming. In every
/// error case `output` and the inputs are left untouched.
pub fn merge_files<P: AsRef<Path>>(
    inputs: &[P],
    output: &Path,
) -> Result<MergeSummary, CovError> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let prefix = output.file_name().unwrap_or_default();
    // Dropping the handle on any early return deletes the temporary file.
    let tmp = tempfile::Builder::new()
        .prefix(prefix)
        .tempfile_in(&dir)
        .map_err(|e| CovError::io(&dir, e))?;

    let set = merge_inputs(inputs)?;
    let tmp = write_temp(&set, tmp)?;

    for input in inputs {
        let input = input.as_ref();
        if let Err(e) = std::fs::remove_file(input) {
            warn!("failed to remove {}: {e}", input.display());
        }
    }

    tmp.persist(output)
        .map_err(|e| CovError::io(output, e.error))?;

    let summary = MergeSummary {
        inputs: inputs.len(),
        files: set.files().len(),
        ranges: set.range_count(),
    };
    info!(
        "merged {} profiles into {} ({} files, {} ranges)",
        summary.inputs,
        output.display(),
        summary.files,
        summary.ranges
    );
    Ok(summary)
}

fn write_temp(set: &ProfileSet, tmp: NamedTempFile) -> Result<NamedTempFile, CovError> {
    let path = tmp.path().to_path_buf();
    let mut out = BufWriter::new(tmp);
    write_profiles(set, &mut out).map_err(|e| CovError::io(&path, e))?;
    let tmp = out
        .into_inner()
        .map_err(|e| CovError::io(&path, e.into_error()))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| CovError::io(&path, e))?;
    Ok(tmp)
}

/// Merge `base` and its numbered siblings back into `base`.
///
/// Returns `Ok(None)` without touching anything when `base` does not exist.
///
/// # Errors
///
/// Returns any error from discovery or [`merge_files`].
pub fn merge_subprofiles(base: &Path) -> Result<Option<MergeSummary>, CovError> {
    let Some(inputs) = discover_subprofiles(base)? else {
        debug!("{} does not exist; nothing to merge", base.display());
        return Ok(None);
    };
    merge_files(inputs.as_slice(), base).map(Some)
}
