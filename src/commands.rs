//! Command execution helpers for `covmerge`.
//!
//! This module owns the runtime flow for each subcommand: resolving the
//! profile paths, running the merge and rendering output to the terminal.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use covmerge::cli_args::{FlagsArgs, MergeArgs, SubprofilesArgs};
use covmerge::discovery::coverprofile_from_args;
use covmerge::{CovError, SubprofileSequence, merge_files, merge_subprofiles, subprofile_flags};
use log::info;

pub fn run_merge(args: &MergeArgs) -> Result<(), CovError> {
    let output = args.output_path().ok_or(CovError::NoInputs)?;
    if args.inputs.is_empty() {
        return Err(CovError::NoInputs);
    }
    merge_files(args.inputs.as_slice(), &output).map(drop)
}

/// Resolve the base profile from the argument or the test process arguments.
fn subprofile_base(args: &SubprofilesArgs) -> Option<PathBuf> {
    args.profile
        .clone()
        .or_else(|| coverprofile_from_args(args.test_args.as_slice()))
}

pub fn run_subprofiles(args: &SubprofilesArgs) -> Result<(), CovError> {
    let Some(base) = subprofile_base(args) else {
        info!("no coverage profile requested; nothing to merge");
        return Ok(());
    };
    if merge_subprofiles(&base)?.is_none() {
        info!("{} not found; nothing to merge", base.display());
    }
    Ok(())
}

fn is_broken_pipe_io(err: &std::io::Error) -> bool {
    err.kind() == ErrorKind::BrokenPipe
}

/// Print the derived flags for `count` subprocesses, one line each.
pub fn run_flags(args: &FlagsArgs) -> anyhow::Result<()> {
    let sequence = SubprofileSequence::starting_after(args.issued.unwrap_or(0));
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    for _ in 0..args.count.unwrap_or(1) {
        let flags = subprofile_flags(args.test_args.as_slice(), &sequence, Vec::new());
        if let Err(e) = writeln!(handle, "{}", flags.join(" ")) {
            if is_broken_pipe_io(&e) {
                return Ok(());
            }
            return Err(e.into());
        }
    }
    Ok(())
}
