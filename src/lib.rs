//! Merge coverage profiles written by separate processes of one test run.
//!
//! A test may fork measured helper processes, each writing its own profile
//! next to the parent's. This crate discovers those artifacts, merges their
//! per-file ranges into one consistent profile and publishes it atomically.

pub mod cli_args;
pub mod codec;
pub mod commit;
pub mod config;
pub mod discovery;
pub mod error;
pub mod merge;
pub mod profile;

pub use cli_args::{FlagsArgs, MergeArgs, SubprofilesArgs};
pub use commit::{MergeSummary, merge_files, merge_subprofiles};
pub use discovery::{SubprofileSequence, discover_subprofiles, subprofile_flags};
pub use error::{CovError, OverlapKind};
pub use merge::{ParsedProfile, ProfileSet};
pub use profile::{CountingMode, FileProfile, Position, Range};
