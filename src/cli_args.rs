//! Command-line argument structures.
//!
//! Isolates clap derivations so lint expectations remain scoped, keeping
//! `main.rs` focused on runtime logic. Each sub-command also derives
//! `OrthoConfig`, so values may come from a config file or `COVMERGE`
//! environment variables as well as the command line.

use std::path::PathBuf;

use clap::Parser;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

/// Parameters accepted by the `merge` sub-command.
#[derive(Parser, Deserialize, Serialize, Default, Debug, OrthoConfig, Clone)]
#[command(name = "merge")]
#[ortho_config(prefix = "COVMERGE")]
pub struct MergeArgs {
    /// Where to write the merged profile; defaults to the first input
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Profiles to merge, in order. They are deleted after a successful merge
    #[arg(value_name = "INPUT", required = true, num_args = 1..)]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<PathBuf>,
}

impl MergeArgs {
    /// The explicit output, or the first input when none was given.
    #[must_use]
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output.clone().or_else(|| self.inputs.first().cloned())
    }
}

/// Parameters accepted by the `subprofiles` sub-command.
#[derive(Parser, Deserialize, Serialize, Default, Debug, OrthoConfig, Clone)]
#[command(name = "subprofiles")]
#[ortho_config(prefix = "COVMERGE")]
pub struct SubprofilesArgs {
    /// Base profile whose numbered siblings (`PROFILE.1`, `PROFILE.2`, ...)
    /// are merged back into it
    #[arg(value_name = "PROFILE")]
    pub profile: Option<PathBuf>,
    /// Arguments of the test process; the profile is taken from
    /// `-test.coverprofile=` when PROFILE is omitted
    #[arg(last = true, value_name = "TEST_ARGS")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_args: Vec<String>,
}

/// Parameters accepted by the `flags` sub-command.
#[derive(Parser, Deserialize, Serialize, Default, Debug, OrthoConfig, Clone)]
#[command(name = "flags")]
#[ortho_config(prefix = "COVMERGE")]
pub struct FlagsArgs {
    /// Number of subprofile suffixes already handed out
    #[arg(long, value_name = "N")]
    pub issued: Option<u32>,
    /// How many subprocesses to derive flags for, one line each
    #[arg(long, value_name = "COUNT")]
    pub count: Option<u32>,
    /// Arguments of the parent test process
    #[arg(last = true, value_name = "TEST_ARGS")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub test_args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[rstest]
    #[case::explicit(&["merge", "-o", "all.out", "a.out", "b.out"], "all.out")]
    #[case::first_input(&["merge", "a.out", "b.out"], "a.out")]
    fn merge_output_defaults_to_first_input(#[case] argv: &[&str], #[case] expected: &str) {
        let args = MergeArgs::try_parse_from(argv).expect("parse merge args");
        assert_eq!(args.output_path(), Some(PathBuf::from(expected)));
        assert_eq!(args.inputs.len(), 2);
    }

    #[test]
    fn merge_requires_inputs() {
        assert!(MergeArgs::try_parse_from(["merge", "-o", "all.out"]).is_err());
    }

    #[test]
    fn subprofiles_collects_trailing_test_args() {
        let args = SubprofilesArgs::try_parse_from([
            "subprofiles",
            "--",
            "-test.v",
            "-test.coverprofile=cover.out",
        ])
        .expect("parse subprofiles args");
        assert_eq!(args.profile, None);
        assert_eq!(args.test_args, vec!["-test.v", "-test.coverprofile=cover.out"]);
    }

    #[test]
    fn commands_are_well_formed() {
        MergeArgs::command().debug_assert();
        SubprofilesArgs::command().debug_assert();
        FlagsArgs::command().debug_assert();
    }
}
