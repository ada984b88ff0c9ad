use clap::{Parser, Subcommand};
use covmerge::cli_args::{FlagsArgs, MergeArgs, SubprofilesArgs};
use covmerge::config::load_with_cli_fallback;
use covmerge::CovError;
use env_logger::Env;

mod commands;

#[derive(Parser)]
#[command(
    name = "covmerge",
    version,
    about = "Merge coverage profiles written by forked test subprocesses"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge profiles into one and delete the inputs
    Merge(MergeArgs),
    /// Merge PROFILE.1, PROFILE.2, ... back into PROFILE
    Subprofiles(SubprofilesArgs),
    /// Print the coverage flags for a spawned test subprocess
    Flags(FlagsArgs),
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    match Cli::parse().command {
        Commands::Merge(args) => {
            let args =
                load_with_cli_fallback(args, &["inputs", "output"]).map_err(CovError::from)?;
            commands::run_merge(&args)?;
        }
        Commands::Subprofiles(args) => {
            let args = load_with_cli_fallback(args, &["profile", "test_args"])
                .map_err(CovError::from)?;
            commands::run_subprofiles(&args)?;
        }
        Commands::Flags(args) => {
            let args = load_with_cli_fallback(args, &["issued", "count", "test_args"])
                .map_err(CovError::from)?;
            commands::run_flags(&args)?;
        }
    }
    Ok(())
}
