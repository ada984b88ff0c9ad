//! Configuration loading helpers.
//!
//! Provides a wrapper around `ortho_config` that tolerates missing optional
//! fields by falling back to command-line values.

use figment::error::{Error as FigmentError, Kind as FigmentKind};
use ortho_config::{OrthoConfig, OrthoError, load_and_merge_subcommand_for};

fn missing_any(err: &FigmentError, fields: &[&str]) -> bool {
    // FigmentError yields its causes only by value; clone to inspect without ownership.
    err.clone().into_iter().any(|e| match e.kind {
        FigmentKind::MissingField(ref f) => fields.iter().any(|want| f == want),
        _ => false,
    })
}

/// Layer config file and environment values under `cli_args`.
///
/// When gathering fails only because one of `optional` is absent from every
/// source, the command-line values are used as they are.
///
/// # Errors
///
/// Returns an [`OrthoError`] if configuration gathering fails for any other
/// reason.
#[expect(
    clippy::result_large_err,
    reason = "configuration loading errors can be verbose"
)]
pub fn load_with_cli_fallback<T>(cli_args: T, optional: &[&str]) -> Result<T, OrthoError>
where
    T: OrthoConfig + serde::Serialize + Default + clap::CommandFactory + Clone,
{
    match load_and_merge_subcommand_for::<T>(&cli_args) {
        Ok(v) => Ok(v),
        Err(OrthoError::Gathering(e)) => {
            if missing_any(&e, optional) {
                Ok(cli_args)
            } else {
                Err(OrthoError::Gathering(e))
            }
        }
        Err(e) => Err(e),
    }
}
