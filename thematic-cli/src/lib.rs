//! Command-line interface for compiling thematic feature selections.
#![forbid(unsafe_code)]

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use log::debug;
use thematic_core::FeatureSelection;

mod compile;
mod error;
mod keys;
mod validate;

pub use error::CliError;

use compile::{CompileArgs, run_compile_with};
use keys::{KeysArgs, run_keys_with};
use validate::{ValidateArgs, run_validate_with};

pub(crate) const ARG_DOCUMENT: &str = "document";
pub(crate) const ARG_GEOMETRY: &str = "geometry";
pub(crate) const ARG_OUTPUT_DIR: &str = "output-dir";
pub(crate) const ENV_VALIDATE_DOCUMENT: &str = "THEMATIC_CMDS_VALIDATE_DOCUMENT";
pub(crate) const ENV_KEYS_DOCUMENT: &str = "THEMATIC_CMDS_KEYS_DOCUMENT";
pub(crate) const ENV_COMPILE_DOCUMENT: &str = "THEMATIC_CMDS_COMPILE_DOCUMENT";

/// Run the thematic CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn std::io::Write) -> Result<(), CliError> {
    match command {
        Command::Validate(args) => run_validate_with(args, writer),
        Command::Keys(args) => run_keys_with(args, writer),
        Command::Compile(args) => run_compile_with(args, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "thematic",
    about = "Compile OpenStreetMap feature selections into thematic exports",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a feature selection and print its validation report.
    Validate(ValidateArgs),
    /// Print the OSM keys a feature selection needs from the source data.
    Keys(KeysArgs),
    /// Write the SQL scripts and readmes for a feature selection.
    Compile(CompileArgs),
}

/// Ensure `path` names an existing regular file.
pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match thematic_fs::file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Read and compile the feature selection stored at `path`.
pub(crate) fn load_selection(path: &Utf8Path) -> Result<FeatureSelection, CliError> {
    require_existing(path, ARG_DOCUMENT)?;
    let raw = thematic_fs::read_utf8_file(path).map_err(|source| CliError::ReadDocument {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Loaded feature selection from {path} ({} bytes)", raw.len());
    Ok(FeatureSelection::new(raw))
}

/// Fail with [`CliError::InvalidDocument`] unless `selection` is valid.
pub(crate) fn require_valid(selection: &FeatureSelection, path: &Utf8Path) -> Result<(), CliError> {
    if selection.is_valid() {
        Ok(())
    } else {
        Err(CliError::InvalidDocument {
            path: path.to_path_buf(),
            errors: selection.errors(),
        })
    }
}

#[cfg(test)]
mod tests;
