//! Validate command implementation for the thematic CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::{ARG_DOCUMENT, CliError, ENV_VALIDATE_DOCUMENT, load_selection, require_valid};

/// CLI arguments for the `validate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compile a feature selection document and print its \
                 validation report as JSON. Exits with an error when the \
                 document has any diagnostics.",
    about = "Validate a feature selection document"
)]
#[ortho_config(prefix = "THEMATIC")]
pub(crate) struct ValidateArgs {
    /// Path to the YAML feature selection.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) document: Option<Utf8PathBuf>,
}

impl ValidateArgs {
    pub(crate) fn into_config(self) -> Result<ValidateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ValidateConfig::try_from(merged)
    }
}

/// Resolved `validate` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidateConfig {
    pub(crate) document: Utf8PathBuf,
}

impl TryFrom<ValidateArgs> for ValidateConfig {
    type Error = CliError;

    fn try_from(args: ValidateArgs) -> Result<Self, Self::Error> {
        let document = args.document.ok_or(CliError::MissingArgument {
            field: ARG_DOCUMENT,
            env: ENV_VALIDATE_DOCUMENT,
        })?;
        Ok(Self { document })
    }
}

pub(crate) fn run_validate_with(
    args: ValidateArgs,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let selection = load_selection(&config.document)?;
    let payload =
        serde_json::to_string_pretty(selection.report()).map_err(CliError::SerialiseReport)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    require_valid(&selection, &config.document)
}
