//! Keys command implementation for the thematic CLI.

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use thematic_core::GeometryType;

use crate::{ARG_DOCUMENT, ARG_GEOMETRY, CliError, ENV_KEYS_DOCUMENT, load_selection, require_valid};

/// CLI arguments for the `keys` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Print every OSM key the themes of a feature selection \
                 read from the source data, one per line. Keys referenced \
                 only by filters are included.",
    about = "List the OSM keys a feature selection needs"
)]
#[ortho_config(prefix = "THEMATIC")]
pub(crate) struct KeysArgs {
    /// Path to the YAML feature selection.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) document: Option<Utf8PathBuf>,
    /// Restrict the union to themes exported as this geometry type.
    #[arg(long = ARG_GEOMETRY, value_name = "points|lines|polygons")]
    #[serde(default)]
    pub(crate) geometry: Option<String>,
}

impl KeysArgs {
    pub(crate) fn into_config(self) -> Result<KeysConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        KeysConfig::try_from(merged)
    }
}

/// Resolved `keys` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeysConfig {
    pub(crate) document: Utf8PathBuf,
    pub(crate) geometry: Option<GeometryType>,
}

impl TryFrom<KeysArgs> for KeysConfig {
    type Error = CliError;

    fn try_from(args: KeysArgs) -> Result<Self, Self::Error> {
        let document = args.document.ok_or(CliError::MissingArgument {
            field: ARG_DOCUMENT,
            env: ENV_KEYS_DOCUMENT,
        })?;
        let geometry = args
            .geometry
            .map(|value| value.parse::<GeometryType>())
            .transpose()
            .map_err(CliError::UnknownGeometry)?;
        Ok(Self { document, geometry })
    }
}

pub(crate) fn run_keys_with(args: KeysArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let selection = load_selection(&config.document)?;
    require_valid(&selection, &config.document)?;
    for key in selection.key_union(config.geometry) {
        writeln!(writer, "{key}").map_err(CliError::WriteOutput)?;
    }
    Ok(())
}
