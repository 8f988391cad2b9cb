//! Compile command implementation for the thematic CLI.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8::Dir;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;
use thematic_core::{FeatureSelection, slugify};

use crate::{
    ARG_DOCUMENT, ARG_OUTPUT_DIR, CliError, ENV_COMPILE_DOCUMENT, load_selection, require_valid,
};

pub(crate) const CREATE_SCRIPT: &str = "create.sql";
pub(crate) const INDEX_SCRIPT: &str = "index.sql";
pub(crate) const README_SUFFIX: &str = ".README.txt";

/// CLI arguments for the `compile` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Compile a feature selection into `create.sql`, which \
                 materialises one table per theme and geometry type, \
                 `index.sql`, which registers their spatial indexes, and \
                 one attribution readme per theme.",
    about = "Write SQL scripts and readmes for a feature selection"
)]
#[ortho_config(prefix = "THEMATIC")]
pub(crate) struct CompileArgs {
    /// Path to the YAML feature selection.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) document: Option<Utf8PathBuf>,
    /// Directory receiving the compiled artefacts.
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
}

impl CompileArgs {
    pub(crate) fn into_config(self) -> Result<CompileConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        CompileConfig::try_from(merged)
    }
}

/// Resolved `compile` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompileConfig {
    pub(crate) document: Utf8PathBuf,
    pub(crate) output_dir: Utf8PathBuf,
}

impl TryFrom<CompileArgs> for CompileConfig {
    type Error = CliError;

    fn try_from(args: CompileArgs) -> Result<Self, Self::Error> {
        let document = args.document.ok_or(CliError::MissingArgument {
            field: ARG_DOCUMENT,
            env: ENV_COMPILE_DOCUMENT,
        })?;
        let output_dir = args.output_dir.unwrap_or_else(|| Utf8PathBuf::from("."));
        Ok(Self {
            document,
            output_dir,
        })
    }
}

/// A compiled file ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Artefact {
    pub(crate) name: String,
    pub(crate) contents: String,
}

/// Render every artefact for a valid `selection`.
pub(crate) fn artefacts(selection: &FeatureSelection) -> Vec<Artefact> {
    let (create, index) = selection.sqls().into_parts();
    let index = index
        .into_iter()
        .map(|statement| statement + "\n")
        .collect::<String>();
    let mut artefacts = vec![
        Artefact {
            name: CREATE_SCRIPT.to_owned(),
            contents: create.join("\n"),
        },
        Artefact {
            name: INDEX_SCRIPT.to_owned(),
            contents: index,
        },
    ];
    for theme in selection.themes() {
        if let Some(readme) = selection.zip_readme(theme) {
            artefacts.push(Artefact {
                name: format!("{}{README_SUFFIX}", slugify(theme)),
                contents: readme,
            });
        }
    }
    artefacts
}

pub(crate) fn run_compile_with(args: CompileArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let selection = load_selection(&config.document)?;
    require_valid(&selection, &config.document)?;
    let dir = thematic_fs::ensure_dir(&config.output_dir).map_err(|source| {
        CliError::CreateOutputDir {
            path: config.output_dir.clone(),
            source,
        }
    })?;
    for artefact in artefacts(&selection) {
        let path = write_artefact(&dir, &config.output_dir, &artefact)?;
        writeln!(writer, "{path}").map_err(CliError::WriteOutput)?;
    }
    Ok(())
}

fn write_artefact(
    dir: &Dir,
    output_dir: &Utf8Path,
    artefact: &Artefact,
) -> Result<Utf8PathBuf, CliError> {
    let path = output_dir.join(&artefact.name);
    dir.write(&artefact.name, artefact.contents.as_bytes())
        .map_err(|source| CliError::WriteArtefact {
            path: path.clone(),
            source,
        })?;
    info!("Wrote {path} ({} bytes)", artefact.contents.len());
    Ok(path)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<CompileConfig, CliError> {
    let merged = CompileArgs::merge_from_layers(layers).map_err(CliError::from)?;
    CompileConfig::try_from(merged)
}
