//! Error types emitted by the thematic CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors emitted by the thematic CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// The `--geometry` filter does not name a known geometry type.
    #[error("invalid --geometry value: {0}")]
    UnknownGeometry(String),
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Reading the feature selection document failed.
    #[error("failed to read feature selection at {path:?}: {source}")]
    ReadDocument {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document compiled with diagnostics.
    #[error("feature selection {path:?} is invalid: {}", .errors.join("; "))]
    InvalidDocument {
        path: Utf8PathBuf,
        errors: Vec<String>,
    },
    /// Creating the output directory failed.
    #[error("failed to create output directory {path:?}: {source}")]
    CreateOutputDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Writing a compiled artefact failed.
    #[error("failed to write {path:?}: {source}")]
    WriteArtefact {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Serialising the validation report failed.
    #[error("failed to serialise validation report: {0}")]
    SerialiseReport(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
