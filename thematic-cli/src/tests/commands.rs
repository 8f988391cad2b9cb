//! End-to-end tests driving each command against documents on disk.

use super::helpers::{BUILDINGS_AND_ROADS, RESERVED_THEME, Workspace, read_utf8};
use super::*;
use crate::compile::{CompileArgs, run_compile_with};
use crate::keys::{KeysArgs, run_keys_with};
use crate::validate::{ValidateArgs, run_validate_with};
use rstest::{fixture, rstest};

#[fixture]
fn workspace() -> Workspace {
    Workspace::new()
}

fn utf8(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).expect("stdout utf-8")
}

#[rstest]
fn validate_prints_a_clean_report(workspace: Workspace) {
    let document = workspace.document(BUILDINGS_AND_ROADS);
    let mut stdout = Vec::new();
    run_validate_with(
        ValidateArgs {
            document: Some(document),
        },
        &mut stdout,
    )
    .expect("valid document");
    let report: serde_json::Value = serde_json::from_str(&utf8(stdout)).expect("JSON report");
    assert_eq!(report["valid"], true);
    assert_eq!(report["errors"], serde_json::json!([]));
}

#[rstest]
fn validate_prints_errors_before_failing(workspace: Workspace) {
    let document = workspace.document(RESERVED_THEME);
    let mut stdout = Vec::new();
    let err = run_validate_with(
        ValidateArgs {
            document: Some(document),
        },
        &mut stdout,
    )
    .expect_err("reserved theme name");
    match err {
        CliError::InvalidDocument { errors, .. } => {
            assert_eq!(errors, vec!["Theme name reserved: points"]);
        }
        other => panic!("expected InvalidDocument, found {other:?}"),
    }
    let report: serde_json::Value = serde_json::from_str(&utf8(stdout)).expect("JSON report");
    assert_eq!(report["valid"], false);
    assert_eq!(report["errors"][0], "Theme name reserved: points");
}

#[rstest]
fn validate_reports_missing_documents(workspace: Workspace) {
    let mut stdout = Vec::new();
    let err = run_validate_with(
        ValidateArgs {
            document: Some(workspace.root().join("absent.yml")),
        },
        &mut stdout,
    )
    .expect_err("missing document");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_DOCUMENT),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_rejects_directories(workspace: Workspace) {
    let mut stdout = Vec::new();
    let err = run_validate_with(
        ValidateArgs {
            document: Some(workspace.root().to_path_buf()),
        },
        &mut stdout,
    )
    .expect_err("directory is not a document");
    match err {
        CliError::SourcePathNotFile { field, .. } => assert_eq!(field, ARG_DOCUMENT),
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
#[case(None, "building\nhighway\nname\n")]
#[case(Some("lines"), "highway\nname\n")]
#[case(Some("points"), "building\nname\n")]
fn keys_prints_the_union(
    workspace: Workspace,
    #[case] geometry: Option<&str>,
    #[case] expected: &str,
) {
    let document = workspace.document(BUILDINGS_AND_ROADS);
    let mut stdout = Vec::new();
    run_keys_with(
        KeysArgs {
            document: Some(document),
            geometry: geometry.map(str::to_owned),
        },
        &mut stdout,
    )
    .expect("keys listed");
    assert_eq!(utf8(stdout), expected);
}

#[rstest]
fn compile_writes_scripts_and_readmes(workspace: Workspace) {
    let document = workspace.document(BUILDINGS_AND_ROADS);
    let output_dir = workspace.root().join("out/thematic");
    let mut stdout = Vec::new();
    run_compile_with(
        CompileArgs {
            document: Some(document),
            output_dir: Some(output_dir.clone()),
        },
        &mut stdout,
    )
    .expect("compiled");

    let written: Vec<String> = utf8(stdout).lines().map(str::to_owned).collect();
    assert_eq!(
        written,
        vec![
            output_dir.join("create.sql").to_string(),
            output_dir.join("index.sql").to_string(),
            output_dir.join("main_roads.README.txt").to_string(),
            output_dir.join("buildings.README.txt").to_string(),
        ]
    );
    assert_eq!(
        read_utf8(&output_dir.join("index.sql")),
        "SELECT gpkgAddSpatialIndex('main_roads_lines', 'geom');\n\
         SELECT gpkgAddSpatialIndex('buildings_points', 'geom');\n\
         SELECT gpkgAddSpatialIndex('buildings_polygons', 'geom');\n"
    );
    let create = read_utf8(&output_dir.join("create.sql"));
    assert!(create.starts_with("CREATE TABLE main_roads_lines(\n"));
    assert!(create.contains("\"z_index\" TEXT"));
    assert_eq!(create.matches("CREATE TABLE").count(), 3);
    let readme = read_utf8(&output_dir.join("buildings.README.txt"));
    assert!(readme.contains("\nbuilding IS NOT NULL\n"));
}

#[rstest]
fn compile_refuses_invalid_documents(workspace: Workspace) {
    let document = workspace.document(RESERVED_THEME);
    let output_dir = workspace.root().join("out");
    let mut stdout = Vec::new();
    let err = run_compile_with(
        CompileArgs {
            document: Some(document),
            output_dir: Some(output_dir.clone()),
        },
        &mut stdout,
    )
    .expect_err("invalid document");
    assert!(matches!(err, CliError::InvalidDocument { .. }));
    assert!(stdout.is_empty());
    assert!(!output_dir.exists());
}

#[rstest]
fn dispatch_routes_to_the_parsed_command(workspace: Workspace) {
    let document = workspace.document(BUILDINGS_AND_ROADS);
    let cli = Cli::try_parse_from(["thematic", "keys", document.as_str(), "--geometry", "lines"])
        .expect("arguments parse");
    let mut stdout = Vec::new();
    dispatch(cli.command, &mut stdout).expect("keys listed");
    assert_eq!(utf8(stdout), "highway\nname\n");
}
