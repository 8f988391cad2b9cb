//! Behavioural tests for compiling feature selection documents.

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use thematic_core::FeatureSelection;

const WATERWAYS_AND_BUILDINGS: &str = "\
waterways:
  types: [lines, polygons]
  select: [name, waterway]
buildings:
  select: [name, building]
  where: building IS NOT NULL
";

#[fixture]
fn document() -> RefCell<Option<String>> {
    RefCell::new(None)
}

#[fixture]
fn compiled() -> RefCell<Option<FeatureSelection>> {
    RefCell::new(None)
}

fn expect_selection(compiled: &RefCell<Option<FeatureSelection>>) -> FeatureSelection {
    compiled
        .borrow()
        .as_ref()
        .expect("document was compiled")
        .clone()
}

#[given("a document with waterways and buildings themes")]
fn two_themes(#[from(document)] document: &RefCell<Option<String>>) {
    *document.borrow_mut() = Some(WATERWAYS_AND_BUILDINGS.to_owned());
}

#[given("a document declaring a theme named points")]
fn reserved_theme(#[from(document)] document: &RefCell<Option<String>>) {
    *document.borrow_mut() = Some("points:\n  select: [name]\n".to_owned());
}

#[given("a document filtering on addr:housenumber without quotes")]
fn unquoted_colon_filter(#[from(document)] document: &RefCell<Option<String>>) {
    *document.borrow_mut() = Some(
        "buildings:\n  select:\n    - name\n    - addr:housenumber\n  where: addr:housenumber IS NOT NULL\n"
            .to_owned(),
    );
}

#[given("a document carrying a python object tag")]
fn tagged_document(#[from(document)] document: &RefCell<Option<String>>) {
    *document.borrow_mut() =
        Some("!!python/object:feature_selection.FeatureSelection\na: 0\n".to_owned());
}

#[when("I compile the document")]
fn compile(
    #[from(document)] document: &RefCell<Option<String>>,
    #[from(compiled)] compiled: &RefCell<Option<FeatureSelection>>,
) {
    let raw = document.borrow().clone().expect("document prepared");
    *compiled.borrow_mut() = Some(FeatureSelection::new(raw));
}

#[then("the document is valid")]
fn is_valid(#[from(compiled)] compiled: &RefCell<Option<FeatureSelection>>) {
    let selection = expect_selection(compiled);
    assert!(selection.is_valid(), "unexpected errors: {:?}", selection.errors());
}

#[then("the themes are listed alphabetically")]
fn sorted_themes(#[from(compiled)] compiled: &RefCell<Option<FeatureSelection>>) {
    let selection = expect_selection(compiled);
    assert_eq!(selection.themes(), vec!["buildings", "waterways"]);
}

#[then("the key union spans both themes")]
fn key_union(#[from(compiled)] compiled: &RefCell<Option<FeatureSelection>>) {
    let selection = expect_selection(compiled);
    assert_eq!(selection.key_union(None), vec!["building", "name", "waterway"]);
}

#[then("the first error reports the reserved name")]
fn reserved_error(#[from(compiled)] compiled: &RefCell<Option<FeatureSelection>>) {
    let selection = expect_selection(compiled);
    assert!(!selection.is_valid());
    assert_eq!(
        selection.errors().first().map(String::as_str),
        Some("Theme name reserved: points")
    );
}

#[then("the first error carries the SQL validator message")]
fn validator_error(#[from(compiled)] compiled: &RefCell<Option<FeatureSelection>>) {
    let selection = expect_selection(compiled);
    assert_eq!(
        selection.errors().first().map(String::as_str),
        Some("SQL WHERE Invalid: identifier with colon : must be in double quotes.")
    );
}

#[then("exactly one error is reported")]
fn single_error(#[from(compiled)] compiled: &RefCell<Option<FeatureSelection>>) {
    let selection = expect_selection(compiled);
    assert!(!selection.is_valid());
    assert_eq!(selection.errors().len(), 1, "{:?}", selection.errors());
}

#[scenario(path = "tests/features/feature_selection.feature", index = 0)]
fn compiling_valid_document(
    document: RefCell<Option<String>>,
    compiled: RefCell<Option<FeatureSelection>>,
) {
    let _ = (document, compiled);
}

#[scenario(path = "tests/features/feature_selection.feature", index = 1)]
fn rejecting_reserved_name(
    document: RefCell<Option<String>>,
    compiled: RefCell<Option<FeatureSelection>>,
) {
    let _ = (document, compiled);
}

#[scenario(path = "tests/features/feature_selection.feature", index = 2)]
fn passing_validator_errors(
    document: RefCell<Option<String>>,
    compiled: RefCell<Option<FeatureSelection>>,
) {
    let _ = (document, compiled);
}

#[scenario(path = "tests/features/feature_selection.feature", index = 3)]
fn refusing_tagged_yaml(
    document: RefCell<Option<String>>,
    compiled: RefCell<Option<FeatureSelection>>,
) {
    let _ = (document, compiled);
}
