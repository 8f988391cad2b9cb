//! Shape validation for individual themes.
//!
//! Each top-level entry of a document is checked against the theme grammar:
//!
//! ```yaml
//! buildings:
//!   types: [points, polygons]   # optional, defaults to all three
//!   select: [name, building]    # required, non-empty
//!   where: building IS NOT NULL # optional string or list of strings
//! ```
//!
//! Checks keep going after a failure so a single pass reports every problem
//! in a theme.

use std::collections::BTreeSet;

use log::warn;
use serde_yaml::{Mapping, Value};

use crate::document::{render, scalar_text};
use crate::key::check_key;
use crate::sql::quote_identifier;
use crate::{
    Diagnostic, FilterPredicate, GeometryType, PredicateValidator, ValidationReport, slugify,
};

/// Table names created by the GeoPackage importer.
const RESERVED_NAMES: [&str; 4] = ["points", "lines", "polygons", "multipolygons"];
/// Prefixes of GeoPackage bookkeeping tables.
const RESERVED_PREFIXES: [&str; 2] = ["rtree_", "gpkg_"];

const SELECT: &str = "select";
const TYPES: &str = "types";
const WHERE: &str = "where";

/// Whether `name` collides with a table the export pipeline relies on.
///
/// # Examples
/// ```
/// use thematic_core::is_reserved_theme_name;
///
/// assert!(is_reserved_theme_name("points"));
/// assert!(is_reserved_theme_name("gpkg_contents"));
/// assert!(!is_reserved_theme_name("Points"));
/// assert!(!is_reserved_theme_name("points_of_interest"));
/// ```
#[must_use]
pub fn is_reserved_theme_name(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
        || RESERVED_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
}

/// Whether `name` slugifies to a bare SQL identifier usable as a table
/// prefix and a file name.
fn has_table_safe_slug(name: &str) -> bool {
    if name.trim().is_empty() {
        return false;
    }
    let slug = slugify(name);
    let mut chars = slug.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// A validated theme definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeSpec {
    types: Vec<GeometryType>,
    select: Vec<String>,
    filter: Option<FilterPredicate>,
    filter_columns: BTreeSet<String>,
}

impl ThemeSpec {
    /// Geometry types in authored order, without duplicates.
    #[must_use]
    pub fn geometry_types(&self) -> &[GeometryType] {
        &self.types
    }

    /// Whether the theme is exported for `geometry`.
    #[must_use]
    pub fn includes(&self, geometry: GeometryType) -> bool {
        self.types.contains(&geometry)
    }

    /// Selected keys in authored order.
    #[must_use]
    pub fn select(&self) -> &[String] {
        &self.select
    }

    /// The explicit `where` entry, if any.
    #[must_use]
    pub const fn filter(&self) -> Option<&FilterPredicate> {
        self.filter.as_ref()
    }

    /// Columns referenced by the `where` entry.
    #[must_use]
    pub const fn filter_columns(&self) -> &BTreeSet<String> {
        &self.filter_columns
    }

    /// The effective filter clause.
    ///
    /// An explicit `where` is used as authored. Without one, a row matches
    /// when any selected key is set.
    #[must_use]
    pub fn filter_clause(&self) -> String {
        self.filter.as_ref().map_or_else(
            || {
                self.select
                    .iter()
                    .map(|key| format!("{} IS NOT NULL", quote_identifier(key)))
                    .collect::<Vec<_>>()
                    .join(" OR ")
            },
            FilterPredicate::clause,
        )
    }
}

/// Validate one top-level entry, recording problems in `report`.
///
/// Returns the theme only when the entry produced no diagnostics.
pub(crate) fn check_theme(
    key: &Value,
    body: &Value,
    validator: &dyn PredicateValidator,
    report: &mut ValidationReport,
) -> Option<(String, ThemeSpec)> {
    let Some(name) = scalar_text(key).filter(|name| has_table_safe_slug(name)) else {
        report.push(Diagnostic::InvalidThemeName { name: render(key) });
        return None;
    };
    let mut checker = ThemeChecker {
        name: &name,
        report,
        clean: true,
    };

    if is_reserved_theme_name(&name) {
        checker.fail(Diagnostic::ReservedThemeName { name: name.clone() });
    }
    let Some(fields) = body.as_mapping() else {
        checker.fail(Diagnostic::MissingSelect {
            theme: name.clone(),
        });
        return None;
    };

    let select = checker.select(fields.get(SELECT));
    let types = checker.types(fields.get(TYPES));
    let filter = checker.filter(fields.get(WHERE));
    let filter_columns = filter
        .as_ref()
        .map(|predicate| checker.filter_columns(predicate, validator))
        .unwrap_or_default();
    checker.warn_unknown_fields(fields);

    checker.clean.then(|| {
        (
            name.clone(),
            ThemeSpec {
                types,
                select,
                filter,
                filter_columns,
            },
        )
    })
}

struct ThemeChecker<'a> {
    name: &'a str,
    report: &'a mut ValidationReport,
    clean: bool,
}

impl ThemeChecker<'_> {
    fn fail(&mut self, diagnostic: Diagnostic) {
        self.clean = false;
        self.report.push(diagnostic);
    }

    fn theme(&self) -> String {
        self.name.to_owned()
    }

    fn select(&mut self, entry: Option<&Value>) -> Vec<String> {
        let entries = match entry {
            Some(Value::Sequence(entries)) if !entries.is_empty() => entries,
            _ => {
                self.fail(Diagnostic::MissingSelect {
                    theme: self.theme(),
                });
                return Vec::new();
            }
        };
        let mut keys = Vec::with_capacity(entries.len());
        for entry in entries {
            match check_key(self.name, entry) {
                Ok(key) => keys.push(key),
                Err(diagnostic) => self.fail(diagnostic),
            }
        }
        keys
    }

    fn types(&mut self, entry: Option<&Value>) -> Vec<GeometryType> {
        let entries = match entry {
            None | Some(Value::Null) => return GeometryType::ALL.to_vec(),
            Some(Value::Sequence(entries)) if !entries.is_empty() => entries,
            Some(other) => {
                self.fail(Diagnostic::InvalidGeometryTypes {
                    theme: self.theme(),
                    value: render(other),
                });
                return Vec::new();
            }
        };
        let mut types = Vec::with_capacity(entries.len());
        for entry in entries {
            let parsed = scalar_text(entry).and_then(|text| text.parse::<GeometryType>().ok());
            match parsed {
                Some(geometry) if !types.contains(&geometry) => types.push(geometry),
                Some(_) => {}
                None => self.fail(Diagnostic::InvalidGeometryType {
                    theme: self.theme(),
                    value: render(entry),
                }),
            }
        }
        types
    }

    fn filter(&mut self, entry: Option<&Value>) -> Option<FilterPredicate> {
        match entry {
            None | Some(Value::Null) => None,
            Some(Value::String(expression)) => Some(FilterPredicate::Single(expression.clone())),
            Some(Value::Sequence(entries)) if !entries.is_empty() => {
                let expressions: Option<Vec<String>> = entries
                    .iter()
                    .map(|item| item.as_str().map(str::to_owned))
                    .collect();
                if expressions.is_none() {
                    self.fail(Diagnostic::InvalidWhereShape {
                        theme: self.theme(),
                        value: "list containing non-string entries".to_owned(),
                    });
                }
                expressions.map(FilterPredicate::Multiple)
            }
            Some(other) => {
                self.fail(Diagnostic::InvalidWhereShape {
                    theme: self.theme(),
                    value: render(other),
                });
                None
            }
        }
    }

    fn filter_columns(
        &mut self,
        predicate: &FilterPredicate,
        validator: &dyn PredicateValidator,
    ) -> BTreeSet<String> {
        let mut columns = BTreeSet::new();
        for expression in predicate.expressions() {
            match validator.validate(expression) {
                Ok(found) => columns.extend(found),
                Err(err) => self.fail(Diagnostic::InvalidWhere {
                    theme: self.theme(),
                    message: err.message().to_owned(),
                }),
            }
        }
        columns
    }

    fn warn_unknown_fields(&self, fields: &Mapping) {
        for field in fields.keys() {
            let known = field
                .as_str()
                .is_some_and(|field| matches!(field, SELECT | TYPES | WHERE));
            if !known {
                warn!(
                    "Ignoring unknown field {} in theme {}",
                    render(field),
                    self.name
                );
            }
        }
    }
}
