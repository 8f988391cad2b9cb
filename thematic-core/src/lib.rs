//! Feature selection compiler for thematic OpenStreetMap exports.
//!
//! A feature selection is a YAML document mapping theme names to the
//! geometry types, OSM keys and filter each theme exports:
//!
//! ```yaml
//! buildings:
//!   types: [points, polygons]
//!   select: [name, building, addr:housenumber]
//!   where: building IS NOT NULL
//! ```
//!
//! [`FeatureSelection`] validates such a document and derives:
//! - a [`ValidationReport`] listing every problem found,
//! - the SQL materialising one GeoPackage table per theme and geometry,
//! - the union of source columns the themes require,
//! - the attribution readme shipped with each theme.
//!
//! Boundaries:
//! - No SQL is executed and no data source is contacted.
//! - Filter syntax is delegated to a [`PredicateValidator`].
//!
//! Invariants:
//! - A compiled selection is immutable and `Send + Sync`.
//! - Output depends only on the document text.
//!
//! # Examples
//! ```
//! use thematic_core::FeatureSelection;
//!
//! let selection = FeatureSelection::new("roads:\n  types: [lines]\n  select: [highway]\n");
//! assert!(selection.is_valid());
//! let (create, index) = selection.sqls().into_parts();
//! assert!(create[0].starts_with("CREATE TABLE roads_lines("));
//! assert_eq!(index.len(), 1);
//! ```

#![forbid(unsafe_code)]

mod diagnostic;
mod document;
mod geometry;
mod key;
mod predicate;
mod readme;
mod schema;
mod selection;
mod sql;

pub use diagnostic::{Diagnostic, DiagnosticCategory, ValidationReport};
pub use geometry::GeometryType;
pub use key::is_valid_osm_key;
pub use predicate::{FilterPredicate, InvalidPredicate, PredicateValidator, SqlPredicateValidator};
pub use schema::{ThemeSpec, is_reserved_theme_name};
pub use selection::{FeatureSelection, slugify};
pub use sql::{OutputTable, SqlStatements};
