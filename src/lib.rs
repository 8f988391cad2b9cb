//! Facade crate for the OSM thematic export compiler.
//!
//! This crate re-exports the feature selection compiler and its supporting
//! types so callers depend on a single package.

#![forbid(unsafe_code)]

pub use thematic_core::{
    Diagnostic, DiagnosticCategory, FeatureSelection, FilterPredicate, GeometryType,
    InvalidPredicate, OutputTable, PredicateValidator, SqlPredicateValidator, SqlStatements,
    ThemeSpec, ValidationReport, is_reserved_theme_name, is_valid_osm_key, slugify,
};
