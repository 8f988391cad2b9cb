//! The compiled feature selection and its derived outputs.

use std::collections::BTreeSet;

use log::debug;

use crate::document;
use crate::readme;
use crate::schema::check_theme;
use crate::sql::{self, OutputTable, SqlStatements};
use crate::{
    Diagnostic, GeometryType, PredicateValidator, SqlPredicateValidator, ThemeSpec,
    ValidationReport,
};

/// Normalise a theme name for use in table and file names.
///
/// # Examples
/// ```
/// use thematic_core::slugify;
///
/// assert_eq!(slugify("A Theme Name"), "a_theme_name");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// A feature selection document compiled into themes.
///
/// Construction validates the whole document and never fails; problems are
/// collected in [`report`](Self::report). The remaining accessors are only
/// meaningful when [`is_valid`](Self::is_valid) returns `true`.
///
/// A compiled selection is immutable and can be shared across threads.
///
/// # Examples
/// ```
/// use thematic_core::{FeatureSelection, GeometryType};
///
/// let selection = FeatureSelection::new(
///     "waterways:\n  types: [lines, polygons]\n  select: [name, waterway]\n",
/// );
/// assert!(selection.is_valid());
/// assert_eq!(selection.themes(), vec!["waterways"]);
/// assert_eq!(
///     selection.filter_clause("waterways").as_deref(),
///     Some("\"name\" IS NOT NULL OR \"waterway\" IS NOT NULL"),
/// );
/// assert!(selection.key_union(Some(GeometryType::Points)).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct FeatureSelection {
    raw: String,
    report: ValidationReport,
    themes: Vec<(String, ThemeSpec)>,
}

impl FeatureSelection {
    /// Compile `raw`, vetting filters with [`SqlPredicateValidator`].
    pub fn new(raw: impl Into<String>) -> Self {
        Self::with_validator(raw, &SqlPredicateValidator)
    }

    /// Compile `raw`, vetting filters with `validator`.
    pub fn with_validator(raw: impl Into<String>, validator: &dyn PredicateValidator) -> Self {
        let raw = raw.into();
        let mut report = ValidationReport::default();
        let mut themes = Vec::new();
        match document::load(&raw) {
            Ok(entries) => {
                let mut slugs = BTreeSet::new();
                for (key, body) in &entries {
                    let Some((name, spec)) = check_theme(key, body, validator, &mut report) else {
                        continue;
                    };
                    if slugs.insert(slugify(&name)) {
                        themes.push((name, spec));
                    } else {
                        report.push(Diagnostic::ThemeNameCollision { name });
                    }
                }
            }
            Err(diagnostic) => report.push(diagnostic),
        }
        debug!(
            "Compiled feature selection with {} themes and {} diagnostics",
            themes.len(),
            report.diagnostics().len()
        );
        Self {
            raw,
            report,
            themes,
        }
    }

    /// The document text as supplied.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the document passed every check.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }

    /// Diagnostic messages in discovery order.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.report.errors()
    }

    /// The full validation report.
    #[must_use]
    pub const fn report(&self) -> &ValidationReport {
        &self.report
    }

    fn sorted(&self) -> Vec<(&str, &ThemeSpec)> {
        let mut themes: Vec<_> = self
            .themes
            .iter()
            .map(|(name, spec)| (name.as_str(), spec))
            .collect();
        themes.sort_unstable_by(|(left, _), (right, _)| left.cmp(right));
        themes
    }

    /// Theme names in ascending order.
    #[must_use]
    pub fn themes(&self) -> Vec<&str> {
        self.sorted().into_iter().map(|(name, _)| name).collect()
    }

    /// Slugs of [`themes`](Self::themes), in the same order.
    #[must_use]
    pub fn slug_themes(&self) -> Vec<String> {
        self.themes().into_iter().map(slugify).collect()
    }

    /// The definition of `theme`.
    #[must_use]
    pub fn theme(&self, theme: &str) -> Option<&ThemeSpec> {
        self.themes
            .iter()
            .find_map(|(name, spec)| (name == theme).then_some(spec))
    }

    /// Geometry types exported for `theme`.
    #[must_use]
    pub fn geom_types(&self, theme: &str) -> Option<&[GeometryType]> {
        self.theme(theme).map(ThemeSpec::geometry_types)
    }

    /// Keys selected by `theme`, as authored.
    #[must_use]
    pub fn key_selections(&self, theme: &str) -> Option<&[String]> {
        self.theme(theme).map(ThemeSpec::select)
    }

    /// Effective filter clause of `theme`.
    #[must_use]
    pub fn filter_clause(&self, theme: &str) -> Option<String> {
        self.theme(theme).map(ThemeSpec::filter_clause)
    }

    /// Every column the themes need, sorted and de-duplicated.
    ///
    /// Includes columns referenced only by filters. With `geometry`, only
    /// themes exported for that geometry contribute.
    #[must_use]
    pub fn key_union(&self, geometry: Option<GeometryType>) -> Vec<String> {
        self.themes
            .iter()
            .map(|(_, spec)| spec)
            .filter(|spec| geometry.is_none_or(|geometry| spec.includes(geometry)))
            .flat_map(|spec| spec.select().iter().chain(spec.filter_columns()))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Output tables in the order their statements are generated.
    #[must_use]
    pub fn output_tables(&self) -> Vec<OutputTable> {
        self.sorted()
            .into_iter()
            .flat_map(|(name, spec)| {
                let slug = slugify(name);
                GeometryType::ALL
                    .into_iter()
                    .filter(move |geometry| spec.includes(*geometry))
                    .map(move |geometry| OutputTable::new(name, &slug, geometry))
            })
            .collect()
    }

    /// Statements creating and indexing every output table.
    #[must_use]
    pub fn sqls(&self) -> SqlStatements {
        let mut statements = SqlStatements::default();
        for table in self.output_tables() {
            let Some(spec) = self.theme(&table.theme) else {
                continue;
            };
            statements.create_statements.push(sql::create_statement(
                &table,
                spec.select(),
                &spec.filter_clause(),
            ));
            statements
                .index_statements
                .push(sql::index_statement(&table));
        }
        statements
    }

    /// Attribution readme for `theme`.
    #[must_use]
    pub fn zip_readme(&self, theme: &str) -> Option<String> {
        self.theme(theme)
            .map(|spec| readme::render(&spec.filter_clause(), spec.select()))
    }
}
