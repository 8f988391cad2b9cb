//! Diagnostics collected while compiling a feature selection.
//!
//! The compiler never aborts: every problem is recorded as a [`Diagnostic`]
//! in a [`ValidationReport`] in the order it was discovered. The `Display`
//! text of each diagnostic is consumed by downstream systems and must stay
//! stable.

use serde::{Serialize, Serializer, ser::SerializeStruct};
use thiserror::Error;

/// Broad class of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticCategory {
    /// The document could not be read as a mapping of themes.
    Structural,
    /// A theme entry does not have the expected shape.
    ThemeShape,
    /// A selected key is empty or contains illegal characters.
    KeyGrammar,
    /// A filter predicate was rejected by the predicate validator.
    Predicate,
}

/// A single problem found in a feature selection document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// The text is not well-formed YAML.
    #[error("Invalid YAML: {message}")]
    Unparsable {
        /// Message reported by the YAML parser.
        message: String,
    },
    /// The document carries a type tag the loader refuses to honour.
    #[error("Unsafe YAML tag: {tag}")]
    UnsafeTag {
        /// Tag as written in the document.
        tag: String,
    },
    /// The document root is not a mapping.
    #[error("YAML must be dict, not {found}")]
    RootNotMapping {
        /// Kind of value found at the root.
        found: &'static str,
    },
    /// The document declares no themes.
    #[error("Feature selection must define at least one theme")]
    NoThemes,
    /// A theme name is not a usable string.
    #[error("Theme name invalid: {name}")]
    InvalidThemeName {
        /// Rendered form of the offending key.
        name: String,
    },
    /// A theme name collides with a table the importer creates.
    #[error("Theme name reserved: {name}")]
    ReservedThemeName {
        /// Offending theme name.
        name: String,
    },
    /// A theme name slugifies to the same table prefix as an earlier theme.
    #[error("Theme name collides: {name}")]
    ThemeNameCollision {
        /// Later of the two colliding theme names.
        name: String,
    },
    /// A theme lacks a non-empty `select` sequence.
    #[error("Each theme must have a 'select' key")]
    MissingSelect {
        /// Theme the problem belongs to.
        theme: String,
    },
    /// `types` is present but not a non-empty sequence.
    #[error("Invalid geometry types: {value}")]
    InvalidGeometryTypes {
        /// Theme the problem belongs to.
        theme: String,
        /// Rendered value of the `types` entry.
        value: String,
    },
    /// An entry of `types` is not a known geometry type.
    #[error("Invalid geometry type: {value}")]
    InvalidGeometryType {
        /// Theme the problem belongs to.
        theme: String,
        /// Rendered value of the entry.
        value: String,
    },
    /// A `select` entry is empty.
    #[error("Missing OSM key")]
    MissingKey {
        /// Theme the problem belongs to.
        theme: String,
    },
    /// A `select` entry contains characters outside the key alphabet.
    #[error("Invalid OSM key: {key}")]
    InvalidKey {
        /// Theme the problem belongs to.
        theme: String,
        /// Offending key.
        key: String,
    },
    /// `where` is neither a string nor a non-empty list of strings.
    #[error("Invalid SQL WHERE: {value}")]
    InvalidWhereShape {
        /// Theme the problem belongs to.
        theme: String,
        /// Rendered value of the `where` entry.
        value: String,
    },
    /// The predicate validator rejected a `where` expression.
    #[error("SQL WHERE Invalid: {message}")]
    InvalidWhere {
        /// Theme the problem belongs to.
        theme: String,
        /// Message returned by the validator, verbatim.
        message: String,
    },
}

impl Diagnostic {
    /// Classify the diagnostic.
    #[must_use]
    pub const fn category(&self) -> DiagnosticCategory {
        match self {
            Self::Unparsable { .. }
            | Self::UnsafeTag { .. }
            | Self::RootNotMapping { .. }
            | Self::NoThemes => DiagnosticCategory::Structural,
            Self::InvalidThemeName { .. }
            | Self::ReservedThemeName { .. }
            | Self::ThemeNameCollision { .. }
            | Self::MissingSelect { .. }
            | Self::InvalidGeometryTypes { .. }
            | Self::InvalidGeometryType { .. }
            | Self::InvalidWhereShape { .. } => DiagnosticCategory::ThemeShape,
            Self::MissingKey { .. } | Self::InvalidKey { .. } => DiagnosticCategory::KeyGrammar,
            Self::InvalidWhere { .. } => DiagnosticCategory::Predicate,
        }
    }

    /// Theme the diagnostic refers to, when it is tied to one.
    #[must_use]
    pub fn theme(&self) -> Option<&str> {
        match self {
            Self::ReservedThemeName { name } | Self::ThemeNameCollision { name } => Some(name),
            Self::MissingSelect { theme }
            | Self::InvalidGeometryTypes { theme, .. }
            | Self::InvalidGeometryType { theme, .. }
            | Self::MissingKey { theme }
            | Self::InvalidKey { theme, .. }
            | Self::InvalidWhereShape { theme, .. }
            | Self::InvalidWhere { theme, .. } => Some(theme),
            Self::Unparsable { .. }
            | Self::UnsafeTag { .. }
            | Self::RootNotMapping { .. }
            | Self::NoThemes
            | Self::InvalidThemeName { .. } => None,
        }
    }
}

/// Outcome of validating a feature selection document.
///
/// The document is valid iff no diagnostics were recorded.
///
/// # Examples
/// ```
/// use thematic_core::FeatureSelection;
///
/// let selection = FeatureSelection::new("- all:\n    select: [name]\n");
/// let report = selection.report();
/// assert!(!report.is_valid());
/// assert_eq!(report.errors(), vec!["YAML must be dict, not list".to_owned()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Whether the document passed every check.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Typed diagnostics in discovery order.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Rendered diagnostic messages in discovery order.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.diagnostics.iter().map(ToString::to_string).collect()
    }
}

impl From<Diagnostic> for ValidationReport {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationReport", 2)?;
        state.serialize_field("valid", &self.is_valid())?;
        state.serialize_field("errors", &self.errors())?;
        state.end()
    }
}
