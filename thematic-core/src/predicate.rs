//! Filter predicates and the validator that vets them.
//!
//! A theme may narrow its rows with a `where` entry holding one SQL boolean
//! expression or a list of them. Each expression is handed to a
//! [`PredicateValidator`]; the default [`SqlPredicateValidator`] parses it
//! with `sqlparser` using the SQLite dialect spoken by GeoPackage.

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use sqlparser::ast::{BinaryOperator, Expr, UnaryOperator, Value, visit_expressions};
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::{Parser, ParserError};
use sqlparser::tokenizer::{Token, Tokenizer};
use thiserror::Error;

const COLON_IDENTIFIER: &str = "identifier with colon : must be in double quotes.";
const NOT_A_PREDICATE: &str = "expression is not a boolean predicate";
const SUBQUERY: &str = "subqueries are not supported in filters";

/// The `where` entry of a theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPredicate {
    /// A single boolean expression.
    Single(String),
    /// Several expressions, any of which selects a row.
    Multiple(Vec<String>),
}

impl FilterPredicate {
    /// Individual expressions in authored order.
    #[must_use]
    pub fn expressions(&self) -> &[String] {
        match self {
            Self::Single(expression) => std::slice::from_ref(expression),
            Self::Multiple(expressions) => expressions,
        }
    }

    /// The predicate as one SQL clause, alternatives joined with `OR`.
    ///
    /// # Examples
    /// ```
    /// use thematic_core::FilterPredicate;
    ///
    /// let predicate = FilterPredicate::Multiple(vec![
    ///     "name IS NOT NULL".into(),
    ///     "name = 'some building'".into(),
    /// ]);
    /// assert_eq!(predicate.clause(), "name IS NOT NULL OR name = 'some building'");
    /// ```
    #[must_use]
    pub fn clause(&self) -> String {
        self.expressions().join(" OR ")
    }
}

/// Rejection returned by a [`PredicateValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct InvalidPredicate {
    message: String,
}

impl InvalidPredicate {
    /// Wrap a human-readable rejection message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The rejection message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Checks a single boolean SQL expression.
///
/// Implementations return the column identifiers the expression references
/// so callers can provision them. Validators must be `Send + Sync` so a
/// compiled selection can be shared across threads.
pub trait PredicateValidator: Send + Sync {
    /// Validate `predicate`, returning the referenced column names.
    fn validate(&self, predicate: &str) -> Result<BTreeSet<String>, InvalidPredicate>;
}

/// [`PredicateValidator`] backed by `sqlparser`.
///
/// # Examples
/// ```
/// use thematic_core::{PredicateValidator, SqlPredicateValidator};
///
/// let columns = SqlPredicateValidator
///     .validate("\"addr:street\" IS NOT NULL AND building = 'yes'")
///     .expect("valid predicate");
/// assert!(columns.contains("addr:street"));
/// assert!(columns.contains("building"));
///
/// let err = SqlPredicateValidator
///     .validate("addr:street IS NOT NULL")
///     .unwrap_err();
/// assert_eq!(err.message(), "identifier with colon : must be in double quotes.");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlPredicateValidator;

impl PredicateValidator for SqlPredicateValidator {
    fn validate(&self, predicate: &str) -> Result<BTreeSet<String>, InvalidPredicate> {
        let dialect = SQLiteDialect {};
        let tokens = Tokenizer::new(&dialect, predicate)
            .tokenize()
            .map_err(|err| InvalidPredicate::new(err.to_string()))?;
        if has_unquoted_colon_identifier(&tokens) {
            return Err(InvalidPredicate::new(COLON_IDENTIFIER));
        }

        let mut parser = Parser::new(&dialect)
            .try_with_sql(predicate)
            .map_err(parser_rejection)?;
        let expr = parser.parse_expr().map_err(parser_rejection)?;
        parser
            .expect_token(&Token::EOF)
            .map_err(parser_rejection)?;

        let columns = referenced_columns(&expr)?;
        if !is_predicate(&expr) {
            return Err(InvalidPredicate::new(NOT_A_PREDICATE));
        }
        Ok(columns)
    }
}

/// `addr:street` tokenises as a word directly followed by a colon.
fn has_unquoted_colon_identifier(tokens: &[Token]) -> bool {
    tokens.windows(2).any(|pair| match pair {
        [Token::Word(word), Token::Colon] => word.quote_style.is_none(),
        [Token::Word(word), Token::Placeholder(placeholder)] => {
            word.quote_style.is_none() && placeholder.starts_with(':')
        }
        _ => false,
    })
}

fn parser_rejection(err: ParserError) -> InvalidPredicate {
    match err {
        ParserError::TokenizerError(message) | ParserError::ParserError(message) => {
            InvalidPredicate::new(message)
        }
        other => InvalidPredicate::new(other.to_string()),
    }
}

fn is_predicate(expr: &Expr) -> bool {
    match expr {
        Expr::Nested(inner) => is_predicate(inner),
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            expr,
        } => is_predicate(expr),
        Expr::BinaryOp { op, .. } => matches!(
            op,
            BinaryOperator::And
                | BinaryOperator::Or
                | BinaryOperator::Eq
                | BinaryOperator::NotEq
                | BinaryOperator::Lt
                | BinaryOperator::LtEq
                | BinaryOperator::Gt
                | BinaryOperator::GtEq
        ),
        Expr::IsNull(_)
        | Expr::IsNotNull(_)
        | Expr::IsTrue(_)
        | Expr::IsNotTrue(_)
        | Expr::IsFalse(_)
        | Expr::IsNotFalse(_)
        | Expr::IsDistinctFrom(..)
        | Expr::IsNotDistinctFrom(..)
        | Expr::InList { .. }
        | Expr::Between { .. }
        | Expr::Like { .. }
        | Expr::ILike { .. }
        | Expr::Function(_)
        | Expr::Value(Value::Boolean(_)) => true,
        _ => false,
    }
}

fn referenced_columns(expr: &Expr) -> Result<BTreeSet<String>, InvalidPredicate> {
    let mut columns = BTreeSet::new();
    let flow = visit_expressions(expr, |node| {
        match node {
            Expr::Subquery(_) | Expr::Exists { .. } | Expr::InSubquery { .. } => {
                return ControlFlow::Break(());
            }
            Expr::Identifier(ident) => {
                columns.insert(ident.value.clone());
            }
            Expr::CompoundIdentifier(parts) => {
                if let Some(column) = parts.last() {
                    columns.insert(column.value.clone());
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    });
    if flow.is_break() {
        return Err(InvalidPredicate::new(SUBQUERY));
    }
    Ok(columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn columns(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[rstest]
    #[case("building IS NOT NULL", &["building"])]
    #[case("\"addr:housenumber\" IS NOT NULL", &["addr:housenumber"])]
    #[case("name = 'some building'", &["name"])]
    #[case("highway IN ('primary', 'secondary') AND NOT (oneway = 'yes')", &["highway", "oneway"])]
    #[case("(amenity = 'school') OR (amenity = 'college')", &["amenity"])]
    #[case("levels BETWEEN 1 AND 4", &["levels"])]
    #[case("name LIKE 'St %'", &["name"])]
    fn accepts_boolean_predicates(#[case] predicate: &str, #[case] expected: &[&str]) {
        let found = SqlPredicateValidator
            .validate(predicate)
            .unwrap_or_else(|err| panic!("{predicate} should be valid: {err}"));
        assert_eq!(found, columns(expected));
    }

    #[rstest]
    #[case("addr:housenumber IS NOT NULL")]
    #[case("name IS NOT NULL OR addr:street = 'x'")]
    fn rejects_unquoted_colon_identifiers(#[case] predicate: &str) {
        let err = SqlPredicateValidator
            .validate(predicate)
            .expect_err("colon identifiers must be quoted");
        assert_eq!(err.message(), COLON_IDENTIFIER);
    }

    #[rstest]
    #[case("name")]
    #[case("'text'")]
    #[case("1 + 2")]
    fn rejects_non_boolean_expressions(#[case] predicate: &str) {
        let err = SqlPredicateValidator
            .validate(predicate)
            .expect_err("not a predicate");
        assert_eq!(err.message(), NOT_A_PREDICATE);
    }

    #[test]
    fn rejects_subqueries() {
        let err = SqlPredicateValidator
            .validate("osm_id IN (SELECT osm_id FROM points)")
            .expect_err("subquery");
        assert_eq!(err.message(), SUBQUERY);
    }

    #[rstest]
    #[case("")]
    #[case("name IS NOT NULL garbage")]
    #[case("name = ")]
    #[case("name IS NOT NULL; DROP TABLE points")]
    fn rejects_malformed_sql(#[case] predicate: &str) {
        let err = SqlPredicateValidator
            .validate(predicate)
            .expect_err("malformed");
        assert!(!err.message().is_empty());
    }

    #[test]
    fn single_predicate_clause_is_verbatim() {
        let predicate = FilterPredicate::Single("building IS NOT NULL".into());
        assert_eq!(predicate.clause(), "building IS NOT NULL");
        assert_eq!(predicate.expressions().len(), 1);
    }
}
