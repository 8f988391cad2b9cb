//! Safe loading of feature selection documents.
//!
//! Documents are parsed into plain [`serde_yaml::Value`] trees. Tagged nodes
//! (`!!python/object:…` and friends) are refused outright instead of being
//! resolved, so nothing beyond mappings, sequences and scalars is ever
//! constructed from user input.

use serde_yaml::{Mapping, Value};

use crate::Diagnostic;

/// Secondary-handle tags from the YAML core and type schemas.
const CORE_TAGS: [&str; 14] = [
    "str", "int", "float", "bool", "null", "map", "seq", "binary", "timestamp", "set", "omap",
    "pairs", "merge", "value",
];

/// Parse `raw` into the top-level mapping of themes.
///
/// Every failure is reported as a single structural [`Diagnostic`].
pub(crate) fn load(raw: &str) -> Result<Mapping, Diagnostic> {
    if let Some(tag) = first_global_tag(raw) {
        return Err(Diagnostic::UnsafeTag { tag });
    }
    let value: Value = serde_yaml::from_str(raw).map_err(|err| Diagnostic::Unparsable {
        message: err.to_string(),
    })?;
    if let Some(tag) = first_tag(&value) {
        return Err(Diagnostic::UnsafeTag { tag });
    }
    match value {
        Value::Mapping(themes) if !themes.is_empty() => Ok(themes),
        Value::Mapping(_) | Value::Null => Err(Diagnostic::NoThemes),
        other => Err(Diagnostic::RootNotMapping {
            found: kind(&other),
        }),
    }
}

/// First `!!` tag outside the core schema that is placed on a node.
///
/// The parser resolves `!!` tags to their global form and applies them
/// silently, so they never surface as [`Value::Tagged`]. The scan follows
/// enough of the YAML layout to tell node properties from scalar content.
fn first_global_tag(raw: &str) -> Option<String> {
    let mut scanner = TagScanner::default();
    raw.lines().find_map(|line| scanner.scan_line(line))
}

/// Line-by-line state for [`first_global_tag`].
#[derive(Debug, Default)]
struct TagScanner {
    /// Delimiter of a quoted scalar still open at the end of a line.
    quote: Option<char>,
    /// Nesting depth of flow collections.
    flow_depth: usize,
    /// Indentation of the line that opened a block scalar.
    block_parent: Option<usize>,
}

impl TagScanner {
    fn scan_line(&mut self, line: &str) -> Option<String> {
        let chars: Vec<char> = line.chars().collect();
        let indent = chars.iter().take_while(|ch| **ch == ' ').count();
        if let Some(parent) = self.block_parent {
            if indent >= chars.len() || indent > parent {
                return None;
            }
            self.block_parent = None;
        }

        let mut pos = if is_document_marker(&chars) { 3 } else { 0 };
        let mut node_start = self.quote.is_none();
        let mut plain = false;
        while let Some(&ch) = chars.get(pos) {
            pos += 1;
            if let Some(quote) = self.quote {
                if ch == '\\' && quote == '"' {
                    pos += 1;
                } else if ch == quote {
                    if quote == '\'' && chars.get(pos) == Some(&'\'') {
                        pos += 1;
                    } else {
                        self.quote = None;
                    }
                }
                continue;
            }
            let prev_blank = pos < 2 || chars.get(pos - 2).is_some_and(|c| c.is_whitespace());
            let next_blank = chars.get(pos).is_none_or(|c| c.is_whitespace());
            match ch {
                ' ' | '\t' => {}
                '#' if prev_blank => break,
                ':' if next_blank => {
                    node_start = true;
                    plain = false;
                }
                '-' | '?' if node_start && next_blank => {}
                '[' | '{' if !plain => {
                    self.flow_depth += 1;
                    node_start = true;
                }
                ',' if self.flow_depth > 0 => {
                    node_start = true;
                    plain = false;
                }
                ']' | '}' if self.flow_depth > 0 => {
                    self.flow_depth -= 1;
                    node_start = false;
                    plain = false;
                }
                '!' | '&' if node_start => {
                    let end = property_end(&chars, pos);
                    let property: String = chars
                        .get(pos - 1..end)
                        .map(|slice| slice.iter().collect())
                        .unwrap_or_default();
                    pos = end;
                    if let Some(suffix) = property.strip_prefix("!!")
                        && !CORE_TAGS.contains(&suffix)
                    {
                        return Some(property);
                    }
                }
                '"' | '\'' if node_start => {
                    self.quote = Some(ch);
                    node_start = false;
                }
                '|' | '>' if node_start && self.flow_depth == 0 => {
                    self.block_parent = Some(indent);
                    break;
                }
                _ => {
                    node_start = false;
                    plain = true;
                }
            }
        }
        None
    }
}

/// `---` or `...` at the start of a line.
fn is_document_marker(chars: &[char]) -> bool {
    matches!(
        chars,
        ['-', '-', '-', rest @ ..] | ['.', '.', '.', rest @ ..]
            if rest.first().is_none_or(|ch| ch.is_whitespace())
    )
}

/// Index just past a tag or anchor whose first character precedes `start`.
fn property_end(chars: &[char], start: usize) -> usize {
    chars
        .iter()
        .enumerate()
        .skip(start)
        .find(|&(_, &ch)| ch.is_whitespace() || matches!(ch, ',' | '[' | ']' | '{' | '}'))
        .map_or(chars.len(), |(index, _)| index)
}

/// Depth-first search for the first tagged node.
fn first_tag(value: &Value) -> Option<String> {
    match value {
        Value::Tagged(tagged) => Some(tagged.tag.to_string()),
        Value::Sequence(items) => items.iter().find_map(first_tag),
        Value::Mapping(entries) => entries
            .iter()
            .find_map(|(key, item)| first_tag(key).or_else(|| first_tag(item))),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => None,
    }
}

/// Name of a value's kind, spelled the way document authors know it.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "dict",
        Value::Tagged(_) => "tagged value",
    }
}

/// Text of a scalar, or `None` for null and collection values.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

/// Render a value for inclusion in a diagnostic.
pub(crate) fn render(value: &Value) -> String {
    scalar_text(value).unwrap_or_else(|| kind(value).to_owned())
}
