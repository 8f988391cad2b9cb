//! Lexical checks for OpenStreetMap keys.
//!
//! Keys may mix case and contain digits, underscores, colons (namespaced
//! tags such as `addr:housenumber`) and interior spaces. See
//! <https://taginfo.openstreetmap.org/keys> for keys in use.

use serde_yaml::Value;

use crate::Diagnostic;
use crate::document::{render, scalar_text};

/// Whether `key` only uses characters allowed in a selected key.
///
/// # Examples
/// ```
/// use thematic_core::is_valid_osm_key;
///
/// assert!(is_valid_osm_key("addr:housenumber"));
/// assert!(is_valid_osm_key("Has Space"));
/// assert!(!is_valid_osm_key("na?me"));
/// assert!(!is_valid_osm_key("   "));
/// ```
#[must_use]
pub fn is_valid_osm_key(key: &str) -> bool {
    !key.trim().is_empty() && key.chars().all(is_key_char)
}

const fn is_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | ':' | ' ')
}

/// Check one `select` entry, returning the key text when it is usable.
pub(crate) fn check_key(theme: &str, entry: &Value) -> Result<String, Diagnostic> {
    let Some(key) = scalar_text(entry) else {
        return match entry {
            Value::Null => Err(Diagnostic::MissingKey {
                theme: theme.to_owned(),
            }),
            other => Err(Diagnostic::InvalidKey {
                theme: theme.to_owned(),
                key: render(other),
            }),
        };
    };
    if key.trim().is_empty() {
        return Err(Diagnostic::MissingKey {
            theme: theme.to_owned(),
        });
    }
    if !is_valid_osm_key(&key) {
        return Err(Diagnostic::InvalidKey {
            theme: theme.to_owned(),
            key,
        });
    }
    Ok(key)
}
