//! Attribution text shipped alongside each theme in an export archive.
//!
//! The wording is part of the archive format: identical inputs must render
//! byte-identical text so archives stay reproducible.

const WIKI_KEY_URL: &str = "http://wiki.openstreetmap.org/wiki/Key:";

/// Render the readme for a theme with the given filter clause and keys.
pub(crate) fn render(filter_clause: &str, keys: &[String]) -> String {
    let columns = keys
        .iter()
        .map(|key| format!("{key} {WIKI_KEY_URL}{key}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "
This thematic file was generated by EventKit.

This theme includes features matching the filter:

{filter_clause}

clipped to the area defined by the included boundary.geojson.

This theme includes the following OpenStreetMap keys:

{columns}

(c) OpenStreetMap contributors.

This file is made available under the Open Database License: http://opendatacommons.org/licenses/odbl/1.0/. Any rights in individual contents of the database are licensed under the Database Contents License: http://opendatacommons.org/licenses/dbcl/1.0/
"
    )
}
