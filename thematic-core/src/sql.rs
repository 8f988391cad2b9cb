//! SQL that materialises theme tables inside the export GeoPackage.
//!
//! Every theme/geometry pair becomes one script: a `CREATE TABLE` for the
//! output table followed by an `INSERT … SELECT` copying the matching rows
//! out of the importer's generic source table. A companion statement
//! registers the spatial index on the new table's `geom` column.

use serde::Serialize;

use crate::GeometryType;

/// Line tables selecting this key also get the renderer's draw order column.
const Z_INDEX_TRIGGER: &str = "highway";
const Z_INDEX: &str = "z_index";

/// Statements generated for a feature selection.
///
/// `index_statements` pairs one to one with `create_statements`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SqlStatements {
    /// `CREATE TABLE` plus `INSERT … SELECT` script per output table.
    pub create_statements: Vec<String>,
    /// Spatial index registration per output table.
    pub index_statements: Vec<String>,
}

impl SqlStatements {
    /// Split into `(create_statements, index_statements)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (self.create_statements, self.index_statements)
    }
}

/// One output table a feature selection creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputTable {
    /// Theme name as authored.
    pub theme: String,
    /// Geometry the table holds.
    pub geometry: GeometryType,
    /// Name of the table inside the GeoPackage.
    pub table: String,
}

impl OutputTable {
    pub(crate) fn new(theme: &str, slug: &str, geometry: GeometryType) -> Self {
        Self {
            theme: theme.to_owned(),
            geometry,
            table: format!("{slug}_{geometry}"),
        }
    }
}

/// Render the create-and-populate script for one output table.
///
/// `keys` are the selected keys in authored order; duplicates collapse to
/// their first occurrence. `filter_clause` is embedded as produced.
pub(crate) fn create_statement(
    table: &OutputTable,
    keys: &[String],
    filter_clause: &str,
) -> String {
    let mut columns = vec!["osm_id".to_owned()];
    if table.geometry == GeometryType::Polygons {
        columns.push("osm_way_id".to_owned());
    }
    let mut selected: Vec<&str> = Vec::with_capacity(keys.len() + 1);
    for key in keys {
        if !selected.contains(&key.as_str()) {
            selected.push(key);
        }
    }
    if table.geometry == GeometryType::Lines
        && selected.contains(&Z_INDEX_TRIGGER)
        && !selected.contains(&Z_INDEX)
    {
        selected.push(Z_INDEX);
    }
    columns.extend(selected.iter().map(|key| quote_identifier(key)));

    let definitions = columns
        .iter()
        .map(|column| format!("{column} TEXT"))
        .collect::<Vec<_>>()
        .join(",");
    let column_list = columns.join(",");
    let name = &table.table;

    format!(
        "CREATE TABLE {name}(\n\
         fid INTEGER PRIMARY KEY AUTOINCREMENT,\n\
         geom {geometry},\n\
         {definitions}\n\
         );\n\
         INSERT INTO {name}(geom, {column_list}) select geom, {column_list} from {source} WHERE ({filter_clause});\n",
        geometry = table.geometry.column_type(),
        source = table.geometry.source_table(),
    )
}

/// Register a GeoPackage R-tree on the table's geometry column.
pub(crate) fn index_statement(table: &OutputTable) -> String {
    format!("SELECT gpkgAddSpatialIndex('{}', 'geom');", table.table)
}

/// Double-quote a key for use as an SQL identifier.
///
/// Keys never contain quotes, the key grammar rejects them.
pub(crate) fn quote_identifier(key: &str) -> String {
    format!("\"{key}\"")
}
