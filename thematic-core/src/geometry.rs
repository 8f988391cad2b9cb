//! Geometry types a theme can be exported as.
//!
//! Each variant maps onto a physical source table produced by the OSM
//! GeoPackage importer and onto the column type used for the output table.
//!
//! # Examples
//! ```
//! use thematic_core::GeometryType;
//!
//! assert_eq!(GeometryType::Polygons.as_str(), "polygons");
//! assert_eq!(GeometryType::Polygons.source_table(), "multipolygons");
//! assert_eq!(GeometryType::Lines.to_string(), "lines");
//! ```

use serde::Serialize;

/// Logical geometry type selected by a theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeometryType {
    /// Nodes rendered as points.
    Points,
    /// Open ways rendered as line strings.
    Lines,
    /// Closed ways and multipolygon relations.
    Polygons,
}

impl GeometryType {
    /// Every geometry type in canonical order.
    pub const ALL: [Self; 3] = [Self::Points, Self::Lines, Self::Polygons];

    /// Return the geometry type as a lowercase `&str`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Lines => "lines",
            Self::Polygons => "polygons",
        }
    }

    /// Name of the source table holding features of this type.
    #[must_use]
    pub const fn source_table(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Lines => "lines",
            Self::Polygons => "multipolygons",
        }
    }

    /// Column type declared for the `geom` column of an output table.
    #[must_use]
    pub const fn column_type(self) -> &'static str {
        match self {
            Self::Points => "POINT",
            Self::Lines => "MULTILINESTRING",
            Self::Polygons => "MULTIPOLYGON",
        }
    }
}

impl std::fmt::Display for GeometryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GeometryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "points" => Ok(Self::Points),
            "lines" => Ok(Self::Lines),
            "polygons" => Ok(Self::Polygons),
            _ => Err(format!("unknown geometry type '{s}'")),
        }
    }
}
