//! Declared column layout for a museum-object export.
//!
//! A [`Schema`] is an ordered list of [`ColumnMeta`] entries, each naming a
//! column and its primitive [`ColumnType`]. Every column is nullable. The
//! built-in [`Schema::met_objects`] layout mirrors the public MetObjects
//! export; other layouts can be loaded from YAML.

use std::{fmt, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const OBJECT_ID: &str = "Object ID";
pub const TITLE: &str = "Title";
pub const CONSTITUENT_ID: &str = "Constituent ID";
pub const ARTIST_DISPLAY_NAME: &str = "Artist Display Name";
pub const DIMENSIONS: &str = "Dimensions";
pub const COUNTRY: &str = "Country";

/// Columns the cleaning stages read; a schema without them cannot drive a run.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    OBJECT_ID,
    TITLE,
    CONSTITUENT_ID,
    ARTIST_DISPLAY_NAME,
    DIMENSIONS,
    COUNTRY,
];

const MET_OBJECTS_COLUMNS: &[(&str, ColumnType)] = &[
    ("Object Number", ColumnType::Integer),
    ("Is Highlight", ColumnType::Boolean),
    ("Is Timeline Work", ColumnType::Boolean),
    ("Is Public Domain", ColumnType::Boolean),
    (OBJECT_ID, ColumnType::Integer),
    ("Gallery Number", ColumnType::String),
    ("Department", ColumnType::String),
    ("AccessionYear", ColumnType::Float),
    ("Object Name", ColumnType::String),
    (TITLE, ColumnType::String),
    ("Culture", ColumnType::String),
    ("Period", ColumnType::String),
    ("Dynasty", ColumnType::String),
    ("Reign", ColumnType::String),
    ("Portfolio", ColumnType::String),
    (CONSTITUENT_ID, ColumnType::Integer),
    ("Artist Role", ColumnType::String),
    ("Artist Prefix", ColumnType::String),
    (ARTIST_DISPLAY_NAME, ColumnType::String),
    ("Artist Display Bio", ColumnType::String),
    ("Artist Suffix", ColumnType::String),
    ("Artist Alpha Sort", ColumnType::String),
    ("Artist Nationality", ColumnType::String),
    ("Artist Begin Date", ColumnType::Integer),
    ("Artist End Date", ColumnType::Integer),
    ("Artist Gender", ColumnType::String),
    ("Artist ULAN URL", ColumnType::Integer),
    ("Artist Wikidata URL", ColumnType::String),
    ("Object Date", ColumnType::Integer),
    ("Object Begin Date", ColumnType::Integer),
    ("Object End Date", ColumnType::Integer),
    ("Medium", ColumnType::String),
    (DIMENSIONS, ColumnType::String),
    ("Credit Line", ColumnType::String),
    ("Geography Type", ColumnType::String),
    ("City", ColumnType::String),
    ("State", ColumnType::String),
    ("County", ColumnType::String),
    (COUNTRY, ColumnType::String),
    ("Region", ColumnType::String),
    ("Subregion", ColumnType::String),
    ("Locale", ColumnType::String),
    ("Locus", ColumnType::String),
    ("Excavation", ColumnType::String),
    ("River", ColumnType::String),
    ("Classification", ColumnType::String),
    ("Rights and Reproduction", ColumnType::String),
    ("Link Resource", ColumnType::Integer),
    ("Object Wikidata URL", ColumnType::String),
    ("Metadata Date", ColumnType::String),
    ("Repository", ColumnType::String),
    ("Tags", ColumnType::String),
    ("Tags AAT URL", ColumnType::String),
    ("Tags Wikidata URL", ColumnType::String),
];

/// Structural problems that make an input unusable. These abort a run before
/// any aggregate is produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Header length mismatch: schema expects {expected} column(s) but file contains {found}")]
    HeaderLength { expected: usize, found: usize },
    #[error("Header mismatch at position {position}: expected '{expected}' but found '{found}'")]
    HeaderName {
        position: usize,
        expected: String,
        found: String,
    },
    #[error("Schema does not declare required column '{0}'")]
    MissingColumn(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub datatype: ColumnType,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Schema {
    pub columns: Vec<ColumnMeta>,
    #[serde(default = "Schema::default_has_headers")]
    pub has_headers: bool,
}

impl Schema {
    pub fn met_objects() -> Self {
        let columns = MET_OBJECTS_COLUMNS
            .iter()
            .map(|(name, datatype)| ColumnMeta {
                name: (*name).to_string(),
                datatype: *datatype,
            })
            .collect();
        Schema {
            columns,
            has_headers: true,
        }
    }

    pub const fn default_has_headers() -> bool {
        true
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, SchemaError> {
        self.column_index(name)
            .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
    }

    /// Positions of `names`, in the order given.
    pub fn require_columns<const N: usize>(
        &self,
        names: &[&str; N],
    ) -> Result<[usize; N], SchemaError> {
        let mut positions = [0; N];
        for (slot, name) in positions.iter_mut().zip(names) {
            *slot = self.require_column(name)?;
        }
        Ok(positions)
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Headers must match the declared columns by position and name.
    pub fn validate_headers(&self, headers: &[String]) -> Result<(), SchemaError> {
        if headers.len() != self.columns.len() {
            return Err(SchemaError::HeaderLength {
                expected: self.columns.len(),
                found: headers.len(),
            });
        }
        for (idx, (column, header)) in self.columns.iter().zip(headers).enumerate() {
            if column.name != *header {
                return Err(SchemaError::HeaderName {
                    position: idx + 1,
                    expected: column.name.clone(),
                    found: header.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing schema to YAML string")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating schema file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing schema YAML")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening schema file {path:?}"))?;
        let reader = BufReader::new(file);
        let schema: Schema = serde_yaml::from_reader(reader).context("Parsing schema YAML")?;
        Ok(schema)
    }
}
