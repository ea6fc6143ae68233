//! Country field splitting and the grouping key it produces.

use std::fmt;

use anyhow::{Context, Result};
use regex::Regex;

/// Standalone word `or` together with the whitespace around it, or a bare pipe.
const COUNTRY_DELIMITER: &str = r"\s*\bor\b\s*|\|";

/// Ordered list of country tokens used as the key of every aggregate.
///
/// Equality, hashing and ordering are by value over the token sequence, so
/// `["France", "Italy"]` and `["Italy", "France"]` are different groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryKey(Box<[String]>);

impl CountryKey {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CountryKey(tokens.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Renders as a JSON array so `[]`, `[""]` and `["a","b"]` stay distinct in
/// delimited output.
impl fmt::Display for CountryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens = serde_json::Value::from(self.0.to_vec());
        write!(f, "{tokens}")
    }
}

#[derive(Debug, Clone)]
pub struct CountrySplitter {
    delimiter: Regex,
}

impl CountrySplitter {
    pub fn new() -> Result<Self> {
        let delimiter = Regex::new(COUNTRY_DELIMITER).context("Compiling country delimiter")?;
        Ok(Self { delimiter })
    }

    /// Splits without trimming, case folding or deduplication. Empty tokens
    /// from adjacent or trailing delimiters are kept.
    pub fn split(&self, text: &str) -> CountryKey {
        CountryKey::new(self.delimiter.split(text))
    }

    /// A missing field is the empty key, which is a group of its own.
    pub fn key_for(&self, field: Option<&str>) -> CountryKey {
        field.map(|text| self.split(text)).unwrap_or_default()
    }
}
