//! Extraction of centimetre magnitudes from free-text dimension descriptions.

use anyhow::{Context, Result};
use regex::Regex;

const MAGNITUDE: &str = r"[0-9]{1,3}\.[0-9]{1,2}";
const SEPARATOR: &str = " x ";
const UNIT_SUFFIX: &str = " cm";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDimensions {
    pub height: Option<String>,
    pub width: Option<String>,
    pub length: Option<String>,
}

impl ParsedDimensions {
    pub fn is_empty(&self) -> bool {
        self.height.is_none() && self.width.is_none() && self.length.is_none()
    }

    pub fn height_cm(&self) -> Option<f64> {
        as_centimetres(self.height.as_deref())
    }

    pub fn width_cm(&self) -> Option<f64> {
        as_centimetres(self.width.as_deref())
    }

    pub fn length_cm(&self) -> Option<f64> {
        as_centimetres(self.length.as_deref())
    }
}

fn as_centimetres(value: Option<&str>) -> Option<f64> {
    value.and_then(|text| text.trim().parse::<f64>().ok())
}

/// Matches `H x W x L cm` or `H x W cm` anywhere in a description.
///
/// The three-magnitude form is listed first, so when both could start at the
/// same position the longer statement wins. Only the leftmost statement is
/// used.
#[derive(Debug, Clone)]
pub struct DimensionParser {
    pattern: Regex,
}

impl DimensionParser {
    pub fn new() -> Result<Self> {
        let three = format!("{MAGNITUDE} +x {MAGNITUDE} +x {MAGNITUDE}{UNIT_SUFFIX}");
        let two = format!("{MAGNITUDE} +x {MAGNITUDE}{UNIT_SUFFIX}");
        let pattern = Regex::new(&format!("{three}|{two}"))
            .context("Compiling dimension pattern")?;
        Ok(Self { pattern })
    }

    /// Returns the matched statement, unit suffix included.
    pub fn extract<'a>(&self, text: &'a str) -> Option<&'a str> {
        self.pattern.find(text).map(|found| found.as_str())
    }

    pub fn parse(&self, text: &str) -> ParsedDimensions {
        let Some(statement) = self.extract(text) else {
            return ParsedDimensions::default();
        };
        let magnitudes = statement.strip_suffix(UNIT_SUFFIX).unwrap_or(statement);
        let mut parts = magnitudes.split(SEPARATOR).map(str::to_string);
        ParsedDimensions {
            height: parts.next(),
            width: parts.next(),
            length: parts.next(),
        }
    }

    pub fn parse_field(&self, field: Option<&str>) -> ParsedDimensions {
        field.map(|text| self.parse(text)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> DimensionParser {
        DimensionParser::new().expect("pattern compiles")
    }

    fn dims(h: Option<&str>, w: Option<&str>, l: Option<&str>) -> ParsedDimensions {
        ParsedDimensions {
            height: h.map(str::to_string),
            width: w.map(str::to_string),
            length: l.map(str::to_string),
        }
    }

    #[test]
    fn three_magnitudes_fill_every_slot() {
        assert_eq!(
            parser().parse("10.5 x 20.25 x 5.0 cm"),
            dims(Some("10.5"), Some("20.25"), Some("5.0"))
        );
    }

    #[test]
    fn two_magnitudes_leave_length_absent() {
        assert_eq!(
            parser().parse("10.5 x 20.25 cm"),
            dims(Some("10.5"), Some("20.25"), None)
        );
    }

    #[test]
    fn unrecognized_text_is_empty() {
        let parsed = parser().parse("irregular shape");
        assert!(parsed.is_empty());
        assert!(parser().parse("10 x 20 cm").is_empty());
        assert!(parser().parse_field(None).is_empty());
    }

    #[test]
    fn annotation_around_the_statement_is_ignored() {
        let text = "H. 4 1/8 in. (10.48 x 3.2 cm); Diam. of base";
        assert_eq!(parser().parse(text), dims(Some("10.48"), Some("3.2"), None));
    }

    #[test]
    fn first_statement_wins() {
        let text = "Frame: 45.72 x 30.48 x 2.54 cm; Image: 40.01 x 25.4 cm";
        assert_eq!(
            parser().parse(text),
            dims(Some("45.72"), Some("30.48"), Some("2.54"))
        );
        let text = "Image: 40.01 x 25.4 cm; Frame: 45.72 x 30.48 x 2.54 cm";
        assert_eq!(parser().parse(text), dims(Some("40.01"), Some("25.4"), None));
    }

    #[test]
    fn magnitude_digits_are_bounded() {
        // Four integer digits: the match starts inside the number.
        assert_eq!(
            parser().parse("1234.5 x 20.25 cm"),
            dims(Some("234.5"), Some("20.25"), None)
        );
        // Three fractional digits cannot be followed by the separator.
        assert!(parser().parse("10.555 x 20.25 cm").is_empty());
    }

    #[test]
    fn numeric_views_parse_text_slots() {
        let parsed = parser().parse("10.5 x 20.25 cm");
        assert_eq!(parsed.height_cm(), Some(10.5));
        assert_eq!(parsed.width_cm(), Some(20.25));
        assert_eq!(parsed.length_cm(), None);
    }
}
