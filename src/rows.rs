//! Row coercion against a declared schema.
//!
//! [`coerce_row`] turns a raw string row into typed cells. Ingestion is
//! permissive: a cell that does not fit its column type becomes `None`, and a
//! row with too few or too many fields is padded or truncated. Cells whose bytes
//! had to be replaced during decoding keep the substituted text. Any of these
//! marks the row as malformed in the [`ValidationReport`] but never drops it.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::{
    data::{Value, parse_typed_value},
    schema::Schema,
};

const MALFORMED_WARN_LIMIT: usize = 5;

pub type TypedRow = Vec<Option<Value>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub rows_read: usize,
    pub malformed_rows: usize,
    pub ragged_rows: usize,
    pub replaced_cells: usize,
    pub coercion_failures: Vec<usize>,
}

impl ValidationReport {
    pub fn for_schema(schema: &Schema) -> Self {
        Self {
            coercion_failures: vec![0; schema.columns.len()],
            ..Self::default()
        }
    }

    pub fn total_coercion_failures(&self) -> usize {
        self.coercion_failures.iter().sum()
    }

    pub fn log_summary(&self, schema: &Schema) {
        info!(
            "Validated {} row(s): {} malformed ({} ragged, {} value(s) nulled, {} undecodable)",
            self.rows_read,
            self.malformed_rows,
            self.ragged_rows,
            self.total_coercion_failures(),
            self.replaced_cells
        );
        for (column, failures) in schema.columns.iter().zip(&self.coercion_failures) {
            if *failures > 0 {
                debug!(
                    "Column '{}' ({}): {} value(s) could not be coerced",
                    column.name, column.datatype, failures
                );
            }
        }
    }
}

/// Coerces one raw row. `replaced` lists the fields that were decoded with
/// substitutions. `row_number` is the 1-based line in the source and is only
/// used for diagnostics.
pub fn coerce_row(
    schema: &Schema,
    raw: &[String],
    replaced: &[usize],
    row_number: usize,
    report: &mut ValidationReport,
) -> TypedRow {
    report.rows_read += 1;
    report.replaced_cells += replaced.len();
    let ragged = raw.len() != schema.columns.len();
    let mut failures = 0usize;

    let typed = schema
        .columns
        .iter()
        .enumerate()
        .map(|(idx, column)| {
            let value = raw.get(idx).map(|s| s.as_str()).unwrap_or("");
            match parse_typed_value(value, &column.datatype) {
                Ok(parsed) => parsed,
                Err(err) => {
                    failures += 1;
                    if let Some(count) = report.coercion_failures.get_mut(idx) {
                        *count += 1;
                    }
                    debug!("Row {row_number} column '{}': {err}", column.name);
                    None
                }
            }
        })
        .collect();

    if ragged {
        report.ragged_rows += 1;
    }
    if ragged || failures > 0 || !replaced.is_empty() {
        report.malformed_rows += 1;
        if report.malformed_rows <= MALFORMED_WARN_LIMIT {
            warn!(
                "Row {row_number} is malformed ({} field(s), {failures} value(s) nulled, {} undecodable)",
                raw.len(),
                replaced.len()
            );
        } else if report.malformed_rows == MALFORMED_WARN_LIMIT + 1 {
            warn!("Further malformed rows are only reported in the summary");
        }
    }
    typed
}

/// Coerces every row of a raw table. `replaced_cells` maps row indexes to the
/// fields decoded with substitutions. Line numbers assume one header line.
pub fn coerce_rows(
    schema: &Schema,
    raw_rows: &[Vec<String>],
    replaced_cells: &BTreeMap<usize, Vec<usize>>,
) -> (Vec<TypedRow>, ValidationReport) {
    let mut report = ValidationReport::for_schema(schema);
    let first_line = if schema.has_headers { 2 } else { 1 };
    let typed = raw_rows
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let replaced = replaced_cells.get(&idx).map(Vec::as_slice).unwrap_or(&[]);
            coerce_row(schema, raw, replaced, idx + first_line, &mut report)
        })
        .collect();
    (typed, report)
}
