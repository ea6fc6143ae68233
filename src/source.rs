use std::{collections::BTreeMap, io::Read, path::Path};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use log::{info, warn};

use crate::{io_utils, schema::Schema};

/// Text rows as they came out of the delimited source, before type coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Row index to the field positions whose bytes did not decode and were
    /// replaced with U+FFFD.
    pub replaced_cells: BTreeMap<usize, Vec<usize>>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Reads every row of `path`. An unreadable file or a header row that does not
/// decode or match the schema aborts the read. Undecodable bytes in data rows
/// are substituted and recorded in [`RawTable::replaced_cells`].
pub fn read_raw_table(
    path: &Path,
    schema: &Schema,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<RawTable> {
    let reader = io_utils::open_csv_reader_from_path(path, delimiter, schema.has_headers)?;
    let table = read_from_csv(reader, schema, encoding)
        .with_context(|| format!("Reading records from {path:?}"))?;
    info!(
        "Read {} record(s) from '{}' (delimiter '{}')",
        table.len(),
        path.display(),
        io_utils::printable_delimiter(delimiter)
    );
    Ok(table)
}

pub fn read_raw_from_reader<R: Read>(
    reader: R,
    schema: &Schema,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<RawTable> {
    let reader = io_utils::open_csv_reader(reader, delimiter, schema.has_headers);
    read_from_csv(reader, schema, encoding)
}

fn read_from_csv<R: Read>(
    mut reader: csv::Reader<R>,
    schema: &Schema,
    encoding: &'static Encoding,
) -> Result<RawTable> {
    let headers = if schema.has_headers {
        let headers = io_utils::reader_headers(&mut reader, encoding)?;
        schema
            .validate_headers(&headers)
            .context("Validating headers against schema")?;
        headers
    } else {
        schema.headers()
    };

    let first_line = if schema.has_headers { 2 } else { 1 };
    let mut rows = Vec::new();
    let mut replaced_cells = BTreeMap::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", idx + first_line))?;
        let (decoded, replaced) = io_utils::decode_record_lossy(&record, encoding);
        if !replaced.is_empty() {
            replaced_cells.insert(idx, replaced);
        }
        rows.push(decoded);
    }
    if !replaced_cells.is_empty() {
        warn!(
            "{} row(s) contained bytes invalid for {}; replaced with U+FFFD",
            replaced_cells.len(),
            encoding.name()
        );
    }
    Ok(RawTable {
        headers,
        rows,
        replaced_cells,
    })
}
