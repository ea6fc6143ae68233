//! Writes finished aggregate tables to an output directory.
//!
//! Every table is rendered to memory first, so nothing reaches the directory
//! until all of them serialized cleanly. Alongside the tables a
//! `manifest.json` records row counts and SHA-256 digests; it carries no
//! timestamps, so an unchanged input reproduces the directory byte for byte.

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::{aggregate::AggregateTable, io_utils, rows::ValidationReport};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenTable {
    pub file: String,
    pub rows: usize,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunManifest {
    pub rows_read: usize,
    pub rows_malformed: usize,
    pub tables: Vec<WrittenTable>,
}

pub fn render_table(table: &AggregateTable, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = io_utils::csv_writer(Vec::new(), delimiter);
    writer
        .write_record(&table.headers)
        .with_context(|| format!("Writing header for {}", table.name))?;
    for (idx, row) in table.rows.iter().enumerate() {
        writer
            .write_record(row)
            .with_context(|| format!("Writing row {} of {}", idx + 1, table.name))?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing {}: {}", table.name, err.error()))
}

pub fn write_tables(
    out_dir: &Path,
    tables: &[AggregateTable],
    report: &ValidationReport,
    delimiter: u8,
) -> Result<RunManifest> {
    let rendered = tables
        .iter()
        .map(|table| render_table(table, delimiter).map(|bytes| (table, bytes)))
        .collect::<Result<Vec<_>>>()?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Creating output directory {out_dir:?}"))?;

    let mut written = Vec::with_capacity(rendered.len());
    for (table, bytes) in rendered {
        let file = table.file_name();
        let path = out_dir.join(&file);
        fs::write(&path, &bytes).with_context(|| format!("Writing table to {path:?}"))?;
        let sha256 = format!("{:x}", Sha256::digest(&bytes));
        debug!("{file}: {} row(s), sha256 {sha256}", table.rows.len());
        written.push(WrittenTable {
            file,
            rows: table.rows.len(),
            sha256,
        });
    }

    let manifest = RunManifest {
        rows_read: report.rows_read,
        rows_malformed: report.malformed_rows,
        tables: written,
    };
    let manifest_path = out_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest).context("Serializing run manifest")?;
    fs::write(&manifest_path, json)
        .with_context(|| format!("Writing manifest to {manifest_path:?}"))?;
    info!(
        "Wrote {} table(s) and {} to {:?}",
        manifest.tables.len(),
        MANIFEST_FILE,
        out_dir
    );
    Ok(manifest)
}
