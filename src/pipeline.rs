//! Stage orchestration: validate → clean → aggregate → write.
//!
//! [`PipelineContext`] carries the configuration every stage needs (schema,
//! compiled dimension pattern, compiled country delimiter). It holds no run
//! state, so one context can drive any number of runs. Each stage takes the
//! previous stage's table by reference and returns a new one.

use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::{
    aggregate::{self, AggregateTable},
    clean::{self, CleanedRecord, RecordLayout},
    cli::{InputArgs, RunArgs},
    country::CountrySplitter,
    dimensions::DimensionParser,
    io_utils,
    rows::{self, TypedRow, ValidationReport},
    schema::Schema,
    sink,
    source::{self, RawTable},
    table,
};

#[derive(Debug, Clone)]
pub struct PipelineContext {
    schema: Schema,
    layout: RecordLayout,
    dimensions: DimensionParser,
    countries: CountrySplitter,
}

#[derive(Debug, Clone)]
pub struct ValidatedTable {
    pub rows: Vec<TypedRow>,
    pub report: ValidationReport,
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub report: ValidationReport,
    pub cleaned: Vec<CleanedRecord>,
    pub tables: Vec<AggregateTable>,
}

impl PipelineContext {
    pub fn new(schema: Schema) -> Result<Self> {
        let layout = RecordLayout::resolve(&schema).context("Resolving pipeline columns")?;
        Ok(Self {
            schema,
            layout,
            dimensions: DimensionParser::new()?,
            countries: CountrySplitter::new()?,
        })
    }

    pub fn met_objects() -> Result<Self> {
        Self::new(Schema::met_objects())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn validate(&self, raw: &RawTable) -> ValidatedTable {
        let (rows, report) = rows::coerce_rows(&self.schema, &raw.rows, &raw.replaced_cells);
        report.log_summary(&self.schema);
        ValidatedTable { rows, report }
    }

    pub fn clean(&self, validated: &ValidatedTable) -> Vec<CleanedRecord> {
        let records = validated
            .rows
            .iter()
            .map(|row| self.layout.project(row))
            .collect::<Vec<_>>();
        clean::clean_records(&records, &self.dimensions, &self.countries)
    }

    pub fn aggregate(&self, cleaned: &[CleanedRecord]) -> Vec<AggregateTable> {
        let tables = aggregate::build_tables(cleaned);
        for table in &tables {
            info!("Aggregated {}: {} group(s)", table.name, table.rows.len());
        }
        tables
    }

    pub fn run(&self, raw: &RawTable) -> PipelineOutput {
        let validated = self.validate(raw);
        let cleaned = self.clean(&validated);
        let tables = self.aggregate(&cleaned);
        PipelineOutput {
            report: validated.report,
            cleaned,
            tables,
        }
    }

    pub fn read(&self, input: &InputArgs) -> Result<RawTable> {
        let delimiter = io_utils::resolve_input_delimiter(&input.input, input.delimiter);
        let encoding = io_utils::resolve_encoding(input.input_encoding.as_deref())?;
        source::read_raw_table(&input.input, &self.schema, delimiter, encoding)
    }
}

pub fn load_context(schema_path: Option<&Path>) -> Result<PipelineContext> {
    let schema = match schema_path {
        Some(path) => {
            Schema::load(path).with_context(|| format!("Loading schema from {path:?}"))?
        }
        None => Schema::met_objects(),
    };
    PipelineContext::new(schema)
}

pub fn execute(args: &RunArgs) -> Result<()> {
    let context = load_context(args.source.schema.as_deref())?;
    let raw = context.read(&args.source)?;
    let output = context.run(&raw);

    let delimiter = args.output_delimiter.unwrap_or(io_utils::DEFAULT_CSV_DELIMITER);
    let manifest = sink::write_tables(&args.output_dir, &output.tables, &output.report, delimiter)?;

    if args.preview {
        for table in &output.tables {
            println!("{}", table.file_name());
            table::print_table(&table.headers, &table.rows, args.preview_rows);
            println!();
        }
    }
    info!(
        "Pipeline finished: {} record(s) -> {} table(s) in {:?}",
        manifest.rows_read,
        manifest.tables.len(),
        args.output_dir
    );
    Ok(())
}
