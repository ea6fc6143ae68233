//! The cleaning stage: parse dimensions, split countries, impute identifiers.

use anyhow::{Context, Result};
use log::info;

use crate::{
    cli::CleanArgs,
    country::{CountryKey, CountrySplitter},
    data::Value,
    dimensions::{DimensionParser, ParsedDimensions},
    impute::{FillInput, impute_constituent_ids},
    io_utils, pipeline,
    rows::TypedRow,
    schema::{self, Schema, SchemaError},
};

pub const CLEANED_HEADERS: &[&str] = &[
    schema::OBJECT_ID,
    schema::TITLE,
    schema::CONSTITUENT_ID,
    "Constituent ID_cleaned",
    schema::DIMENSIONS,
    "height_col",
    "width_col",
    "length_col",
    schema::COUNTRY,
    "Country_cleaned",
    schema::ARTIST_DISPLAY_NAME,
];

/// Positions of the columns the cleaning stage reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    object_id: usize,
    title: usize,
    constituent_id: usize,
    artist_display_name: usize,
    dimensions: usize,
    country: usize,
}

impl RecordLayout {
    pub fn resolve(schema: &Schema) -> Result<Self, SchemaError> {
        let [
            object_id,
            title,
            constituent_id,
            artist_display_name,
            dimensions,
            country,
        ] = schema.require_columns(&schema::REQUIRED_COLUMNS)?;
        Ok(Self {
            object_id,
            title,
            constituent_id,
            artist_display_name,
            dimensions,
            country,
        })
    }

    pub fn project(&self, row: &TypedRow) -> ObjectRecord {
        let cell = |idx: usize| row.get(idx).cloned().flatten();
        ObjectRecord {
            object_id: cell(self.object_id).and_then(|v| v.as_integer()),
            title: cell(self.title).map(Value::into_text),
            constituent_id: cell(self.constituent_id).and_then(|v| v.as_integer()),
            artist_display_name: cell(self.artist_display_name).map(Value::into_text),
            dimensions: cell(self.dimensions).map(Value::into_text),
            country: cell(self.country).map(Value::into_text),
        }
    }
}

/// The fields of a validated record that the pipeline works with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectRecord {
    pub object_id: Option<i64>,
    pub title: Option<String>,
    pub constituent_id: Option<i64>,
    pub artist_display_name: Option<String>,
    pub dimensions: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub record: ObjectRecord,
    pub parsed_dimensions: ParsedDimensions,
    pub country_key: CountryKey,
    pub constituent_id_cleaned: Option<i64>,
}

impl CleanedRecord {
    pub fn to_row(&self) -> Vec<String> {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        let number = |value: Option<i64>| value.map(|v| v.to_string()).unwrap_or_default();
        vec![
            number(self.record.object_id),
            text(&self.record.title),
            number(self.record.constituent_id),
            number(self.constituent_id_cleaned),
            text(&self.record.dimensions),
            text(&self.parsed_dimensions.height),
            text(&self.parsed_dimensions.width),
            text(&self.parsed_dimensions.length),
            text(&self.record.country),
            self.country_key.to_string(),
            text(&self.record.artist_display_name),
        ]
    }
}

/// Produces the cleaned table in input order. The input is left untouched.
pub fn clean_records(
    records: &[ObjectRecord],
    dimensions: &DimensionParser,
    countries: &CountrySplitter,
) -> Vec<CleanedRecord> {
    let fill_inputs = records
        .iter()
        .map(|record| FillInput {
            title: record.title.as_deref(),
            object_id: record.object_id,
            constituent_id: record.constituent_id,
        })
        .collect::<Vec<_>>();
    let filled = impute_constituent_ids(&fill_inputs);

    let cleaned = records
        .iter()
        .zip(filled)
        .map(|(record, constituent_id_cleaned)| CleanedRecord {
            record: record.clone(),
            parsed_dimensions: dimensions.parse_field(record.dimensions.as_deref()),
            country_key: countries.key_for(record.country.as_deref()),
            constituent_id_cleaned,
        })
        .collect::<Vec<_>>();

    let parsed = cleaned
        .iter()
        .filter(|c| !c.parsed_dimensions.is_empty())
        .count();
    let imputed = cleaned
        .iter()
        .filter(|c| c.record.constituent_id.is_none() && c.constituent_id_cleaned.is_some())
        .count();
    let without_country = cleaned.iter().filter(|c| c.country_key.is_empty()).count();
    info!(
        "Cleaned {} record(s): {} with parsed dimensions, {} constituent id(s) imputed, {} without country",
        cleaned.len(),
        parsed,
        imputed,
        without_country
    );
    cleaned
}

pub fn execute(args: &CleanArgs) -> Result<()> {
    let context = pipeline::load_context(args.source.schema.as_deref())?;
    let raw = context.read(&args.source)?;
    let validated = context.validate(&raw);
    let cleaned = context.clean(&validated);

    let input_delimiter =
        io_utils::resolve_input_delimiter(&args.source.input, args.source.delimiter);
    let output_path = args.output.as_deref();
    let delimiter =
        io_utils::resolve_output_delimiter(output_path, args.output_delimiter, input_delimiter);
    let mut writer = io_utils::open_csv_writer(output_path, delimiter)?;
    writer
        .write_record(CLEANED_HEADERS)
        .context("Writing output headers")?;
    for (idx, record) in cleaned.iter().enumerate() {
        writer
            .write_record(record.to_row())
            .with_context(|| format!("Writing cleaned row {}", idx + 1))?;
    }
    writer.flush().context("Flushing output writer")?;

    let destination = output_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "stdout".to_string());
    info!("Wrote {} cleaned record(s) -> {}", cleaned.len(), destination);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(object_id: i64, title: &str, constituent_id: Option<i64>) -> ObjectRecord {
        ObjectRecord {
            object_id: Some(object_id),
            title: Some(title.to_string()),
            constituent_id,
            ..ObjectRecord::default()
        }
    }

    #[test]
    fn layout_requires_every_pipeline_column() {
        assert!(RecordLayout::resolve(&Schema::met_objects()).is_ok());
        for required in schema::REQUIRED_COLUMNS {
            let mut schema = Schema::met_objects();
            schema.columns.retain(|c| c.name != required);
            assert_eq!(
                RecordLayout::resolve(&schema).unwrap_err(),
                SchemaError::MissingColumn(required.to_string())
            );
        }
    }

    #[test]
    fn project_reads_typed_cells_by_position() {
        let schema = Schema::met_objects();
        let layout = RecordLayout::resolve(&schema).unwrap();
        let mut row: TypedRow = vec![None; schema.columns.len()];
        row[schema.column_index("Object ID").unwrap()] = Some(Value::Integer(11));
        row[schema.column_index("Title").unwrap()] = Some(Value::String("Vase A".into()));
        row[schema.column_index("Country").unwrap()] = Some(Value::String("Egypt".into()));
        let projected = layout.project(&row);
        assert_eq!(projected.object_id, Some(11));
        assert_eq!(projected.title.as_deref(), Some("Vase A"));
        assert_eq!(projected.country.as_deref(), Some("Egypt"));
        assert_eq!(projected.constituent_id, None);
    }

    #[test]
    fn clean_records_derives_every_column() {
        let dimensions = DimensionParser::new().unwrap();
        let countries = CountrySplitter::new().unwrap();
        let mut first = record(1, "Vase A", None);
        first.dimensions = Some("H. 10.5 x 20.25 cm".into());
        first.country = Some("France or Italy".into());
        let records = vec![first, record(2, "Vase A", Some(7)), record(3, "Vase A", None)];

        let cleaned = clean_records(&records, &dimensions, &countries);
        assert_eq!(cleaned.len(), 3);
        assert!(cleaned.iter().all(|c| c.constituent_id_cleaned == Some(7)));
        assert_eq!(cleaned[0].parsed_dimensions.height.as_deref(), Some("10.5"));
        assert_eq!(
            cleaned[0].country_key,
            CountryKey::new(["France", "Italy"])
        );
        assert!(cleaned[1].country_key.is_empty());
        assert_eq!(records[0].constituent_id, None);
    }

    #[test]
    fn cleaned_rows_line_up_with_headers() {
        let dimensions = DimensionParser::new().unwrap();
        let countries = CountrySplitter::new().unwrap();
        let cleaned = clean_records(&[record(5, "Cup", Some(2))], &dimensions, &countries);
        let row = cleaned[0].to_row();
        assert_eq!(row.len(), CLEANED_HEADERS.len());
        assert_eq!(row[0], "5");
        assert_eq!(row[3], "2");
        assert_eq!(row[9], "[]");
    }
}
