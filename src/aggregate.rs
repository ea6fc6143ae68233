//! Grouped summaries keyed by the country token list.
//!
//! Each table is computed independently from the cleaned records and fully
//! materialized before it is returned. Rows are ordered by their statistic,
//! largest first; ties fall back to the key in ascending order so repeated runs
//! produce identical tables.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
};

use itertools::Itertools;

use crate::{clean::CleanedRecord, country::CountryKey};

pub const KEY_COLUMN: &str = "Country_cleaned";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateTable {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl AggregateTable {
    fn new(name: &str, statistic_headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        let headers = std::iter::once(KEY_COLUMN)
            .chain(statistic_headers.iter().copied())
            .map(str::to_string)
            .collect();
        Self {
            name: name.to_string(),
            headers,
            rows,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn add(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanDimensions {
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub length: Option<f64>,
}

fn group_by_key<'a, T, F>(records: &'a [CleanedRecord], mut fold: F) -> BTreeMap<&'a CountryKey, T>
where
    T: Default,
    F: FnMut(&mut T, &'a CleanedRecord),
{
    let mut groups: BTreeMap<&CountryKey, T> = BTreeMap::new();
    for record in records {
        fold(groups.entry(&record.country_key).or_default(), record);
    }
    groups
}

fn rank_counts(groups: BTreeMap<&CountryKey, usize>) -> Vec<(CountryKey, usize)> {
    groups
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .map(|(key, count)| (key.clone(), count))
        .collect()
}

fn count_rows(ranked: Vec<(CountryKey, usize)>) -> Vec<Vec<String>> {
    ranked
        .into_iter()
        .map(|(key, count)| vec![key.to_string(), count.to_string()])
        .collect()
}

/// Number of records per key.
pub fn object_counts(records: &[CleanedRecord]) -> Vec<(CountryKey, usize)> {
    rank_counts(group_by_key(records, |count: &mut usize, _| *count += 1))
}

/// Number of records per key with an artist display name. Keys whose names are
/// all missing are still listed with zero.
pub fn artist_counts(records: &[CleanedRecord]) -> Vec<(CountryKey, usize)> {
    rank_counts(group_by_key(records, |count: &mut usize, record| {
        if record.record.artist_display_name.is_some() {
            *count += 1;
        }
    }))
}

/// Number of distinct imputed constituent ids per key.
pub fn distinct_constituents(records: &[CleanedRecord]) -> Vec<(CountryKey, usize)> {
    let groups = group_by_key(records, |ids: &mut BTreeSet<i64>, record| {
        ids.extend(record.constituent_id_cleaned);
    });
    rank_counts(
        groups
            .into_iter()
            .map(|(key, ids)| (key, ids.len()))
            .collect(),
    )
}

/// Means of each parsed dimension per key. Absent or non-numeric values do not
/// contribute; a key with none for a column has no mean for it.
pub fn mean_dimensions(records: &[CleanedRecord]) -> Vec<(CountryKey, MeanDimensions)> {
    let groups = group_by_key(
        records,
        |acc: &mut [MeanAccumulator; 3], record| {
            let dims = &record.parsed_dimensions;
            acc[0].add(dims.height_cm());
            acc[1].add(dims.width_cm());
            acc[2].add(dims.length_cm());
        },
    );
    groups
        .into_iter()
        .map(|(key, [height, width, length])| {
            let means = MeanDimensions {
                height: height.mean(),
                width: width.mean(),
                length: length.mean(),
            };
            (key.clone(), means)
        })
        .sorted_by(|a, b| compare_means(&a.1, &b.1).then_with(|| a.0.cmp(&b.0)))
        .collect()
}

/// Larger means first, column by column; a missing mean sorts after any value.
fn compare_means(a: &MeanDimensions, b: &MeanDimensions) -> Ordering {
    let descending = |x: Option<f64>, y: Option<f64>| match (x, y) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    descending(a.height, b.height)
        .then_with(|| descending(a.width, b.width))
        .then_with(|| descending(a.length, b.length))
}

/// `f64` debug formatting always keeps a fractional part (`15.0`) and is the
/// shortest text that reads back to the same value.
pub fn format_mean(value: Option<f64>) -> String {
    value.map(|v| format!("{v:?}")).unwrap_or_default()
}

pub fn object_count_table(records: &[CleanedRecord]) -> AggregateTable {
    AggregateTable::new("table1", &["count"], count_rows(object_counts(records)))
}

pub fn artist_count_table(records: &[CleanedRecord]) -> AggregateTable {
    AggregateTable::new("table2", &["count"], count_rows(artist_counts(records)))
}

pub fn mean_dimension_table(records: &[CleanedRecord]) -> AggregateTable {
    let rows = mean_dimensions(records)
        .into_iter()
        .map(|(key, means)| {
            vec![
                key.to_string(),
                format_mean(means.height),
                format_mean(means.width),
                format_mean(means.length),
            ]
        })
        .collect();
    AggregateTable::new(
        "table3",
        &["avg(height_col)", "avg(width_col)", "avg(length_col)"],
        rows,
    )
}

pub fn distinct_constituent_table(records: &[CleanedRecord]) -> AggregateTable {
    AggregateTable::new(
        "table4",
        &["distinct_Constituent ID"],
        count_rows(distinct_constituents(records)),
    )
}

/// All four tables, in output order.
pub fn build_tables(records: &[CleanedRecord]) -> Vec<AggregateTable> {
    vec![
        object_count_table(records),
        artist_count_table(records),
        mean_dimension_table(records),
        distinct_constituent_table(records),
    ]
}
