//! Parsing raw column input into an immutable [`MetricTable`].
//!
//! Input is a set of named columns: one column of metric names and two or
//! more period columns. JSON objects keep their key order, so the first two
//! period keys are the compared pair. CSV input uses the header row for the
//! column names and one record per metric.

use crate::error::{SchemaError, TableError};
use crate::formatting::parse_numeral;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use tracing::debug;

const METRIC_COLUMN: &str = "Metric";
const MIN_PERIODS: usize = 2;

/// One cell of a period column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Decimal(f64),
    /// Non-numeric or already formatted text, kept verbatim.
    Text(String),
}

impl CellValue {
    /// Numeric reading of the cell. Text cells are read through
    /// [`parse_numeral`], so `"$1,200"` yields `1200.0`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Decimal(value) => Some(*value),
            Self::Text(text) => parse_numeral(text),
        }
    }

    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Decimal(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricRow {
    name: String,
    values: Vec<CellValue>,
}

impl MetricRow {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values in period-column order.
    pub fn values(&self) -> &[CellValue] {
        &self.values
    }

    /// Values of the two compared periods.
    pub fn compared(&self) -> (&CellValue, &CellValue) {
        (&self.values[0], &self.values[1])
    }
}

/// Validated metric table. Built once per input and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricTable {
    name_label: String,
    periods: Vec<String>,
    rows: Vec<MetricRow>,
    #[serde(skip)]
    index: FxHashMap<String, usize>,
}

impl MetricTable {
    /// Header of the metric name column as it appeared in the input.
    pub fn name_label(&self) -> &str {
        &self.name_label
    }

    /// All period labels in input order.
    pub fn periods(&self) -> &[String] {
        &self.periods
    }

    /// The first two period labels, which are the ones compared.
    pub fn compared_periods(&self) -> (&str, &str) {
        (&self.periods[0], &self.periods[1])
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    /// Row with exactly this metric name.
    pub fn row(&self, name: &str) -> Option<&MetricRow> {
        self.index.get(name).map(|&idx| &self.rows[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Csv,
}

impl InputFormat {
    /// Picks the format from the file extension, falling back to sniffing the
    /// first non-whitespace byte (`{` or `[` means JSON).
    pub fn detect(path: Option<&Path>, bytes: &[u8]) -> Self {
        let extension = path
            .and_then(Path::extension)
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Self::Csv,
            Some("json") => Self::Json,
            _ => match bytes.iter().find(|byte| !byte.is_ascii_whitespace()) {
                Some(b'{' | b'[') => Self::Json,
                _ => Self::Csv,
            },
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Csv => "CSV",
        }
    }
}

/// Parses `bytes` in the given format.
///
/// # Errors
///
/// Returns [`TableError::Parse`] when the bytes are not valid UTF-8 (JSON
/// only) or not well-formed for `format`, and [`TableError::Schema`] when the
/// columns do not describe a metric table. See [`parse_table`] and
/// [`parse_csv_table`].
pub fn parse_input(format: InputFormat, bytes: &[u8]) -> Result<MetricTable, TableError> {
    debug!(format = format.name(), len = bytes.len(), "parsing input");
    match format {
        InputFormat::Json => {
            let text = std::str::from_utf8(bytes).map_err(|err| TableError::Parse {
                format: "JSON",
                message: err.to_string(),
                line: None,
                column: None,
            })?;
            parse_table(text)
        }
        InputFormat::Csv => parse_csv_table(bytes),
    }
}

/// Parses a JSON object of columns, e.g.
/// `{"Metric": ["Sale Volume"], "Jan 2025": [136], "Jan 2026": [132]}`.
///
/// # Errors
///
/// Returns [`TableError::Parse`] for malformed JSON, with the line and column
/// of the first error. Returns [`TableError::Schema`] when the top level is not
/// an object, a key repeats, a column is not a list, or the columns fail the
/// table checks (name column, period count, lengths, names, cells).
pub fn parse_table(raw: &str) -> Result<MetricTable, TableError> {
    let ColumnList(entries) = match serde_json::from_str(raw) {
        Ok(list) => list,
        Err(err) if err.is_data() => return Err(SchemaError::NotAnObject.into()),
        Err(err) => return Err(err.into()),
    };

    let mut columns = Vec::with_capacity(entries.len());
    for (label, column) in entries {
        let Value::Array(cells) = column else {
            return Err(SchemaError::ColumnNotArray { column: label }.into());
        };
        columns.push((label, cells));
    }

    build_table(columns)
}

/// Parses CSV with a header row: first (or `Metric`) column holds names,
/// the remaining columns hold period values.
///
/// # Errors
///
/// Returns [`TableError::Parse`] for unreadable CSV (bad quoting, invalid
/// UTF-8). Returns [`TableError::Schema`] when a header repeats, a record has
/// a different number of fields than the header, or the columns fail the
/// table checks.
pub fn parse_csv_table(raw: &[u8]) -> Result<MetricTable, TableError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw);

    let headers = reader.headers()?.clone();
    let mut columns: Vec<(String, Vec<String>)> = headers
        .iter()
        .map(|header| (header.to_string(), Vec::new()))
        .collect();

    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != columns.len() {
            return Err(SchemaError::RaggedRow {
                row: idx + 1,
                expected: columns.len(),
                found: record.len(),
            }
            .into());
        }
        for ((_, cells), field) in columns.iter_mut().zip(record.iter()) {
            cells.push(field.to_string());
        }
    }

    build_table(columns)
}

/// Top-level JSON object as its entries in document order, repeated keys
/// included, so duplicates can be reported instead of silently merged.
struct ColumnList(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for ColumnList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ColumnListVisitor)
    }
}

struct ColumnListVisitor;

impl<'de> Visitor<'de> for ColumnListVisitor {
    type Value = ColumnList;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an object mapping column names to value lists")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ColumnList, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some(entry) = access.next_entry::<String, serde_json::Value>()? {
            entries.push(entry);
        }
        Ok(ColumnList(entries))
    }
}

/// A cell as it comes out of the raw input, before validation.
trait RawCell: Sized {
    fn as_name(&self) -> Option<&str>;
    fn into_cell(self) -> Option<CellValue>;
}

impl RawCell for Value {
    fn as_name(&self) -> Option<&str> {
        self.as_str()
    }

    fn into_cell(self) -> Option<CellValue> {
        match self {
            Self::Number(number) => number.as_i64().map(CellValue::Integer).or_else(|| {
                number
                    .as_f64()
                    .filter(|value| value.is_finite())
                    .map(CellValue::Decimal)
            }),
            Self::String(text) => Some(CellValue::Text(text)),
            _ => None,
        }
    }
}

impl RawCell for String {
    fn as_name(&self) -> Option<&str> {
        Some(self.as_str())
    }

    fn into_cell(self) -> Option<CellValue> {
        if self.is_empty() {
            return None;
        }
        if let Ok(value) = self.parse::<i64>() {
            return Some(CellValue::Integer(value));
        }
        match self.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(CellValue::Decimal(value)),
            _ => Some(CellValue::Text(self)),
        }
    }
}

fn find_name_column<T: RawCell>(columns: &[(String, Vec<T>)]) -> Option<usize> {
    if let Some(idx) = columns
        .iter()
        .position(|(label, _)| label.trim().eq_ignore_ascii_case(METRIC_COLUMN))
    {
        return Some(idx);
    }
    let (_, first) = columns.first()?;
    first
        .iter()
        .all(|cell| cell.as_name().is_some())
        .then_some(0)
}

fn build_table<T: RawCell>(mut columns: Vec<(String, Vec<T>)>) -> Result<MetricTable, TableError> {
    let mut labels = FxHashSet::default();
    for (label, _) in &columns {
        if !labels.insert(label.as_str()) {
            return Err(SchemaError::DuplicateColumn {
                column: label.clone(),
            }
            .into());
        }
    }

    let name_idx = find_name_column(&columns).ok_or(SchemaError::MissingMetricColumn)?;
    let (name_label, name_cells) = columns.remove(name_idx);

    if columns.len() < MIN_PERIODS {
        return Err(SchemaError::TooFewPeriods {
            found: columns.len(),
        }
        .into());
    }

    let expected = name_cells.len();
    if let Some((label, cells)) = columns.iter().find(|(_, cells)| cells.len() != expected) {
        return Err(SchemaError::RaggedColumns {
            column: label.clone(),
            expected,
            found: cells.len(),
        }
        .into());
    }

    let mut index = FxHashMap::default();
    let mut names = Vec::with_capacity(expected);
    for (row, cell) in name_cells.iter().enumerate() {
        let name = cell
            .as_name()
            .filter(|name| !name.trim().is_empty())
            .ok_or(SchemaError::InvalidMetricName { row: row + 1 })?;
        if index.insert(name.to_string(), row).is_some() {
            return Err(SchemaError::DuplicateMetric {
                name: name.to_string(),
            }
            .into());
        }
        names.push(name.to_string());
    }

    let mut periods = Vec::with_capacity(columns.len());
    let mut period_cells = Vec::with_capacity(columns.len());
    for (label, cells) in columns {
        let mut values = Vec::with_capacity(cells.len());
        for (row, cell) in cells.into_iter().enumerate() {
            let value = cell.into_cell().ok_or_else(|| SchemaError::InvalidCell {
                column: label.clone(),
                row: row + 1,
            })?;
            values.push(value);
        }
        periods.push(label);
        period_cells.push(values.into_iter());
    }

    let rows = names
        .into_iter()
        .map(|name| MetricRow {
            name,
            values: period_cells.iter_mut().filter_map(Iterator::next).collect(),
        })
        .collect();

    debug!(
        name_column = name_label.as_str(),
        periods = ?periods,
        rows = expected,
        "parsed metric table"
    );

    Ok(MetricTable {
        name_label,
        periods,
        rows,
        index,
    })
}
