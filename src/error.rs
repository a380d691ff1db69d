use thiserror::Error;

/// Failure to turn raw input into a [`MetricTable`](crate::MetricTable).
///
/// Both variants are recoverable: the caller keeps its previous table (or an
/// empty placeholder) and shows the message.
#[derive(Debug, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("input is not valid {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },
    #[error("input has the wrong shape: {0}")]
    Schema(#[from] SchemaError),
}

impl TableError {
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    pub const fn is_schema(&self) -> bool {
        matches!(self, Self::Schema(_))
    }
}

impl From<serde_json::Error> for TableError {
    fn from(err: serde_json::Error) -> Self {
        let (line, column) = if err.line() == 0 {
            (None, None)
        } else {
            (Some(err.line()), Some(err.column()))
        };
        Self::Parse {
            format: "JSON",
            message: err.to_string(),
            line,
            column,
        }
    }
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .and_then(|pos| usize::try_from(pos.line()).ok());
        Self::Parse {
            format: "CSV",
            message: err.to_string(),
            line,
            column: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("expected an object mapping column names to value lists")]
    NotAnObject,
    #[error("column '{column}' is not a list of values")]
    ColumnNotArray { column: String },
    #[error("column '{column}' appears more than once")]
    DuplicateColumn { column: String },
    #[error("no metric name column found (expected a 'Metric' column)")]
    MissingMetricColumn,
    #[error("expected at least 2 period columns besides the metric column, found {found}")]
    TooFewPeriods { found: usize },
    #[error("column '{column}' has {found} values but the metric column has {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("row {row} has {found} fields but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("metric name in row {row} is empty or not text")]
    InvalidMetricName { row: usize },
    #[error("value in column '{column}', row {row} is not a number or text")]
    InvalidCell { column: String, row: usize },
    #[error("metric '{name}' appears more than once")]
    DuplicateMetric { name: String },
}
