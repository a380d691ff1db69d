//! Two-period market metric comparison.
//!
//! Raw column input is parsed into an immutable [`MetricTable`], which the
//! pure builders turn into a formatted [`DisplayTable`] and axis-grouped
//! [`ComparisonSeries`] for table and chart renderers.

pub mod display;
pub mod error;
pub mod formatting;
pub mod metrics;
pub mod series;
pub mod table;

pub use display::{DisplayRow, DisplayTable, build_display_table};
pub use error::{SchemaError, TableError};
pub use metrics::{Axis, KNOWN_METRICS, MetricClass, classify, select};
pub use series::{AxisScale, ComparisonSeries, SeriesEntry, build_series};
pub use table::{
    CellValue, InputFormat, MetricRow, MetricTable, parse_csv_table, parse_input, parse_table,
};
