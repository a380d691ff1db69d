//! Formatted rows for the table renderer.

use crate::formatting::format_cell;
use crate::metrics::classify;
use crate::table::MetricTable;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub metric: String,
    pub period1: String,
    pub period2: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayTable {
    /// Name column label followed by the two compared period labels.
    pub header: [String; 3],
    pub rows: Vec<DisplayRow>,
}

/// One display row per metric, in input order, with the two compared
/// periods formatted by metric class. Metrics outside the vocabulary are kept
/// and shown as stored.
pub fn build_display_table(table: &MetricTable) -> DisplayTable {
    let (period1, period2) = table.compared_periods();
    let rows = table
        .rows()
        .iter()
        .map(|row| {
            let class = classify(row.name());
            let (first, second) = row.compared();
            DisplayRow {
                metric: row.name().to_string(),
                period1: format_cell(class, first),
                period2: format_cell(class, second),
            }
        })
        .collect();

    DisplayTable {
        header: [
            table.name_label().to_string(),
            period1.to_string(),
            period2.to_string(),
        ],
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::parse_table;

    #[test]
    fn formats_prices_and_percentages_only() {
        let table = parse_table(
            r#"{
                "Metric": ["Sale Volume", "Avg Sale Price", "SNLR", "Days on Market"],
                "Jan 2025": [136, 1364747, 44, 31],
                "Jan 2026": [132, 1313103, 45.5, 28]
            }"#,
        )
        .unwrap();
        let display = build_display_table(&table);
        assert_eq!(display.header, ["Metric", "Jan 2025", "Jan 2026"]);
        let cells: Vec<_> = display
            .rows
            .iter()
            .map(|row| (row.metric.as_str(), row.period1.as_str(), row.period2.as_str()))
            .collect();
        assert_eq!(
            cells,
            vec![
                ("Sale Volume", "136", "132"),
                ("Avg Sale Price", "$1,364,747", "$1,313,103"),
                ("SNLR", "44%", "45.5%"),
                ("Days on Market", "31", "28"),
            ]
        );
    }

    #[test]
    fn empty_table_has_header_only() {
        let table = parse_table(r#"{"Metric": [], "A": [], "B": []}"#).unwrap();
        let display = build_display_table(&table);
        assert!(display.rows.is_empty());
        assert_eq!(display.header[2], "B");
    }
}
