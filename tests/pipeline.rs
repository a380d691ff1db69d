use mktdash::formatting::{format_price, parse_numeral};
use mktdash::{
    Axis, CellValue, SchemaError, TableError, build_display_table, build_series, parse_csv_table,
    parse_table,
};

const FULL_TABLE: &str = r#"{
    "Metric": ["Sale Volume", "Avg Sale Price", "Med Sale Price", "New Listings", "SNLR", "Active Listings", "MOI"],
    "Jan 2025": [136, 1364747, 1150000, 310, 44, 402, 2.9],
    "Jan 2026": [132, 1313103, 1105000, 295, 45, 388, 2.7]
}"#;

#[test]
fn worked_example_formats_table_and_chart_labels() {
    let table = parse_table(
        r#"{"Metric": ["Sale Volume", "Avg Sale Price"], "Jan 2025": [136, 1364747], "Jan 2026": [132, 1313103]}"#,
    )
    .unwrap();

    let display = build_display_table(&table);
    let price = display
        .rows
        .iter()
        .find(|row| row.metric == "Avg Sale Price")
        .unwrap();
    assert_eq!(price.period1, "$1,364,747");
    assert_eq!(price.period2, "$1,313,103");

    let series = build_series(&table);
    assert_eq!(series.secondary_axis[0].period1_label, "$1.36M");
    assert_eq!(series.primary_axis[0].metric, "Sale Volume");
}

#[test]
fn display_table_keeps_rows_and_names_and_only_touches_price_and_percentage() {
    let table = parse_table(FULL_TABLE).unwrap();
    let display = build_display_table(&table);

    assert_eq!(display.rows.len(), table.len());
    for (row, source) in display.rows.iter().zip(table.rows()) {
        assert_eq!(row.metric, source.name());
        let (first, _) = source.compared();
        let changed = row.period1 != first.to_string();
        let formatted_class = matches!(
            source.name(),
            "Avg Sale Price" | "Med Sale Price" | "SNLR"
        );
        assert_eq!(changed, formatted_class, "{}", source.name());
    }
}

#[test]
fn series_values_follow_names_not_row_positions() {
    let shuffled = r#"{
        "Metric": ["MOI", "Active Listings", "SNLR", "New Listings", "Med Sale Price", "Avg Sale Price", "Sale Volume"],
        "Jan 2025": [2.9, 402, 44, 310, 1150000, 1364747, 136],
        "Jan 2026": [2.7, 388, 45, 295, 1105000, 1313103, 132]
    }"#;
    let ordered = build_series(&parse_table(FULL_TABLE).unwrap());
    let reordered = build_series(&parse_table(shuffled).unwrap());
    assert_eq!(ordered, reordered);

    let axes: Vec<_> = ordered
        .entries()
        .map(|entry| entry.class.axis())
        .collect();
    let first_secondary = axes
        .iter()
        .position(|axis| *axis == Axis::Secondary)
        .unwrap();
    assert!(axes[..first_secondary].iter().all(|axis| *axis == Axis::Primary));
    assert!(axes[first_secondary..].iter().all(|axis| *axis == Axis::Secondary));
}

#[test]
fn series_is_the_same_for_repeated_rebuilds() {
    let first = build_series(&parse_table(FULL_TABLE).unwrap());
    let second = build_series(&parse_table(FULL_TABLE).unwrap());
    assert_eq!(first, second);
}

#[test]
fn missing_metric_is_left_out_of_the_chart() {
    let table = parse_table(
        r#"{"Metric": ["Sale Volume", "SNLR", "Avg Sale Price"], "A": [10, 40, 900000], "B": [12, 42, 950000]}"#,
    )
    .unwrap();
    let series = build_series(&table);
    let primary: Vec<_> = series
        .primary_axis
        .iter()
        .map(|entry| entry.metric.as_str())
        .collect();
    assert_eq!(primary, vec!["Sale Volume", "SNLR"]);
    assert!(series.entries().all(|entry| entry.metric != "MOI"));
}

#[test]
fn price_format_round_trips_through_numeral() {
    for value in [0_u32, 42, 1_364_747, 1_313_103, 987_654_321] {
        let text = format_price(f64::from(value));
        assert_eq!(parse_numeral(&text), Some(f64::from(value)), "{text}");
    }
}

#[test]
fn malformed_input_never_yields_a_partial_table() {
    for raw in [
        r#"{"Metric": ["Sale Volume"], "Jan 2025": [136, "Jan 2026": [132]}"#,
        r#"{"Metric": ["Sale Volume"] "Jan 2025": [136], "Jan 2026": [132]}"#,
        r#"{"Metric": ["Sale Volume"], "Jan 2025": [136], "Jan 2026": [132]"#,
    ] {
        assert!(matches!(parse_table(raw), Err(TableError::Parse { .. })), "{raw}");
    }
}

#[test]
fn single_period_is_a_schema_error() {
    let err = parse_table(r#"{"Metric": ["Sale Volume"], "Jan 2025": [136]}"#).unwrap_err();
    assert!(matches!(
        err,
        TableError::Schema(SchemaError::TooFewPeriods { found: 1 })
    ));
}

#[test]
fn csv_and_json_inputs_build_the_same_series() {
    let csv = b"Metric,Jan 2025,Jan 2026\n\
Sale Volume,136,132\n\
Avg Sale Price,1364747,1313103\n\
Med Sale Price,1150000,1105000\n\
New Listings,310,295\n\
SNLR,44,45\n\
Active Listings,402,388\n\
MOI,2.9,2.7\n";
    let from_csv = parse_csv_table(csv).unwrap();
    let from_json = parse_table(FULL_TABLE).unwrap();
    assert_eq!(build_series(&from_csv), build_series(&from_json));
    assert_eq!(
        from_csv.row("MOI").unwrap().values()[0],
        CellValue::Decimal(2.9)
    );
}
