use crate::metrics::MetricClass;
use crate::table::CellValue;

/// Table-cell text for a metric value.
///
/// Only numeric cells are formatted; text cells come back unchanged so an
/// already formatted value is never formatted twice.
pub fn format_cell(class: Option<MetricClass>, cell: &CellValue) -> String {
    match (class, cell) {
        (_, CellValue::Text(text)) => text.clone(),
        (Some(MetricClass::Price), CellValue::Integer(value)) => format_price_int(*value),
        (Some(MetricClass::Price), CellValue::Decimal(value)) => format_price(*value),
        (Some(MetricClass::Percentage), numeric) => format!("{numeric}%"),
        (_, numeric) => numeric.to_string(),
    }
}

/// `1364747.0` → `$1,364,747`.
pub fn format_price(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(&digits))
}

fn format_price_int(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let digits = value.unsigned_abs().to_string();
    format!("{sign}${}", group_thousands(&digits))
}

/// Chart label for prices, in millions: `1313103.0` → `$1.31M`.
pub fn format_price_axis(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    // Sign follows the rounded amount so tiny negatives print as `$0.00M`.
    let millions = (value / 10_000.0).round() / 100.0;
    if millions < 0.0 {
        format!("-${:.2}M", millions.abs())
    } else {
        format!("${:.2}M", millions.abs())
    }
}

/// Bar label for a plotted value.
pub fn format_chart_value(class: MetricClass, value: f64) -> String {
    match class {
        MetricClass::Price => format_price_axis(value),
        MetricClass::Percentage => format!("{}%", format_number(value)),
        MetricClass::Volume | MetricClass::Ratio => format_number(value),
    }
}

/// Whole numbers without a fractional part, everything else as stored.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "-".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Reads a number out of display text, ignoring `$`, `,`, `%` and spaces.
pub fn parse_numeral(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|ch| !matches!(ch, '$' | ',' | '%') && !ch.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (len - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
