//! Plot-ready comparison series, grouped by axis.
//!
//! Entries follow the fixed chart order from [`KNOWN_METRICS`](crate::metrics::KNOWN_METRICS),
//! never the input row order, and are keyed by metric name.

use crate::formatting::{format_chart_value, format_number, format_price_axis};
use crate::metrics::{Axis, MetricClass, classify, metrics_for_axis, select};
use crate::table::{MetricRow, MetricTable};
use serde::Serialize;
use tracing::debug;

const TARGET_TICKS: f64 = 5.0;
const MAX_TICKS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesEntry {
    pub metric: String,
    pub class: MetricClass,
    pub period1_value: f64,
    pub period2_value: f64,
    pub period1_label: String,
    pub period2_label: String,
}

impl SeriesEntry {
    pub fn max_value(&self) -> f64 {
        self.period1_value.max(self.period2_value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonSeries {
    pub periods: [String; 2],
    pub primary_axis: Vec<SeriesEntry>,
    pub secondary_axis: Vec<SeriesEntry>,
}

impl ComparisonSeries {
    pub fn axis(&self, axis: Axis) -> &[SeriesEntry] {
        match axis {
            Axis::Primary => &self.primary_axis,
            Axis::Secondary => &self.secondary_axis,
        }
    }

    /// Primary entries followed by secondary entries.
    pub fn entries(&self) -> impl Iterator<Item = &SeriesEntry> {
        self.primary_axis.iter().chain(&self.secondary_axis)
    }

    pub fn is_empty(&self) -> bool {
        self.primary_axis.is_empty() && self.secondary_axis.is_empty()
    }

    /// Independent scale for one axis, `None` when nothing is plotted on it.
    pub fn axis_scale(&self, axis: Axis) -> Option<AxisScale> {
        let entries = self.axis(axis);
        if entries.is_empty() {
            return None;
        }
        let largest = entries
            .iter()
            .map(SeriesEntry::max_value)
            .fold(0.0_f64, f64::max);
        Some(AxisScale::covering(axis, largest))
    }
}

/// Linear axis from zero with "nice" (1, 2 or 5 × 10ⁿ) tick spacing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisScale {
    pub axis: Axis,
    pub max: f64,
    pub step: f64,
}

impl AxisScale {
    pub fn covering(axis: Axis, largest: f64) -> Self {
        let upper = if largest.is_finite() && largest > 0.0 {
            largest
        } else {
            1.0
        };
        let step = match nice_step(upper / TARGET_TICKS) {
            step if step.is_finite() && step > 0.0 => step,
            _ => upper,
        };
        // Rounding up to a whole step can overflow near f64::MAX.
        let max = match (upper / step).ceil() * step {
            max if max.is_finite() => max,
            _ => upper,
        };
        Self { axis, max, step }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn ticks(&self) -> Vec<f64> {
        let count = ((self.max / self.step).round() as usize).min(MAX_TICKS);
        (0..=count)
            .map(|idx| idx as f64 * self.step)
            .take_while(|tick| tick.is_finite())
            .collect()
    }

    /// Fraction of the axis height covered by `value`, clamped to `0..=1`.
    pub fn fraction(&self, value: f64) -> f64 {
        (value / self.max).clamp(0.0, 1.0)
    }

    pub fn tick_label(&self, value: f64) -> String {
        match self.axis {
            Axis::Primary => format_number(value),
            Axis::Secondary => format_price_axis(value),
        }
    }
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10_f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Groups the known metrics present in `table` into primary and secondary
/// axis series for the two compared periods.
pub fn build_series(table: &MetricTable) -> ComparisonSeries {
    let (period1, period2) = table.compared_periods();
    ComparisonSeries {
        periods: [period1.to_string(), period2.to_string()],
        primary_axis: collect_axis(table, Axis::Primary),
        secondary_axis: collect_axis(table, Axis::Secondary),
    }
}

fn collect_axis(table: &MetricTable, axis: Axis) -> Vec<SeriesEntry> {
    select(table, metrics_for_axis(axis))
        .into_iter()
        .filter_map(|row| {
            let class = classify(row.name())?;
            series_entry(row, class)
        })
        .collect()
}

fn series_entry(row: &MetricRow, class: MetricClass) -> Option<SeriesEntry> {
    let (first, second) = row.compared();
    let (Some(period1_value), Some(period2_value)) = (first.as_f64(), second.as_f64()) else {
        debug!(
            metric = row.name(),
            "skipping metric without numeric values for both periods"
        );
        return None;
    };
    Some(SeriesEntry {
        metric: row.name().to_string(),
        class,
        period1_value,
        period2_value,
        period1_label: format_chart_value(class, period1_value),
        period2_label: format_chart_value(class, period2_value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::parse_table;

    fn names(entries: &[SeriesEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.metric.as_str()).collect()
    }

    #[test]
    fn groups_by_axis_in_chart_order() {
        let table = parse_table(
            r#"{
                "Metric": ["Med Sale Price", "MOI", "Sale Volume", "Avg Sale Price", "New Listings", "SNLR", "Active Listings", "Pending"],
                "Jan 2025": [1150000, 2.9, 136, 1364747, 310, 44, 402, 12],
                "Jan 2026": [1105000, 2.7, 132, 1313103, 295, 45, 388, 14]
            }"#,
        )
        .unwrap();
        let series = build_series(&table);
        assert_eq!(series.periods, ["Jan 2025", "Jan 2026"]);
        assert_eq!(
            names(&series.primary_axis),
            vec!["Sale Volume", "New Listings", "Active Listings", "SNLR", "MOI"]
        );
        assert_eq!(
            names(&series.secondary_axis),
            vec!["Avg Sale Price", "Med Sale Price"]
        );
        let avg = &series.secondary_axis[0];
        assert_eq!(avg.period1_label, "$1.36M");
        assert_eq!(avg.period2_label, "$1.31M");
        assert_eq!(series.primary_axis[3].period2_label, "45%");
        assert_eq!(series.entries().count(), 7);
    }

    #[test]
    fn unreadable_values_drop_the_metric() {
        let table = parse_table(
            r#"{"Metric": ["Sale Volume", "MOI"], "A": [10, "n/a"], "B": ["$12", 2]}"#,
        )
        .unwrap();
        let series = build_series(&table);
        assert_eq!(names(&series.primary_axis), vec!["Sale Volume"]);
        assert!((series.primary_axis[0].period2_value - 12.0).abs() < f64::EPSILON);
        assert!(series.secondary_axis.is_empty());
        assert!(series.axis_scale(Axis::Secondary).is_none());
    }

    #[test]
    fn axis_scale_uses_nice_steps() {
        let scale = AxisScale::covering(Axis::Primary, 402.0);
        assert!((scale.step - 100.0).abs() < f64::EPSILON);
        assert!((scale.max - 500.0).abs() < f64::EPSILON);
        assert_eq!(scale.ticks().len(), 6);

        let price = AxisScale::covering(Axis::Secondary, 1_364_747.0);
        assert!((price.step - 500_000.0).abs() < 1e-6);
        assert!((price.max - 1_500_000.0).abs() < 1e-6);
        assert_eq!(price.tick_label(500_000.0), "$0.50M");
        assert!((price.fraction(3_000_000.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_only_axis_still_has_a_range() {
        let scale = AxisScale::covering(Axis::Primary, 0.0);
        assert!(scale.max > 0.0);
        assert_eq!(scale.fraction(0.0), 0.0);
    }

    #[test]
    fn huge_values_keep_a_finite_bounded_axis() {
        let table = parse_table(
            r#"{"Metric": ["Avg Sale Price"], "A": [1.7e308], "B": [1.0e308]}"#,
        )
        .unwrap();
        let scale = build_series(&table)
            .axis_scale(Axis::Secondary)
            .unwrap();
        assert!(scale.max.is_finite());
        assert!(scale.max >= 1.7e308);
        let ticks = scale.ticks();
        assert!(ticks.len() <= MAX_TICKS + 1);
        assert!(ticks.iter().all(|tick| tick.is_finite()));
        assert!((scale.fraction(1.7e308) - 1.0).abs() < f64::EPSILON);

        let tiny = AxisScale::covering(Axis::Primary, f64::MIN_POSITIVE / 1e10);
        assert!(tiny.step > 0.0 && tiny.max.is_finite());
        assert!(tiny.ticks().len() <= MAX_TICKS + 1);
    }
}
