//! Inline SVG bar chart with independent left (units) and right (price) axes.

use maud::{Markup, html};
use mktdash::{Axis, AxisScale, ComparisonSeries};

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 440.0;
const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 84.0;
const MARGIN_TOP: f64 = 32.0;
const MARGIN_BOTTOM: f64 = 96.0;
const BAR_WIDTH_RATIO: f64 = 0.35;

const TEAL: &str = "#2a9d8f";
const RUST: &str = "#c25335";
const FIRST_OPACITY: f64 = 0.9;
const SECOND_OPACITY: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
struct Bar {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    fill: &'static str,
    opacity: f64,
    label: String,
}

#[derive(Debug, Clone, PartialEq)]
struct Slot<'a> {
    center: f64,
    metric: &'a str,
}

struct Layout<'a> {
    bars: Vec<Bar>,
    slots: Vec<Slot<'a>>,
    primary: Option<AxisScale>,
    secondary: Option<AxisScale>,
}

const fn plot_width() -> f64 {
    WIDTH - MARGIN_LEFT - MARGIN_RIGHT
}

const fn plot_height() -> f64 {
    HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
}

const fn baseline() -> f64 {
    HEIGHT - MARGIN_BOTTOM
}

const fn axis_color(axis: Axis) -> &'static str {
    match axis {
        Axis::Primary => TEAL,
        Axis::Secondary => RUST,
    }
}

#[allow(clippy::cast_precision_loss)]
fn layout(series: &ComparisonSeries) -> Layout<'_> {
    let primary = series.axis_scale(Axis::Primary);
    let secondary = series.axis_scale(Axis::Secondary);
    let count = series.entries().count().max(1) as f64;
    let slot_width = plot_width() / count;
    let bar_width = slot_width * BAR_WIDTH_RATIO;

    let mut bars = Vec::new();
    let mut slots = Vec::new();
    let placed = series
        .primary_axis
        .iter()
        .map(|entry| (entry, primary.as_ref()))
        .chain(
            series
                .secondary_axis
                .iter()
                .map(|entry| (entry, secondary.as_ref())),
        );
    for (idx, (entry, scale)) in placed.enumerate() {
        let Some(scale) = scale else {
            continue;
        };
        let center = (idx as f64 + 0.5).mul_add(slot_width, MARGIN_LEFT);
        let fill = axis_color(entry.class.axis());
        bars.push(bar(
            scale,
            center - bar_width,
            bar_width,
            entry.period1_value,
            fill,
            FIRST_OPACITY,
            &entry.period1_label,
        ));
        bars.push(bar(
            scale,
            center,
            bar_width,
            entry.period2_value,
            fill,
            SECOND_OPACITY,
            &entry.period2_label,
        ));
        slots.push(Slot {
            center,
            metric: entry.metric.as_str(),
        });
    }

    Layout {
        bars,
        slots,
        primary,
        secondary,
    }
}

fn bar(
    scale: &AxisScale,
    x: f64,
    width: f64,
    value: f64,
    fill: &'static str,
    opacity: f64,
    label: &str,
) -> Bar {
    let height = scale.fraction(value) * plot_height();
    Bar {
        x,
        y: baseline() - height,
        width,
        height,
        fill,
        opacity,
        label: label.to_string(),
    }
}

fn tick_y(scale: &AxisScale, value: f64) -> f64 {
    baseline() - scale.fraction(value) * plot_height()
}

pub(super) fn render_chart(series: &ComparisonSeries) -> Markup {
    if series.is_empty() {
        return html! {
            p.muted { "No known metrics to chart." }
        };
    }
    let layout = layout(series);
    let view_box = format!("0 0 {WIDTH} {HEIGHT}");
    let right_edge = WIDTH - MARGIN_RIGHT;

    html! {
        div.chart {
            svg xmlns="http://www.w3.org/2000/svg" viewBox=(view_box) role="img" aria-label="Period comparison chart" {
                @if let Some(scale) = &layout.primary {
                    (render_axis(scale, MARGIN_LEFT, "end", -8.0, "Volume (Units)"))
                }
                @if let Some(scale) = &layout.secondary {
                    (render_axis(scale, right_edge, "start", 8.0, "Price ($)"))
                }
                line x1=(MARGIN_LEFT) y1=(baseline()) x2=(right_edge) y2=(baseline()) stroke="#1f1b16" stroke-width="1" {}
                @for bar in &layout.bars {
                    rect x=(fmt(bar.x)) y=(fmt(bar.y)) width=(fmt(bar.width)) height=(fmt(bar.height)) fill=(bar.fill) fill-opacity=(bar.opacity) {}
                    text x=(fmt(bar.x + bar.width / 2.0)) y=(fmt(bar.y - 4.0)) text-anchor="middle" font-size="12" font-weight="bold" { (bar.label) }
                }
                @for slot in &layout.slots {
                    text x=(fmt(slot.center)) y=(fmt(baseline() + 22.0)) text-anchor="middle" font-size="14" { (slot.metric) }
                }
                (render_legend(series))
            }
        }
    }
}

fn render_axis(scale: &AxisScale, x: f64, anchor: &str, offset: f64, title: &str) -> Markup {
    let color = axis_color(scale.axis);
    let title_x = x + offset * 7.0;
    let title_y = MARGIN_TOP + plot_height() / 2.0;
    let rotate = format!("rotate(-90 {} {})", fmt(title_x), fmt(title_y));
    html! {
        g.axis {
            line x1=(fmt(x)) y1=(MARGIN_TOP) x2=(fmt(x)) y2=(baseline()) stroke=(color) stroke-width="1" {}
            @for tick in scale.ticks() {
                text x=(fmt(x + offset)) y=(fmt(tick_y(scale, tick) + 4.0)) text-anchor=(anchor) font-size="11" fill=(color) {
                    (scale.tick_label(tick))
                }
            }
            text x=(fmt(title_x)) y=(fmt(title_y)) transform=(rotate) text-anchor="middle" font-size="14" font-weight="bold" fill=(color) {
                (title)
            }
        }
    }
}

fn render_legend(series: &ComparisonSeries) -> Markup {
    let [first, second] = &series.periods;
    let mut items: Vec<(String, &'static str, f64)> = Vec::with_capacity(4);
    for (axis, suffix) in [(Axis::Primary, "Vol"), (Axis::Secondary, "Price")] {
        if series.axis(axis).is_empty() {
            continue;
        }
        let color = axis_color(axis);
        items.push((format!("{first} {suffix}"), color, FIRST_OPACITY));
        items.push((format!("{second} {suffix}"), color, SECOND_OPACITY));
    }
    let y = HEIGHT - 28.0;
    html! {
        g.legend {
            @for (idx, (label, color, opacity)) in items.iter().enumerate() {
                @let x = legend_x(idx);
                rect x=(fmt(x)) y=(fmt(y - 11.0)) width="14" height="14" fill=(color) fill-opacity=(opacity) {}
                text x=(fmt(x + 20.0)) y=(fmt(y)) font-size="13" { (label) }
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn legend_x(idx: usize) -> f64 {
    (idx as f64).mul_add(190.0, MARGIN_LEFT)
}

fn fmt(value: f64) -> String {
    format!("{value:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mktdash::{build_series, parse_table};

    fn sample() -> ComparisonSeries {
        let table = parse_table(
            r#"{
                "Metric": ["Sale Volume", "Avg Sale Price", "Med Sale Price", "New Listings"],
                "Jan 2025": [136, 1364747, 1150000, 310],
                "Jan 2026": [132, 1313103, 1105000, 295]
            }"#,
        )
        .unwrap();
        build_series(&table)
    }

    #[test]
    fn two_bars_per_metric_with_units_left_of_prices() {
        let series = sample();
        let layout = layout(&series);
        assert_eq!(layout.bars.len(), 8);
        let metrics: Vec<_> = layout.slots.iter().map(|slot| slot.metric).collect();
        assert_eq!(
            metrics,
            vec!["Sale Volume", "New Listings", "Avg Sale Price", "Med Sale Price"]
        );
        assert!(layout.slots.windows(2).all(|pair| pair[0].center < pair[1].center));
        assert_eq!(layout.bars[0].fill, TEAL);
        assert_eq!(layout.bars[4].fill, RUST);
        assert_eq!(layout.bars[4].label, "$1.36M");
    }

    #[test]
    fn bars_scale_against_their_own_axis() {
        let series = sample();
        let layout = layout(&series);
        // New Listings (310) reaches 310/400 of the units axis.
        let listings = &layout.bars[2];
        assert!((listings.height - 0.775 * plot_height()).abs() < 1e-9);
        // Avg Sale Price (1364747) is measured against a 1.5M axis, not the units axis.
        let price = &layout.bars[4];
        assert!(price.height <= plot_height());
        assert!(price.height > 0.5 * plot_height());
        assert!((price.y + price.height - baseline()).abs() < 1e-9);
    }

    #[test]
    fn empty_series_renders_placeholder() {
        let table = parse_table(r#"{"Metric": ["Other"], "A": [1], "B": [2]}"#).unwrap();
        let markup = render_chart(&build_series(&table)).into_string();
        assert!(markup.contains("No known metrics to chart."));
        assert!(!markup.contains("<svg"));
    }

    #[test]
    fn svg_includes_both_axes_and_legend() {
        let markup = render_chart(&sample()).into_string();
        assert!(markup.contains("Volume (Units)"));
        assert!(markup.contains("Price ($)"));
        assert!(markup.contains("Jan 2026 Price"));
        assert!(markup.contains("$1.31M"));
    }

    #[test]
    fn near_max_prices_render_a_bounded_axis() {
        let table = parse_table(
            r#"{"Metric": ["Sale Volume", "Avg Sale Price"], "A": [136, 1.7e308], "B": [132, 1.0e308]}"#,
        )
        .unwrap();
        let markup = render_chart(&build_series(&table)).into_string();
        assert!(markup.contains("<svg"));
        assert!(!markup.contains("NaN"));
        assert!(!markup.contains("inf"));
    }
}
