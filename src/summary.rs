use chrono::{DateTime, Local};
use colored::Colorize;
use mktdash::{Axis, ComparisonSeries, DisplayTable, SeriesEntry};
use std::path::Path;

pub struct SummaryPaths<'a> {
    pub(crate) html: Option<&'a Path>,
    pub(crate) csv: Option<&'a Path>,
    pub(crate) series: Option<&'a Path>,
}

pub struct SummaryContext<'a> {
    pub(crate) title: &'a str,
    pub(crate) source: &'a str,
    pub(crate) format: &'a str,
    pub(crate) metric_count: usize,
    pub(crate) period_count: usize,
    pub(crate) run_started_at: &'a DateTime<Local>,
    pub(crate) paths: SummaryPaths<'a>,
    pub(crate) display: &'a DisplayTable,
    pub(crate) series: &'a ComparisonSeries,
}

pub fn print_summary(context: &SummaryContext<'_>) {
    println!();
    print_summary_header(context);
    print_summary_paths(&context.paths);
    println!();
    println!("{}", "Comparison Table".bold().bright_magenta());
    let table_width = print_display_table(context.display);
    println!();
    println!("{}", "Chart Series".bold().bright_magenta());
    print_series(context.series);
    if table_width > 0 {
        println!("{}", "=".repeat(table_width).bright_cyan());
    }
}

fn print_summary_header(context: &SummaryContext<'_>) {
    let banner = format!("=================== {} ===================", context.title);
    println!("{}", banner.bold().bright_cyan());
    println!(
        "{} {}",
        "Run started".bright_yellow().bold(),
        context
            .run_started_at
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string()
            .bright_white()
    );
    println!(
        "{} {} ({})",
        "Input".bright_yellow().bold(),
        context.source.bright_white(),
        context.format.bright_white()
    );
    println!(
        "{} {} | {}",
        "Table".bright_yellow().bold(),
        format!("Metrics: {}", context.metric_count).bright_white(),
        format!("Periods: {}", context.period_count).bright_white()
    );
    if context.period_count > 2 {
        println!(
            "{}",
            "Only the first two period columns are compared.".bright_black()
        );
    }
}

fn print_summary_paths(paths: &SummaryPaths<'_>) {
    print_path_line("HTML Report", paths.html, "not saved (use --save-html)");
    print_path_line("Table CSV", paths.csv, "not saved (use --save-csv)");
    print_path_line(
        "Series JSON",
        paths.series,
        "not saved (use --save-series)",
    );
}

fn print_path_line(label: &str, path: Option<&Path>, hint: &str) {
    let label_colored = label.bright_yellow().bold();
    match path {
        Some(path) => println!(
            "{} {}",
            label_colored,
            format!("{}", path.display()).bright_white()
        ),
        None => println!("{} {}", label_colored, hint.bright_black()),
    }
}

/// Prints the table and returns its width in characters.
fn print_display_table(display: &DisplayTable) -> usize {
    if display.rows.is_empty() {
        let message = "No metrics in the input table.";
        println!("{}", message.bright_black());
        return message.len();
    }

    let [name_header, first_header, second_header] = &display.header;
    let name_width = display
        .rows
        .iter()
        .map(|row| row.metric.chars().count())
        .chain([name_header.chars().count()])
        .max()
        .unwrap_or_default();
    let first_width = display
        .rows
        .iter()
        .map(|row| row.period1.chars().count())
        .chain([first_header.chars().count()])
        .max()
        .unwrap_or_default();
    let second_width = display
        .rows
        .iter()
        .map(|row| row.period2.chars().count())
        .chain([second_header.chars().count()])
        .max()
        .unwrap_or_default();

    let header = format!(
        "{name_header:<name_width$} | {first_header:>first_width$} | {second_header:>second_width$}"
    );
    let separator = format!(
        "{}-+-{}-+-{}",
        "-".repeat(name_width),
        "-".repeat(first_width),
        "-".repeat(second_width)
    );
    println!("{}", header.bold().bright_white());
    println!("{}", separator.bright_black());
    for row in &display.rows {
        let line = format!(
            "{:<name_width$} | {:>first_width$} | {:>second_width$}",
            row.metric, row.period1, row.period2
        );
        println!("{}", line.bright_green());
    }

    header.chars().count().max(separator.len())
}

fn print_series(series: &ComparisonSeries) {
    if series.is_empty() {
        println!(
            "{}",
            "No known metrics to chart (expected e.g. Sale Volume, Avg Sale Price).".bright_black()
        );
        return;
    }
    let [first, second] = &series.periods;
    for (axis, label) in [(Axis::Primary, "Units"), (Axis::Secondary, "Prices")] {
        let entries = series.axis(axis);
        if entries.is_empty() {
            continue;
        }
        println!("{}", format!("{label} axis").bright_yellow().bold());
        for entry in entries {
            print_series_entry(entry, first, second);
        }
    }
}

fn print_series_entry(entry: &SeriesEntry, first: &str, second: &str) {
    println!(
        "  {:<16} {} {} | {} {}",
        entry.metric.bright_white(),
        format!("{first}:").bright_black(),
        entry.period1_label.bright_green(),
        format!("{second}:").bright_black(),
        entry.period2_label.bright_green()
    );
}
