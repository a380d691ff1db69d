use crate::cli::Cli;
use crate::report::{HtmlReportContext, save_html_report};
use crate::summary::{SummaryContext, SummaryPaths, print_summary};
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use csv::Writer;
use mktdash::{
    ComparisonSeries, DisplayTable, InputFormat, build_display_table, build_series, parse_input,
};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;

mod cli;
mod report;
mod summary;

const STDIN_MARKER: &str = "-";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let mut cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Some(command) = cli.command.take() {
        crate::cli::handle_command(command)?;
        return Ok(());
    }

    let Cli {
        input,
        format,
        save_html,
        save_csv,
        save_series,
        title,
        ..
    } = cli;

    let run_started_at = Local::now();

    let input = input.filter(|path| path.as_os_str() != STDIN_MARKER);
    let bytes = read_input(input.as_deref()).await?;
    let format = format
        .fixed()
        .unwrap_or_else(|| InputFormat::detect(input.as_deref(), &bytes));
    let source = input.as_deref().map_or_else(
        || "stdin".to_string(),
        |path| path.display().to_string(),
    );

    let table = parse_input(format, &bytes)
        .with_context(|| format!("failed to read metric table from {source}"))?;
    let display = build_display_table(&table);
    let series = build_series(&table);

    if let Some(path) = save_csv.as_ref() {
        save_display_csv(&display, path.as_path()).await?;
    }

    if let Some(path) = save_series.as_ref() {
        save_series_json(&series, path.as_path()).await?;
    }

    if let Some(path) = save_html.as_ref() {
        let html_context = HtmlReportContext {
            title: &title,
            source: &source,
            run_started_at: &run_started_at,
            period_count: table.periods().len(),
            display: &display,
            series: &series,
        };
        save_html_report(path.as_path(), &html_context).await?;
    }

    print_summary(&SummaryContext {
        title: &title,
        source: &source,
        format: format.name(),
        metric_count: table.len(),
        period_count: table.periods().len(),
        run_started_at: &run_started_at,
        paths: SummaryPaths {
            html: save_html.as_deref(),
            csv: save_csv.as_deref(),
            series: save_series.as_deref(),
        },
        display: &display,
        series: &series,
    });

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buffer)
                .await
                .context("failed to read table from stdin")?;
            Ok(buffer)
        }
    }
}

pub(crate) async fn write_output_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    fs::write(path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(())
}

fn finalize_writer(mut writer: Writer<Vec<u8>>, label: &str) -> Result<Vec<u8>> {
    writer
        .flush()
        .with_context(|| format!("failed to flush {label}"))?;
    writer
        .into_inner()
        .with_context(|| format!("failed to finalize {label}"))
}

async fn save_display_csv(display: &DisplayTable, path: &Path) -> Result<()> {
    let serialized = serialize_display_table(display)?;
    write_output_file(path, &serialized).await
}

fn serialize_display_table(display: &DisplayTable) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(&display.header)
        .context("failed to write table header")?;
    for row in &display.rows {
        writer
            .write_record([&row.metric, &row.period1, &row.period2])
            .context("failed to serialize table row")?;
    }
    finalize_writer(writer, "table CSV writer")
}

async fn save_series_json(series: &ComparisonSeries, path: &Path) -> Result<()> {
    let serialized =
        serde_json::to_vec_pretty(series).context("failed to serialize chart series")?;
    write_output_file(path, &serialized).await
}
