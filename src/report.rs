mod chart;

use crate::write_output_file;
use anyhow::Result;
use chrono::{DateTime, Local};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use mktdash::{ComparisonSeries, DisplayTable};
use std::path::Path;

pub struct HtmlReportContext<'a> {
    pub(crate) title: &'a str,
    pub(crate) source: &'a str,
    pub(crate) run_started_at: &'a DateTime<Local>,
    pub(crate) period_count: usize,
    pub(crate) display: &'a DisplayTable,
    pub(crate) series: &'a ComparisonSeries,
}

pub async fn save_html_report(output_path: &Path, context: &HtmlReportContext<'_>) -> Result<()> {
    let html = render_html_report(context).into_string();
    write_output_file(output_path, html.as_bytes()).await
}

fn render_html_report(context: &HtmlReportContext<'_>) -> Markup {
    let generated_at = context
        .run_started_at
        .format("%Y-%m-%d %H:%M:%S %Z")
        .to_string();
    let [first, second] = &context.series.periods;
    let comparing = format!("{first} vs {second}");

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="color-scheme" content="light";
                title { (context.title) " - " (comparing) }
                style { (PreEscaped(REPORT_STYLE)) }
            }
            body {
                div.page {
                    header.hero {
                        div.pill { "mktdash v" (env!("CARGO_PKG_VERSION")) }
                        h1 { (context.title) }
                        p.subtitle { (comparing) }
                        div.meta {
                            div {
                                span.label { "Generated" }
                                span.value.mono { (generated_at) }
                            }
                            div {
                                span.label { "Input" }
                                span.value.mono { (context.source) }
                            }
                        }
                    }
                    section.cards {
                        div.card {
                            div.card-label { "Metrics" }
                            div.card-value { (context.display.rows.len()) }
                        }
                        div.card {
                            div.card-label { "Charted" }
                            div.card-value { (context.series.entries().count()) }
                        }
                        div.card {
                            div.card-label { "Periods" }
                            div.card-value { (context.period_count) }
                        }
                    }
                    (render_table(context.display, context.period_count))
                    section.chart-section {
                        h2 { "Comparison" }
                        (chart::render_chart(context.series))
                    }
                    footer.footer {
                        div { "Prices on the right axis, units and rates on the left." }
                    }
                }
            }
        }
    }
}

fn render_table(display: &DisplayTable, period_count: usize) -> Markup {
    let [name_header, first_header, second_header] = &display.header;
    html! {
        section.table-section {
            h2 { "Market Metrics" }
            @if period_count > 2 {
                div.hint { "Only the first two period columns are compared." }
            }
            div.table-wrap {
                table {
                    thead {
                        tr {
                            th { (name_header) }
                            th.num { (first_header) }
                            th.num { (second_header) }
                        }
                    }
                    tbody {
                        @if display.rows.is_empty() {
                            tr { td.muted colspan="3" { "No metrics in the input table." } }
                        }
                        @for row in &display.rows {
                            tr {
                                td.metric { (row.metric) }
                                td.num { (row.period1) }
                                td.num { (row.period2) }
                            }
                        }
                    }
                }
            }
        }
    }
}

const REPORT_STYLE: &str = r#"
:root {
  color-scheme: light;
  --bg-top: #f6f3ec;
  --bg-bottom: #efe7db;
  --ink: #1f1b16;
  --muted: #6b635b;
  --card: #ffffff;
  --teal: #2a9d8f;
  --rust: #c25335;
  --accent-cool: #3d405b;
  --border: #e2d6c6;
  --shadow: 0 24px 60px rgba(28, 25, 23, 0.12);
}

* {
  box-sizing: border-box;
}

body {
  margin: 0;
  font-family: "Segoe UI", sans-serif;
  color: var(--ink);
  background: linear-gradient(150deg, var(--bg-top), var(--bg-bottom));
}

.page {
  max-width: 1080px;
  margin: 0 auto;
  padding: 48px 24px 64px;
}

.hero {
  background: linear-gradient(120deg, #ffffff, #fdf4ef);
  border: 1px solid var(--border);
  border-radius: 24px;
  padding: 32px 36px;
  box-shadow: var(--shadow);
}

.pill {
  display: inline-flex;
  padding: 6px 14px;
  border-radius: 999px;
  background: rgba(61, 64, 91, 0.12);
  color: var(--accent-cool);
  font-size: 13px;
  font-weight: 600;
  text-transform: uppercase;
  letter-spacing: 0.08em;
}

h1 {
  font-family: "Georgia", serif;
  font-size: clamp(2.2rem, 4vw, 3rem);
  margin: 16px 0 8px;
}

.subtitle {
  margin: 0 0 16px;
  color: var(--muted);
}

.meta {
  display: flex;
  gap: 32px;
  flex-wrap: wrap;
}

.label {
  display: block;
  font-size: 12px;
  text-transform: uppercase;
  letter-spacing: 0.08em;
  color: var(--muted);
}

.mono {
  font-family: "JetBrains Mono", monospace;
}

.cards {
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
  gap: 16px;
  margin: 28px 0;
}

.card {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 18px;
  padding: 18px 20px;
}

.card-label {
  font-size: 13px;
  color: var(--muted);
}

.card-value {
  font-size: 28px;
  font-weight: 700;
  margin-top: 6px;
}

.table-section,
.chart-section {
  background: var(--card);
  border: 1px solid var(--border);
  border-radius: 20px;
  padding: 24px;
  margin-bottom: 28px;
}

.hint,
.muted {
  color: var(--muted);
  font-size: 14px;
}

table {
  width: 100%;
  border-collapse: collapse;
  font-size: 18px;
}

thead th {
  text-align: left;
  padding: 12px 14px;
  background: var(--accent-cool);
  color: #ffffff;
}

tbody td {
  padding: 12px 14px;
  border-bottom: 1px solid var(--border);
}

tbody tr:nth-child(even) {
  background: #faf7f2;
}

.num {
  text-align: right;
  font-variant-numeric: tabular-nums;
}

.metric {
  font-weight: 600;
}

.chart svg {
  width: 100%;
  height: auto;
}

.footer {
  color: var(--muted);
  font-size: 13px;
  text-align: center;
}
"#;
