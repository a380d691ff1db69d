use criterion::{Criterion, black_box, criterion_group, criterion_main};
use mktdash::{build_display_table, build_series, parse_csv_table, parse_table};

const JSON_TABLE: &str = r#"{
    "Metric": ["Sale Volume", "Avg Sale Price", "Med Sale Price", "New Listings", "SNLR", "Active Listings", "MOI"],
    "Jan 2025": [136, 1364747, 1150000, 310, 44, 402, 2.9],
    "Jan 2026": [132, 1313103, 1105000, 295, 45, 388, 2.7]
}"#;

const CSV_TABLE: &[u8] = b"Metric,Jan 2025,Jan 2026
Sale Volume,136,132
Avg Sale Price,1364747,1313103
Med Sale Price,1150000,1105000
New Listings,310,295
SNLR,44,45
Active Listings,402,388
MOI,2.9,2.7
";

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse_table_json", |b| {
        b.iter(|| parse_table(black_box(JSON_TABLE)));
    });
    c.bench_function("parse_table_csv", |b| {
        b.iter(|| parse_csv_table(black_box(CSV_TABLE)));
    });
}

fn bench_build(c: &mut Criterion) {
    let Ok(table) = parse_table(JSON_TABLE) else {
        return;
    };
    c.bench_function("build_display_table", |b| {
        b.iter(|| build_display_table(black_box(&table)));
    });
    c.bench_function("build_series", |b| {
        b.iter(|| build_series(black_box(&table)));
    });
}

criterion_group!(benches, bench_parse, bench_build);
criterion_main!(benches);
