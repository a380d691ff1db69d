//! Fixed metric vocabulary and name-keyed row selection.

use crate::table::{MetricRow, MetricTable};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricClass {
    Volume,
    Price,
    Percentage,
    Ratio,
}

impl MetricClass {
    /// Axis the class is plotted on.
    pub const fn axis(self) -> Axis {
        match self {
            Self::Price => Axis::Secondary,
            Self::Volume | Self::Percentage | Self::Ratio => Axis::Primary,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Price => "price",
            Self::Percentage => "percentage",
            Self::Ratio => "ratio",
        }
    }
}

impl fmt::Display for MetricClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Units/percentages/ratios share the primary axis; prices get their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Primary,
    Secondary,
}

pub const SALE_VOLUME: &str = "Sale Volume";
pub const AVG_SALE_PRICE: &str = "Avg Sale Price";
pub const MED_SALE_PRICE: &str = "Med Sale Price";
pub const NEW_LISTINGS: &str = "New Listings";
pub const SNLR: &str = "SNLR";
pub const ACTIVE_LISTINGS: &str = "Active Listings";
pub const MOI: &str = "MOI";

/// Known metrics in chart order: volume, listings and activity first, prices last.
pub const KNOWN_METRICS: [(&str, MetricClass); 7] = [
    (SALE_VOLUME, MetricClass::Volume),
    (NEW_LISTINGS, MetricClass::Volume),
    (ACTIVE_LISTINGS, MetricClass::Volume),
    (SNLR, MetricClass::Percentage),
    (MOI, MetricClass::Ratio),
    (AVG_SALE_PRICE, MetricClass::Price),
    (MED_SALE_PRICE, MetricClass::Price),
];

fn vocabulary() -> &'static FxHashMap<&'static str, MetricClass> {
    static VOCABULARY: OnceLock<FxHashMap<&'static str, MetricClass>> = OnceLock::new();
    VOCABULARY.get_or_init(|| KNOWN_METRICS.into_iter().collect())
}

/// Class of a metric by exact name, `None` for names outside the vocabulary.
pub fn classify(name: &str) -> Option<MetricClass> {
    vocabulary().get(name).copied()
}

/// Metric names of the given axis, in chart order.
pub fn metrics_for_axis(axis: Axis) -> impl Iterator<Item = &'static str> {
    KNOWN_METRICS
        .into_iter()
        .filter(move |(_, class)| class.axis() == axis)
        .map(|(name, _)| name)
}

/// Resolves `names` against the table in the requested order.
///
/// Names with no matching row are skipped rather than filled in.
pub fn select<'t, 'n>(
    table: &'t MetricTable,
    names: impl IntoIterator<Item = &'n str>,
) -> Vec<&'t MetricRow> {
    names
        .into_iter()
        .filter_map(|name| table.row(name))
        .collect()
}
