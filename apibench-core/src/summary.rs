//! Aggregate tables written by the driver next to the raw results.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::record::{round2, ApiKind, Complexity, Measurement, Metric, Repository};
use crate::stats::Summary;
use crate::table::{write_rows, TableError};

pub const BY_API_FILE: &str = "summary_by_api.csv";
pub const BY_COMPLEXITY_FILE: &str = "summary_by_complexity.csv";
pub const BY_REPOSITORY_FILE: &str = "summary_by_repository.csv";

const METRIC_COLUMNS: [&str; 11] = [
    "time_ms_count",
    "time_ms_mean",
    "time_ms_std",
    "time_ms_min",
    "time_ms_median",
    "time_ms_max",
    "size_bytes_mean",
    "size_bytes_std",
    "size_bytes_min",
    "size_bytes_median",
    "size_bytes_max",
];

/// Both metrics of one group, rounded to two decimals.
#[derive(Debug, Clone, PartialEq)]
struct MetricColumns {
    time: Summary,
    size: Summary,
}

impl MetricColumns {
    fn of(records: &[&Measurement]) -> Self {
        Self {
            time: summarize(records, Metric::TimeMs),
            size: summarize(records, Metric::SizeBytes),
        }
    }
}

macro_rules! summary_row {
    ($(#[$meta:meta])* $name:ident { $($key:ident: $ty:ty),* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize)]
        pub struct $name {
            $(pub $key: $ty,)*
            pub time_ms_count: usize,
            pub time_ms_mean: f64,
            pub time_ms_std: f64,
            pub time_ms_min: f64,
            pub time_ms_median: f64,
            pub time_ms_max: f64,
            pub size_bytes_mean: f64,
            pub size_bytes_std: f64,
            pub size_bytes_min: f64,
            pub size_bytes_median: f64,
            pub size_bytes_max: f64,
        }

        impl $name {
            fn new($($key: $ty,)* m: MetricColumns) -> Self {
                Self {
                    $($key,)*
                    time_ms_count: m.time.count,
                    time_ms_mean: round2(m.time.mean),
                    time_ms_std: round2(m.time.std_dev),
                    time_ms_min: round2(m.time.min),
                    time_ms_median: round2(m.time.median),
                    time_ms_max: round2(m.time.max),
                    size_bytes_mean: round2(m.size.mean),
                    size_bytes_std: round2(m.size.std_dev),
                    size_bytes_min: round2(m.size.min),
                    size_bytes_median: round2(m.size.median),
                    size_bytes_max: round2(m.size.max),
                }
            }
        }
    };
}

summary_row!(
    /// A row of `summary_by_api.csv`.
    ApiSummaryRow { api_kind: ApiKind }
);

summary_row!(
    /// A row of `summary_by_complexity.csv`.
    ComplexitySummaryRow { api_kind: ApiKind, complexity: Complexity }
);

/// A row of `summary_by_repository.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepositorySummaryRow {
    pub repository: Repository,
    pub api_kind: ApiKind,
    pub complexity: Complexity,
    pub time_ms_mean: f64,
    pub time_ms_std: f64,
    pub size_bytes_mean: f64,
    pub size_bytes_std: f64,
}

fn summarize(records: &[&Measurement], metric: Metric) -> Summary {
    let values: Vec<f64> = records.iter().map(|r| metric.value(r)).collect();
    Summary::of(&values)
}

fn group_by<K: Ord>(
    records: &[Measurement],
    key: impl Fn(&Measurement) -> K,
) -> BTreeMap<K, Vec<&Measurement>> {
    let mut groups: BTreeMap<K, Vec<&Measurement>> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().push(record);
    }
    groups
}

pub fn by_api(records: &[Measurement]) -> Vec<ApiSummaryRow> {
    group_by(records, |r| r.api_kind)
        .into_iter()
        .map(|(api_kind, group)| ApiSummaryRow::new(api_kind, MetricColumns::of(&group)))
        .collect()
}

pub fn by_complexity(records: &[Measurement]) -> Vec<ComplexitySummaryRow> {
    group_by(records, |r| (r.api_kind, r.complexity))
        .into_iter()
        .map(|((api_kind, complexity), group)| {
            ComplexitySummaryRow::new(api_kind, complexity, MetricColumns::of(&group))
        })
        .collect()
}

pub fn by_repository(records: &[Measurement]) -> Vec<RepositorySummaryRow> {
    group_by(records, |r| (r.repository.clone(), r.api_kind, r.complexity))
        .into_iter()
        .map(|((repository, api_kind, complexity), group)| {
            let time = summarize(&group, Metric::TimeMs);
            let size = summarize(&group, Metric::SizeBytes);
            RepositorySummaryRow {
                repository,
                api_kind,
                complexity,
                time_ms_mean: round2(time.mean),
                time_ms_std: round2(time.std_dev),
                size_bytes_mean: round2(size.mean),
                size_bytes_std: round2(size.std_dev),
            }
        })
        .collect()
}

/// Write the three aggregate tables into `dir` and return their paths.
pub fn write_summaries(dir: &Path, records: &[Measurement]) -> Result<Vec<PathBuf>, TableError> {
    let api_header: Vec<&str> = ["api_kind"].into_iter().chain(METRIC_COLUMNS).collect();
    let complexity_header: Vec<&str> = ["api_kind", "complexity"]
        .into_iter()
        .chain(METRIC_COLUMNS)
        .collect();
    let repository_header = [
        "repository",
        "api_kind",
        "complexity",
        "time_ms_mean",
        "time_ms_std",
        "size_bytes_mean",
        "size_bytes_std",
    ];

    let api_path = dir.join(BY_API_FILE);
    let complexity_path = dir.join(BY_COMPLEXITY_FILE);
    let repository_path = dir.join(BY_REPOSITORY_FILE);

    write_rows(&api_path, &api_header, &by_api(records))?;
    write_rows(&complexity_path, &complexity_header, &by_complexity(records))?;
    write_rows(&repository_path, &repository_header, &by_repository(records))?;

    Ok(vec![api_path, complexity_path, repository_path])
}
