//! Static SVG dashboard rendered from the measurement table.
//!
//! Eight charts are written to the charts directory, one file each. Groups
//! without records are left out of their chart instead of failing the run.

use std::path::{Path, PathBuf};

use apibench_core::{ApiKind, Measurement};
use thiserror::Error;
use tracing::info;

mod bars;
mod boxplot;
mod distribution;
mod heatmap;
mod panel;
mod svg;
mod table;

pub use svg::SvgDocument;

pub const TIME_BOXPLOT_FILE: &str = "01_time_boxplot.svg";
pub const SIZE_BOXPLOT_FILE: &str = "02_size_boxplot.svg";
pub const DISTRIBUTION_FILE: &str = "03_distributions.svg";
pub const COMPLEXITY_BARS_FILE: &str = "04_bar_ci95.svg";
pub const VIOLIN_FILE: &str = "05_violin.svg";
pub const HEATMAP_FILE: &str = "06_heatmap.svg";
pub const OVERVIEW_FILE: &str = "07_summary.svg";
pub const SUMMARY_TABLE_FILE: &str = "08_summary_table.svg";

/// Every chart file, in render order.
pub const CHART_FILES: [&str; 8] = [
    TIME_BOXPLOT_FILE,
    SIZE_BOXPLOT_FILE,
    DISTRIBUTION_FILE,
    COMPLEXITY_BARS_FILE,
    VIOLIN_FILE,
    HEATMAP_FILE,
    OVERVIEW_FILE,
    SUMMARY_TABLE_FILE,
];

/// Errors that can occur while rendering the dashboard.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Fill color of an API kind in every chart.
pub fn api_color(api: ApiKind) -> &'static str {
    match api {
        ApiKind::Rest => "#3498db",
        ApiKind::GraphQl => "#e74c3c",
    }
}

/// Legend entries for both API kinds.
fn api_legend() -> [(&'static str, &'static str); 2] {
    ApiKind::ALL.map(|api| (api.as_str(), api_color(api)))
}

type ChartFn = fn(&[Measurement]) -> SvgDocument;

fn charts() -> [(&'static str, ChartFn); 8] {
    [
        (TIME_BOXPLOT_FILE, boxplot::time_boxplot),
        (SIZE_BOXPLOT_FILE, boxplot::size_boxplot),
        (DISTRIBUTION_FILE, distribution::distribution),
        (COMPLEXITY_BARS_FILE, bars::complexity_bars),
        (VIOLIN_FILE, boxplot::violin),
        (HEATMAP_FILE, heatmap::heatmap),
        (OVERVIEW_FILE, bars::overview),
        (SUMMARY_TABLE_FILE, table::summary_table),
    ]
}

/// Renders the chart set into one directory.
#[derive(Debug, Clone)]
pub struct Dashboard {
    charts_dir: PathBuf,
}

impl Dashboard {
    pub fn new(charts_dir: impl Into<PathBuf>) -> Self {
        Self {
            charts_dir: charts_dir.into(),
        }
    }

    pub fn charts_dir(&self) -> &Path {
        &self.charts_dir
    }

    /// Render every chart, creating the directory if needed.
    ///
    /// Returns the written paths in render order.
    pub fn render_all(&self, records: &[Measurement]) -> Result<Vec<PathBuf>, RenderError> {
        std::fs::create_dir_all(&self.charts_dir).map_err(|source| RenderError::Io {
            path: self.charts_dir.clone(),
            source,
        })?;

        let mut written = Vec::with_capacity(CHART_FILES.len());
        for (file, chart) in charts() {
            let path = self.charts_dir.join(file);
            chart(records).save(&path)?;
            info!(path = %path.display(), "chart written");
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use apibench_core::{ApiKind, Complexity, Measurement, Repository};
    use chrono::{TimeZone, Utc};

    /// Two repositories, every tier, three repetitions; GraphQL is slower but
    /// smaller.
    pub fn records() -> Vec<Measurement> {
        let timestamp = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        let mut records = Vec::new();
        for (r, repository) in [Repository::new("a", "one"), Repository::new("b", "two")]
            .into_iter()
            .enumerate()
        {
            for (c, complexity) in Complexity::ALL.into_iter().enumerate() {
                for api in ApiKind::ALL {
                    for repetition in 1..=3u32 {
                        let base = 100.0 * (c + 1) as f64 + 10.0 * r as f64 + repetition as f64;
                        let (time_ms, size_bytes) = match api {
                            ApiKind::Rest => (base, 4000 * (c as u64 + 1) + repetition as u64),
                            ApiKind::GraphQl => (base * 1.5, 1000 * (c as u64 + 1) + repetition as u64),
                        };
                        records.push(Measurement {
                            timestamp,
                            api_kind: api,
                            complexity,
                            repository: repository.clone(),
                            repetition,
                            time_ms,
                            size_bytes,
                            status: 200,
                        });
                    }
                }
            }
        }
        records
    }
}
