use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::{AnalysisReport, ResearchQuestion};
use crate::table::{read_rows, write_rows, TableError, ANALYSIS_FILE};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Table(#[from] TableError),
}

/// One row of `analysis_results.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub research_question: String,
    pub metric: String,
    pub t_statistic: f64,
    pub t_p_value: f64,
    pub u_statistic: f64,
    pub u_p_value: f64,
    pub cohens_d: f64,
    pub mean_rest: f64,
    pub mean_graphql: f64,
    pub diff_percent: f64,
    pub conclusion: String,
    pub significant: bool,
}

const ANALYSIS_HEADER: [&str; 12] = [
    "research_question",
    "metric",
    "t_statistic",
    "t_p_value",
    "u_statistic",
    "u_p_value",
    "cohens_d",
    "mean_rest",
    "mean_graphql",
    "diff_percent",
    "conclusion",
    "significant",
];

impl AnalysisRow {
    /// Rows for RQ1 and RQ2, in that order. Values are exported unrounded.
    pub fn from_report(report: &AnalysisReport) -> Vec<AnalysisRow> {
        ResearchQuestion::ALL
            .iter()
            .map(|&question| {
                let comparison = report.comparison(question);
                AnalysisRow {
                    research_question: question.label().to_string(),
                    metric: comparison.metric.column().to_string(),
                    t_statistic: comparison.t_test.statistic,
                    t_p_value: comparison.t_test.p_value,
                    u_statistic: comparison.mann_whitney.statistic,
                    u_p_value: comparison.mann_whitney.p_value,
                    cohens_d: comparison.cohens_d,
                    mean_rest: comparison.mean_rest(),
                    mean_graphql: comparison.mean_graphql(),
                    diff_percent: comparison.diff_percent,
                    conclusion: comparison.conclusion().to_string(),
                    significant: comparison.significant,
                }
            })
            .collect()
    }
}

pub fn read_analysis(path: &Path) -> Result<Vec<AnalysisRow>, TableError> {
    read_rows(path)
}

/// Something that presents an [`AnalysisReport`].
pub trait Reporter: Send + Sync {
    fn report(&self, report: &AnalysisReport) -> Result<(), ReportError>;
}

/// Writes `analysis_results.csv` into an output directory.
#[derive(Debug, Clone)]
pub struct CsvReporter {
    path: PathBuf,
}

impl CsvReporter {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: output_dir.join(ANALYSIS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Reporter for CsvReporter {
    fn report(&self, report: &AnalysisReport) -> Result<(), ReportError> {
        let rows = AnalysisRow::from_report(report);
        write_rows(&self.path, &ANALYSIS_HEADER, &rows)?;
        tracing::info!(path = %self.path.display(), "analysis results exported");
        Ok(())
    }
}

mod terminal;
pub use terminal::TerminalReporter;
