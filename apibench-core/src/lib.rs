//! Core types and utilities for apibench.
//!
//! This crate holds everything the three phases share without touching the
//! network or a renderer: trial and measurement types, the CSV tables that
//! carry data between phases, the statistics, and the analysis reporters.

pub mod analysis;
pub mod record;
pub mod report;
pub mod stats;
pub mod summary;
pub mod table;

// Re-export main types for convenience
pub use analysis::{
    AnalysisConfig, AnalysisReport, Analyzer, Comparison, GroupSummary, NormalityCheck,
    ResearchQuestion, TierComparison,
};
pub use record::{
    partition_outcomes, select, ApiKind, Complexity, Measurement, Metric, ParseRepositoryError,
    QueryResult, Repository, Trial, TrialFailure, TrialOutcome,
};
pub use report::{AnalysisRow, CsvReporter, ReportError, Reporter, TerminalReporter};
pub use stats::{TestOutcome, TwoSampleTest, VarianceModel};
pub use table::{
    read_failures, read_measurements, write_failures, write_measurements, TableError,
    ANALYSIS_FILE, FAILURES_FILE, RESULTS_FILE,
};
