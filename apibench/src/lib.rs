//! apibench: a controlled REST vs GraphQL experiment
//!
//! The driver runs a shuffled full-factorial set of trials against both APIs
//! and records response time and payload size; the analysis and dashboard
//! phases read those records back from disk.

pub mod cli;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod queries;
pub mod scheduler;

// Re-export core types for convenience
pub use apibench_core::{
    AnalysisConfig, AnalysisReport, Analyzer, ApiKind, Complexity, CsvReporter, Measurement,
    Reporter, Repository, TerminalReporter, TrialOutcome,
};

// Re-export main types from this crate
pub use cli::{Cli, Command, RunArgs};
pub use client::{ApiClient, ClientError, QueryExecutor};
pub use config::{ApiConfig, Config, ConfigError, DashboardConfig, ExperimentConfig};
pub use dashboard::{Dashboard, RenderError};
pub use scheduler::{build_trials, shuffle_trials, Scheduler};
