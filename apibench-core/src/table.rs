//! Reading and writing the delimited tables exchanged between phases.
//!
//! Every table is a headed CSV file. Files are materialized in memory and
//! written in one pass; a re-run overwrites them.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::record::{Measurement, TrialFailure};

/// Per-trial measurements.
pub const RESULTS_FILE: &str = "experiment_results.csv";
/// Trials whose execution raised a transport error.
pub const FAILURES_FILE: &str = "failed_trials.csv";
/// One row per research question.
pub const ANALYSIS_FILE: &str = "analysis_results.csv";

const MEASUREMENT_HEADER: [&str; 8] = [
    "timestamp",
    "api_kind",
    "complexity",
    "repository",
    "execution",
    "time_ms",
    "size_bytes",
    "status",
];

const FAILURE_HEADER: [&str; 6] = [
    "timestamp",
    "api_kind",
    "complexity",
    "repository",
    "execution",
    "error",
];

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Results file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed table {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Write `rows` to `path`, creating parent directories as needed.
///
/// When `rows` is empty only `header` is written, so readers still see a
/// well-formed table.
pub fn write_rows<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<(), TableError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| TableError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let write_err = |source| TableError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
    if rows.is_empty() {
        writer.write_record(header).map_err(write_err)?;
    }
    for row in rows {
        writer.serialize(row).map_err(write_err)?;
    }
    writer.flush().map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Read every row of a headed table.
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, TableError> {
    if !path.exists() {
        return Err(TableError::NotFound(path.to_path_buf()));
    }

    let parse_err = |source| TableError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(parse_err)?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(parse_err)
}

pub fn write_measurements(path: &Path, records: &[Measurement]) -> Result<(), TableError> {
    write_rows(path, &MEASUREMENT_HEADER, records)
}

pub fn read_measurements(path: &Path) -> Result<Vec<Measurement>, TableError> {
    read_rows(path)
}

pub fn write_failures(path: &Path, failures: &[TrialFailure]) -> Result<(), TableError> {
    write_rows(path, &FAILURE_HEADER, failures)
}

pub fn read_failures(path: &Path) -> Result<Vec<TrialFailure>, TableError> {
    read_rows(path)
}
