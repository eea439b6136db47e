//! Trial and measurement types shared by the driver, the reporter and the
//! dashboard.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The API surface a trial is executed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ApiKind {
    #[serde(rename = "REST")]
    Rest,
    #[serde(rename = "GraphQL")]
    GraphQl,
}

impl ApiKind {
    /// Both kinds, in report order.
    pub const ALL: [ApiKind; 2] = [ApiKind::Rest, ApiKind::GraphQl];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKind::Rest => "REST",
            ApiKind::GraphQl => "GraphQL",
        }
    }
}

impl fmt::Display for ApiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Query-shape profile of a trial.
///
/// `Simple` asks for the repository alone, `Medium` adds recent issues and
/// `Complex` adds issues, contributors and branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [Complexity::Simple, Complexity::Medium, Complexity::Complex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Medium => "medium",
            Complexity::Complex => "complex",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measured quantity of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    TimeMs,
    SizeBytes,
}

impl Metric {
    pub const ALL: [Metric; 2] = [Metric::TimeMs, Metric::SizeBytes];

    /// Column name in the result table.
    pub fn column(&self) -> &'static str {
        match self {
            Metric::TimeMs => "time_ms",
            Metric::SizeBytes => "size_bytes",
        }
    }

    /// Unit suffix used in human-facing output.
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::TimeMs => "ms",
            Metric::SizeBytes => "bytes",
        }
    }

    pub fn value(&self, record: &Measurement) -> f64 {
        match self {
            Metric::TimeMs => record.time_ms,
            Metric::SizeBytes => record.size_bytes as f64,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid repository '{0}': expected owner/name")]
pub struct ParseRepositoryError(String);

/// A target repository, written as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Repository {
    pub owner: String,
    pub name: String,
}

impl Repository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for Repository {
    type Err = ParseRepositoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Repository::new(owner, name))
            }
            _ => Err(ParseRepositoryError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Repository {
    type Error = ParseRepositoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Repository> for String {
    fn from(repo: Repository) -> Self {
        repo.to_string()
    }
}

/// One unit of work: a single query shape against a single repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trial {
    pub api: ApiKind,
    pub complexity: Complexity,
    pub repository: Repository,
    /// 1-based repetition number.
    pub repetition: u32,
}

impl fmt::Display for Trial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} #{}",
            self.api, self.complexity, self.repository, self.repetition
        )
    }
}

/// Raw result of one query function call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryResult {
    pub time_ms: f64,
    pub size_bytes: u64,
    pub status: u16,
}

/// A row of `experiment_results.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub timestamp: DateTime<Utc>,
    pub api_kind: ApiKind,
    pub complexity: Complexity,
    pub repository: Repository,
    #[serde(rename = "execution")]
    pub repetition: u32,
    pub time_ms: f64,
    pub size_bytes: u64,
    pub status: u16,
}

impl Measurement {
    /// Build the record for a successfully executed trial.
    ///
    /// Elapsed time is stored at two decimal places.
    pub fn from_result(trial: &Trial, result: QueryResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            api_kind: trial.api,
            complexity: trial.complexity,
            repository: trial.repository.clone(),
            repetition: trial.repetition,
            time_ms: round2(result.time_ms.max(0.0)),
            size_bytes: result.size_bytes,
            status: result.status,
        }
    }
}

/// A row of `failed_trials.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialFailure {
    pub timestamp: DateTime<Utc>,
    pub api_kind: ApiKind,
    pub complexity: Complexity,
    pub repository: Repository,
    #[serde(rename = "execution")]
    pub repetition: u32,
    pub error: String,
}

impl TrialFailure {
    pub fn new(trial: &Trial, error: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            api_kind: trial.api,
            complexity: trial.complexity,
            repository: trial.repository.clone(),
            repetition: trial.repetition,
            error: error.into(),
        }
    }
}

/// What happened to a trial.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    Success(Measurement),
    Failure(TrialFailure),
}

impl TrialOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TrialOutcome::Success(_))
    }
}

/// Split outcomes into recorded measurements and failures, keeping order.
pub fn partition_outcomes(outcomes: Vec<TrialOutcome>) -> (Vec<Measurement>, Vec<TrialFailure>) {
    let mut measurements = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            TrialOutcome::Success(m) => measurements.push(m),
            TrialOutcome::Failure(f) => failures.push(f),
        }
    }
    (measurements, failures)
}

/// Values of `metric` for records matching `api` and, if given, `complexity`.
pub fn select(
    records: &[Measurement],
    api: ApiKind,
    complexity: Option<Complexity>,
    metric: Metric,
) -> Vec<f64> {
    records
        .iter()
        .filter(|r| r.api_kind == api && complexity.map_or(true, |c| r.complexity == c))
        .map(|r| metric.value(r))
        .collect()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial() -> Trial {
        Trial {
            api: ApiKind::Rest,
            complexity: Complexity::Medium,
            repository: Repository::new("facebook", "react"),
            repetition: 3,
        }
    }

    #[test]
    fn test_repository_parse() {
        let repo: Repository = "facebook/react".parse().unwrap();
        assert_eq!(repo.owner, "facebook");
        assert_eq!(repo.name, "react");
        assert_eq!(repo.to_string(), "facebook/react");
    }

    #[test]
    fn test_repository_parse_invalid() {
        assert!("react".parse::<Repository>().is_err());
        assert!("/react".parse::<Repository>().is_err());
        assert!("facebook/".parse::<Repository>().is_err());
        assert!("a/b/c".parse::<Repository>().is_err());
    }

    #[test]
    fn test_measurement_rounds_time() {
        let result = QueryResult {
            time_ms: 123.456789,
            size_bytes: 2048,
            status: 200,
        };
        let m = Measurement::from_result(&trial(), result, Utc::now());
        assert_eq!(m.time_ms, 123.46);
        assert_eq!(m.size_bytes, 2048);
        assert_eq!(m.repetition, 3);
        assert_eq!(m.api_kind, ApiKind::Rest);
    }

    #[test]
    fn test_measurement_time_never_negative() {
        let result = QueryResult {
            time_ms: -0.001,
            size_bytes: 0,
            status: 200,
        };
        let m = Measurement::from_result(&trial(), result, Utc::now());
        assert!(m.time_ms >= 0.0);
    }

    #[test]
    fn test_partition_outcomes() {
        let ok = Measurement::from_result(
            &trial(),
            QueryResult {
                time_ms: 1.0,
                size_bytes: 1,
                status: 200,
            },
            Utc::now(),
        );
        let failed = TrialFailure::new(&trial(), "connection reset", Utc::now());
        let outcomes = vec![
            TrialOutcome::Success(ok.clone()),
            TrialOutcome::Failure(failed.clone()),
            TrialOutcome::Success(ok.clone()),
        ];

        let (measurements, failures) = partition_outcomes(outcomes);
        assert_eq!(measurements, vec![ok.clone(), ok]);
        assert_eq!(failures, vec![failed]);
    }

    #[test]
    fn test_enum_labels() {
        assert_eq!(ApiKind::GraphQl.to_string(), "GraphQL");
        assert_eq!(Complexity::Complex.to_string(), "complex");
        assert_eq!(Metric::SizeBytes.column(), "size_bytes");
    }
}
