//! Configuration loading for apibench.
//!
//! Every phase receives one [`Config`], loaded from `.apibench.toml` when
//! present and otherwise built from defaults. CLI flags are applied on top
//! (see [`crate::cli::Cli::apply_to_config`]) before [`Config::validate`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use apibench_core::{AnalysisConfig, ApiKind, Complexity, Repository};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder credential; a run refuses to start while it is still set.
pub const CREDENTIAL_SENTINEL: &str = "YOUR_TOKEN_HERE";

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = ".apibench.toml";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("API credential is not configured: pass --token or set GITHUB_TOKEN")]
    MissingCredential,

    #[error("At least one repository is required")]
    NoRepositories,

    #[error("Repetitions must be at least 1")]
    ZeroRepetitions,

    #[error("Significance level must be in (0, 1), got {0}")]
    InvalidSignificanceLevel(f64),
}

/// Top-level configuration for apibench.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Personal access token sent with every request.
    pub credential: String,
    /// Repositories to query, as `owner/name`.
    pub repositories: Vec<Repository>,
    /// Repetitions of each (API kind, complexity, repository) treatment.
    pub repetitions: u32,
    /// Directory holding every table and the charts directory.
    pub output_dir: PathBuf,
    /// Endpoints of the two APIs.
    pub api: ApiConfig,
    /// Settings for trial scheduling.
    pub experiment: ExperimentConfig,
    /// Settings for the statistical analysis.
    pub analysis: AnalysisConfig,
    /// Settings for chart rendering.
    pub dashboard: DashboardConfig,
}

/// Endpoints of the APIs under test.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the REST API.
    pub rest_url: String,
    /// The single GraphQL endpoint.
    pub graphql_url: String,
    /// Per-request timeout; the transport default when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,
}

/// Configuration for trial scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Unrecorded REST + GraphQL simple call pairs before the first trial.
    pub warmup_runs: u32,
    /// Repository the warm-up calls target.
    pub canary_repository: Repository,
    /// Pause in milliseconds after every trial.
    pub inter_trial_delay_ms: u64,
    /// Log progress every this many trials.
    pub progress_interval: usize,
    /// Seed of the trial shuffle; entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
}

/// Configuration for chart rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Charts directory, relative to `output_dir`.
    pub charts_dir: PathBuf,
}

fn default_repositories() -> Vec<Repository> {
    [
        ("facebook", "react"),
        ("microsoft", "vscode"),
        ("tensorflow", "tensorflow"),
        ("torvalds", "linux"),
        ("django", "django"),
        ("python", "cpython"),
        ("nodejs", "node"),
        ("kubernetes", "kubernetes"),
        ("angular", "angular"),
        ("vuejs", "vue"),
    ]
    .into_iter()
    .map(|(owner, name)| Repository::new(owner, name))
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credential: CREDENTIAL_SENTINEL.to_string(),
            repositories: default_repositories(),
            repetitions: 100,
            output_dir: PathBuf::from("results"),
            api: ApiConfig::default(),
            experiment: ExperimentConfig::default(),
            analysis: AnalysisConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            rest_url: "https://api.github.com".to_string(),
            graphql_url: "https://api.github.com/graphql".to_string(),
            request_timeout_ms: None,
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            warmup_runs: 5,
            canary_repository: Repository::new("octocat", "Hello-World"),
            inter_trial_delay_ms: 100,
            progress_interval: 100,
            shuffle_seed: None,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            charts_dir: PathBuf::from("charts"),
        }
    }
}

impl ApiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms.map(Duration::from_millis)
    }
}

impl ExperimentConfig {
    pub fn inter_trial_delay(&self) -> Duration {
        Duration::from_millis(self.inter_trial_delay_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Load configuration from `.apibench.toml` in the current directory, or
    /// use defaults when the file doesn't exist.
    pub fn load_or_default() -> Result<Config> {
        let path = Path::new(DEFAULT_CONFIG_FILE);

        if path.exists() {
            Self::load(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from the specified path, or try the default location.
    pub fn load_from(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load_or_default(),
        }
    }

    /// Check the settings every phase relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.repositories.is_empty() {
            return Err(ConfigError::NoRepositories);
        }
        if self.repetitions == 0 {
            return Err(ConfigError::ZeroRepetitions);
        }
        let alpha = self.analysis.significance_level;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ConfigError::InvalidSignificanceLevel(alpha));
        }
        Ok(())
    }

    /// Additional check for the driver: a real credential must be set.
    pub fn validate_credential(&self) -> Result<(), ConfigError> {
        let credential = self.credential.trim();
        if credential.is_empty() || credential == CREDENTIAL_SENTINEL {
            return Err(ConfigError::MissingCredential);
        }
        Ok(())
    }

    pub fn charts_dir(&self) -> PathBuf {
        self.output_dir.join(&self.dashboard.charts_dir)
    }

    /// Number of trials a run schedules.
    pub fn trial_count(&self) -> usize {
        ApiKind::ALL.len() * Complexity::ALL.len() * self.repositories.len() * self.repetitions as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apibench_core::VarianceModel;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.credential, CREDENTIAL_SENTINEL);
        assert_eq!(config.repositories.len(), 10);
        assert_eq!(config.repositories[0].to_string(), "facebook/react");
        assert_eq!(config.repetitions, 100);
        assert_eq!(config.output_dir, PathBuf::from("results"));
        assert_eq!(config.api.rest_url, "https://api.github.com");
        assert_eq!(config.api.graphql_url, "https://api.github.com/graphql");
        assert!(config.api.request_timeout().is_none());
        assert_eq!(config.experiment.warmup_runs, 5);
        assert_eq!(
            config.experiment.canary_repository.to_string(),
            "octocat/Hello-World"
        );
        assert_eq!(config.experiment.inter_trial_delay(), Duration::from_millis(100));
        assert_eq!(config.experiment.progress_interval, 100);
        assert_eq!(config.analysis.significance_level, 0.05);
        assert_eq!(config.analysis.normality_sample_cap, 5000);
        assert_eq!(config.analysis.normality_seed, 42);
        assert_eq!(config.analysis.variance, VarianceModel::Pooled);
        assert_eq!(config.charts_dir(), PathBuf::from("results/charts"));
        assert_eq!(config.trial_count(), 6000);
    }

    #[test]
    fn test_load_partial_config() {
        let toml_content = r#"
repositories = ["rust-lang/rust", "tokio-rs/tokio"]
repetitions = 20

[experiment]
shuffle_seed = 7

[analysis]
variance = "welch"
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();

        // Overridden values
        assert_eq!(config.repositories.len(), 2);
        assert_eq!(config.repositories[1].owner, "tokio-rs");
        assert_eq!(config.repetitions, 20);
        assert_eq!(config.experiment.shuffle_seed, Some(7));
        assert_eq!(config.analysis.variance, VarianceModel::Welch);

        // Default values
        assert_eq!(config.experiment.warmup_runs, 5);
        assert_eq!(config.analysis.significance_level, 0.05);
        assert_eq!(config.api.rest_url, "https://api.github.com");
    }

    #[test]
    fn test_load_full_config() {
        let toml_content = r#"
credential = "ghp_example"
repositories = ["octocat/Hello-World"]
repetitions = 3
output_dir = "out"

[api]
rest_url = "http://localhost:8080"
graphql_url = "http://localhost:8080/graphql"
request_timeout_ms = 2500

[experiment]
warmup_runs = 0
canary_repository = "octocat/Spoon-Knife"
inter_trial_delay_ms = 0
progress_interval = 10

[analysis]
significance_level = 0.01
normality_sample_cap = 500
normality_seed = 1

[dashboard]
charts_dir = "figures"
"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.credential, "ghp_example");
        assert_eq!(config.repetitions, 3);
        assert_eq!(config.api.request_timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.experiment.warmup_runs, 0);
        assert_eq!(config.experiment.canary_repository.name, "Spoon-Knife");
        assert_eq!(config.experiment.progress_interval, 10);
        assert_eq!(config.analysis.significance_level, 0.01);
        assert_eq!(config.analysis.normality_sample_cap, 500);
        assert_eq!(config.charts_dir(), PathBuf::from("out/figures"));
        assert!(config.validate().is_ok());
        assert!(config.validate_credential().is_ok());
    }

    #[test]
    fn test_invalid_repository_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"repositories = [\"no-slash\"]").unwrap();

        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load(Path::new("/nonexistent/path/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"this is not valid toml {{{{").unwrap();

        let result = Config::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.validate_credential(), Err(ConfigError::MissingCredential));

        config.credential = "  ".to_string();
        assert_eq!(config.validate_credential(), Err(ConfigError::MissingCredential));

        config.repetitions = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroRepetitions));

        config.repetitions = 1;
        config.analysis.significance_level = 1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidSignificanceLevel(1.0))
        );

        config.repositories.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoRepositories));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.repositories, parsed.repositories);
        assert_eq!(config.repetitions, parsed.repetitions);
        assert_eq!(config.api.rest_url, parsed.api.rest_url);
        assert_eq!(
            config.analysis.significance_level,
            parsed.analysis.significance_level
        );
        assert_eq!(config.experiment.shuffle_seed, parsed.experiment.shuffle_seed);
    }
}
