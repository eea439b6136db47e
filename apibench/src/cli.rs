//! Command-line interface for apibench.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "apibench")]
#[command(about = "Controlled REST vs GraphQL response time and payload size experiment")]
#[command(version)]
pub struct Cli {
    /// Path to config file (defaults to .apibench.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the experiment and write the result tables
    Run(RunArgs),
    /// Print the statistical analysis and export analysis_results.csv
    Analyze,
    /// Render the charts
    Dashboard,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// API credential (personal access token)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repetitions of each treatment
    #[arg(long)]
    pub repetitions: Option<u32>,

    /// Seed for the trial shuffle
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    /// Apply CLI overrides to the configuration.
    ///
    /// CLI arguments take precedence over config file values.
    /// Only non-None optional values will override the config.
    pub fn apply_to_config(&self, config: &mut Config) {
        if let Command::Run(args) = &self.command {
            if let Some(token) = &args.token {
                config.credential = token.clone();
            }

            if let Some(repetitions) = args.repetitions {
                config.repetitions = repetitions;
            }

            if let Some(seed) = args.seed {
                config.experiment.shuffle_seed = Some(seed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CREDENTIAL_SENTINEL;

    fn run_cli(token: Option<&str>, repetitions: Option<u32>, seed: Option<u64>) -> Cli {
        Cli {
            config: None,
            verbose: false,
            command: Command::Run(RunArgs {
                token: token.map(str::to_string),
                repetitions,
                seed,
            }),
        }
    }

    #[test]
    fn test_apply_to_config_with_overrides() {
        let cli = run_cli(Some("ghp_abc"), Some(10), Some(99));

        let mut config = Config::default();
        cli.apply_to_config(&mut config);

        assert_eq!(config.credential, "ghp_abc");
        assert_eq!(config.repetitions, 10);
        assert_eq!(config.experiment.shuffle_seed, Some(99));
    }

    #[test]
    fn test_apply_to_config_without_overrides() {
        let cli = run_cli(None, None, None);

        let mut config = Config::default();
        cli.apply_to_config(&mut config);

        // Values should remain unchanged
        assert_eq!(config.credential, CREDENTIAL_SENTINEL);
        assert_eq!(config.repetitions, 100);
        assert_eq!(config.experiment.shuffle_seed, None);
    }

    #[test]
    fn test_analyze_leaves_config_untouched() {
        let cli = Cli {
            config: None,
            verbose: true,
            command: Command::Analyze,
        };

        let mut config = Config::default();
        cli.apply_to_config(&mut config);

        assert_eq!(config.repetitions, 100);
    }

    #[test]
    fn test_cli_parse_run() {
        let cli = Cli::try_parse_from([
            "apibench",
            "--config",
            "lab.toml",
            "-v",
            "run",
            "--token",
            "ghp_xyz",
            "--repetitions",
            "5",
            "--seed",
            "42",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("lab.toml")));
        assert!(cli.verbose);
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.token.as_deref(), Some("ghp_xyz"));
                assert_eq!(args.repetitions, Some(5));
                assert_eq!(args.seed, Some(42));
            }
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_cli_parse_minimal() {
        let cli = Cli::try_parse_from(["apibench", "analyze"]).unwrap();

        assert!(cli.config.is_none());
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Command::Analyze));
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["apibench", "dashboard", "--verbose"]).unwrap();

        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Dashboard));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["apibench"]).is_err());
    }
}
