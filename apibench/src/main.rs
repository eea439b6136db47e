use std::io;

use anyhow::{Context, Result};
use apibench::{
    build_trials, shuffle_trials, Analyzer, ApiClient, Cli, Command, Config, CsvReporter,
    Dashboard, Reporter, Scheduler, TerminalReporter,
};
use apibench_core::summary::write_summaries;
use apibench_core::{
    partition_outcomes, read_measurements, write_failures, write_measurements, FAILURES_FILE,
    RESULTS_FILE,
};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    // Load config and apply CLI overrides
    let mut config = Config::load_from(cli.config.as_deref())?;
    cli.apply_to_config(&mut config);
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Command::Run(_) => run(&config).await,
        Command::Analyze => analyze(&config),
        Command::Dashboard => dashboard(&config),
    }
}

async fn run(config: &Config) -> Result<()> {
    config.validate_credential()?;

    let client =
        ApiClient::new(&config.api, &config.credential).context("Failed to create API client")?;
    let login = client
        .verify_credentials()
        .await
        .context("Credential check failed")?;
    info!(login = %login, "authenticated");

    let mut trials = build_trials(&config.repositories, config.repetitions);
    shuffle_trials(&mut trials, config.experiment.shuffle_seed);
    info!(
        trials = trials.len(),
        repositories = config.repositories.len(),
        repetitions = config.repetitions,
        "trial set ready"
    );

    let scheduler = Scheduler::new(client, &config.experiment);
    let outcomes = scheduler.run(&trials).await;
    let (measurements, failures) = partition_outcomes(outcomes);

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            config.output_dir.display()
        )
    })?;

    let results_path = config.output_dir.join(RESULTS_FILE);
    write_measurements(&results_path, &measurements)
        .context("Failed to write measurements")?;
    info!(path = %results_path.display(), records = measurements.len(), "results written");

    let failures_path = config.output_dir.join(FAILURES_FILE);
    write_failures(&failures_path, &failures).context("Failed to write failures")?;
    if !failures.is_empty() {
        warn!(path = %failures_path.display(), count = failures.len(), "some trials failed");
    }

    for path in write_summaries(&config.output_dir, &measurements)
        .context("Failed to write summaries")?
    {
        info!(path = %path.display(), "summary written");
    }

    Ok(())
}

fn analyze(config: &Config) -> Result<()> {
    let results_path = config.output_dir.join(RESULTS_FILE);
    let records = read_measurements(&results_path).with_context(|| {
        format!(
            "Failed to read {}. Run `apibench run` first",
            results_path.display()
        )
    })?;

    let analyzer = Analyzer::new(config.analysis);
    let report = analyzer.analyze(&records);

    let reporters: [Box<dyn Reporter>; 2] = [
        Box::new(TerminalReporter::new()),
        Box::new(CsvReporter::new(&config.output_dir)),
    ];
    for reporter in &reporters {
        reporter.report(&report)?;
    }

    Ok(())
}

fn dashboard(config: &Config) -> Result<()> {
    let results_path = config.output_dir.join(RESULTS_FILE);
    let records = read_measurements(&results_path).with_context(|| {
        format!(
            "Failed to read {}. Run `apibench run` first",
            results_path.display()
        )
    })?;

    let dashboard = Dashboard::new(config.charts_dir());
    let written = dashboard
        .render_all(&records)
        .context("Failed to render dashboard")?;
    info!(
        charts = written.len(),
        dir = %dashboard.charts_dir().display(),
        "dashboard complete"
    );

    Ok(())
}
