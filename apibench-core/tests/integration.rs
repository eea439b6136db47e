//! End-to-end checks of the analysis phase: a table written to disk is read
//! back, analyzed and exported.

use apibench_core::report::read_analysis;
use apibench_core::summary::write_summaries;
use apibench_core::{
    read_measurements, write_measurements, Analyzer, ApiKind, Complexity, CsvReporter,
    Measurement, QueryResult, Reporter, TableError, Trial, ANALYSIS_FILE, RESULTS_FILE,
};
use chrono::{TimeZone, Utc};
use tempfile::TempDir;

fn measurement(
    api: ApiKind,
    complexity: Complexity,
    repo: &str,
    repetition: u32,
    time_ms: f64,
    size_bytes: u64,
) -> Measurement {
    let trial = Trial {
        api,
        complexity,
        repository: repo.parse().unwrap(),
        repetition,
    };
    let timestamp = Utc.with_ymd_and_hms(2025, 11, 3, 14, 0, repetition).unwrap();
    Measurement::from_result(
        &trial,
        QueryResult {
            time_ms,
            size_bytes,
            status: 200,
        },
        timestamp,
    )
}

/// A synthetic run where GraphQL is consistently smaller and slightly slower.
fn synthetic_run() -> Vec<Measurement> {
    let mut records = Vec::new();
    for (c, complexity) in Complexity::ALL.into_iter().enumerate() {
        for repo in ["facebook/react", "vuejs/vue"] {
            for rep in 1..=10u32 {
                let jitter = ((rep * 7) % 5) as f64;
                let base = 200.0 + 150.0 * c as f64;
                records.push(measurement(
                    ApiKind::Rest,
                    complexity,
                    repo,
                    rep,
                    base + jitter,
                    6000 * (c as u64 + 1) + rep as u64 * 10,
                ));
                records.push(measurement(
                    ApiKind::GraphQl,
                    complexity,
                    repo,
                    rep,
                    base + 3.0 + jitter * 1.1,
                    900 + rep as u64 * 5,
                ));
            }
        }
    }
    records
}

#[test]
fn test_table_roundtrip_then_analyze() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(RESULTS_FILE);
    let records = synthetic_run();

    write_measurements(&path, &records).unwrap();
    let loaded = read_measurements(&path).unwrap();
    assert_eq!(loaded, records);

    let report = Analyzer::default().analyze(&loaded);
    assert_eq!(report.record_count, 120);
    assert_eq!(report.repository_count, 2);
    assert_eq!(report.by_api[0].time.count, 60);
    assert_eq!(
        report.rq2.conclusion(),
        "GraphQL returns significantly SMALLER responses than REST"
    );
    assert!(report.rq2.diff_percent > 80.0);
    assert!(report.rq2.mann_whitney.p_value < 0.001);
}

#[test]
fn test_analysis_export() {
    let dir = TempDir::new().unwrap();
    let report = Analyzer::default().analyze(&synthetic_run());

    CsvReporter::new(dir.path()).report(&report).unwrap();

    let rows = read_analysis(&dir.path().join(ANALYSIS_FILE)).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].research_question, "RQ1");
    assert_eq!(rows[1].metric, "size_bytes");
    assert!(rows[1].significant);
    assert_eq!(rows[1].mean_rest, report.rq2.mean_rest());
}

#[test]
fn test_summaries_written_next_to_results() {
    let dir = TempDir::new().unwrap();
    let paths = write_summaries(dir.path(), &synthetic_run()).unwrap();

    for path in &paths {
        assert!(path.exists(), "{} missing", path.display());
    }
    let by_repository = std::fs::read_to_string(&paths[2]).unwrap();
    // header plus 2 repositories x 2 APIs x 3 tiers
    assert_eq!(by_repository.lines().count(), 13);
}

#[test]
fn test_missing_results_file() {
    let dir = TempDir::new().unwrap();
    let err = read_measurements(&dir.path().join(RESULTS_FILE)).unwrap_err();
    assert!(matches!(err, TableError::NotFound(_)));
}

#[test]
fn test_analysis_is_deterministic() {
    let records = synthetic_run();
    let first = Analyzer::default().analyze(&records);
    let second = Analyzer::default().analyze(&records);

    assert_eq!(first.normality, second.normality);
}
