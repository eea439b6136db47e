//! The analysis pipeline behind `apibench analyze`.
//!
//! An [`Analyzer`] turns the measurement table into an [`AnalysisReport`]:
//! grouped descriptive statistics, normality checks, and the REST vs GraphQL
//! comparison for each research question and each complexity tier. Reporters
//! only format what the report already holds.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::record::{select, ApiKind, Complexity, Measurement, Metric};
use crate::stats::{
    cohens_d, percent_difference, MannWhitneyU, ShapiroWilk, Summary, TTest, TestOutcome,
    TwoSampleTest, VarianceModel,
};

/// Knobs of the analysis, mirrored by the `[analysis]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Significance level used for every test.
    pub significance_level: f64,
    /// Groups larger than this are down-sampled before the normality check.
    pub normality_sample_cap: usize,
    /// Seed of the normality down-sampling.
    pub normality_seed: u64,
    /// Variance model of the parametric test.
    pub variance: VarianceModel,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            normality_sample_cap: 5000,
            normality_seed: 42,
            variance: VarianceModel::Pooled,
        }
    }
}

/// The two questions the experiment answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResearchQuestion {
    /// Are GraphQL responses faster than REST responses?
    Rq1,
    /// Are GraphQL responses smaller than REST responses?
    Rq2,
}

impl ResearchQuestion {
    pub const ALL: [ResearchQuestion; 2] = [ResearchQuestion::Rq1, ResearchQuestion::Rq2];

    pub fn label(&self) -> &'static str {
        match self {
            ResearchQuestion::Rq1 => "RQ1",
            ResearchQuestion::Rq2 => "RQ2",
        }
    }

    pub fn question(&self) -> &'static str {
        match self {
            ResearchQuestion::Rq1 => "Are GraphQL responses faster than REST responses?",
            ResearchQuestion::Rq2 => "Are GraphQL responses smaller than REST responses?",
        }
    }

    pub fn metric(&self) -> Metric {
        match self {
            ResearchQuestion::Rq1 => Metric::TimeMs,
            ResearchQuestion::Rq2 => Metric::SizeBytes,
        }
    }
}

/// Descriptive statistics of one API kind, optionally within one tier.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub api: ApiKind,
    pub complexity: Option<Complexity>,
    pub time: Summary,
    pub size: Summary,
}

impl GroupSummary {
    pub fn metric(&self, metric: Metric) -> &Summary {
        match metric {
            Metric::TimeMs => &self.time,
            Metric::SizeBytes => &self.size,
        }
    }
}

/// Shapiro-Wilk result for one (API kind, metric) group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalityCheck {
    pub api: ApiKind,
    pub metric: Metric,
    pub result: ShapiroWilk,
    pub normal: bool,
}

/// REST vs GraphQL on one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub metric: Metric,
    pub t_test: TestOutcome,
    pub mann_whitney: TestOutcome,
    pub cohens_d: f64,
    pub rest: Summary,
    pub graphql: Summary,
    /// `(mean_rest - mean_graphql) / mean_rest * 100`; positive when GraphQL is lower.
    pub diff_percent: f64,
    /// Whether the t-test p-value is below the significance level.
    pub significant: bool,
}

impl Comparison {
    pub fn mean_rest(&self) -> f64 {
        self.rest.mean
    }

    pub fn mean_graphql(&self) -> f64 {
        self.graphql.mean
    }

    /// The API with the lower mean, if the difference is significant.
    pub fn winner(&self) -> Option<ApiKind> {
        if !self.significant {
            return None;
        }
        if self.rest.mean > self.graphql.mean {
            Some(ApiKind::GraphQl)
        } else {
            Some(ApiKind::Rest)
        }
    }

    /// Plain-language verdict keyed on significance and the lower mean.
    pub fn conclusion(&self) -> &'static str {
        match (self.metric, self.winner()) {
            (Metric::TimeMs, Some(ApiKind::GraphQl)) => "GraphQL is significantly FASTER than REST",
            (Metric::TimeMs, Some(ApiKind::Rest)) => "REST is significantly FASTER than GraphQL",
            (Metric::TimeMs, None) => "No significant difference in response time",
            (Metric::SizeBytes, Some(ApiKind::GraphQl)) => {
                "GraphQL returns significantly SMALLER responses than REST"
            }
            (Metric::SizeBytes, Some(ApiKind::Rest)) => {
                "REST returns significantly SMALLER responses than GraphQL"
            }
            (Metric::SizeBytes, None) => "No significant difference in response size",
        }
    }
}

/// Both metrics compared within one complexity tier.
#[derive(Debug, Clone, PartialEq)]
pub struct TierComparison {
    pub complexity: Complexity,
    pub time: Comparison,
    pub size: Comparison,
}

/// Everything `apibench analyze` reports.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub record_count: usize,
    pub repository_count: usize,
    pub significance_level: f64,
    pub normality_sample_cap: usize,
    /// One entry per API kind, REST first.
    pub by_api: Vec<GroupSummary>,
    /// One entry per (complexity, API kind), simple first.
    pub by_complexity: Vec<GroupSummary>,
    pub normality: Vec<NormalityCheck>,
    pub rq1: Comparison,
    pub rq2: Comparison,
    pub tiers: Vec<TierComparison>,
}

impl AnalysisReport {
    pub fn comparison(&self, question: ResearchQuestion) -> &Comparison {
        match question {
            ResearchQuestion::Rq1 => &self.rq1,
            ResearchQuestion::Rq2 => &self.rq2,
        }
    }
}

/// Runs the descriptive and inferential statistics over a measurement table.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    t_test: TTest,
    u_test: MannWhitneyU,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            t_test: TTest::new(config.variance),
            u_test: MannWhitneyU::new(),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(&self, records: &[Measurement]) -> AnalysisReport {
        let repository_count = records
            .iter()
            .map(|r| &r.repository)
            .collect::<BTreeSet<_>>()
            .len();
        debug!(
            records = records.len(),
            repositories = repository_count,
            test = self.t_test.name(),
            "analyzing measurements"
        );

        let by_api = ApiKind::ALL
            .iter()
            .map(|&api| Self::summarize(records, api, None))
            .collect();

        let by_complexity = Complexity::ALL
            .iter()
            .flat_map(|&complexity| {
                ApiKind::ALL
                    .iter()
                    .map(move |&api| Self::summarize(records, api, Some(complexity)))
            })
            .collect();

        let normality = ApiKind::ALL
            .iter()
            .flat_map(|&api| Metric::ALL.iter().map(move |&metric| (api, metric)))
            .map(|(api, metric)| self.check_normality(records, api, metric))
            .collect();

        let tiers = Complexity::ALL
            .iter()
            .map(|&complexity| TierComparison {
                complexity,
                time: self.compare(records, Some(complexity), Metric::TimeMs),
                size: self.compare(records, Some(complexity), Metric::SizeBytes),
            })
            .collect();

        AnalysisReport {
            record_count: records.len(),
            repository_count,
            significance_level: self.config.significance_level,
            normality_sample_cap: self.config.normality_sample_cap,
            by_api,
            by_complexity,
            normality,
            rq1: self.compare(records, None, ResearchQuestion::Rq1.metric()),
            rq2: self.compare(records, None, ResearchQuestion::Rq2.metric()),
            tiers,
        }
    }

    /// REST vs GraphQL on `metric`, over every record or one tier.
    pub fn compare(
        &self,
        records: &[Measurement],
        complexity: Option<Complexity>,
        metric: Metric,
    ) -> Comparison {
        let rest = select(records, ApiKind::Rest, complexity, metric);
        let graphql = select(records, ApiKind::GraphQl, complexity, metric);

        let t_test = self.t_test.test(&rest, &graphql);
        let mann_whitney = self.u_test.test(&rest, &graphql);
        let rest_summary = Summary::of(&rest);
        let graphql_summary = Summary::of(&graphql);

        Comparison {
            metric,
            t_test,
            mann_whitney,
            cohens_d: cohens_d(&rest, &graphql),
            diff_percent: percent_difference(rest_summary.mean, graphql_summary.mean),
            significant: t_test.is_significant(self.config.significance_level),
            rest: rest_summary,
            graphql: graphql_summary,
        }
    }

    fn check_normality(&self, records: &[Measurement], api: ApiKind, metric: Metric) -> NormalityCheck {
        let values = select(records, api, None, metric);
        let result = ShapiroWilk::test_sampled(
            &values,
            self.config.normality_sample_cap,
            self.config.normality_seed,
        );
        NormalityCheck {
            api,
            metric,
            result,
            normal: result.is_normal(self.config.significance_level),
        }
    }

    fn summarize(records: &[Measurement], api: ApiKind, complexity: Option<Complexity>) -> GroupSummary {
        GroupSummary {
            api,
            complexity,
            time: Summary::of(&select(records, api, complexity, Metric::TimeMs)),
            size: Summary::of(&select(records, api, complexity, Metric::SizeBytes)),
        }
    }
}
