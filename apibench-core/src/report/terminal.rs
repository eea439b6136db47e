use std::io::{self, Write};

use colored::{ColoredString, Colorize};

use super::{ReportError, Reporter};
use crate::analysis::{AnalysisReport, Comparison, GroupSummary, ResearchQuestion};
use crate::record::{ApiKind, Metric};
use crate::stats::{effect_magnitude, significance_stars};

const WIDTH: usize = 70;
const BOX_INNER: usize = WIDTH - 1;

/// A reporter that prints the full analysis to the terminal.
#[derive(Debug, Clone, Default)]
pub struct TerminalReporter {
    /// Whether to use colors in output (defaults to true).
    use_colors: bool,
}

impl TerminalReporter {
    /// Create a new terminal reporter with default settings.
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    /// Create a terminal reporter with color output disabled.
    pub fn without_colors() -> Self {
        Self { use_colors: false }
    }

    fn paint(&self, text: &str, style: impl Fn(ColoredString) -> ColoredString) -> String {
        if self.use_colors {
            style(text.normal()).to_string()
        } else {
            text.to_string()
        }
    }

    /// Format a metric value: milliseconds keep two decimals, bytes none.
    fn format_value(metric: Metric, value: f64) -> String {
        match metric {
            Metric::TimeMs => format!("{:.2}", value),
            Metric::SizeBytes => format!("{:.0}", value),
        }
    }

    /// Format the percent difference of GraphQL relative to REST.
    fn format_change(diff_percent: f64) -> String {
        if diff_percent == 0.0 {
            "0.00%".to_string()
        } else {
            format!("{:+.2}%", diff_percent)
        }
    }

    fn metric_title(metric: Metric) -> &'static str {
        match metric {
            Metric::TimeMs => "RESPONSE TIME (ms)",
            Metric::SizeBytes => "RESPONSE SIZE (bytes)",
        }
    }

    fn print_banner(&self, writer: &mut impl Write, title: &str) -> io::Result<()> {
        writeln!(writer)?;
        writeln!(writer, "{}", "=".repeat(WIDTH))?;
        writeln!(writer, "{}", self.paint(title, |s| s.bold()))?;
        writeln!(writer, "{}", "=".repeat(WIDTH))?;
        Ok(())
    }

    fn print_section(&self, writer: &mut impl Write, title: &str) -> io::Result<()> {
        writeln!(writer)?;
        writeln!(writer, "{}", "-".repeat(WIDTH))?;
        writeln!(writer, "{}", self.paint(title, |s| s.bold()))?;
        writeln!(writer, "{}", "-".repeat(WIDTH))?;
        Ok(())
    }

    /// Print the dataset overview.
    fn print_header(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        self.print_banner(writer, "STATISTICAL ANALYSIS: GraphQL vs REST")?;
        writeln!(writer, "Records loaded: {}", report.record_count)?;
        writeln!(writer, "Repositories:   {}", report.repository_count)?;
        Ok(())
    }

    fn print_api_table(
        &self,
        writer: &mut impl Write,
        metric: Metric,
        groups: &[GroupSummary],
    ) -> io::Result<()> {
        self.print_section(writer, &format!("{} - by API kind", Self::metric_title(metric)))?;
        writeln!(
            writer,
            "{:<10} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "API", "N", "Mean", "Std", "Min", "Median", "Max"
        )?;
        for group in groups {
            let s = group.metric(metric);
            writeln!(
                writer,
                "{:<10} {:>6} {:>12} {:>12} {:>12} {:>12} {:>12}",
                group.api.as_str(),
                s.count,
                Self::format_value(metric, s.mean),
                Self::format_value(metric, s.std_dev),
                Self::format_value(metric, s.min),
                Self::format_value(metric, s.median),
                Self::format_value(metric, s.max),
            )?;
        }
        Ok(())
    }

    fn print_complexity_table(
        &self,
        writer: &mut impl Write,
        metric: Metric,
        groups: &[GroupSummary],
    ) -> io::Result<()> {
        self.print_section(
            writer,
            &format!("{} - by complexity and API kind", Self::metric_title(metric)),
        )?;
        writeln!(
            writer,
            "{:<10} {:<10} {:>6} {:>12} {:>12} {:>12}",
            "Complexity", "API", "N", "Mean", "Std", "Median"
        )?;
        for group in groups {
            let s = group.metric(metric);
            let complexity = group.complexity.map(|c| c.as_str()).unwrap_or("all");
            writeln!(
                writer,
                "{:<10} {:<10} {:>6} {:>12} {:>12} {:>12}",
                complexity,
                group.api.as_str(),
                s.count,
                Self::format_value(metric, s.mean),
                Self::format_value(metric, s.std_dev),
                Self::format_value(metric, s.median),
            )?;
        }
        Ok(())
    }

    fn print_descriptive(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        self.print_banner(writer, "DESCRIPTIVE STATISTICS")?;
        for metric in Metric::ALL {
            self.print_api_table(writer, metric, &report.by_api)?;
        }
        for metric in Metric::ALL {
            self.print_complexity_table(writer, metric, &report.by_complexity)?;
        }
        Ok(())
    }

    fn print_normality(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        self.print_banner(writer, "NORMALITY TESTS (Shapiro-Wilk)")?;
        writeln!(writer, "H0: the data follow a normal distribution")?;
        writeln!(writer, "H1: the data do NOT follow a normal distribution")?;
        writeln!(
            writer,
            "Significance level: alpha = {}",
            report.significance_level
        )?;
        writeln!(writer, "{}", "-".repeat(WIDTH))?;

        for check in &report.normality {
            let (normal, decision) = if check.normal {
                ("yes", "do not reject H0")
            } else {
                ("no", "reject H0")
            };
            let normal = if check.normal {
                self.paint(&format!("{:<3}", normal), |s| s.green())
            } else {
                self.paint(&format!("{:<3}", normal), |s| s.yellow())
            };
            writeln!(
                writer,
                "{:<8} | {:<10} | W = {:.4} | p = {:.6} | normal: {} | {}",
                check.api.as_str(),
                check.metric.column(),
                check.result.w,
                check.result.p_value,
                normal,
                decision,
            )?;
        }

        writeln!(writer, "{}", "-".repeat(WIDTH))?;
        writeln!(
            writer,
            "Groups above {} values are tested on a seeded random sample.",
            report.normality_sample_cap
        )?;
        writeln!(
            writer,
            "When p < alpha the data are not normal; prefer the Mann-Whitney U result."
        )?;
        Ok(())
    }

    fn print_hypothesis(
        &self,
        writer: &mut impl Write,
        question: ResearchQuestion,
        comparison: &Comparison,
        alpha: f64,
    ) -> io::Result<()> {
        self.print_section(
            writer,
            &format!("{}: {}", question.label(), question.question()),
        )?;
        writeln!(writer, "H0: mu_GraphQL = mu_REST (no significant difference)")?;
        writeln!(writer, "H1: mu_GraphQL != mu_REST (significant difference)")?;
        writeln!(writer, "Significance level: alpha = {}", alpha)?;
        writeln!(writer)?;

        writeln!(writer, "Independent t-test:")?;
        writeln!(writer, "  t-statistic = {:.4}", comparison.t_test.statistic)?;
        writeln!(writer, "  p-value     = {:.6}", comparison.t_test.p_value)?;
        writeln!(writer)?;
        writeln!(writer, "Mann-Whitney U test (non-parametric):")?;
        writeln!(writer, "  U-statistic = {:.2}", comparison.mann_whitney.statistic)?;
        writeln!(writer, "  p-value     = {:.6}", comparison.mann_whitney.p_value)?;
        writeln!(writer)?;
        writeln!(
            writer,
            "Effect size (Cohen's d): {:.4} ({})",
            comparison.cohens_d,
            effect_magnitude(comparison.cohens_d)
        )?;
        writeln!(writer)?;

        let verdict = if comparison.significant {
            self.paint("REJECT H0", |s| s.green().bold())
        } else {
            self.paint("DO NOT REJECT H0", |s| s.yellow().bold())
        };
        writeln!(writer, "{}", "=".repeat(50))?;
        writeln!(writer, "CONCLUSION {}: {}", question.label(), verdict)?;
        writeln!(writer, "{}", comparison.conclusion())?;
        writeln!(writer, "{}", "=".repeat(50))?;

        let metric = comparison.metric;
        writeln!(
            writer,
            "Mean REST:    {} {}",
            Self::format_value(metric, comparison.mean_rest()),
            metric.unit()
        )?;
        writeln!(
            writer,
            "Mean GraphQL: {} {}",
            Self::format_value(metric, comparison.mean_graphql()),
            metric.unit()
        )?;
        writeln!(
            writer,
            "Difference:   {}",
            Self::format_change(comparison.diff_percent)
        )?;
        Ok(())
    }

    fn print_tier_metric(&self, writer: &mut impl Write, comparison: &Comparison) -> io::Result<()> {
        let metric = comparison.metric;
        writeln!(writer, "{}:", Self::metric_title(metric))?;
        for (api, summary) in [
            (ApiKind::Rest, &comparison.rest),
            (ApiKind::GraphQl, &comparison.graphql),
        ] {
            writeln!(
                writer,
                "  {:<8} {:>12} {} (+/- {})",
                format!("{}:", api),
                Self::format_value(metric, summary.mean),
                metric.unit(),
                Self::format_value(metric, summary.std_dev),
            )?;
        }

        let stars = significance_stars(comparison.t_test.p_value);
        let change = format!("{:+.1}%", comparison.diff_percent);
        let change = if comparison.significant {
            self.paint(&change, |s| s.green())
        } else {
            self.paint(&change, |s| s.yellow())
        };
        writeln!(
            writer,
            "  Difference: {} | p-value: {:.6} {}",
            change, comparison.t_test.p_value, stars
        )?;
        Ok(())
    }

    fn print_tiers(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        self.print_banner(writer, "ANALYSIS BY COMPLEXITY TIER")?;
        for tier in &report.tiers {
            self.print_section(
                writer,
                &format!("COMPLEXITY: {}", tier.complexity.as_str().to_uppercase()),
            )?;
            self.print_tier_metric(writer, &tier.time)?;
            writeln!(writer)?;
            self.print_tier_metric(writer, &tier.size)?;
        }
        writeln!(writer)?;
        writeln!(writer, "{}", "-".repeat(WIDTH))?;
        writeln!(writer, "Legend: * p<0.05 | ** p<0.01 | *** p<0.001")?;
        Ok(())
    }

    fn box_line(writer: &mut impl Write, content: &str) -> io::Result<()> {
        let padding = (BOX_INNER - 2).saturating_sub(content.chars().count());
        writeln!(writer, "│ {}{} │", content, " ".repeat(padding))
    }

    fn print_box(
        &self,
        writer: &mut impl Write,
        question: ResearchQuestion,
        comparison: &Comparison,
    ) -> io::Result<()> {
        let metric = comparison.metric;
        let unit = metric.unit();
        writeln!(writer, "┌{}┐", "─".repeat(BOX_INNER))?;
        Self::box_line(writer, &format!("{}: {}", question.label(), question.question()))?;
        writeln!(writer, "├{}┤", "─".repeat(BOX_INNER))?;
        Self::box_line(writer, &format!("Result: {}", comparison.conclusion()))?;
        Self::box_line(writer, &format!("p-value: {:.6}", comparison.t_test.p_value))?;
        Self::box_line(writer, &format!("Cohen's d: {:.4}", comparison.cohens_d))?;
        Self::box_line(
            writer,
            &format!(
                "Mean REST: {} {}",
                Self::format_value(metric, comparison.mean_rest()),
                unit
            ),
        )?;
        Self::box_line(
            writer,
            &format!(
                "Mean GraphQL: {} {}",
                Self::format_value(metric, comparison.mean_graphql()),
                unit
            ),
        )?;
        Self::box_line(
            writer,
            &format!("Difference: {}", Self::format_change(comparison.diff_percent)),
        )?;
        writeln!(writer, "└{}┘", "─".repeat(BOX_INNER))?;
        Ok(())
    }

    /// Print the final summary boxes and the effect size legend.
    fn print_summary(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        self.print_banner(writer, "FINAL SUMMARY")?;
        for question in ResearchQuestion::ALL {
            writeln!(writer)?;
            self.print_box(writer, question, report.comparison(question))?;
        }

        writeln!(writer)?;
        writeln!(writer, "Interpreting Cohen's d:")?;
        writeln!(writer, "  |d| < 0.2        : negligible effect")?;
        writeln!(writer, "  0.2 <= |d| < 0.5 : small effect")?;
        writeln!(writer, "  0.5 <= |d| < 0.8 : medium effect")?;
        writeln!(writer, "  |d| >= 0.8       : large effect")?;
        writeln!(writer)?;
        Ok(())
    }

    /// Write the whole report to `writer`.
    pub fn write_report(&self, writer: &mut impl Write, report: &AnalysisReport) -> io::Result<()> {
        self.print_header(writer, report)?;
        self.print_descriptive(writer, report)?;
        self.print_normality(writer, report)?;

        self.print_banner(writer, "HYPOTHESIS TESTS")?;
        for question in ResearchQuestion::ALL {
            self.print_hypothesis(
                writer,
                question,
                report.comparison(question),
                report.significance_level,
            )?;
        }

        self.print_tiers(writer, report)?;
        self.print_summary(writer, report)?;
        Ok(())
    }
}

impl Reporter for TerminalReporter {
    fn report(&self, report: &AnalysisReport) -> Result<(), ReportError> {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        self.write_report(&mut writer, report)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Analyzer;
    use crate::record::{Complexity, Measurement, QueryResult, Trial};
    use chrono::Utc;

    fn record(api: ApiKind, complexity: Complexity, time_ms: f64, size: u64) -> Measurement {
        let trial = Trial {
            api,
            complexity,
            repository: "django/django".parse().unwrap(),
            repetition: 1,
        };
        Measurement::from_result(
            &trial,
            QueryResult {
                time_ms,
                size_bytes: size,
                status: 200,
            },
            Utc::now(),
        )
    }

    fn report() -> AnalysisReport {
        Analyzer::default().analyze(&[
            record(ApiKind::Rest, Complexity::Simple, 100.0, 5000),
            record(ApiKind::Rest, Complexity::Simple, 200.0, 5200),
            record(ApiKind::GraphQl, Complexity::Simple, 50.0, 400),
            record(ApiKind::GraphQl, Complexity::Simple, 60.0, 420),
        ])
    }

    fn render(report: &AnalysisReport) -> String {
        let mut buffer = Vec::new();
        TerminalReporter::without_colors()
            .write_report(&mut buffer, report)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_format_value() {
        assert_eq!(TerminalReporter::format_value(Metric::TimeMs, 123.456), "123.46");
        assert_eq!(TerminalReporter::format_value(Metric::SizeBytes, 5100.4), "5100");
    }

    #[test]
    fn test_format_change() {
        assert_eq!(TerminalReporter::format_change(63.3333), "+63.33%");
        assert_eq!(TerminalReporter::format_change(-10.5), "-10.50%");
        assert_eq!(TerminalReporter::format_change(0.0), "0.00%");
    }

    #[test]
    fn test_report_sections() {
        let output = render(&report());

        assert!(output.contains("DESCRIPTIVE STATISTICS"));
        assert!(output.contains("NORMALITY TESTS (Shapiro-Wilk)"));
        assert!(output.contains("RQ1: Are GraphQL responses faster than REST responses?"));
        assert!(output.contains("RQ2: Are GraphQL responses smaller than REST responses?"));
        assert!(output.contains("COMPLEXITY: SIMPLE"));
        assert!(output.contains("COMPLEXITY: COMPLEX"));
        assert!(output.contains("Legend: * p<0.05 | ** p<0.01 | *** p<0.001"));
        assert!(output.contains("Interpreting Cohen's d:"));
    }

    #[test]
    fn test_report_values() {
        let output = render(&report());

        assert!(output.contains("Mean REST:    150.00 ms"));
        assert!(output.contains("Mean GraphQL: 55.00 ms"));
        assert!(output.contains("Difference:   +63.33%"));
        assert!(output.contains("No significant difference in response time"));
        assert!(output.contains("GraphQL returns significantly SMALLER responses than REST"));
        assert!(output.contains("CONCLUSION RQ1: DO NOT REJECT H0"));
        assert!(output.contains("CONCLUSION RQ2: REJECT H0"));
        // size at the simple tier: t ~ 46.7 with 2 df
        assert!(output
            .lines()
            .any(|l| l.starts_with("  Difference:") && l.ends_with("***")));
    }

    #[test]
    fn test_summary_box_is_aligned() {
        let output = render(&report());

        let widths: Vec<usize> = output
            .lines()
            .filter(|l| l.starts_with('│') || l.starts_with('┌') || l.starts_with('└'))
            .map(|l| l.chars().count())
            .collect();
        assert!(!widths.is_empty());
        assert!(widths.iter().all(|&w| w == BOX_INNER + 2));
    }

    #[test]
    fn test_empty_tier_prints_nan() {
        let output = render(&report());
        let complex = output
            .split("COMPLEXITY: COMPLEX")
            .nth(1)
            .unwrap();
        assert!(complex.contains("NaN"));
    }
}
