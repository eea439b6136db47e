//! Mean bar charts: per complexity tier with confidence intervals, and the
//! overall comparison.

use apibench_core::stats::{mean, mean_ci_half_width, percent_difference};
use apibench_core::{select, ApiKind, Complexity, Measurement, Metric};

use super::boxplot::axis_label;
use super::panel::{Panel, Scale};
use super::svg::{SvgDocument, TextStyle, INK, MUTED};
use super::{api_color, api_legend};

const CONFIDENCE: f64 = 0.95;
const GAIN: &str = "#2ecc71";
const LOSS: &str = "#e74c3c";

struct Bar {
    api: ApiKind,
    mean: f64,
    /// Half-width of the confidence interval, NaN when undefined.
    error: f64,
}

fn tier_bars(records: &[Measurement], metric: Metric, complexity: Complexity) -> Vec<Bar> {
    ApiKind::ALL
        .into_iter()
        .filter_map(|api| {
            let values = select(records, api, Some(complexity), metric);
            (!values.is_empty()).then(|| Bar {
                api,
                mean: mean(&values),
                error: mean_ci_half_width(&values, CONFIDENCE),
            })
        })
        .collect()
}

fn error_bar(doc: &mut SvgDocument, panel: &Panel, x: f64, bar: &Bar) {
    if !bar.error.is_finite() {
        return;
    }
    let lo = panel.y_of(bar.mean - bar.error);
    let hi = panel.y_of(bar.mean + bar.error);
    doc.line(x, lo, x, hi, INK, 1.5);
    doc.line(x - 5.0, lo, x + 5.0, lo, INK, 1.5);
    doc.line(x - 5.0, hi, x + 5.0, hi, INK, 1.5);
}

fn complexity_panel(doc: &mut SvgDocument, records: &[Measurement], metric: Metric, area: (f64, f64, f64, f64)) {
    let groups: Vec<Vec<Bar>> = Complexity::ALL
        .into_iter()
        .map(|c| tier_bars(records, metric, c))
        .collect();
    let tops = groups
        .iter()
        .flatten()
        .map(|b| b.mean + if b.error.is_finite() { b.error } else { 0.0 });
    let panel = Panel::new(area, Scale::covering(tops, true));

    let title = match metric {
        Metric::TimeMs => "Mean Response Time by Complexity",
        Metric::SizeBytes => "Mean Response Size by Complexity",
    };
    panel.draw_frame(doc, title, "Complexity", axis_label(metric));
    panel.category_labels(doc, &Complexity::ALL.map(|c| c.as_str()));

    let slot = panel.slot_width(Complexity::ALL.len());
    let bar_width = slot * 0.35;
    for (i, bars) in groups.iter().enumerate() {
        let center = panel.slot_center(i, Complexity::ALL.len());
        for bar in bars {
            let x = match bar.api {
                ApiKind::Rest => center - bar_width / 2.0,
                ApiKind::GraphQl => center + bar_width / 2.0,
            };
            let top = panel.y_of(bar.mean);
            let base = panel.y_of(0.0);
            doc.rect(x - bar_width / 2.0, top, bar_width, base - top, api_color(bar.api), None);
            error_bar(doc, &panel, x, bar);
        }
    }
    panel.legend(doc, "API", &api_legend());
}

/// Mean per tier with 95% confidence intervals, time and size side by side.
pub(super) fn complexity_bars(records: &[Measurement]) -> SvgDocument {
    let mut doc = SvgDocument::new(1400, 600);
    complexity_panel(&mut doc, records, Metric::TimeMs, (100.0, 80.0, 540.0, 420.0));
    complexity_panel(&mut doc, records, Metric::SizeBytes, (800.0, 80.0, 540.0, 420.0));
    doc
}

fn value_label(metric: Metric, value: f64) -> String {
    match metric {
        Metric::TimeMs => format!("{:.1} ms", value),
        Metric::SizeBytes => format!("{:.0} B", value),
    }
}

fn mean_panel(doc: &mut SvgDocument, records: &[Measurement], metric: Metric, area: (f64, f64, f64, f64)) {
    let means: Vec<(ApiKind, f64)> = ApiKind::ALL
        .into_iter()
        .filter_map(|api| {
            let values = select(records, api, None, metric);
            (!values.is_empty()).then(|| (api, mean(&values)))
        })
        .collect();
    // headroom for the value labels
    let top = means.iter().map(|(_, m)| *m).fold(0.0, f64::max) * 1.12;
    let panel = Panel::new(area, Scale::covering([0.0, top], true));

    let title = match metric {
        Metric::TimeMs => "Mean Response Time",
        Metric::SizeBytes => "Mean Response Size",
    };
    panel.draw_frame(doc, title, "API", axis_label(metric));
    panel.category_labels(doc, &ApiKind::ALL.map(|a| a.as_str()));

    let bar_width = panel.slot_width(ApiKind::ALL.len()) * 0.5;
    for (api, value) in &means {
        let index = ApiKind::ALL.iter().position(|a| a == api).unwrap_or(0);
        let center = panel.slot_center(index, ApiKind::ALL.len());
        let y = panel.y_of(*value);
        doc.rect(center - bar_width / 2.0, y, bar_width, panel.y_of(0.0) - y, api_color(*api), None);
        doc.text(center, y - 8.0, &value_label(metric, *value), TextStyle::new(12).bold());
    }
    if means.is_empty() {
        panel.no_data(doc);
    }
}

/// Percent by which GraphQL's mean undercuts REST's per tier, skipping
/// tiers that miss either side.
fn tier_differences(records: &[Measurement], metric: Metric) -> Vec<(Complexity, f64)> {
    Complexity::ALL
        .into_iter()
        .filter_map(|c| {
            let rest = select(records, ApiKind::Rest, Some(c), metric);
            let graphql = select(records, ApiKind::GraphQl, Some(c), metric);
            if rest.is_empty() || graphql.is_empty() {
                return None;
            }
            let diff = percent_difference(mean(&rest), mean(&graphql));
            diff.is_finite().then_some((c, diff))
        })
        .collect()
}

fn difference_panel(doc: &mut SvgDocument, records: &[Measurement], metric: Metric, area: (f64, f64, f64, f64)) {
    let diffs = tier_differences(records, metric);
    let panel = Panel::new(area, Scale::covering(diffs.iter().map(|(_, d)| *d), true));

    let title = match metric {
        Metric::TimeMs => "Time Difference: REST vs GraphQL",
        Metric::SizeBytes => "Size Difference: REST vs GraphQL",
    };
    panel.draw_frame(doc, title, "Complexity", "Difference (%)");
    panel.category_labels(doc, &Complexity::ALL.map(|c| c.as_str()));

    let zero = panel.y_of(0.0);
    let bar_width = panel.slot_width(Complexity::ALL.len()) * 0.5;
    for (complexity, diff) in &diffs {
        let index = Complexity::ALL.iter().position(|c| c == complexity).unwrap_or(0);
        let center = panel.slot_center(index, Complexity::ALL.len());
        let y = panel.y_of(*diff);
        let color = if *diff > 0.0 { GAIN } else { LOSS };
        doc.rect(center - bar_width / 2.0, y.min(zero), bar_width, (zero - y).abs(), color, None);
        let label_y = if *diff > 0.0 { y - 8.0 } else { y + 18.0 };
        doc.text(center, label_y, &format!("{:+.1}%", diff), TextStyle::new(12).bold());
    }
    doc.line(panel.x, zero, panel.right(), zero, MUTED, 1.5);
}

/// Overall means (top) and per-tier percent differences (bottom).
pub(super) fn overview(records: &[Measurement]) -> SvgDocument {
    let mut doc = SvgDocument::new(1400, 1000);
    mean_panel(&mut doc, records, Metric::TimeMs, (100.0, 80.0, 540.0, 360.0));
    mean_panel(&mut doc, records, Metric::SizeBytes, (800.0, 80.0, 540.0, 360.0));
    difference_panel(&mut doc, records, Metric::TimeMs, (100.0, 560.0, 540.0, 360.0));
    difference_panel(&mut doc, records, Metric::SizeBytes, (800.0, 560.0, 540.0, 360.0));
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::fixtures;

    #[test]
    fn test_tier_differences() {
        let diffs = tier_differences(&fixtures::records(), Metric::TimeMs);

        assert_eq!(diffs.len(), 3);
        for (_, diff) in &diffs {
            assert!((diff + 50.0).abs() < 1e-9);
        }

        let sizes = tier_differences(&fixtures::records(), Metric::SizeBytes);
        assert!(sizes.iter().all(|(_, d)| *d > 0.0));
    }

    #[test]
    fn test_tier_missing_side_is_skipped() {
        let records: Vec<Measurement> = fixtures::records()
            .into_iter()
            .filter(|r| !(r.complexity == Complexity::Medium && r.api_kind == ApiKind::GraphQl))
            .collect();

        let diffs = tier_differences(&records, Metric::TimeMs);

        assert_eq!(
            diffs.iter().map(|(c, _)| *c).collect::<Vec<_>>(),
            vec![Complexity::Simple, Complexity::Complex]
        );
    }

    #[test]
    fn test_overview_labels_and_colors() {
        let svg = overview(&fixtures::records()).render();

        assert!(svg.contains(" ms</text>"));
        assert!(svg.contains(" B</text>"));
        assert!(svg.contains("-50.0%"));
        assert!(svg.contains(GAIN));
        assert!(svg.contains(LOSS));
    }

    #[test]
    fn test_complexity_bars_have_error_bars() {
        let svg = complexity_bars(&fixtures::records()).render();

        assert!(svg.contains("Mean Response Time by Complexity"));
        // 12 bars plus the white background and legend boxes/swatches
        assert!(svg.matches("<rect").count() >= 12);
        assert!(svg.contains(r#"stroke-width="1.5""#));
    }
}
