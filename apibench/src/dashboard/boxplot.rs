//! Box plots per API kind and split violins per complexity tier.

use apibench_core::stats::{mean, BoxStats, GaussianKde};
use apibench_core::{select, ApiKind, Complexity, Measurement, Metric};

use super::panel::{Panel, Scale};
use super::svg::{SvgDocument, TextStyle, INK};
use super::{api_color, api_legend};

const WIDTH: u32 = 1400;
const HEIGHT: u32 = 600;
const LEFT: (f64, f64, f64, f64) = (100.0, 80.0, 500.0, 420.0);
const RIGHT: (f64, f64, f64, f64) = (780.0, 80.0, 560.0, 420.0);
const KDE_POINTS: usize = 60;

pub(super) fn axis_label(metric: Metric) -> &'static str {
    match metric {
        Metric::TimeMs => "Response time (ms)",
        Metric::SizeBytes => "Response size (bytes)",
    }
}

fn metric_title(metric: Metric) -> &'static str {
    match metric {
        Metric::TimeMs => "Response Time",
        Metric::SizeBytes => "Response Size",
    }
}

fn mean_label(metric: Metric, value: f64) -> String {
    match metric {
        Metric::TimeMs => format!("μ = {:.1}ms", value),
        Metric::SizeBytes => format!("μ = {:.0}B", value),
    }
}

fn values_scale(records: &[Measurement], metric: Metric) -> Scale {
    Scale::covering(records.iter().map(|r| metric.value(r)), false)
}

fn draw_box(doc: &mut SvgDocument, panel: &Panel, center: f64, width: f64, stats: &BoxStats, color: &str) {
    let half = width / 2.0;
    let (q1, q3) = (panel.y_of(stats.q1), panel.y_of(stats.q3));
    let (lo, hi) = (panel.y_of(stats.lower_whisker), panel.y_of(stats.upper_whisker));

    doc.line(center, hi, center, q3, INK, 1.0);
    doc.line(center, q1, center, lo, INK, 1.0);
    doc.line(center - half / 2.0, hi, center + half / 2.0, hi, INK, 1.0);
    doc.line(center - half / 2.0, lo, center + half / 2.0, lo, INK, 1.0);
    doc.rect(center - half, q3, width, q1 - q3, color, Some(INK));

    let median = panel.y_of(stats.median);
    doc.line(center - half, median, center + half, median, INK, 2.0);

    for outlier in &stats.outliers {
        doc.ring(center, panel.y_of(*outlier), 3.0, INK);
    }
}

fn boxplot(records: &[Measurement], metric: Metric) -> SvgDocument {
    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    let scale = values_scale(records, metric);

    let overall = Panel::new(LEFT, scale);
    overall.draw_frame(
        &mut doc,
        &format!("{} by API", metric_title(metric)),
        "API",
        axis_label(metric),
    );
    overall.category_labels(&mut doc, &ApiKind::ALL.map(|a| a.as_str()));
    let width = overall.slot_width(ApiKind::ALL.len()) * 0.5;
    for (i, api) in ApiKind::ALL.into_iter().enumerate() {
        let values = select(records, api, None, metric);
        let Some(stats) = BoxStats::of(&values) else {
            continue;
        };
        let center = overall.slot_center(i, ApiKind::ALL.len());
        draw_box(&mut doc, &overall, center, width, &stats, api_color(api));
        doc.text(
            center,
            overall.y_of(stats.upper_whisker) - 10.0,
            &mean_label(metric, mean(&values)),
            TextStyle::new(12).bold(),
        );
    }
    if records.is_empty() {
        overall.no_data(&mut doc);
    }

    let tiers = Panel::new(RIGHT, scale);
    tiers.draw_frame(
        &mut doc,
        &format!("{} by Complexity", metric_title(metric)),
        "Complexity",
        axis_label(metric),
    );
    tiers.category_labels(&mut doc, &Complexity::ALL.map(|c| c.as_str()));
    let slot = tiers.slot_width(Complexity::ALL.len());
    for (i, complexity) in Complexity::ALL.into_iter().enumerate() {
        let center = tiers.slot_center(i, Complexity::ALL.len());
        for (j, api) in ApiKind::ALL.into_iter().enumerate() {
            let values = select(records, api, Some(complexity), metric);
            if let Some(stats) = BoxStats::of(&values) {
                let offset = if j == 0 { -slot * 0.18 } else { slot * 0.18 };
                draw_box(&mut doc, &tiers, center + offset, slot * 0.3, &stats, api_color(api));
            }
        }
    }
    tiers.legend(&mut doc, "API", &api_legend());

    doc
}

pub(super) fn time_boxplot(records: &[Measurement]) -> SvgDocument {
    boxplot(records, Metric::TimeMs)
}

pub(super) fn size_boxplot(records: &[Measurement]) -> SvgDocument {
    boxplot(records, Metric::SizeBytes)
}

/// One half of a violin; `side` is -1 for the left half and 1 for the right.
fn draw_half_violin(
    doc: &mut SvgDocument,
    panel: &Panel,
    center: f64,
    max_width: f64,
    values: &[f64],
    side: f64,
    color: &str,
) {
    let Some(kde) = GaussianKde::new(values) else {
        // a single value or zero spread: draw the value as a flat line
        if let Some(value) = values.first() {
            let y = panel.y_of(*value);
            doc.line(center, y, center + side * max_width, y, color, 3.0);
        }
        return;
    };

    let curve = kde.curve_between(panel.y_scale.lo, panel.y_scale.hi, KDE_POINTS);
    let peak = curve.iter().map(|(_, d)| *d).fold(0.0, f64::max);
    if peak <= 0.0 {
        return;
    }

    let mut outline = Vec::with_capacity(curve.len() + 2);
    outline.push((center, panel.y_of(curve[0].0)));
    for (value, density) in &curve {
        outline.push((center + side * max_width * density / peak, panel.y_of(*value)));
    }
    outline.push((center, panel.y_of(curve[curve.len() - 1].0)));
    doc.polygon(&outline, color, 0.7);

    if let Some(stats) = BoxStats::of(values) {
        let width = side * max_width * 0.6;
        for (quartile, stroke) in [(stats.q1, 1.0), (stats.median, 2.0), (stats.q3, 1.0)] {
            let y = panel.y_of(quartile);
            doc.line(center, y, center + width, y, INK, stroke);
        }
    }
}

fn violin_panel(doc: &mut SvgDocument, records: &[Measurement], metric: Metric, area: (f64, f64, f64, f64)) {
    let panel = Panel::new(area, values_scale(records, metric));
    panel.draw_frame(
        doc,
        &format!("{} Distribution by Complexity", metric_title(metric)),
        "Complexity",
        axis_label(metric),
    );
    panel.category_labels(doc, &Complexity::ALL.map(|c| c.as_str()));

    let half_width = panel.slot_width(Complexity::ALL.len()) * 0.4;
    for (i, complexity) in Complexity::ALL.into_iter().enumerate() {
        let center = panel.slot_center(i, Complexity::ALL.len());
        for (api, side) in [(ApiKind::Rest, -1.0), (ApiKind::GraphQl, 1.0)] {
            let values = select(records, api, Some(complexity), metric);
            draw_half_violin(doc, &panel, center, half_width, &values, side, api_color(api));
        }
    }
    panel.legend(doc, "API", &api_legend());
}

/// REST on the left half, GraphQL on the right, per complexity tier.
pub(super) fn violin(records: &[Measurement]) -> SvgDocument {
    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    violin_panel(&mut doc, records, Metric::TimeMs, LEFT);
    violin_panel(&mut doc, records, Metric::SizeBytes, RIGHT);
    doc
}
