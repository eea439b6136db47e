//! Histograms with a KDE overlay, one panel per (metric, API kind).

use apibench_core::stats::GaussianKde;
use apibench_core::{select, ApiKind, Measurement, Metric};

use super::api_color;
use super::boxplot::axis_label;
use super::panel::{Panel, Scale};
use super::svg::{SvgDocument, INK};

const WIDTH: u32 = 1400;
const HEIGHT: u32 = 1000;
const BINS: usize = 30;

/// Bin counts over `[lo, hi]`; the last bin is closed on the right.
pub(super) fn histogram(values: &[f64], lo: f64, hi: f64, bins: usize) -> Vec<usize> {
    let mut counts = vec![0; bins];
    let width = (hi - lo) / bins as f64;
    if bins == 0 || width <= 0.0 || !width.is_finite() {
        return counts;
    }
    for value in values.iter().filter(|v| **v >= lo && **v <= hi) {
        let index = (((value - lo) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }
    counts
}

fn histogram_panel(
    doc: &mut SvgDocument,
    records: &[Measurement],
    metric: Metric,
    api: ApiKind,
    area: (f64, f64, f64, f64),
) {
    let values = select(records, api, None, metric);
    let title = format!("{} {}", api, axis_label(metric));

    let x_scale = Scale::covering(values.iter().copied(), false);
    let counts = histogram(&values, x_scale.lo, x_scale.hi, BINS);
    let peak = counts.iter().copied().max().unwrap_or(0);
    let panel = Panel::new(area, Scale::covering([0.0, peak as f64], true)).with_x_scale(x_scale);
    panel.draw_frame(doc, &title, axis_label(metric), "Count");

    if values.is_empty() {
        panel.no_data(doc);
        return;
    }

    let color = api_color(api);
    let bin_width = x_scale.span() / BINS as f64;
    for (i, count) in counts.iter().enumerate().filter(|(_, c)| **c > 0) {
        let x0 = panel.x_of(x_scale.lo + bin_width * i as f64);
        let x1 = panel.x_of(x_scale.lo + bin_width * (i + 1) as f64);
        let top = panel.y_of(*count as f64);
        doc.rect(x0, top, x1 - x0, panel.bottom() - top, color, Some("#ffffff"));
    }

    if let Some(kde) = GaussianKde::new(&values) {
        // density scaled to expected counts per bin
        let scale = values.len() as f64 * bin_width;
        let points: Vec<(f64, f64)> = kde
            .curve_between(x_scale.lo, x_scale.hi, 120)
            .into_iter()
            .map(|(x, d)| (panel.x_of(x), panel.y_of(d * scale)))
            .collect();
        doc.polyline(&points, INK, 2.0);
    }
}

/// Rows are time then size, columns REST then GraphQL.
pub(super) fn distribution(records: &[Measurement]) -> SvgDocument {
    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    for (row, metric) in Metric::ALL.into_iter().enumerate() {
        for (col, api) in ApiKind::ALL.into_iter().enumerate() {
            let area = (100.0 + 680.0 * col as f64, 70.0 + 480.0 * row as f64, 560.0, 360.0);
            histogram_panel(&mut doc, records, metric, api, area);
        }
    }
    doc
}
