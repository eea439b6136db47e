//! Per-repository heatmaps of mean time and size.

use std::collections::BTreeMap;

use apibench_core::stats::mean;
use apibench_core::{ApiKind, Complexity, Measurement, Metric, Repository};

use super::svg::{Anchor, SvgDocument, TextStyle, GRID, INK, MUTED};

const CELL_W: f64 = 90.0;
const CELL_H: f64 = 28.0;
const LABEL_W: f64 = 200.0;
const TOP: f64 = 110.0;
const GAP: f64 = 80.0;

/// Green through yellow to red as the value rises.
const LOW: (f64, f64, f64) = (26.0, 152.0, 80.0);
const MID: (f64, f64, f64) = (255.0, 255.0, 191.0);
const HIGH: (f64, f64, f64) = (215.0, 48.0, 39.0);

/// Column order: tiers outer, API kinds inner.
fn columns() -> Vec<(Complexity, ApiKind)> {
    Complexity::ALL
        .into_iter()
        .flat_map(|c| ApiKind::ALL.map(|a| (c, a)))
        .collect()
}

/// Mean per repository row and column; missing cells are `None`.
fn cell_means(records: &[Measurement], metric: Metric) -> BTreeMap<Repository, Vec<Option<f64>>> {
    let mut groups: BTreeMap<Repository, BTreeMap<(Complexity, ApiKind), Vec<f64>>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.repository.clone())
            .or_default()
            .entry((record.complexity, record.api_kind))
            .or_default()
            .push(metric.value(record));
    }

    let columns = columns();
    groups
        .into_iter()
        .map(|(repository, cells)| {
            let row = columns
                .iter()
                .map(|key| cells.get(key).map(|values| mean(values)))
                .collect();
            (repository, row)
        })
        .collect()
}

/// Position of `value` along the color ramp, as `#rrggbb`.
pub(super) fn ramp(value: f64, lo: f64, hi: f64) -> String {
    let t = if hi > lo { ((value - lo) / (hi - lo)).clamp(0.0, 1.0) } else { 0.5 };
    let (from, to, t) = if t < 0.5 { (LOW, MID, t * 2.0) } else { (MID, HIGH, (t - 0.5) * 2.0) };
    let mix = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
    format!(
        "#{:02x}{:02x}{:02x}",
        mix(from.0, to.0),
        mix(from.1, to.1),
        mix(from.2, to.2)
    )
}

fn heatmap_panel(doc: &mut SvgDocument, records: &[Measurement], metric: Metric, x: f64, title: &str) {
    let rows = cell_means(records, metric);
    let columns = columns();
    let width = CELL_W * columns.len() as f64;

    doc.text(x + width / 2.0, TOP - 60.0, title, TextStyle::new(15).bold());
    for (i, (complexity, api)) in columns.iter().enumerate() {
        let cx = x + CELL_W * (i as f64 + 0.5);
        doc.text(cx, TOP - 26.0, api.as_str(), TextStyle::new(11).bold());
        doc.text(cx, TOP - 10.0, complexity.as_str(), TextStyle::new(11).fill(MUTED));
    }

    if rows.is_empty() {
        doc.text(x + width / 2.0, TOP + CELL_H, "no data", TextStyle::new(13).fill(MUTED));
        return;
    }

    let (lo, hi) = rows
        .values()
        .flatten()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));

    for (r, (repository, cells)) in rows.iter().enumerate() {
        let y = TOP + CELL_H * r as f64;
        doc.text(
            x - 8.0,
            y + CELL_H * 0.65,
            &repository.to_string(),
            TextStyle::new(11).anchor(Anchor::End),
        );
        for (c, cell) in cells.iter().enumerate() {
            let cx = x + CELL_W * c as f64;
            match cell {
                Some(value) => {
                    doc.rect(cx, y, CELL_W, CELL_H, &ramp(*value, lo, hi), Some("#ffffff"));
                    doc.text(
                        cx + CELL_W / 2.0,
                        y + CELL_H * 0.65,
                        &format!("{:.0}", value),
                        TextStyle::new(11).fill(INK),
                    );
                }
                None => doc.rect(cx, y, CELL_W, CELL_H, GRID, Some("#ffffff")),
            }
        }
    }
}

/// Time on the left, size on the right; one row per repository.
pub(super) fn heatmap(records: &[Measurement]) -> SvgDocument {
    let repositories = cell_means(records, Metric::TimeMs).len().max(1);
    let panel_w = CELL_W * columns().len() as f64;
    let width = (2.0 * (LABEL_W + panel_w) + GAP) as u32;
    let height = (TOP + CELL_H * repositories as f64 + 40.0) as u32;

    let mut doc = SvgDocument::new(width, height);
    heatmap_panel(&mut doc, records, Metric::TimeMs, LABEL_W, "Mean Time by Repository (ms)");
    heatmap_panel(
        &mut doc,
        records,
        Metric::SizeBytes,
        2.0 * LABEL_W + panel_w + GAP,
        "Mean Size by Repository (bytes)",
    );
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::fixtures;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(ramp(0.0, 0.0, 10.0), "#1a9850");
        assert_eq!(ramp(5.0, 0.0, 10.0), "#ffffbf");
        assert_eq!(ramp(10.0, 0.0, 10.0), "#d73027");
        assert_eq!(ramp(3.0, 3.0, 3.0), "#ffffbf");
    }

    #[test]
    fn test_cell_means() {
        let rows = cell_means(&fixtures::records(), Metric::TimeMs);

        assert_eq!(rows.len(), 2);
        let first = &rows[&Repository::new("a", "one")];
        assert_eq!(first.len(), 6);
        // REST simple, repetitions 1..=3 on base 100
        assert_eq!(first[0], Some(102.0));
        assert_eq!(first[1], Some(153.0));
    }

    #[test]
    fn test_missing_cells_are_blank() {
        let records: Vec<Measurement> = fixtures::records()
            .into_iter()
            .filter(|r| !(r.repository.name == "two" && r.complexity == Complexity::Complex))
            .collect();

        let rows = cell_means(&records, Metric::SizeBytes);

        let second = &rows[&Repository::new("b", "two")];
        assert_eq!(second[4], None);
        assert_eq!(second[5], None);
        assert!(heatmap(&records).render().contains(GRID));
    }

    #[test]
    fn test_height_grows_with_repositories() {
        let doc = heatmap(&fixtures::records());

        assert_eq!(doc.height(), TOP + 2.0 * CELL_H + 40.0);
        assert!(doc.render().contains("a/one"));
    }
}
