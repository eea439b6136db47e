//! Descriptive statistics rendered as a table image.

use apibench_core::stats::Summary;
use apibench_core::{select, ApiKind, Complexity, Measurement, Metric};

use super::svg::{SvgDocument, TextStyle, GRID, MUTED};

const HEADER_FILL: &str = "#4a90d9";
const STRIPE_FILL: &str = "#e8f4f8";
const COLUMNS: [&str; 8] = [
    "API",
    "Complexity",
    "Time mean (ms)",
    "Time std",
    "Time median",
    "Size mean (B)",
    "Size std",
    "Size median",
];
const COLUMN_W: f64 = 150.0;
const ROW_H: f64 = 40.0;
const MARGIN: f64 = 50.0;
const TOP: f64 = 90.0;

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One row per non-empty (API kind, complexity) group, API kind outer.
fn rows(records: &[Measurement]) -> Vec<[String; 8]> {
    let mut rows = Vec::new();
    for api in ApiKind::ALL {
        for complexity in Complexity::ALL {
            let time = Summary::of(&select(records, api, Some(complexity), Metric::TimeMs));
            if time.is_empty() {
                continue;
            }
            let size = Summary::of(&select(records, api, Some(complexity), Metric::SizeBytes));
            rows.push([
                api.to_string(),
                capitalize(complexity.as_str()),
                format!("{:.1}", time.mean),
                format!("{:.1}", time.std_dev),
                format!("{:.1}", time.median),
                format!("{:.0}", size.mean),
                format!("{:.0}", size.std_dev),
                format!("{:.0}", size.median),
            ]);
        }
    }
    rows
}

pub(super) fn summary_table(records: &[Measurement]) -> SvgDocument {
    let rows = rows(records);
    let width = MARGIN * 2.0 + COLUMN_W * COLUMNS.len() as f64;
    let height = TOP + ROW_H * (rows.len() + 1) as f64 + MARGIN;
    let mut doc = SvgDocument::new(width as u32, height as u32);

    doc.text(width / 2.0, 50.0, "Summary Table: Descriptive Statistics", TextStyle::new(18).bold());

    for (i, label) in COLUMNS.iter().enumerate() {
        let x = MARGIN + COLUMN_W * i as f64;
        doc.rect(x, TOP, COLUMN_W, ROW_H, HEADER_FILL, Some(GRID));
        doc.text(
            x + COLUMN_W / 2.0,
            TOP + ROW_H * 0.62,
            label,
            TextStyle::new(13).bold().fill("#ffffff"),
        );
    }

    for (r, row) in rows.iter().enumerate() {
        let y = TOP + ROW_H * (r + 1) as f64;
        let fill = if r % 2 == 0 { STRIPE_FILL } else { "#ffffff" };
        for (c, cell) in row.iter().enumerate() {
            let x = MARGIN + COLUMN_W * c as f64;
            doc.rect(x, y, COLUMN_W, ROW_H, fill, Some(GRID));
            doc.text(x + COLUMN_W / 2.0, y + ROW_H * 0.62, cell, TextStyle::new(13));
        }
    }

    if rows.is_empty() {
        doc.text(width / 2.0, TOP + ROW_H * 1.6, "no data", TextStyle::new(13).fill(MUTED));
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::fixtures;

    #[test]
    fn test_row_order_and_format() {
        let rows = rows(&fixtures::records());

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0][0], "REST");
        assert_eq!(rows[0][1], "Simple");
        assert_eq!(rows[2][1], "Complex");
        assert_eq!(rows[3][0], "GraphQL");
        // REST simple times: 101..=103 and 111..=113
        assert_eq!(rows[0][2], "107.0");
        assert_eq!(rows[0][4], "107.0");
    }

    #[test]
    fn test_empty_groups_are_skipped() {
        let records: Vec<Measurement> = fixtures::records()
            .into_iter()
            .filter(|r| r.complexity != Complexity::Medium)
            .collect();

        assert_eq!(rows(&records).len(), 4);
    }

    #[test]
    fn test_striped_rows() {
        let svg = summary_table(&fixtures::records()).render();

        assert_eq!(svg.matches(HEADER_FILL).count(), 8);
        assert_eq!(svg.matches(STRIPE_FILL).count(), 3 * 8);
        assert!(svg.contains("Time mean (ms)"));
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("medium"), "Medium");
        assert_eq!(capitalize(""), "");
    }
}
