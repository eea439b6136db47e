//! Minimal SVG document builder.
//!
//! Charts are plain SVG markup: shapes are appended as elements in pixel
//! coordinates and the document is written out in one pass.

use std::fmt::Write as _;
use std::path::Path;

use super::RenderError;

pub const FONT: &str = "sans-serif";
pub const INK: &str = "#0f172a";
pub const MUTED: &str = "#64748b";
pub const GRID: &str = "#e2e8f0";

/// Horizontal anchor of a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

/// Styling of a text element.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle<'a> {
    pub size: u32,
    pub bold: bool,
    pub fill: &'a str,
    pub anchor: Anchor,
    /// Rotation in degrees around the anchor point.
    pub rotate: Option<i32>,
}

impl<'a> TextStyle<'a> {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            bold: false,
            fill: INK,
            anchor: Anchor::Middle,
            rotate: None,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn fill(mut self, fill: &'a str) -> Self {
        self.fill = fill;
        self
    }

    pub fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn rotate(mut self, degrees: i32) -> Self {
        self.rotate = Some(degrees);
        self
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// An SVG document under construction.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: u32,
    height: u32,
    body: String,
}

impl SvgDocument {
    pub fn new(width: u32, height: u32) -> Self {
        let mut doc = Self {
            width,
            height,
            body: String::new(),
        };
        doc.rect(0.0, 0.0, width as f64, height as f64, "#ffffff", None);
        doc
    }

    pub fn width(&self) -> f64 {
        self.width as f64
    }

    pub fn height(&self) -> f64 {
        self.height as f64
    }

    fn push(&mut self, element: std::fmt::Arguments<'_>) {
        // writing into a String cannot fail
        let _ = writeln!(self.body, "  {}", element);
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, fill: &str, stroke: Option<&str>) {
        let stroke = stroke
            .map(|s| format!(r#" stroke="{s}" stroke-width="1""#))
            .unwrap_or_default();
        self.push(format_args!(
            r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"{}/>"#,
            x,
            y,
            w.max(0.0),
            h.max(0.0),
            fill,
            stroke
        ));
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str, width: f64) {
        self.push(format_args!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{}"/>"#,
            x1, y1, x2, y2, stroke, width
        ));
    }

    pub fn dashed_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, stroke: &str) {
        self.push(format_args!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-dasharray="2,2"/>"#,
            x1, y1, x2, y2, stroke
        ));
    }

    /// Open polyline through `points`.
    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: &str, width: f64) {
        if points.len() < 2 {
            return;
        }
        self.push(format_args!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
            Self::points(points),
            stroke,
            width
        ));
    }

    /// Closed filled shape through `points`.
    pub fn polygon(&mut self, points: &[(f64, f64)], fill: &str, opacity: f64) {
        if points.len() < 3 {
            return;
        }
        self.push(format_args!(
            r#"<polygon points="{}" fill="{}" fill-opacity="{}" stroke="{}" stroke-width="1"/>"#,
            Self::points(points),
            fill,
            opacity,
            fill
        ));
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str) {
        self.push(format_args!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{}" fill="{}"/>"#,
            cx, cy, r, fill
        ));
    }

    /// Hollow circle, used for outliers.
    pub fn ring(&mut self, cx: f64, cy: f64, r: f64, stroke: &str) {
        self.push(format_args!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{}" fill="none" stroke="{}"/>"#,
            cx, cy, r, stroke
        ));
    }

    pub fn text(&mut self, x: f64, y: f64, content: &str, style: TextStyle<'_>) {
        let weight = if style.bold { r#" font-weight="bold""# } else { "" };
        let transform = style
            .rotate
            .map(|deg| format!(r#" transform="rotate({deg} {x:.1} {y:.1})""#))
            .unwrap_or_default();
        self.push(format_args!(
            r#"<text x="{:.1}" y="{:.1}" font-family="{}" font-size="{}"{} fill="{}" text-anchor="{}"{}>{}</text>"#,
            x,
            y,
            FONT,
            style.size,
            weight,
            style.fill,
            style.anchor.as_str(),
            transform,
            escape(content)
        ));
    }

    fn points(points: &[(f64, f64)]) -> String {
        points
            .iter()
            .map(|(x, y)| format!("{:.1},{:.1}", x, y))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn render(&self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {w} {h}\" width=\"{w}\" height=\"{h}\">\n{body}</svg>\n",
            w = self.width,
            h = self.height,
            body = self.body
        )
    }

    pub fn save(&self, path: &Path) -> Result<(), RenderError> {
        std::fs::write(path, self.render()).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_structure() {
        let mut doc = SvgDocument::new(200, 100);
        doc.line(0.0, 0.0, 10.0, 10.0, INK, 1.0);
        let svg = doc.render();

        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains(r#"viewBox="0 0 200 100""#));
        assert!(svg.contains("<line"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut doc = SvgDocument::new(10, 10);
        doc.text(1.0, 1.0, "a < b & c", TextStyle::new(10));

        assert!(doc.render().contains("a &lt; b &amp; c"));
    }

    #[test]
    fn test_text_styles() {
        let mut doc = SvgDocument::new(10, 10);
        doc.text(
            5.0,
            5.0,
            "label",
            TextStyle::new(12).bold().anchor(Anchor::End).rotate(-90),
        );
        let svg = doc.render();

        assert!(svg.contains(r#"font-weight="bold""#));
        assert!(svg.contains(r#"text-anchor="end""#));
        assert!(svg.contains(r#"transform="rotate(-90 5.0 5.0)""#));
    }

    #[test]
    fn test_degenerate_shapes_are_skipped() {
        let mut doc = SvgDocument::new(10, 10);
        doc.polyline(&[(0.0, 0.0)], INK, 1.0);
        doc.polygon(&[(0.0, 0.0), (1.0, 1.0)], INK, 0.5);

        let svg = doc.render();
        assert!(!svg.contains("<polyline"));
        assert!(!svg.contains("<polygon"));
    }
}
