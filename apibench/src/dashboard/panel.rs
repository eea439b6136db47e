//! Plot areas with a linear value axis.

use super::svg::{Anchor, SvgDocument, TextStyle, GRID, INK, MUTED};

/// A linear axis domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub lo: f64,
    pub hi: f64,
}

impl Scale {
    pub fn new(lo: f64, hi: f64) -> Self {
        if lo.is_finite() && hi.is_finite() && hi > lo {
            Self { lo, hi }
        } else if lo.is_finite() {
            // zero-width domain: center it on the single value
            let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
            Self {
                lo: lo - pad,
                hi: lo + pad,
            }
        } else {
            Self { lo: 0.0, hi: 1.0 }
        }
    }

    /// Domain covering the finite `values` with 5% padding on each side.
    /// With `include_zero` the domain always reaches zero, as bar charts need.
    pub fn covering(values: impl IntoIterator<Item = f64>, include_zero: bool) -> Self {
        let (mut lo, mut hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !lo.is_finite() {
            return Self::new(0.0, 1.0);
        }
        if include_zero {
            lo = lo.min(0.0);
            hi = hi.max(0.0);
        }
        let pad = (hi - lo) * 0.05;
        let lo = if include_zero && lo == 0.0 { 0.0 } else { lo - pad };
        let hi = if include_zero && hi == 0.0 { 0.0 } else { hi + pad };
        Self::new(lo, hi)
    }

    pub fn span(&self) -> f64 {
        self.hi - self.lo
    }

    /// Round tick positions inside the domain, about `target` of them.
    pub fn ticks(&self, target: usize) -> Vec<f64> {
        let step = nice_step(self.span(), target.max(2));
        let first = (self.lo / step).ceil() as i64;
        let last = (self.hi / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// A 1, 2 or 5 times a power of ten step giving about `target` intervals.
pub fn nice_step(span: f64, target: usize) -> f64 {
    let raw = span / target as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let fraction = raw / magnitude;
    let nice = if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Tick label without trailing zeros.
pub fn format_tick(value: f64) -> String {
    if value.abs() >= 1000.0 || value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// A rectangular plot area in pixel coordinates with a value axis on the left.
#[derive(Debug, Clone, Copy)]
pub struct Panel {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub y_scale: Scale,
    /// Numeric x axis; `None` for categorical panels.
    pub x_scale: Option<Scale>,
}

impl Panel {
    pub fn new(area: (f64, f64, f64, f64), y_scale: Scale) -> Self {
        let (x, y, w, h) = area;
        Self {
            x,
            y,
            w,
            h,
            y_scale,
            x_scale: None,
        }
    }

    pub fn with_x_scale(mut self, x_scale: Scale) -> Self {
        self.x_scale = Some(x_scale);
        self
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    /// Pixel row of `value`, clamped to the panel.
    pub fn y_of(&self, value: f64) -> f64 {
        let t = (value - self.y_scale.lo) / self.y_scale.span();
        self.bottom() - t.clamp(0.0, 1.0) * self.h
    }

    /// Pixel column of `value` on the numeric x axis.
    pub fn x_of(&self, value: f64) -> f64 {
        match self.x_scale {
            Some(scale) => {
                let t = (value - scale.lo) / scale.span();
                self.x + t.clamp(0.0, 1.0) * self.w
            }
            None => self.x,
        }
    }

    /// Center of category slot `index` out of `count`.
    pub fn slot_center(&self, index: usize, count: usize) -> f64 {
        self.x + self.slot_width(count) * (index as f64 + 0.5)
    }

    pub fn slot_width(&self, count: usize) -> f64 {
        self.w / count.max(1) as f64
    }

    /// Title, gridlines, tick labels, axes and axis labels.
    pub fn draw_frame(&self, doc: &mut SvgDocument, title: &str, x_label: &str, y_label: &str) {
        doc.text(
            self.x + self.w / 2.0,
            self.y - 14.0,
            title,
            TextStyle::new(15).bold(),
        );

        for tick in self.y_scale.ticks(6) {
            let y = self.y_of(tick);
            doc.dashed_line(self.x, y, self.right(), y, GRID);
            doc.text(
                self.x - 6.0,
                y + 4.0,
                &format_tick(tick),
                TextStyle::new(11).fill(MUTED).anchor(Anchor::End),
            );
        }

        if let Some(scale) = self.x_scale {
            for tick in scale.ticks(6) {
                let x = self.x_of(tick);
                doc.line(x, self.bottom(), x, self.bottom() + 4.0, MUTED, 1.0);
                doc.text(
                    x,
                    self.bottom() + 18.0,
                    &format_tick(tick),
                    TextStyle::new(11).fill(MUTED),
                );
            }
        }

        doc.line(self.x, self.y, self.x, self.bottom(), INK, 1.0);
        doc.line(self.x, self.bottom(), self.right(), self.bottom(), INK, 1.0);

        doc.text(
            self.x + self.w / 2.0,
            self.bottom() + 40.0,
            x_label,
            TextStyle::new(12),
        );
        let label_x = self.x - 58.0;
        let label_y = self.y + self.h / 2.0;
        doc.text(label_x, label_y, y_label, TextStyle::new(12).rotate(-90));
    }

    /// Labels under each category slot.
    pub fn category_labels(&self, doc: &mut SvgDocument, labels: &[&str]) {
        for (i, label) in labels.iter().enumerate() {
            doc.text(
                self.slot_center(i, labels.len()),
                self.bottom() + 18.0,
                label,
                TextStyle::new(12),
            );
        }
    }

    /// Color swatches with labels in the panel's upper right corner.
    pub fn legend(&self, doc: &mut SvgDocument, title: &str, entries: &[(&str, &str)]) {
        let x = self.right() - 110.0;
        let mut y = self.y + 8.0;
        doc.rect(x - 8.0, y - 4.0, 112.0, 22.0 + 20.0 * entries.len() as f64, "#ffffff", Some(GRID));
        doc.text(x, y + 10.0, title, TextStyle::new(11).bold().anchor(Anchor::Start));
        y += 18.0;
        for (label, color) in entries {
            doc.rect(x, y, 14.0, 14.0, color, None);
            doc.text(
                x + 20.0,
                y + 11.0,
                label,
                TextStyle::new(11).anchor(Anchor::Start),
            );
            y += 20.0;
        }
    }

    /// Centered note for a panel with nothing to draw.
    pub fn no_data(&self, doc: &mut SvgDocument) {
        doc.text(
            self.x + self.w / 2.0,
            self.y + self.h / 2.0,
            "no data",
            TextStyle::new(13).fill(MUTED),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nice_step() {
        assert_eq!(nice_step(100.0, 5), 20.0);
        assert_eq!(nice_step(1.0, 4), 0.5);
        assert_eq!(nice_step(7300.0, 6), 2000.0);
        assert_eq!(nice_step(0.0, 5), 1.0);
    }

    #[test]
    fn test_scale_covering() {
        let scale = Scale::covering([10.0, 20.0, f64::NAN], false);
        assert!((scale.lo - 9.5).abs() < 1e-9);
        assert!((scale.hi - 20.5).abs() < 1e-9);

        let bars = Scale::covering([10.0, 20.0], true);
        assert_eq!(bars.lo, 0.0);
        assert!((bars.hi - 21.0).abs() < 1e-9);

        let negative = Scale::covering([-5.0, 10.0], true);
        assert!(negative.lo < -5.0);
    }

    #[test]
    fn test_degenerate_scales() {
        let empty = Scale::covering(std::iter::empty(), false);
        assert_eq!(empty, Scale { lo: 0.0, hi: 1.0 });

        let single = Scale::covering([50.0, 50.0], false);
        assert!(single.lo < 50.0 && single.hi > 50.0);
    }

    #[test]
    fn test_ticks_inside_domain() {
        let ticks = Scale::new(0.0, 105.0).ticks(5);
        assert_eq!(ticks, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
    }

    #[test]
    fn test_pixel_mapping() {
        let panel = Panel::new((100.0, 50.0, 400.0, 200.0), Scale::new(0.0, 10.0))
            .with_x_scale(Scale::new(0.0, 4.0));

        assert_eq!(panel.y_of(0.0), 250.0);
        assert_eq!(panel.y_of(10.0), 50.0);
        assert_eq!(panel.y_of(20.0), 50.0);
        assert_eq!(panel.x_of(2.0), 300.0);
        assert_eq!(panel.slot_center(0, 2), 200.0);
        assert_eq!(panel.slot_width(4), 100.0);
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(200.0), "200");
        assert_eq!(format_tick(0.5), "0.5");
        assert_eq!(format_tick(12500.0), "12500");
    }
}
