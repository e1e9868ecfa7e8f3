//! Axis geometry shared by category and XY plots.
//!
//! Plot content is computed in (domain, value) pixel coordinates and mapped onto the screen by
//! [`Cartesian`]. With a vertical orientation the domain runs along the bottom edge; with a
//! horizontal orientation it runs along the left edge.

use super::{
    AXIS_LABEL_FONT, Anchor, Baseline, Drawable, Rect, Stroke, TICK_LABEL_FONT, TextItem,
};
use crate::axis::NumberAxis;
use crate::model::CategoryAxis;
use crate::text::{TextMeasurer, TextStyle};
use xmlchart_core::{CategoryLabelPositions, Color};

const TICK_LENGTH: f64 = 2.0;
const TICK_LABEL_GAP: f64 = 4.0;
const AXIS_LABEL_GAP: f64 = 4.0;

pub(crate) const GRIDLINE_PAINT: Color = Color::LIGHT_GRAY;
const GRIDBAND_PAINT: Color = Color::rgba(232, 234, 232, 128);

pub(crate) const CATEGORY_LOWER_MARGIN: f64 = 0.05;
pub(crate) const CATEGORY_UPPER_MARGIN: f64 = 0.05;
pub(crate) const CATEGORY_MARGIN: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Bottom,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Cartesian {
    pub data: Rect,
    pub vertical: bool,
}

impl Cartesian {
    /// Screen point for a domain pixel `d` and a value pixel `v`.
    pub fn point(&self, d: f64, v: f64) -> (f64, f64) {
        if self.vertical { (d, v) } else { (v, d) }
    }

    pub fn rect(&self, d0: f64, d1: f64, v0: f64, v1: f64) -> Rect {
        let (x0, y0) = self.point(d0, v0);
        let (x1, y1) = self.point(d1, v1);
        Rect::from_corners(x0, y0, x1, y1)
    }

    pub fn domain_side(&self) -> Side {
        if self.vertical { Side::Bottom } else { Side::Left }
    }

    pub fn value_side(&self) -> Side {
        if self.vertical { Side::Left } else { Side::Bottom }
    }

    /// Pixel interval of the value axis, lower bound first.
    pub fn value_interval(&self) -> (f64, f64) {
        interval(self.data, self.value_side(), false)
    }

    /// Pixel interval of the domain axis. Categories read top to bottom on a left edge;
    /// numeric domains read bottom to top.
    pub fn domain_interval(&self, categorical: bool) -> (f64, f64) {
        interval(self.data, self.domain_side(), categorical)
    }
}

fn interval(data: Rect, side: Side, top_down: bool) -> (f64, f64) {
    match side {
        Side::Bottom => (data.x, data.right()),
        Side::Left if top_down => (data.y, data.bottom()),
        Side::Left => (data.bottom(), data.y),
    }
}

fn tick_style() -> TextStyle {
    TextStyle::sized(TICK_LABEL_FONT)
}

fn axis_label_style() -> TextStyle {
    TextStyle::sized(AXIS_LABEL_FONT)
}

/// Depth of the band an axis needs beside the data area.
pub(crate) fn axis_space(
    side: Side,
    labels: &[String],
    rotation: f64,
    axis_label: Option<&str>,
    measurer: &dyn TextMeasurer,
) -> f64 {
    let style = tick_style();
    let (sin, cos) = rotation.to_radians().sin_cos();
    let extent = labels
        .iter()
        .map(|l| {
            let m = measurer.measure(l, &style);
            match side {
                Side::Left => m.width,
                Side::Bottom => m.width * sin.abs() + m.height * cos.abs(),
            }
        })
        .fold(0.0, f64::max);
    let label = axis_label
        .filter(|l| !l.is_empty())
        .map(|l| measurer.measure(l, &axis_label_style()).height + AXIS_LABEL_GAP)
        .unwrap_or(0.0);
    TICK_LENGTH + TICK_LABEL_GAP + extent + label
}

fn draw_axis_label(
    label: Option<&str>,
    paint: Color,
    side: Side,
    data: Rect,
    offset: f64,
    out: &mut Vec<Drawable>,
) {
    let Some(label) = label.filter(|l| !l.is_empty()) else {
        return;
    };
    let (cx, cy) = data.center();
    let item = match side {
        Side::Left => TextItem::new(label, data.x - offset - AXIS_LABEL_GAP, cy, AXIS_LABEL_FONT, paint)
            .anchored(Anchor::Middle, Baseline::Bottom)
            .rotated(-90.0),
        Side::Bottom => TextItem::new(
            label,
            cx,
            data.bottom() + offset + AXIS_LABEL_GAP,
            AXIS_LABEL_FONT,
            paint,
        )
        .anchored(Anchor::Middle, Baseline::Top),
    };
    out.push(Drawable::Text(item));
}

/// A number axis bound to a side and a pixel interval.
pub(crate) struct ValueAxisView<'a> {
    pub axis: &'a NumberAxis,
    pub side: Side,
    pub start: f64,
    pub end: f64,
    pub unit: f64,
    pub ticks: Vec<f64>,
}

impl<'a> ValueAxisView<'a> {
    pub fn new(axis: &'a NumberAxis, side: Side, (start, end): (f64, f64)) -> Self {
        let spacing = match side {
            Side::Left => 30.0,
            Side::Bottom if axis.is_date_axis() => 90.0,
            Side::Bottom => 60.0,
        };
        let unit = axis.tick_unit((end - start).abs(), spacing);
        let ticks = axis.ticks(unit);
        Self {
            axis,
            side,
            start,
            end,
            unit,
            ticks,
        }
    }

    pub fn px(&self, value: f64) -> f64 {
        self.axis.value_to_px(value, self.start, self.end)
    }

    /// Pixel of `value` clamped into the visible interval.
    pub fn px_clamped(&self, value: f64) -> f64 {
        let r = self.axis.range();
        self.px(value.clamp(r.lower, r.upper))
    }

    pub fn labels(&self) -> Vec<String> {
        self.ticks
            .iter()
            .map(|v| self.axis.tick_label(*v, self.unit))
            .collect()
    }

    fn across(&self, p: f64, data: Rect, stroke: Stroke) -> Drawable {
        match self.side {
            Side::Left => Drawable::line(data.x, p, data.right(), p, stroke),
            Side::Bottom => Drawable::line(p, data.y, p, data.bottom(), stroke),
        }
    }

    pub fn gridlines(&self, data: Rect, out: &mut Vec<Drawable>) {
        for v in &self.ticks {
            out.push(self.across(self.px(*v), data, Stroke::dashed(GRIDLINE_PAINT, 0.5)));
        }
    }

    /// Alternate bands behind the integer positions of a symbol axis.
    pub fn gridbands(&self, data: Rect, out: &mut Vec<Drawable>) {
        if !(self.axis.is_symbol_axis() && self.axis.gridbands_visible) {
            return;
        }
        let r = self.axis.range();
        for (i, v) in self.ticks.iter().enumerate() {
            if i % 2 == 1 {
                continue;
            }
            let a = self.px((v - 0.5).max(r.lower));
            let b = self.px((v + 0.5).min(r.upper));
            let band = match self.side {
                Side::Left => Rect::from_corners(data.x, a, data.right(), b),
                Side::Bottom => Rect::from_corners(a, data.y, b, data.bottom()),
            };
            out.push(Drawable::rect(band, Some(GRIDBAND_PAINT), None));
        }
    }

    pub fn zero_baseline(&self, data: Rect, out: &mut Vec<Drawable>) {
        let r = self.axis.range();
        if r.lower < 0.0 && r.upper > 0.0 {
            out.push(self.across(self.px(0.0), data, Stroke::solid(Color::BLACK, 0.5)));
        }
    }

    pub fn draw(&self, data: Rect, measurer: &dyn TextMeasurer, out: &mut Vec<Drawable>) {
        let line = Stroke::solid(self.axis.line_paint, 0.5);
        let labels = self.labels();
        match self.side {
            Side::Left => {
                out.push(Drawable::line(data.x, data.y, data.x, data.bottom(), line.clone()));
                for (v, label) in self.ticks.iter().zip(&labels) {
                    let y = self.px(*v);
                    out.push(Drawable::line(data.x - TICK_LENGTH, y, data.x, y, line.clone()));
                    out.push(Drawable::Text(
                        TextItem::new(
                            label,
                            data.x - TICK_LENGTH - TICK_LABEL_GAP,
                            y,
                            TICK_LABEL_FONT,
                            self.axis.tick_label_paint,
                        )
                        .anchored(Anchor::End, Baseline::Middle),
                    ));
                }
            }
            Side::Bottom => {
                out.push(Drawable::line(data.x, data.bottom(), data.right(), data.bottom(), line.clone()));
                for (v, label) in self.ticks.iter().zip(&labels) {
                    let x = self.px(*v);
                    out.push(Drawable::line(x, data.bottom(), x, data.bottom() + TICK_LENGTH, line.clone()));
                    out.push(Drawable::Text(
                        TextItem::new(
                            label,
                            x,
                            data.bottom() + TICK_LENGTH + TICK_LABEL_GAP,
                            TICK_LABEL_FONT,
                            self.axis.tick_label_paint,
                        )
                        .anchored(Anchor::Middle, Baseline::Top),
                    ));
                }
            }
        }
        let offset = axis_space(self.side, &labels, 0.0, None, measurer);
        draw_axis_label(
            self.axis.label.as_deref(),
            self.axis.label_paint,
            self.side,
            data,
            offset,
            out,
        );
    }
}

/// Category bands along one side: outer margins, then equal bands separated by gaps that
/// share the category margin.
pub(crate) struct CategoryAxisView<'a> {
    pub axis: &'a CategoryAxis,
    pub side: Side,
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl<'a> CategoryAxisView<'a> {
    pub fn band(&self, category: usize) -> (f64, f64) {
        let length = self.end - self.start;
        let available = length * (1.0 - CATEGORY_LOWER_MARGIN - CATEGORY_UPPER_MARGIN);
        let n = self.count.max(1) as f64;
        let (width, gap) = if self.count > 1 {
            (
                available * (1.0 - CATEGORY_MARGIN) / n,
                available * CATEGORY_MARGIN / (n - 1.0),
            )
        } else {
            (available, 0.0)
        };
        let s = self.start + length * CATEGORY_LOWER_MARGIN + category as f64 * (width + gap);
        (s, s + width)
    }

    pub fn middle(&self, category: usize) -> f64 {
        let (a, b) = self.band(category);
        (a + b) / 2.0
    }

    pub fn rotation(&self) -> f64 {
        match self.side {
            Side::Bottom => self.axis.label_positions.angle_degrees(),
            Side::Left => 0.0,
        }
    }

    pub fn draw(
        &self,
        keys: &[String],
        data: Rect,
        measurer: &dyn TextMeasurer,
        out: &mut Vec<Drawable>,
    ) {
        let line = Stroke::solid(Color::GRAY, 0.5);
        let paint = self.axis.tick_label_paint;
        match self.side {
            Side::Left => {
                out.push(Drawable::line(data.x, data.y, data.x, data.bottom(), line));
                for (c, key) in keys.iter().enumerate() {
                    out.push(Drawable::Text(
                        TextItem::new(
                            key,
                            data.x - TICK_LENGTH - TICK_LABEL_GAP,
                            self.middle(c),
                            TICK_LABEL_FONT,
                            paint,
                        )
                        .anchored(Anchor::End, Baseline::Middle),
                    ));
                }
            }
            Side::Bottom => {
                out.push(Drawable::line(data.x, data.bottom(), data.right(), data.bottom(), line));
                let y = data.bottom() + TICK_LENGTH + TICK_LABEL_GAP;
                for (c, key) in keys.iter().enumerate() {
                    let item = TextItem::new(key, self.middle(c), y, TICK_LABEL_FONT, paint);
                    let item = match self.axis.label_positions {
                        CategoryLabelPositions::Standard => item.anchored(Anchor::Middle, Baseline::Top),
                        CategoryLabelPositions::Up45 | CategoryLabelPositions::Up90 => item
                            .anchored(Anchor::End, Baseline::Middle)
                            .rotated(self.rotation()),
                        CategoryLabelPositions::Down45 | CategoryLabelPositions::Down90 => item
                            .anchored(Anchor::Start, Baseline::Middle)
                            .rotated(self.rotation()),
                    };
                    out.push(Drawable::Text(item));
                }
            }
        }
        let offset = axis_space(self.side, keys, self.rotation(), None, measurer);
        draw_axis_label(
            self.axis.label.as_deref(),
            self.axis.label_paint,
            self.side,
            data,
            offset,
            out,
        );
    }
}
