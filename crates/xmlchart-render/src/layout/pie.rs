//! Pie, 3-D pie, ring and multiple-pie plots.
//!
//! Sections start at twelve o'clock and run clockwise. Only positive values get a section;
//! zero, negative and missing values are skipped. Arcs are sampled into polygons so that the
//! same path data serves the SVG writer and the rasteriser.

use super::{
    AXIS_LABEL_FONT, Anchor, Baseline, Drawable, ItemOptions, Rect, Stroke, TICK_LABEL_FONT,
    TextItem, item_url, no_data, plot_frame, with_alpha,
};
use crate::model::{MultiplePiePlot, PieKind, PiePlot};
use crate::text::{TextMeasurer, TextStyle};
use std::f64::consts::TAU;
use xmlchart_core::{Color, NumberFormat, PieSectionLabelGenerator};

const LABEL_BACKGROUND: Color = Color::rgb(255, 255, 192);
const LABEL_PADDING: f64 = 2.0;
const LABEL_LINK: f64 = 12.0;
const SHADOW_OFFSET: f64 = 4.0;
const RING_INNER: f64 = 0.8;
const THREE_D_TILT: f64 = 0.6;
const THREE_D_DEPTH: f64 = 0.2;
const MIN_RADIUS: f64 = 8.0;
/// Largest angle between two sampled arc points.
const ARC_STEP: f64 = TAU / 180.0;

struct Section<'a> {
    index: usize,
    key: &'a str,
    value: f64,
    start: f64,
    extent: f64,
    label: String,
}

impl Section<'_> {
    fn middle(&self) -> f64 {
        self.start + self.extent / 2.0
    }
}

/// Ellipse geometry of one pie. Angles are clockwise from twelve o'clock.
#[derive(Debug, Clone, Copy)]
struct Disc {
    cx: f64,
    cy: f64,
    rx: f64,
    ry: f64,
}

impl Disc {
    fn at(&self, angle: f64, scale: f64) -> (f64, f64) {
        (
            self.cx + self.rx * scale * angle.sin(),
            self.cy - self.ry * scale * angle.cos(),
        )
    }

    fn arc(&self, start: f64, extent: f64, scale: f64) -> Vec<(f64, f64)> {
        let steps = (extent / ARC_STEP).ceil().max(1.0) as usize;
        (0..=steps)
            .map(|i| self.at(start + extent * i as f64 / steps as f64, scale))
            .collect()
    }

    fn shifted(self, dx: f64, dy: f64) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            ..self
        }
    }

    /// Outline of a section: a wedge, or a ring segment when `inner` is positive.
    fn section(&self, start: f64, extent: f64, inner: f64) -> Vec<(f64, f64)> {
        let mut points = self.arc(start, extent, 1.0);
        if inner > 0.0 {
            let mut back = self.arc(start, extent, inner);
            back.reverse();
            points.extend(back);
        } else if extent < TAU {
            points.push((self.cx, self.cy));
        }
        points
    }
}

/// Positive sections in dataset order, with the total they share.
fn sections(plot: &PiePlot) -> (Vec<Section<'_>>, f64) {
    let total: f64 = plot
        .dataset
        .iter()
        .filter_map(|(_, v)| v.filter(|v| *v > 0.0))
        .sum();
    let mut start = 0.0;
    let sections = plot
        .dataset
        .iter()
        .enumerate()
        .filter_map(|(index, (key, value))| {
            let value = value.filter(|v| *v > 0.0)?;
            let extent = value / total * TAU;
            let section = Section {
                index,
                key,
                value,
                start,
                extent,
                label: plot.label_generator.generate(key, Some(value), total),
            };
            start += extent;
            Some(section)
        })
        .collect();
    (sections, total)
}

pub(super) fn layout(
    plot: &PiePlot,
    area: Rect,
    items: ItemOptions,
    measurer: &dyn TextMeasurer,
    out: &mut Vec<Drawable>,
) {
    let outline = plot_frame(&plot.style, area, out);
    draw_pie(plot, area, items, measurer, out);
    out.extend(outline);
}

fn draw_pie(
    plot: &PiePlot,
    area: Rect,
    items: ItemOptions,
    measurer: &dyn TextMeasurer,
    out: &mut Vec<Drawable>,
) {
    let (sections, total) = sections(plot);
    if sections.is_empty() {
        no_data(area, out);
        return;
    }

    let style = TextStyle::sized(TICK_LABEL_FONT);
    let (label_w, label_h) = sections
        .iter()
        .filter(|s| !s.label.is_empty())
        .map(|s| measurer.measure(&s.label, &style))
        .fold((0.0f64, 0.0f64), |(w, h), m| (w.max(m.width), h.max(m.height)));
    let label_w = if label_w > 0.0 { label_w + 2.0 * LABEL_PADDING + LABEL_LINK } else { 0.0 };
    let label_h = if label_h > 0.0 { label_h + 2.0 * LABEL_PADDING } else { 0.0 };

    let (cx, cy) = area.center();
    let (tilt, depth_factor) = match plot.kind {
        PieKind::ThreeD => (THREE_D_TILT, THREE_D_DEPTH),
        PieKind::Flat | PieKind::Ring => (1.0, 0.0),
    };
    let r = ((area.width / 2.0 - label_w) * 0.9)
        .min(((area.height / 2.0 - label_h) * 0.9) / (tilt + depth_factor))
        .max(MIN_RADIUS);
    let depth = r * depth_factor;
    let disc = Disc {
        cx,
        cy: cy - depth / 2.0,
        rx: r,
        ry: r * tilt,
    };
    let inner = if plot.kind == PieKind::Ring { RING_INNER } else { 0.0 };

    let mut content = Vec::new();
    if let Some(shadow) = plot.shadow_paint {
        let d = disc.shifted(SHADOW_OFFSET, SHADOW_OFFSET + depth);
        for s in &sections {
            content.push(Drawable::polygon(&d.section(s.start, s.extent, inner), Some(shadow), None));
        }
    }

    let outline = plot
        .section_outlines_visible
        .then(|| Stroke::solid(plot.section_outline_paint, 0.5));

    if depth > 0.0 {
        let base = disc.shifted(0.0, depth);
        for s in &sections {
            let side = plot.section_paint(s.key, s.index).darker(0.7);
            content.push(Drawable::polygon(&base.section(s.start, s.extent, inner), Some(side), None));
            let mut band = disc.arc(s.start, s.extent, 1.0);
            let mut lower = base.arc(s.start, s.extent, 1.0);
            lower.reverse();
            band.extend(lower);
            content.push(Drawable::polygon(&band, Some(side), None));
        }
    }

    let tooltip = PieSectionLabelGenerator::new(
        "{0}: ({1}, {2})",
        NumberFormat::number(),
        NumberFormat::percent(),
    );
    for s in &sections {
        let paint = plot.section_paint(s.key, s.index);
        let shape = Drawable::polygon(&disc.section(s.start, s.extent, inner), Some(paint), outline.clone());
        content.extend(items.wrap(
            vec![shape],
            || tooltip.generate(s.key, Some(s.value), total),
            || item_url(&[("category", s.key)]),
        ));
    }
    with_alpha(plot.style.foreground_alpha, content, out);

    for s in &sections {
        if !s.label.is_empty() {
            section_label(&disc, s, measurer, &style, out);
        }
    }
}

/// A boxed label outside the pie, linked to the middle of its section.
fn section_label(
    disc: &Disc,
    s: &Section<'_>,
    measurer: &dyn TextMeasurer,
    style: &TextStyle,
    out: &mut Vec<Drawable>,
) {
    let angle = s.middle();
    let (ax, ay) = disc.at(angle, 1.0);
    let right = angle.sin() >= 0.0;
    let (ex, ey) = (ax + if right { LABEL_LINK } else { -LABEL_LINK }, ay);
    out.push(Drawable::polyline(
        &[(ax, ay), (ex, ey)],
        Stroke::solid(Color::GRAY, 0.5),
    ));

    let m = measurer.measure(&s.label, style);
    let w = m.width + 2.0 * LABEL_PADDING;
    let h = m.height + 2.0 * LABEL_PADDING;
    let x = if right { ex } else { ex - w };
    out.push(Drawable::rect(
        Rect::new(x, ey - h / 2.0, w, h),
        Some(LABEL_BACKGROUND),
        Some(Stroke::solid(Color::GRAY, 0.5)),
    ));
    out.push(Drawable::Text(
        TextItem::new(&s.label, x + LABEL_PADDING, ey, TICK_LABEL_FONT, Color::BLACK)
            .anchored(Anchor::Start, Baseline::Middle),
    ));
}

pub(super) fn layout_multiple(
    plot: &MultiplePiePlot,
    area: Rect,
    items: ItemOptions,
    measurer: &dyn TextMeasurer,
    out: &mut Vec<Drawable>,
) {
    let outline = plot_frame(&plot.style, area, out);
    let pies = plot.pies();
    if pies.is_empty() {
        no_data(area, out);
        out.extend(outline);
        return;
    }

    let keys = plot.section_keys();
    let n = pies.len();
    let cols = (n as f64).sqrt().ceil().max(1.0) as usize;
    let rows = n.div_ceil(cols);
    let cell_w = area.width / cols as f64;
    let cell_h = area.height / rows as f64;
    let title_style = TextStyle::bold(AXIS_LABEL_FONT);

    for (i, (title, table)) in pies.into_iter().enumerate() {
        let cell = Rect::new(
            area.x + (i % cols) as f64 * cell_w,
            area.y + (i / cols) as f64 * cell_h,
            cell_w,
            cell_h,
        );
        let title_h = measurer.measure(&title, &title_style).height;
        let (tx, _) = cell.center();
        out.push(Drawable::Text(
            TextItem::new(&title, tx, cell.y + LABEL_PADDING, AXIS_LABEL_FONT, Color::BLACK)
                .anchored(Anchor::Middle, Baseline::Top)
                .bold(),
        ));

        let mut pie = plot.pie.clone();
        pie.dataset = table;
        for (k, key) in keys.iter().enumerate() {
            pie.section_paints
                .entry(key.clone())
                .or_insert_with(|| plot.supplier.paint(k));
        }
        let body = cell.inset(title_h + 2.0 * LABEL_PADDING, 0.0, 0.0, 0.0);
        let sub_outline = plot_frame(&pie.style, body, out);
        draw_pie(&pie, body, items, measurer, out);
        out.extend(sub_outline);
    }
    out.extend(outline);
}
