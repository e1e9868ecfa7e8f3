use super::cartesian::{Cartesian, CategoryAxisView, Side, ValueAxisView, axis_space};
use super::{
    Anchor, Baseline, Drawable, ItemOptions, Rect, Stroke, TICK_LABEL_FONT, TextItem, item_url,
    no_data, plot_frame, with_alpha,
};
use crate::model::{CategoryPlot, CategoryRendererKind};
use crate::palette::DrawingSupplier;
use crate::text::TextMeasurer;
use xmlchart_core::{CategoryTable, Color, NumberFormat, PlotOrientation};

const ITEM_MARGIN: f64 = 0.2;
const SHAPE_SIZE: f64 = 6.0;
const ITEM_LABEL_OFFSET: f64 = 4.0;

const WATERFALL_FIRST: Color = Color::rgb(0x22, 0x22, 0xff);
const WATERFALL_LAST: Color = Color::rgb(0xff, 0xff, 0x22);
const WATERFALL_UP: Color = Color::rgb(0x22, 0xff, 0x22);
const WATERFALL_DOWN: Color = Color::rgb(0xff, 0x22, 0x22);

pub(super) fn layout(
    plot: &CategoryPlot,
    area: Rect,
    items: ItemOptions,
    measurer: &dyn TextMeasurer,
    out: &mut Vec<Drawable>,
) {
    let table = &plot.dataset;
    let keys: Vec<String> = table.category_keys().map(str::to_string).collect();
    let vertical = plot.orientation == PlotOrientation::Vertical;
    let domain_side = if vertical { Side::Bottom } else { Side::Left };
    let value_side = if vertical { Side::Left } else { Side::Bottom };

    // Reserve axis bands with a provisional tick set, then lay out for real.
    let provisional = Cartesian { data: area, vertical };
    let value_labels =
        ValueAxisView::new(&plot.range_axis, value_side, provisional.value_interval()).labels();
    let rotation = match domain_side {
        Side::Bottom => plot.domain_axis.label_positions.angle_degrees(),
        Side::Left => 0.0,
    };
    let domain_space = axis_space(
        domain_side,
        &keys,
        rotation,
        plot.domain_axis.label.as_deref(),
        measurer,
    );
    let value_space = axis_space(
        value_side,
        &value_labels,
        0.0,
        plot.range_axis.label.as_deref(),
        measurer,
    );
    let (left, bottom) = if vertical {
        (value_space, domain_space)
    } else {
        (domain_space, value_space)
    };
    let frame = area.inset(0.0, 0.0, bottom, left);

    let outline = plot_frame(&plot.style, frame, out);
    if table.is_empty() || table.category_count() == 0 {
        no_data(frame, out);
        out.extend(outline);
        return;
    }

    // 3-D renderers draw their extrusion into a band at the top and right of the frame.
    let depth = plot.renderer.depth.unwrap_or(0.0);
    let data = frame.inset(depth, depth, 0.0, 0.0);
    let cart = Cartesian { data, vertical };
    let value = ValueAxisView::new(&plot.range_axis, value_side, cart.value_interval());
    let (d0, d1) = cart.domain_interval(true);
    let domain = CategoryAxisView {
        axis: &plot.domain_axis,
        side: domain_side,
        start: d0,
        end: d1,
        count: table.category_count(),
    };

    if plot.range_gridlines_visible {
        value.gridlines(data, out);
    }
    if plot.domain_gridlines_visible {
        for c in 0..table.category_count() {
            let (x1, y1) = cart.point(domain.middle(c), value.start);
            let (x2, y2) = cart.point(domain.middle(c), value.end);
            out.push(Drawable::line(
                x1,
                y1,
                x2,
                y2,
                Stroke::dashed(super::cartesian::GRIDLINE_PAINT, 0.5),
            ));
        }
    }

    let ctx = Ctx {
        plot,
        table,
        cart,
        value: &value,
        domain: &domain,
        depth,
        items,
        supplier: DrawingSupplier::default(),
    };
    let mut content = Vec::new();
    match plot.renderer.kind {
        CategoryRendererKind::Bar => ctx.bars(&mut content),
        CategoryRendererKind::StackedBar => ctx.stacked_bars(&mut content),
        CategoryRendererKind::Line { lines, shapes } => ctx.lines(lines, shapes, &mut content),
        CategoryRendererKind::Area => ctx.areas(&mut content),
        CategoryRendererKind::StackedArea => ctx.stacked_areas(&mut content),
        CategoryRendererKind::Waterfall => ctx.waterfall(&mut content),
    }
    with_alpha(plot.style.foreground_alpha, content, out);

    if plot.range_zero_baseline_visible {
        value.zero_baseline(data, out);
    }
    ctx.item_labels(out);

    out.extend(outline);
    value.draw(data, measurer, out);
    domain.draw(&keys, data, measurer, out);
}

struct Ctx<'a> {
    plot: &'a CategoryPlot,
    table: &'a CategoryTable,
    cart: Cartesian,
    value: &'a ValueAxisView<'a>,
    domain: &'a CategoryAxisView<'a>,
    depth: f64,
    items: ItemOptions,
    supplier: DrawingSupplier,
}

impl Ctx<'_> {
    fn paint(&self, series: usize) -> Color {
        self.plot
            .renderer
            .series_paints
            .resolve(series, &self.supplier)
    }

    fn series_key(&self, series: usize) -> &str {
        self.table.series_key(series).unwrap_or_default()
    }

    fn category_key(&self, category: usize) -> &str {
        self.table.category_key(category).unwrap_or_default()
    }

    fn decorate(&self, series: usize, category: usize, value: f64, shapes: Vec<Drawable>) -> Vec<Drawable> {
        let s = self.series_key(series);
        let c = self.category_key(category);
        self.items.wrap(
            shapes,
            || format!("({s}, {c}) = {}", NumberFormat::number().format(value)),
            || item_url(&[("series", s), ("category", c)]),
        )
    }

    /// Bar slots within one category band.
    fn bar_slot(&self, series: usize, category: usize) -> (f64, f64) {
        let (a, b) = self.domain.band(category);
        let n = self.table.series_count().max(1) as f64;
        let width = b - a;
        if n <= 1.0 {
            return (a, b);
        }
        let bar = width * (1.0 - ITEM_MARGIN) / n;
        let gap = width * ITEM_MARGIN / (n - 1.0);
        let s = a + series as f64 * (bar + gap);
        (s, s + bar)
    }

    fn bar_shapes(&self, d0: f64, d1: f64, v0: f64, v1: f64, paint: Color) -> Vec<Drawable> {
        let rect = self.cart.rect(d0, d1, v0, v1);
        let mut shapes = Vec::new();
        if self.depth > 0.0 {
            let k = self.depth;
            let (x, y, r, b) = (rect.x, rect.y, rect.right(), rect.bottom());
            shapes.push(Drawable::polygon(
                &[(x, y), (x + k, y - k), (r + k, y - k), (r, y)],
                Some(paint),
                None,
            ));
            shapes.push(Drawable::polygon(
                &[(r, y), (r + k, y - k), (r + k, b - k), (r, b)],
                Some(paint.darker(0.7)),
                None,
            ));
        }
        shapes.push(Drawable::rect(rect, Some(paint), None));
        shapes
    }

    fn bars(&self, out: &mut Vec<Drawable>) {
        let base = self.value.px_clamped(0.0);
        for c in 0..self.table.category_count() {
            for s in 0..self.table.series_count() {
                let Some(v) = self.table.value_at(s, c) else {
                    continue;
                };
                let (d0, d1) = self.bar_slot(s, c);
                let shapes = self.bar_shapes(d0, d1, base, self.value.px_clamped(v), self.paint(s));
                out.extend(self.decorate(s, c, v, shapes));
            }
        }
    }

    fn stacked_bars(&self, out: &mut Vec<Drawable>) {
        for c in 0..self.table.category_count() {
            let (d0, d1) = self.domain.band(c);
            let (mut pos, mut neg) = (0.0, 0.0);
            for s in 0..self.table.series_count() {
                let Some(v) = self.table.value_at(s, c) else {
                    continue;
                };
                let (from, to) = if v >= 0.0 {
                    pos += v;
                    (pos - v, pos)
                } else {
                    neg += v;
                    (neg - v, neg)
                };
                let shapes = self.bar_shapes(
                    d0,
                    d1,
                    self.value.px_clamped(from),
                    self.value.px_clamped(to),
                    self.paint(s),
                );
                out.extend(self.decorate(s, c, v, shapes));
            }
        }
    }

    fn point(&self, c: usize, v: f64) -> (f64, f64) {
        self.cart.point(self.domain.middle(c), self.value.px(v))
    }

    fn lines(&self, lines: bool, shapes: bool, out: &mut Vec<Drawable>) {
        for s in 0..self.table.series_count() {
            let paint = self.paint(s);
            if lines {
                // Null values break the line.
                let mut run: Vec<(f64, f64)> = Vec::new();
                for c in 0..self.table.category_count() {
                    match self.table.value_at(s, c) {
                        Some(v) => run.push(self.point(c, v)),
                        None => flush_run(&mut run, paint, self.depth, out),
                    }
                }
                flush_run(&mut run, paint, self.depth, out);
            }
            if shapes || self.items.tooltips || self.items.urls {
                for c in 0..self.table.category_count() {
                    let Some(v) = self.table.value_at(s, c) else {
                        continue;
                    };
                    let (x, y) = self.point(c, v);
                    let marker = if shapes {
                        shape_marker(s, x, y, paint)
                    } else {
                        Drawable::rect(
                            Rect::new(x - SHAPE_SIZE / 2.0, y - SHAPE_SIZE / 2.0, SHAPE_SIZE, SHAPE_SIZE),
                            None,
                            None,
                        )
                    };
                    out.extend(self.decorate(s, c, v, vec![marker]));
                }
            }
        }
    }

    fn areas(&self, out: &mut Vec<Drawable>) {
        let base = self.value.px_clamped(0.0);
        for s in 0..self.table.series_count() {
            let mut upper = Vec::new();
            for c in 0..self.table.category_count() {
                let v = self.table.value_at(s, c).unwrap_or(0.0);
                upper.push(self.cart.point(self.domain.middle(c), self.value.px_clamped(v)));
            }
            let mut points = Vec::with_capacity(upper.len() + 2);
            if let (Some(first), Some(last)) = (upper.first().copied(), upper.last().copied()) {
                points.push(self.base_point(first, base));
                points.extend(upper.iter().copied());
                points.push(self.base_point(last, base));
            }
            let shape = Drawable::polygon(&points, Some(self.paint(s)), None);
            out.extend(self.items.wrap(
                vec![shape],
                || self.series_key(s).to_string(),
                || item_url(&[("series", self.series_key(s))]),
            ));
        }
    }

    /// Projects a screen point onto the value baseline.
    fn base_point(&self, (x, y): (f64, f64), base: f64) -> (f64, f64) {
        if self.cart.vertical { (x, base) } else { (base, y) }
    }

    fn stacked_areas(&self, out: &mut Vec<Drawable>) {
        let n = self.table.category_count();
        let mut below = vec![0.0; n];
        for s in 0..self.table.series_count() {
            let above: Vec<f64> = (0..n)
                .map(|c| below[c] + self.table.value_at(s, c).unwrap_or(0.0))
                .collect();
            let mut points: Vec<(f64, f64)> = (0..n)
                .map(|c| self.cart.point(self.domain.middle(c), self.value.px_clamped(above[c])))
                .collect();
            points.extend(
                (0..n)
                    .rev()
                    .map(|c| self.cart.point(self.domain.middle(c), self.value.px_clamped(below[c]))),
            );
            let shape = Drawable::polygon(&points, Some(self.paint(s)), None);
            out.extend(self.items.wrap(
                vec![shape],
                || self.series_key(s).to_string(),
                || item_url(&[("series", self.series_key(s))]),
            ));
            below = above;
        }
    }

    fn waterfall(&self, out: &mut Vec<Drawable>) {
        let last = self.table.category_count().saturating_sub(1);
        for s in 0..self.table.series_count() {
            let mut total = 0.0;
            for c in 0..self.table.category_count() {
                let Some(v) = self.table.value_at(s, c) else {
                    continue;
                };
                let (from, to, paint) = if c == 0 {
                    (0.0, v, WATERFALL_FIRST)
                } else if c == last {
                    (0.0, v, WATERFALL_LAST)
                } else if v >= 0.0 {
                    (total, total + v, WATERFALL_UP)
                } else {
                    (total, total + v, WATERFALL_DOWN)
                };
                total += v;
                let (d0, d1) = self.bar_slot(s, c);
                let shapes = self.bar_shapes(
                    d0,
                    d1,
                    self.value.px_clamped(from),
                    self.value.px_clamped(to),
                    paint,
                );
                out.extend(self.decorate(s, c, v, shapes));
            }
        }
    }

    /// Item labels at the value end of each item, when a generator is installed.
    fn item_labels(&self, out: &mut Vec<Drawable>) {
        let renderer = &self.plot.renderer;
        let Some(generator) = renderer.item_label_generator.as_ref() else {
            return;
        };
        if !renderer.item_labels_visible {
            return;
        }
        let stacked = matches!(
            renderer.kind,
            CategoryRendererKind::StackedBar | CategoryRendererKind::StackedArea
        );
        // Screen direction in which values grow along the value axis.
        let growth = if self.value.end >= self.value.start { 1.0 } else { -1.0 };
        for c in 0..self.table.category_count() {
            let mut running = 0.0;
            for s in 0..self.table.series_count() {
                let Some(v) = self.table.value_at(s, c) else {
                    continue;
                };
                running += v;
                let Some(text) = generator.generator.generate_label(self.table, s, c) else {
                    continue;
                };
                let (d, at) = match renderer.kind {
                    CategoryRendererKind::Bar | CategoryRendererKind::Waterfall => {
                        let (d0, d1) = self.bar_slot(s, c);
                        ((d0 + d1) / 2.0, v)
                    }
                    _ if stacked => (self.domain.middle(c), running),
                    _ => (self.domain.middle(c), v),
                };
                let outward = if v >= 0.0 { growth } else { -growth };
                let p = self.value.px_clamped(at) + outward * ITEM_LABEL_OFFSET;
                let (x, y) = self.cart.point(d, p);
                let (anchor, baseline) = match (self.cart.vertical, outward < 0.0) {
                    (true, true) => (Anchor::Middle, Baseline::Bottom),
                    (true, false) => (Anchor::Middle, Baseline::Top),
                    (false, true) => (Anchor::End, Baseline::Middle),
                    (false, false) => (Anchor::Start, Baseline::Middle),
                };
                out.push(Drawable::Text(
                    TextItem::new(text, x, y, TICK_LABEL_FONT, Color::BLACK).anchored(anchor, baseline),
                ));
            }
        }
    }
}

fn flush_run(run: &mut Vec<(f64, f64)>, paint: Color, depth: f64, out: &mut Vec<Drawable>) {
    if run.len() >= 2 {
        let width = if depth > 0.0 { 3.0 } else { 1.0 };
        out.push(Drawable::polyline(run, Stroke::solid(paint, width)));
    }
    run.clear();
}

/// Series shapes cycle through square, circle, triangle and diamond.
pub(super) fn shape_marker(series: usize, x: f64, y: f64, paint: Color) -> Drawable {
    let h = SHAPE_SIZE / 2.0;
    match series % 4 {
        0 => Drawable::rect(Rect::new(x - h, y - h, SHAPE_SIZE, SHAPE_SIZE), Some(paint), None),
        1 => Drawable::Ellipse {
            cx: x,
            cy: y,
            rx: h,
            ry: h,
            fill: Some(paint),
            stroke: None,
        },
        2 => Drawable::polygon(&[(x, y - h), (x + h, y + h), (x - h, y + h)], Some(paint), None),
        _ => Drawable::polygon(&[(x, y - h), (x + h, y), (x, y + h), (x - h, y)], Some(paint), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::NumberAxis;
    use crate::model::{CategoryAxis, CategoryRenderer, PlotStyle};
    use crate::text::DeterministicTextMeasurer;

    fn plot(kind: CategoryRendererKind) -> CategoryPlot {
        let mut t = CategoryTable::default();
        t.add_value("S1", "A", Some(1.0));
        t.add_value("S1", "B", Some(3.0));
        t.add_value("S2", "A", Some(2.0));
        let range = crate::factory::category_value_range(&t, kind);
        CategoryPlot {
            style: PlotStyle::default(),
            orientation: PlotOrientation::Vertical,
            dataset: t,
            domain_axis: CategoryAxis::new(Some("Quarter".into())),
            range_axis: NumberAxis::new(Some("Sales".into()), range),
            renderer: CategoryRenderer::new(kind),
            domain_gridlines_visible: false,
            range_gridlines_visible: true,
            range_zero_baseline_visible: true,
        }
    }

    fn rects(out: &[Drawable], paint: Color) -> Vec<Rect> {
        out.iter()
            .filter_map(|d| match d {
                Drawable::Rect { rect, fill: Some(f), .. } if *f == paint => Some(*rect),
                _ => None,
            })
            .collect()
    }

    fn run(plot: &CategoryPlot, items: ItemOptions) -> Vec<Drawable> {
        let mut out = Vec::new();
        layout(
            plot,
            Rect::new(0.0, 0.0, 400.0, 300.0),
            items,
            &DeterministicTextMeasurer::default(),
            &mut out,
        );
        out
    }

    const PLAIN: ItemOptions = ItemOptions {
        tooltips: false,
        urls: false,
    };

    #[test]
    fn one_bar_per_non_null_value() {
        let plot = plot(CategoryRendererKind::Bar);
        let out = run(&plot, PLAIN);
        let supplier = DrawingSupplier::default();
        assert_eq!(rects(&out, supplier.paint(0)).len(), 2);
        assert_eq!(rects(&out, supplier.paint(1)).len(), 1);
        let bars = rects(&out, supplier.paint(0));
        // Taller value, taller bar.
        assert!(bars[1].height > bars[0].height);
    }

    #[test]
    fn tooltips_wrap_items() {
        let plot = plot(CategoryRendererKind::Bar);
        let out = run(
            &plot,
            ItemOptions {
                tooltips: true,
                urls: true,
            },
        );
        let tips: Vec<_> = out
            .iter()
            .filter_map(|d| match d {
                Drawable::Item { tooltip, href, .. } => Some((tooltip.clone(), href.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(tips.len(), 3);
        assert_eq!(tips[0].0.as_deref(), Some("(S1, A) = 1"));
        assert_eq!(tips[0].1.as_deref(), Some("index.html?series=S1&category=A"));
    }

    #[test]
    fn empty_table_shows_message() {
        let mut p = plot(CategoryRendererKind::Bar);
        p.dataset = CategoryTable::default();
        let out = run(&p, PLAIN);
        assert!(out.iter().any(|d| matches!(d, Drawable::Text(t) if t.text == super::super::NO_DATA_MESSAGE)));
    }

    #[test]
    fn stacked_bars_share_the_band() {
        let plot = plot(CategoryRendererKind::StackedBar);
        let out = run(&plot, PLAIN);
        let supplier = DrawingSupplier::default();
        let s1 = rects(&out, supplier.paint(0));
        let s2 = rects(&out, supplier.paint(1));
        assert!((s1[0].x - s2[0].x).abs() < 1e-9);
        // S2 sits on top of S1 in category A.
        assert!((s2[0].bottom() - s1[0].y).abs() < 1e-6);
    }
}
