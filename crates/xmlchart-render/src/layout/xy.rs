use super::cartesian::{Cartesian, ValueAxisView, axis_space};
use super::category::shape_marker;
use super::{Drawable, ItemOptions, Rect, Stroke, item_url, no_data, plot_frame, with_alpha};
use crate::model::{XyData, XyPlot, XyRendererKind};
use crate::palette::DrawingSupplier;
use crate::text::TextMeasurer;
use xmlchart_core::{Color, NumberFormat, PlotOrientation};

/// Height of the marker drawn for a bar that only shows its y position.
const Y_INTERVAL_MARKER: f64 = 1.0;

/// One data point of either XY vocabulary.
#[derive(Debug, Clone, Copy)]
struct Point {
    x: f64,
    y: Option<f64>,
    z: Option<f64>,
}

fn series_points(data: &XyData) -> Vec<(String, Vec<Point>)> {
    match data {
        XyData::Xy(t) => t
            .series
            .iter()
            .map(|s| {
                let points = s
                    .items
                    .iter()
                    .map(|i| Point {
                        x: i.x,
                        y: i.y,
                        z: None,
                    })
                    .collect();
                (s.key.clone(), points)
            })
            .collect(),
        XyData::Xyz(t) => t
            .series
            .iter()
            .map(|s| {
                let points = s
                    .items
                    .iter()
                    .map(|i| Point {
                        x: i.x,
                        y: Some(i.y),
                        z: Some(i.z),
                    })
                    .collect();
                (s.key.clone(), points)
            })
            .collect(),
    }
}

pub(super) fn layout(
    plot: &XyPlot,
    area: Rect,
    items: ItemOptions,
    measurer: &dyn TextMeasurer,
    out: &mut Vec<Drawable>,
) {
    let vertical = plot.orientation == PlotOrientation::Vertical;
    let provisional = Cartesian { data: area, vertical };
    let domain_side = provisional.domain_side();
    let value_side = provisional.value_side();

    let domain_labels =
        ValueAxisView::new(&plot.domain_axis, domain_side, provisional.domain_interval(false))
            .labels();
    let value_labels =
        ValueAxisView::new(&plot.range_axis, value_side, provisional.value_interval()).labels();
    let domain_space = axis_space(
        domain_side,
        &domain_labels,
        0.0,
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
    let data = area.inset(0.0, 0.0, bottom, left);

    let outline = plot_frame(&plot.style, data, out);
    let series = series_points(&plot.dataset);
    if series.iter().all(|(_, points)| points.is_empty()) {
        no_data(data, out);
        out.extend(outline);
        return;
    }

    let cart = Cartesian { data, vertical };
    let domain = ValueAxisView::new(&plot.domain_axis, domain_side, cart.domain_interval(false));
    let value = ValueAxisView::new(&plot.range_axis, value_side, cart.value_interval());

    domain.gridbands(data, out);
    value.gridbands(data, out);
    if plot.domain_gridlines_visible {
        domain.gridlines(data, out);
    }
    if plot.range_gridlines_visible {
        value.gridlines(data, out);
    }

    let ctx = Ctx {
        plot,
        cart,
        domain: &domain,
        value: &value,
        items,
        supplier: DrawingSupplier::default(),
    };
    let mut content = Vec::new();
    for (index, (key, points)) in series.iter().enumerate() {
        ctx.series(index, key, points, &mut content);
    }
    with_alpha(plot.style.foreground_alpha, content, out);

    if plot.domain_zero_baseline_visible {
        domain.zero_baseline(data, out);
    }
    if plot.range_zero_baseline_visible {
        value.zero_baseline(data, out);
    }

    out.extend(outline);
    domain.draw(data, measurer, out);
    value.draw(data, measurer, out);
}

struct Ctx<'a> {
    plot: &'a XyPlot,
    cart: Cartesian,
    domain: &'a ValueAxisView<'a>,
    value: &'a ValueAxisView<'a>,
    items: ItemOptions,
    supplier: DrawingSupplier,
}

impl Ctx<'_> {
    fn screen(&self, x: f64, y: f64) -> (f64, f64) {
        self.cart.point(self.domain.px(x), self.value.px(y))
    }

    fn stroke(&self, paint: Color) -> Stroke {
        let width = self.plot.renderer.series_stroke_width.map_or(1.0, f64::from);
        Stroke::solid(paint, width)
    }

    fn decorate(&self, key: &str, index: usize, point: Point, shapes: Vec<Drawable>) -> Vec<Drawable> {
        let nf = NumberFormat::number();
        self.items.wrap(
            shapes,
            || {
                let x = nf.format(point.x);
                let y = point.y.map_or_else(|| "null".to_string(), |y| nf.format(y));
                match point.z {
                    Some(z) => format!("{key}: ({x}, {y}, {})", nf.format(z)),
                    None => format!("{key}: ({x}, {y})"),
                }
            },
            || item_url(&[("series", key), ("item", &index.to_string())]),
        )
    }

    fn series(&self, s: usize, key: &str, points: &[Point], out: &mut Vec<Drawable>) {
        let paint = self.plot.renderer.series_paints.resolve(s, &self.supplier);
        match self.plot.renderer.kind {
            XyRendererKind::Line => {
                let mut run = Vec::new();
                for p in points {
                    match p.y {
                        Some(y) => run.push(self.screen(p.x, y)),
                        None => self.flush(&mut run, paint, out),
                    }
                }
                self.flush(&mut run, paint, out);
                if self.items.tooltips || self.items.urls {
                    for (i, p) in points.iter().enumerate() {
                        if let Some(y) = p.y {
                            let (x, y) = self.screen(p.x, y);
                            let hit = Drawable::rect(Rect::new(x - 3.0, y - 3.0, 6.0, 6.0), None, None);
                            out.extend(self.decorate(key, i, *p, vec![hit]));
                        }
                    }
                }
            }
            XyRendererKind::Shapes => {
                for (i, p) in points.iter().enumerate() {
                    if let Some(y) = p.y {
                        let (x, y) = self.screen(p.x, y);
                        out.extend(self.decorate(key, i, *p, vec![shape_marker(s, x, y, paint)]));
                    }
                }
            }
            XyRendererKind::Area => {
                let base = self.value.px_clamped(0.0);
                let mut polygon = Vec::with_capacity(points.len() + 2);
                for p in points {
                    let v = self.value.px_clamped(p.y.unwrap_or(0.0));
                    polygon.push(self.cart.point(self.domain.px(p.x), v));
                }
                if let (Some(first), Some(last)) = (points.first(), points.last()) {
                    polygon.insert(0, self.cart.point(self.domain.px(first.x), base));
                    polygon.push(self.cart.point(self.domain.px(last.x), base));
                }
                let shape = Drawable::polygon(&polygon, Some(paint), None);
                out.extend(self.items.wrap(
                    vec![shape],
                    || key.to_string(),
                    || item_url(&[("series", key)]),
                ));
            }
            XyRendererKind::Bar {
                use_y_interval,
                bar_width,
            } => {
                let half = bar_width / 2.0;
                for (i, p) in points.iter().enumerate() {
                    let Some(y) = p.y else {
                        continue;
                    };
                    let d0 = self.domain.px(p.x - half);
                    let d1 = self.domain.px(p.x + half);
                    let v1 = self.value.px_clamped(y);
                    let v0 = if use_y_interval {
                        let direction = if self.value.end >= self.value.start { -1.0 } else { 1.0 };
                        v1 + direction * Y_INTERVAL_MARKER
                    } else {
                        self.value.px_clamped(0.0)
                    };
                    let bar = Drawable::rect(self.cart.rect(d0, d1, v0, v1), Some(paint), None);
                    out.extend(self.decorate(key, i, *p, vec![bar]));
                }
            }
            XyRendererKind::Dot { width, height } => {
                let (w, h) = (f64::from(width), f64::from(height));
                for (i, p) in points.iter().enumerate() {
                    let Some(y) = p.y else {
                        continue;
                    };
                    let (x, y) = self.screen(p.x, y);
                    let dot = Drawable::rect(Rect::new(x - w / 2.0, y - h / 2.0, w, h), Some(paint), None);
                    out.extend(self.decorate(key, i, *p, vec![dot]));
                }
            }
            XyRendererKind::Bubble => {
                for (i, p) in points.iter().enumerate() {
                    let (Some(y), Some(z)) = (p.y, p.z) else {
                        continue;
                    };
                    // z is a diameter in data units on both axes.
                    let dw = (self.domain.px(p.x + z / 2.0) - self.domain.px(p.x - z / 2.0)).abs();
                    let vh = (self.value.px(y + z / 2.0) - self.value.px(y - z / 2.0)).abs();
                    let (cx, cy) = self.screen(p.x, y);
                    let (rx, ry) = if self.cart.vertical {
                        (dw / 2.0, vh / 2.0)
                    } else {
                        (vh / 2.0, dw / 2.0)
                    };
                    let bubble = Drawable::Ellipse {
                        cx,
                        cy,
                        rx,
                        ry,
                        fill: Some(paint),
                        stroke: Some(Stroke::solid(paint.darker(0.7), 0.5)),
                    };
                    out.extend(self.decorate(key, i, *p, vec![bubble]));
                }
            }
        }
    }

    fn flush(&self, run: &mut Vec<(f64, f64)>, paint: Color, out: &mut Vec<Drawable>) {
        if run.len() >= 2 {
            out.push(Drawable::polyline(run, self.stroke(paint)));
        }
        run.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::{NumberAxis, Range};
    use crate::model::{PlotStyle, XyRenderer};
    use crate::text::DeterministicTextMeasurer;
    use xmlchart_core::{XyItem, XySeries, XyTable, XyzItem, XyzSeries, XyzTable};

    fn xy_plot(kind: XyRendererKind, data: XyData) -> XyPlot {
        let mut domain = NumberAxis::new(None, Range::from_extent(data.x_extent()));
        domain.set_auto_range_includes_zero(false);
        let range = NumberAxis::new(None, Range::from_extent(data.y_extent()));
        XyPlot {
            style: PlotStyle::default(),
            orientation: PlotOrientation::Vertical,
            dataset: data,
            domain_axis: domain,
            range_axis: range,
            renderer: XyRenderer::new(kind),
            domain_gridlines_visible: true,
            range_gridlines_visible: true,
            domain_zero_baseline_visible: false,
            range_zero_baseline_visible: false,
        }
    }

    fn line_data() -> XyData {
        XyData::Xy(XyTable {
            series: vec![XySeries {
                key: "S".into(),
                items: vec![
                    XyItem { x: 1.0, y: Some(1.0) },
                    XyItem { x: 2.0, y: Some(3.0) },
                    XyItem { x: 3.0, y: None },
                    XyItem { x: 4.0, y: Some(2.0) },
                    XyItem { x: 5.0, y: Some(4.0) },
                ],
            }],
        })
    }

    fn run(plot: &XyPlot, items: ItemOptions) -> Vec<Drawable> {
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
    fn null_y_breaks_the_line() {
        let plot = xy_plot(XyRendererKind::Line, line_data());
        let paint = DrawingSupplier::default().paint(0);
        let lines = run(&plot, PLAIN)
            .into_iter()
            .filter(|d| matches!(d, Drawable::Path { fill: None, stroke: Some(s), .. } if s.paint == paint))
            .count();
        assert_eq!(lines, 2);
    }

    #[test]
    fn xy_tooltips_name_series_and_item() {
        let plot = xy_plot(XyRendererKind::Shapes, line_data());
        let items: Vec<_> = run(
            &plot,
            ItemOptions {
                tooltips: true,
                urls: true,
            },
        )
        .into_iter()
        .filter_map(|d| match d {
            Drawable::Item { tooltip, href, .. } => Some((tooltip, href)),
            _ => None,
        })
        .collect();
        assert_eq!(items.len(), 4);
        assert_eq!(items[1].0.as_deref(), Some("S: (2, 3)"));
        assert_eq!(items[3].1.as_deref(), Some("index.html?series=S&item=4"));
    }

    #[test]
    fn bubbles_scale_with_z() {
        let data = XyData::Xyz(XyzTable {
            series: vec![XyzSeries {
                key: "B".into(),
                items: vec![
                    XyzItem { x: 1.0, y: 1.0, z: 1.0 },
                    XyzItem { x: 5.0, y: 5.0, z: 2.0 },
                ],
            }],
        });
        let plot = xy_plot(XyRendererKind::Bubble, data);
        let radii: Vec<f64> = run(&plot, PLAIN)
            .into_iter()
            .filter_map(|d| match d {
                Drawable::Ellipse { rx, .. } => Some(rx),
                _ => None,
            })
            .collect();
        assert_eq!(radii.len(), 2);
        assert!((radii[1] - 2.0 * radii[0]).abs() < 1e-6);
    }

    #[test]
    fn empty_series_show_message() {
        let plot = xy_plot(XyRendererKind::Line, XyData::Xy(XyTable::default()));
        assert!(run(&plot, PLAIN)
            .iter()
            .any(|d| matches!(d, Drawable::Text(t) if t.text == super::super::NO_DATA_MESSAGE)));
    }
}
