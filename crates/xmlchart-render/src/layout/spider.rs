use super::{
    Anchor, Baseline, Drawable, ItemOptions, Rect, Stroke, TICK_LABEL_FONT, TextItem, item_url,
    no_data, plot_frame, with_alpha,
};
use crate::model::SpiderWebPlot;
use crate::palette::DrawingSupplier;
use crate::text::TextMeasurer;
use std::f64::consts::TAU;
use xmlchart_core::{Color, NumberFormat};

const WEB_FILL_OPACITY: f64 = 0.1;
const RADIUS_FACTOR: f64 = 0.75;
const VERTEX_RADIUS: f64 = 3.0;
const LABEL_GAP: f64 = 6.0;

/// Axes start at twelve o'clock and run clockwise, one per category.
pub(super) fn layout(
    plot: &SpiderWebPlot,
    area: Rect,
    items: ItemOptions,
    _measurer: &dyn TextMeasurer,
    out: &mut Vec<Drawable>,
) {
    let outline = plot_frame(&plot.style, area, out);
    let table = &plot.dataset;
    let categories = table.category_count();
    if table.is_empty() || categories == 0 {
        no_data(area, out);
        out.extend(outline);
        return;
    }

    let (cx, cy) = area.center();
    let radius = area.width.min(area.height) / 2.0 * RADIUS_FACTOR;
    let (min, max) = value_bounds(plot);
    let angle = |c: usize| c as f64 / categories as f64 * TAU;
    let at = |c: usize, fraction: f64| {
        let a = angle(c);
        (cx + radius * fraction * a.sin(), cy - radius * fraction * a.cos())
    };

    for c in 0..categories {
        let (x, y) = at(c, 1.0);
        out.push(Drawable::line(cx, cy, x, y, Stroke::solid(plot.axis_line_paint, 1.0)));
    }

    let supplier = DrawingSupplier::default();
    let mut content = Vec::new();
    for s in 0..table.series_count() {
        let paint = plot.series_paints.resolve(s, &supplier);
        let points: Vec<(usize, f64, (f64, f64))> = (0..categories)
            .filter_map(|c| {
                let v = table.value_at(s, c)?;
                let fraction = ((v - min) / (max - min)).clamp(0.0, 1.0);
                Some((c, v, at(c, fraction)))
            })
            .collect();
        if points.len() >= 2 {
            let polygon: Vec<(f64, f64)> = points.iter().map(|(_, _, p)| *p).collect();
            content.push(Drawable::Group {
                opacity: WEB_FILL_OPACITY,
                children: vec![Drawable::polygon(&polygon, Some(paint), None)],
            });
            content.push(Drawable::polygon(&polygon, None, Some(Stroke::solid(paint, 1.0))));
        }
        let series_key = table.series_key(s).unwrap_or_default();
        for (c, v, (x, y)) in points {
            let category_key = table.category_key(c).unwrap_or_default();
            let vertex = Drawable::Ellipse {
                cx: x,
                cy: y,
                rx: VERTEX_RADIUS,
                ry: VERTEX_RADIUS,
                fill: Some(paint),
                stroke: None,
            };
            content.extend(items.wrap(
                vec![vertex],
                || format!("({series_key}, {category_key}) = {}", NumberFormat::number().format(v)),
                || item_url(&[("series", series_key), ("category", category_key)]),
            ));
        }
    }
    with_alpha(plot.style.foreground_alpha, content, out);

    for c in 0..categories {
        let label = match &plot.label_generator {
            Some(g) => g.generator.generate_column_label(table, c),
            None => table.category_key(c).map(str::to_string),
        };
        let Some(label) = label.filter(|l| !l.is_empty()) else {
            continue;
        };
        let a = angle(c);
        let (x, y) = at(c, 1.0);
        let (x, y) = (x + LABEL_GAP * a.sin(), y - LABEL_GAP * a.cos());
        let anchor = match a.sin() {
            s if s > 1e-9 => Anchor::Start,
            s if s < -1e-9 => Anchor::End,
            _ => Anchor::Middle,
        };
        let baseline = match a.cos() {
            c if c > 1e-9 => Baseline::Bottom,
            c if c < -1e-9 => Baseline::Top,
            _ => Baseline::Middle,
        };
        out.push(Drawable::Text(
            TextItem::new(label, x, y, TICK_LABEL_FONT, Color::BLACK).anchored(anchor, baseline),
        ));
    }
    out.extend(outline);
}

/// Bounds of the radial scale: explicit settings first, then zero and the data maximum.
fn value_bounds(plot: &SpiderWebPlot) -> (f64, f64) {
    let min = plot.min_value.unwrap_or(0.0);
    let max = plot.max_value.unwrap_or_else(|| {
        plot.dataset
            .value_extent()
            .map_or(min + 1.0, |(_, hi)| hi)
    });
    if max > min { (min, max) } else { (min, min + 1.0) }
}
