//! Turns an assembled [`Chart`] into a flat list of positioned drawables.
//!
//! The chart frame (background, title, legend, bottom subtitle) is laid out here; the plot area
//! that remains is handed to the plot family's module.

mod cartesian;
mod category;
mod pie;
mod spider;
mod xy;

use crate::model::{Chart, Plot, TextTitle};
use crate::palette::DrawingSupplier;
use crate::text::{TextMeasurer, TextStyle};
use serde::Serialize;
use xmlchart_core::Color;

pub(crate) const TITLE_FONT: f64 = 18.0;
pub(crate) const AXIS_LABEL_FONT: f64 = 12.0;
pub(crate) const TICK_LABEL_FONT: f64 = 10.0;
pub(crate) const LEGEND_FONT: f64 = 10.0;
const PADDING: f64 = 8.0;
const LEGEND_SWATCH: f64 = 8.0;
const LEGEND_GAP: f64 = 4.0;
const LEGEND_ITEM_SPACING: f64 = 12.0;

pub(crate) const NO_DATA_MESSAGE: &str = "No data to display";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Rectangle spanning two corners given in any order.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::new(x0.min(x1), y0.min(y1), (x1 - x0).abs(), (y1 - y0).abs())
    }

    pub fn inset(&self, top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self::new(
            self.x + left,
            self.y + top,
            self.width - left - right,
            self.height - top - bottom,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub paint: Color,
    pub width: f64,
    pub dashed: bool,
}

impl Stroke {
    pub fn solid(paint: Color, width: f64) -> Self {
        Self {
            paint,
            width,
            dashed: false,
        }
    }

    pub fn dashed(paint: Color, width: f64) -> Self {
        Self {
            paint,
            width,
            dashed: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Baseline {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextItem {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub bold: bool,
    pub fill: Color,
    pub anchor: Anchor,
    pub baseline: Baseline,
    /// Degrees clockwise around `(x, y)`.
    pub rotation: f64,
}

impl TextItem {
    pub fn new(text: impl Into<String>, x: f64, y: f64, font_size: f64, fill: Color) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            font_size,
            bold: false,
            fill,
            anchor: Anchor::Start,
            baseline: Baseline::Top,
            rotation: 0.0,
        }
    }

    pub fn anchored(mut self, anchor: Anchor, baseline: Baseline) -> Self {
        self.anchor = anchor;
        self.baseline = baseline;
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Drawable {
    Rect {
        rect: Rect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: Stroke,
    },
    Path {
        d: String,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        fill: Option<Color>,
        stroke: Option<Stroke>,
    },
    Text(TextItem),
    /// Children drawn with a shared opacity.
    Group {
        opacity: f64,
        children: Vec<Drawable>,
    },
    /// One data item, with its tooltip and link when the chart asks for them.
    Item {
        tooltip: Option<String>,
        href: Option<String>,
        children: Vec<Drawable>,
    },
}

impl Drawable {
    pub fn rect(rect: Rect, fill: Option<Color>, stroke: Option<Stroke>) -> Self {
        Drawable::Rect { rect, fill, stroke }
    }

    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64, stroke: Stroke) -> Self {
        Drawable::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
        }
    }

    pub fn polygon(points: &[(f64, f64)], fill: Option<Color>, stroke: Option<Stroke>) -> Self {
        Drawable::Path {
            d: path_data(points, true),
            fill,
            stroke,
        }
    }

    pub fn polyline(points: &[(f64, f64)], stroke: Stroke) -> Self {
        Drawable::Path {
            d: path_data(points, false),
            fill: None,
            stroke: Some(stroke),
        }
    }
}

pub(crate) fn path_data(points: &[(f64, f64)], close: bool) -> String {
    use std::fmt::Write as _;

    let mut d = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{cmd}{},{}", crate::svg::fmt(*x), crate::svg::fmt(*y));
    }
    if close && !points.is_empty() {
        d.push('Z');
    }
    d
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub background: Option<Color>,
    pub drawables: Vec<Drawable>,
}

/// Per-item decoration switches shared by the plot modules.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ItemOptions {
    pub tooltips: bool,
    pub urls: bool,
}

impl ItemOptions {
    /// Wraps `children` into an item when tooltips or links are enabled.
    pub fn wrap(
        &self,
        children: Vec<Drawable>,
        tooltip: impl FnOnce() -> String,
        href: impl FnOnce() -> String,
    ) -> Vec<Drawable> {
        if !self.tooltips && !self.urls {
            return children;
        }
        vec![Drawable::Item {
            tooltip: self.tooltips.then(tooltip),
            href: self.urls.then(href),
            children,
        }]
    }
}

/// `index.html?name=value&...` with form-encoded values.
pub(crate) fn item_url(params: &[(&str, &str)]) -> String {
    let query: Vec<String> = params
        .iter()
        .map(|(k, v)| {
            let v: String = url::form_urlencoded::byte_serialize(v.as_bytes()).collect();
            format!("{k}={v}")
        })
        .collect();
    format!("index.html?{}", query.join("&"))
}

pub(crate) struct LegendItem {
    pub label: String,
    pub paint: Color,
}

pub fn layout_chart(chart: &Chart, measurer: &dyn TextMeasurer) -> ChartLayout {
    let width = f64::from(chart.width);
    let height = f64::from(chart.height);
    let mut drawables = Vec::new();
    let mut area = Rect::new(0.0, 0.0, width, height).inset(PADDING, PADDING, PADDING, PADDING);

    if let Some(title) = &chart.title {
        area = layout_title(title, area, measurer, &mut drawables);
    }
    if let Some(subtitle) = &chart.subtitle {
        area = layout_bottom_subtitle(subtitle, area, measurer, &mut drawables);
    }
    if chart.legend {
        area = layout_legend(&legend_items(&chart.plot), area, measurer, &mut drawables);
    }

    let items = ItemOptions {
        tooltips: chart.tooltips,
        urls: chart.urls,
    };
    match &chart.plot {
        Plot::Category(plot) => category::layout(plot, area, items, measurer, &mut drawables),
        Plot::Xy(plot) => xy::layout(plot, area, items, measurer, &mut drawables),
        Plot::Pie(plot) => pie::layout(plot, area, items, measurer, &mut drawables),
        Plot::MultiplePie(plot) => pie::layout_multiple(plot, area, items, measurer, &mut drawables),
        Plot::SpiderWeb(plot) => spider::layout(plot, area, items, measurer, &mut drawables),
    }

    ChartLayout {
        width,
        height,
        background: chart.background,
        drawables,
    }
}

fn layout_title(
    title: &TextTitle,
    area: Rect,
    measurer: &dyn TextMeasurer,
    out: &mut Vec<Drawable>,
) -> Rect {
    let metrics = measurer.measure(&title.text, &TextStyle::bold(TITLE_FONT));
    let (cx, _) = area.center();
    out.push(Drawable::Text(
        TextItem::new(&title.text, cx, area.y, TITLE_FONT, title.paint)
            .anchored(Anchor::Middle, Baseline::Top)
            .bold(),
    ));
    area.inset(metrics.height + PADDING / 2.0, 0.0, 0.0, 0.0)
}

fn layout_bottom_subtitle(
    subtitle: &TextTitle,
    area: Rect,
    measurer: &dyn TextMeasurer,
    out: &mut Vec<Drawable>,
) -> Rect {
    let metrics = measurer.measure(&subtitle.text, &TextStyle::sized(LEGEND_FONT));
    let (cx, _) = area.center();
    if !subtitle.text.trim().is_empty() {
        out.push(Drawable::Text(
            TextItem::new(&subtitle.text, cx, area.bottom(), LEGEND_FONT, subtitle.paint)
                .anchored(Anchor::Middle, Baseline::Bottom),
        ));
    }
    area.inset(0.0, 0.0, metrics.height + PADDING / 2.0, 0.0)
}

fn legend_items(plot: &Plot) -> Vec<LegendItem> {
    let supplier = DrawingSupplier::default();
    let series = |keys: Vec<String>, paint: &dyn Fn(usize) -> Color| {
        keys.into_iter()
            .enumerate()
            .map(|(i, label)| LegendItem {
                label,
                paint: paint(i),
            })
            .collect::<Vec<_>>()
    };
    match plot {
        Plot::Category(p) => series(
            p.dataset.series_keys().map(str::to_string).collect(),
            &|i| p.renderer.series_paints.resolve(i, &supplier),
        ),
        Plot::Xy(p) => series(p.dataset.series_keys(), &|i| {
            p.renderer.series_paints.resolve(i, &supplier)
        }),
        Plot::SpiderWeb(p) => series(
            p.dataset.series_keys().map(str::to_string).collect(),
            &|i| p.series_paints.resolve(i, &supplier),
        ),
        Plot::Pie(p) => p
            .dataset
            .keys()
            .enumerate()
            .map(|(i, key)| LegendItem {
                label: key.to_string(),
                paint: p.section_paint(key, i),
            })
            .collect(),
        Plot::MultiplePie(p) => series(p.section_keys(), &|i| p.supplier.paint(i)),
    }
}

/// Legend rows along the bottom edge, wrapped to the available width.
fn layout_legend(
    items: &[LegendItem],
    area: Rect,
    measurer: &dyn TextMeasurer,
    out: &mut Vec<Drawable>,
) -> Rect {
    if items.is_empty() {
        return area;
    }
    let style = TextStyle::sized(LEGEND_FONT);
    let row_height = measurer.measure("Xg", &style).height.max(LEGEND_SWATCH);

    let mut rows: Vec<Vec<(&LegendItem, f64)>> = vec![Vec::new()];
    let mut row_width = 0.0;
    for item in items {
        let w = LEGEND_SWATCH + LEGEND_GAP + measurer.measure(&item.label, &style).width;
        if row_width > 0.0 && row_width + LEGEND_ITEM_SPACING + w > area.width {
            rows.push(Vec::new());
            row_width = 0.0;
        }
        if row_width > 0.0 {
            row_width += LEGEND_ITEM_SPACING;
        }
        row_width += w;
        if let Some(row) = rows.last_mut() {
            row.push((item, w));
        }
    }

    let block_height = rows.len() as f64 * row_height;
    let (cx, _) = area.center();
    let mut y = area.bottom() - block_height;
    for row in &rows {
        let total: f64 = row.iter().map(|(_, w)| *w).sum::<f64>()
            + LEGEND_ITEM_SPACING * row.len().saturating_sub(1) as f64;
        let mut x = cx - total / 2.0;
        let mid = y + row_height / 2.0;
        for (item, w) in row {
            out.push(Drawable::rect(
                Rect::new(x, mid - LEGEND_SWATCH / 2.0, LEGEND_SWATCH, LEGEND_SWATCH),
                Some(item.paint),
                None,
            ));
            out.push(Drawable::Text(
                TextItem::new(
                    &item.label,
                    x + LEGEND_SWATCH + LEGEND_GAP,
                    mid,
                    LEGEND_FONT,
                    Color::BLACK,
                )
                .anchored(Anchor::Start, Baseline::Middle),
            ));
            x += w + LEGEND_ITEM_SPACING;
        }
        y += row_height;
    }
    area.inset(0.0, 0.0, block_height + PADDING / 2.0, 0.0)
}

/// Plot background and outline behind the data area.
pub(crate) fn plot_frame(
    style: &crate::model::PlotStyle,
    rect: Rect,
    out: &mut Vec<Drawable>,
) -> Option<Drawable> {
    if let Some(bg) = style.background {
        out.push(Drawable::rect(rect, Some(bg), None));
    }
    match (style.outline_visible, style.outline_paint) {
        (true, Some(paint)) => Some(Drawable::rect(rect, None, Some(Stroke::solid(paint, 0.5)))),
        _ => None,
    }
}

pub(crate) fn no_data(area: Rect, out: &mut Vec<Drawable>) {
    let (cx, cy) = area.center();
    out.push(Drawable::Text(
        TextItem::new(NO_DATA_MESSAGE, cx, cy, TICK_LABEL_FONT, Color::BLACK)
            .anchored(Anchor::Middle, Baseline::Middle),
    ));
}

/// Wraps plot content in the foreground alpha when it is not opaque.
pub(crate) fn with_alpha(alpha: f32, children: Vec<Drawable>, out: &mut Vec<Drawable>) {
    if alpha >= 1.0 {
        out.extend(children);
    } else {
        out.push(Drawable::Group {
            opacity: f64::from(alpha.max(0.0)),
            children,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_urls_are_form_encoded() {
        assert_eq!(
            item_url(&[("series", "R&D"), ("category", "Q 1")]),
            "index.html?series=R%26D&category=Q+1"
        );
    }

    #[test]
    fn path_data_closes_polygons() {
        assert_eq!(path_data(&[(0.0, 0.0), (10.5, 2.0)], false), "M0,0L10.5,2");
        assert_eq!(path_data(&[(0.0, 0.0), (1.0, 1.0)], true), "M0,0L1,1Z");
    }

    #[test]
    fn rect_from_corners_normalises() {
        let r = Rect::from_corners(10.0, 20.0, 4.0, 5.0);
        assert_eq!(r, Rect::new(4.0, 5.0, 6.0, 15.0));
    }
}
