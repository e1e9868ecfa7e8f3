//! The assembled chart: plot family, axes, renderers and paints, after every setting has been
//! applied. Layout reads this model and never mutates it.

use crate::axis::NumberAxis;
use crate::palette::DrawingSupplier;
use indexmap::IndexMap;
use serde::Serialize;
use xmlchart_core::{
    CategoryLabelPositions, CategoryTable, ChartType, Color, PieSectionLabelGenerator, PieTable,
    PlotOrientation, ResolvedLabelGenerator, TableOrder, XyTable, XyzTable,
};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    pub chart_type: ChartType,
    pub width: u32,
    pub height: u32,
    pub title: Option<TextTitle>,
    /// Bottom subtitle; radar charts without a legend reserve a blank line here.
    pub subtitle: Option<TextTitle>,
    pub legend: bool,
    pub tooltips: bool,
    pub urls: bool,
    pub background: Option<Color>,
    pub plot: Plot,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextTitle {
    pub text: String,
    pub paint: Color,
}

impl TextTitle {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            paint: Color::BLACK,
        }
    }
}

/// The plot family, fixed by the chart type at construction.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Plot {
    Category(CategoryPlot),
    Xy(XyPlot),
    Pie(PiePlot),
    MultiplePie(MultiplePiePlot),
    SpiderWeb(SpiderWebPlot),
}

impl Plot {
    pub fn style(&self) -> &PlotStyle {
        match self {
            Plot::Category(p) => &p.style,
            Plot::Xy(p) => &p.style,
            Plot::Pie(p) => &p.style,
            Plot::MultiplePie(p) => &p.style,
            Plot::SpiderWeb(p) => &p.style,
        }
    }

    pub fn style_mut(&mut self) -> &mut PlotStyle {
        match self {
            Plot::Category(p) => &mut p.style,
            Plot::Xy(p) => &mut p.style,
            Plot::Pie(p) => &mut p.style,
            Plot::MultiplePie(p) => &mut p.style,
            Plot::SpiderWeb(p) => &mut p.style,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotStyle {
    pub background: Option<Color>,
    pub foreground_alpha: f32,
    pub outline_visible: bool,
    pub outline_paint: Option<Color>,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            background: Some(Color::LIGHT_GRAY),
            foreground_alpha: 1.0,
            outline_visible: true,
            outline_paint: Some(Color::GRAY),
        }
    }
}

/// Explicit per-series paints; unset indices fall back to the drawing supplier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SeriesPaints(Vec<Option<Color>>);

impl SeriesPaints {
    pub fn set(&mut self, index: usize, color: Color) {
        if self.0.len() <= index {
            self.0.resize(index + 1, None);
        }
        self.0[index] = Some(color);
    }

    pub fn get(&self, index: usize) -> Option<Color> {
        self.0.get(index).copied().flatten()
    }

    pub fn resolve(&self, index: usize, supplier: &DrawingSupplier) -> Color {
        self.get(index).unwrap_or_else(|| supplier.paint(index))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAxis {
    pub label: Option<String>,
    pub label_paint: Color,
    pub tick_label_paint: Color,
    pub label_positions: CategoryLabelPositions,
}

impl CategoryAxis {
    pub fn new(label: Option<String>) -> Self {
        Self {
            label,
            label_paint: Color::BLACK,
            tick_label_paint: Color::DARK_GRAY,
            label_positions: CategoryLabelPositions::Standard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryRendererKind {
    Bar,
    StackedBar,
    Line { lines: bool, shapes: bool },
    Area,
    StackedArea,
    Waterfall,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRenderer {
    pub kind: CategoryRendererKind,
    /// Depth offset in pixels for the 3-D variants.
    pub depth: Option<f64>,
    pub series_paints: SeriesPaints,
    pub item_label_generator: Option<ResolvedLabelGenerator>,
    pub item_labels_visible: bool,
}

impl CategoryRenderer {
    pub const DEPTH_3D: f64 = 12.0;

    pub fn new(kind: CategoryRendererKind) -> Self {
        Self {
            kind,
            depth: None,
            series_paints: SeriesPaints::default(),
            item_label_generator: None,
            item_labels_visible: false,
        }
    }

    pub fn three_d(kind: CategoryRendererKind) -> Self {
        Self {
            depth: Some(Self::DEPTH_3D),
            ..Self::new(kind)
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPlot {
    pub style: PlotStyle,
    pub orientation: PlotOrientation,
    pub dataset: CategoryTable,
    pub domain_axis: CategoryAxis,
    pub range_axis: NumberAxis,
    pub renderer: CategoryRenderer,
    pub domain_gridlines_visible: bool,
    pub range_gridlines_visible: bool,
    pub range_zero_baseline_visible: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "shape", content = "table", rename_all = "camelCase")]
pub enum XyData {
    Xy(XyTable),
    Xyz(XyzTable),
}

impl XyData {
    pub fn series_count(&self) -> usize {
        match self {
            XyData::Xy(t) => t.series_count(),
            XyData::Xyz(t) => t.series_count(),
        }
    }

    pub fn series_keys(&self) -> Vec<String> {
        match self {
            XyData::Xy(t) => t.series_keys().map(str::to_string).collect(),
            XyData::Xyz(t) => t.series_keys().map(str::to_string).collect(),
        }
    }

    pub fn x_extent(&self) -> Option<(f64, f64)> {
        match self {
            XyData::Xy(t) => t.x_extent(),
            XyData::Xyz(t) => t.x_extent(),
        }
    }

    pub fn y_extent(&self) -> Option<(f64, f64)> {
        match self {
            XyData::Xy(t) => t.y_extent(),
            XyData::Xyz(t) => t.y_extent(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum XyRendererKind {
    Line,
    Shapes,
    Area,
    #[serde(rename_all = "camelCase")]
    Bar { use_y_interval: bool, bar_width: f64 },
    Dot { width: i32, height: i32 },
    Bubble,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XyRenderer {
    pub kind: XyRendererKind,
    pub series_paints: SeriesPaints,
    pub series_stroke_width: Option<f32>,
}

impl XyRenderer {
    pub fn new(kind: XyRendererKind) -> Self {
        Self {
            kind,
            series_paints: SeriesPaints::default(),
            series_stroke_width: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XyPlot {
    pub style: PlotStyle,
    pub orientation: PlotOrientation,
    pub dataset: XyData,
    pub domain_axis: NumberAxis,
    pub range_axis: NumberAxis,
    pub renderer: XyRenderer,
    pub domain_gridlines_visible: bool,
    pub range_gridlines_visible: bool,
    pub domain_zero_baseline_visible: bool,
    pub range_zero_baseline_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PieKind {
    Flat,
    ThreeD,
    Ring,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PiePlot {
    pub style: PlotStyle,
    pub kind: PieKind,
    pub dataset: PieTable,
    pub label_generator: PieSectionLabelGenerator,
    pub section_paints: IndexMap<String, Color>,
    pub section_outlines_visible: bool,
    pub section_outline_paint: Color,
    pub shadow_paint: Option<Color>,
    pub supplier: DrawingSupplier,
}

impl PiePlot {
    pub fn new(kind: PieKind, dataset: PieTable) -> Self {
        Self {
            style: PlotStyle::default(),
            kind,
            dataset,
            label_generator: PieSectionLabelGenerator::default(),
            section_paints: IndexMap::new(),
            section_outlines_visible: true,
            section_outline_paint: Color::GRAY,
            shadow_paint: Some(Color::GRAY),
            supplier: DrawingSupplier::default(),
        }
    }

    /// Paint of the section at `index` with key `key`.
    pub fn section_paint(&self, key: &str, index: usize) -> Color {
        self.section_paints
            .get(key)
            .copied()
            .unwrap_or_else(|| self.supplier.paint(index))
    }
}

/// A grid of pies, one per column or row of a category table. `pie` is the template sub-plot
/// whose settings every pie shares; its dataset is replaced per pie at layout time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiplePiePlot {
    pub style: PlotStyle,
    pub dataset: CategoryTable,
    pub order: TableOrder,
    pub pie: PiePlot,
    /// Paints sections by key across every pie.
    pub supplier: DrawingSupplier,
}

impl MultiplePiePlot {
    /// Titles and section tables of the individual pies.
    pub fn pies(&self) -> Vec<(String, PieTable)> {
        let t = &self.dataset;
        match self.order {
            TableOrder::ByColumn => (0..t.category_count())
                .map(|c| {
                    let sections = (0..t.series_count())
                        .filter_map(|s| Some((t.series_key(s)?.to_string(), t.value_at(s, c))))
                        .collect();
                    (t.category_key(c).unwrap_or_default().to_string(), sections)
                })
                .collect(),
            TableOrder::ByRow => (0..t.series_count())
                .map(|s| {
                    let sections = (0..t.category_count())
                        .filter_map(|c| Some((t.category_key(c)?.to_string(), t.value_at(s, c))))
                        .collect();
                    (t.series_key(s).unwrap_or_default().to_string(), sections)
                })
                .collect(),
        }
    }

    /// Section keys in paint-assignment order.
    pub fn section_keys(&self) -> Vec<String> {
        let t = &self.dataset;
        match self.order {
            TableOrder::ByColumn => t.series_keys().map(str::to_string).collect(),
            TableOrder::ByRow => t.category_keys().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpiderWebPlot {
    pub style: PlotStyle,
    pub dataset: CategoryTable,
    pub max_value: Option<f64>,
    pub min_value: Option<f64>,
    pub series_paints: SeriesPaints,
    pub label_generator: Option<ResolvedLabelGenerator>,
    pub axis_line_paint: Color,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_paints_leave_gaps_for_the_supplier() {
        let mut p = SeriesPaints::default();
        p.set(2, Color::BLACK);
        let supplier = DrawingSupplier::default();
        assert_eq!(p.get(0), None);
        assert_eq!(p.resolve(1, &supplier), supplier.paint(1));
        assert_eq!(p.resolve(2, &supplier), Color::BLACK);
    }

    #[test]
    fn multiple_pie_slices_by_table_order() {
        let mut t = CategoryTable::default();
        t.add_value("S1", "A", Some(1.0));
        t.add_value("S1", "B", Some(2.0));
        t.add_value("S2", "A", Some(3.0));
        let mut plot = MultiplePiePlot {
            style: PlotStyle::default(),
            dataset: t,
            order: TableOrder::ByColumn,
            pie: PiePlot::new(PieKind::Flat, PieTable::default()),
            supplier: DrawingSupplier::default(),
        };
        let pies = plot.pies();
        assert_eq!(pies.len(), 2);
        assert_eq!(pies[0].0, "A");
        assert_eq!(pies[0].1.value("S2"), Some(3.0));
        assert_eq!(plot.section_keys(), vec!["S1", "S2"]);

        plot.order = TableOrder::ByRow;
        let pies = plot.pies();
        assert_eq!(pies.len(), 2);
        assert_eq!(pies[1].0, "S2");
        assert_eq!(pies[1].1.value("B"), None);
        assert_eq!(plot.section_keys(), vec!["A", "B"]);
    }
}
