//! Chart assembly: builds the plot family for a chart type, then applies the settings in a
//! fixed order. Later steps overwrite earlier ones, so the order below is part of the contract:
//!
//! 1. renderer overrides (shape-only, dot size, line width)
//! 2. plot and number-axis settings (alpha, gridlines, baselines, outline, axis substitution,
//!    bounds then margins, tick units, zero inclusion)
//! 3. category range bounds (radar: maximum and minimum value)
//! 4. label generators, label positions, series and section colours, axis label colours
//! 5. title, chart and plot backgrounds

use crate::axis::{NumberAxis, Range};
use crate::diagnostics::Diagnostics;
use crate::model::{
    CategoryAxis, CategoryPlot, CategoryRenderer, CategoryRendererKind, Chart, MultiplePiePlot,
    PieKind, PiePlot, Plot, PlotStyle, SeriesPaints, SpiderWebPlot, TextTitle, XyData, XyPlot,
    XyRenderer, XyRendererKind,
};
use crate::palette::DrawingSupplier;
use crate::{Error, Result};
use xmlchart_core::color::{parse_color, tokenize};
use xmlchart_core::{
    CategoryTable, ChartSettings, ChartType, Color, Dataset, DatasetKind, PieSectionLabelGenerator,
};

/// A chart plus the soft failures met while configuring it.
#[derive(Debug, Clone)]
pub struct Assembled {
    pub chart: Chart,
    pub diagnostics: Diagnostics,
}

/// Builds `chart_type` over `dataset` and applies `settings`.
pub fn build_chart(
    chart_type: ChartType,
    settings: &ChartSettings,
    dataset: Dataset,
) -> Result<Assembled> {
    let mut diagnostics = Diagnostics::new();
    let mut chart = construct(chart_type, settings, dataset)?;

    match &mut chart.plot {
        Plot::Category(plot) => {
            configure_category_plot(plot, settings);
            apply_category_range(plot, settings);
            if let Some(generator) = &settings.category_item_label_generator {
                plot.renderer.item_label_generator = Some(generator.clone());
                plot.renderer.item_labels_visible = true;
            }
            plot.domain_axis.label_positions = settings.category_label_positions;
            apply_series_colors(
                &mut plot.renderer.series_paints,
                settings.series_colors.as_deref(),
                &mut diagnostics,
            );
            if let Some(color) = settings.category_axis_color {
                plot.domain_axis.label_paint = color;
            }
            if let Some(color) = settings.value_axis_color {
                plot.range_axis.label_paint = color;
            }
        }
        Plot::SpiderWeb(plot) => {
            apply_spider_range(plot, settings);
            if let Some(generator) = &settings.category_item_label_generator {
                plot.label_generator = Some(generator.clone());
            }
            apply_series_colors(
                &mut plot.series_paints,
                settings.series_colors.as_deref(),
                &mut diagnostics,
            );
            if let Some(color) = settings.category_axis_color {
                plot.axis_line_paint = color;
            }
        }
        Plot::Xy(plot) => {
            configure_xy_plot(plot, settings);
            apply_series_colors(
                &mut plot.renderer.series_paints,
                settings.series_colors.as_deref(),
                &mut diagnostics,
            );
        }
        Plot::Pie(plot) => {
            configure_pie_plot(plot, settings);
            apply_pie_section_label(plot, settings)?;
            if let Some(colors) = settings.section_colors.as_deref() {
                apply_section_colors(
                    plot,
                    colors,
                    &settings.section_colors_delimiter,
                    &mut diagnostics,
                );
            }
        }
        Plot::MultiplePie(plot) => {
            configure_pie_plot(&mut plot.pie, settings);
            apply_pie_section_label(&mut plot.pie, settings)?;
            if let Some(colors) = settings.section_colors.as_deref() {
                plot.supplier = section_supplier(colors, &mut diagnostics);
            }
        }
    }

    apply_colors(&mut chart, settings);
    Ok(Assembled { chart, diagnostics })
}

fn construct(chart_type: ChartType, s: &ChartSettings, dataset: Dataset) -> Result<Chart> {
    use ChartType as T;

    let found = dataset.kind();
    let mismatch = || Error::DatasetMismatch {
        chart_type,
        expected: chart_type.dataset_kind(),
        found,
    };

    let plot = match (chart_type, dataset) {
        (T::PieChart, Dataset::Pie(table)) => Plot::Pie(PiePlot::new(PieKind::Flat, table)),
        (T::PieChart3D, Dataset::Pie(table)) => Plot::Pie(PiePlot::new(PieKind::ThreeD, table)),
        (T::RingChart, Dataset::Pie(table)) => Plot::Pie(PiePlot::new(PieKind::Ring, table)),
        (T::MultiplePieChart | T::MultiplePieChart3D, Dataset::Category(table)) => {
            let kind = if chart_type == T::MultiplePieChart3D {
                PieKind::ThreeD
            } else {
                PieKind::Flat
            };
            let mut pie = PiePlot::new(kind, Default::default());
            pie.style.background = None;
            Plot::MultiplePie(MultiplePiePlot {
                style: PlotStyle::default(),
                dataset: table,
                order: s.order,
                pie,
                supplier: DrawingSupplier::default(),
            })
        }
        (T::SpiderWebChart, Dataset::Category(table)) => Plot::SpiderWeb(SpiderWebPlot {
            style: PlotStyle {
                background: Some(Color::WHITE),
                ..PlotStyle::default()
            },
            dataset: table,
            max_value: None,
            min_value: None,
            series_paints: SeriesPaints::default(),
            label_generator: None,
            axis_line_paint: Color::BLACK,
        }),
        (
            T::ScatterPlot | T::XYAreaChart | T::XYBarChart | T::XYLineChart,
            Dataset::Xy(table),
        ) => Plot::Xy(xy_plot(chart_type, s, XyData::Xy(table))),
        (T::BubbleChart, Dataset::Xyz(table)) => {
            Plot::Xy(xy_plot(chart_type, s, XyData::Xyz(table)))
        }
        (category, Dataset::Category(table)) if category.dataset_kind() == DatasetKind::Category => {
            Plot::Category(category_plot(category, s, table))
        }
        _ => return Err(mismatch()),
    };

    let subtitle = (chart_type == T::SpiderWebChart && !s.generate_legend)
        .then(|| TextTitle::new(" "));

    Ok(Chart {
        chart_type,
        width: s.image_width.max(1).unsigned_abs(),
        height: s.image_height.max(1).unsigned_abs(),
        title: s.title.clone().map(TextTitle::new),
        subtitle,
        legend: s.generate_legend,
        tooltips: s.generate_tooltips,
        urls: s.generate_urls,
        background: Some(Color::WHITE),
        plot,
    })
}

fn category_plot(chart_type: ChartType, s: &ChartSettings, table: CategoryTable) -> CategoryPlot {
    use CategoryRendererKind as K;
    use ChartType as T;

    let renderer = match chart_type {
        T::AreaChart => CategoryRenderer::new(K::Area),
        T::BarChart => CategoryRenderer::new(K::Bar),
        T::BarChart3D => CategoryRenderer::three_d(K::Bar),
        T::LineChart => CategoryRenderer::new(K::Line {
            lines: true,
            shapes: false,
        }),
        T::LineChart3D => CategoryRenderer::three_d(K::Line {
            lines: true,
            shapes: false,
        }),
        T::StackedAreaChart => CategoryRenderer::new(K::StackedArea),
        T::StackedBarChart => CategoryRenderer::new(K::StackedBar),
        T::StackedBarChart3D => CategoryRenderer::three_d(K::StackedBar),
        _ => CategoryRenderer::new(K::Waterfall),
    };

    let (domain_label, range_label) = if chart_type == T::StackedBarChart {
        (s.domain_axis_label.clone(), s.range_axis_label.clone())
    } else {
        (s.category_axis_label.clone(), s.value_axis_label.clone())
    };

    let data_range = category_value_range(&table, renderer.kind);
    CategoryPlot {
        style: PlotStyle::default(),
        orientation: s.orientation,
        dataset: table,
        domain_axis: CategoryAxis::new(domain_label),
        range_axis: NumberAxis::new(range_label, data_range),
        renderer,
        domain_gridlines_visible: false,
        range_gridlines_visible: true,
        range_zero_baseline_visible: false,
    }
}

/// The value range a category renderer needs room for.
pub(crate) fn category_value_range(table: &CategoryTable, kind: CategoryRendererKind) -> Option<Range> {
    match kind {
        CategoryRendererKind::StackedBar | CategoryRendererKind::StackedArea => {
            let mut range: Option<Range> = None;
            for c in 0..table.category_count() {
                let (mut pos, mut neg) = (0.0, 0.0);
                for s in 0..table.series_count() {
                    match table.value_at(s, c) {
                        Some(v) if v > 0.0 => pos += v,
                        Some(v) => neg += v,
                        None => {}
                    }
                }
                range = Some(match range {
                    Some(r) => r.include(neg).include(pos),
                    None => Range::new(neg, pos),
                });
            }
            range
        }
        CategoryRendererKind::Waterfall => {
            let mut range: Option<Range> = None;
            let last = table.category_count().saturating_sub(1);
            for s in 0..table.series_count() {
                let mut total = 0.0;
                for c in 0..table.category_count() {
                    let Some(v) = table.value_at(s, c) else {
                        continue;
                    };
                    // The last column is the closing total, drawn from zero.
                    let end = if c == last { v } else { total + v };
                    total += v;
                    range = Some(range.unwrap_or(Range::new(0.0, 0.0)).include(end));
                }
            }
            range
        }
        _ => Range::from_extent(table.value_extent()),
    }
}

fn xy_plot(chart_type: ChartType, s: &ChartSettings, dataset: XyData) -> XyPlot {
    use ChartType as T;

    let renderer = XyRenderer::new(match chart_type {
        T::ScatterPlot => XyRendererKind::Shapes,
        T::XYAreaChart => XyRendererKind::Area,
        T::XYBarChart => XyRendererKind::Bar {
            use_y_interval: false,
            bar_width: s.bar_width,
        },
        T::BubbleChart => XyRendererKind::Bubble,
        _ => XyRendererKind::Line,
    });

    let x_range = xy_domain_range(&dataset, renderer.kind);
    let y_range = Range::from_extent(dataset.y_extent());
    let domain_label = s.domain_axis_label.clone();
    let domain_axis = if chart_type == T::XYBarChart {
        NumberAxis::date(domain_label, x_range)
    } else {
        let mut axis = NumberAxis::new(domain_label, x_range);
        axis.set_auto_range_includes_zero(false);
        axis
    };
    let mut range_axis = NumberAxis::new(s.range_axis_label.clone(), y_range);
    if matches!(chart_type, T::ScatterPlot | T::BubbleChart) {
        range_axis.set_auto_range_includes_zero(false);
    }

    XyPlot {
        style: PlotStyle::default(),
        orientation: s.orientation,
        dataset,
        domain_axis,
        range_axis,
        renderer,
        domain_gridlines_visible: true,
        range_gridlines_visible: true,
        domain_zero_baseline_visible: false,
        range_zero_baseline_visible: false,
    }
}

fn xy_domain_range(dataset: &XyData, kind: XyRendererKind) -> Option<Range> {
    let range = Range::from_extent(dataset.x_extent())?;
    Some(match kind {
        XyRendererKind::Bar { bar_width, .. } => {
            Range::new(range.lower - bar_width / 2.0, range.upper + bar_width / 2.0)
        }
        _ => range,
    })
}

fn set_renderer_category(plot: &mut CategoryPlot, s: &ChartSettings) {
    if s.only_shape {
        plot.renderer = CategoryRenderer::new(CategoryRendererKind::Line {
            lines: false,
            shapes: true,
        });
        plot.domain_gridlines_visible = true;
        plot.range_gridlines_visible = true;
    }
}

fn configure_category_plot(plot: &mut CategoryPlot, s: &ChartSettings) {
    set_renderer_category(plot, s);

    apply_plot_style(&mut plot.style, s);
    plot.domain_gridlines_visible = s.domain_gridlines_visible;
    plot.range_gridlines_visible = s.range_gridlines_visible;
    plot.range_zero_baseline_visible = s.range_zero_baseline_visible;

    plot.range_axis.set_auto_range_includes_zero(s.range_auto_range_includes_zero);
    if s.range_integer_tick_units {
        plot.range_axis.integer_ticks = true;
    }
}

fn apply_category_range(plot: &mut CategoryPlot, s: &ChartSettings) {
    if let Some(upper) = s.range_upper_bound {
        plot.range_axis.set_upper_bound(upper);
    }
    if let Some(lower) = s.range_lower_bound {
        plot.range_axis.set_lower_bound(lower);
    }
}

/// The upper bound becomes the web's maximum value and the lower bound its minimum; each is
/// applied on its own.
fn apply_spider_range(plot: &mut SpiderWebPlot, s: &ChartSettings) {
    if let Some(upper) = s.range_upper_bound {
        plot.max_value = Some(upper);
    }
    if let Some(lower) = s.range_lower_bound {
        plot.min_value = Some(lower);
    }
}

fn set_renderer_xy(plot: &mut XyPlot, s: &ChartSettings) {
    if s.dot_width != 1 || s.dot_height != 1 {
        plot.renderer = XyRenderer::new(XyRendererKind::Dot {
            width: s.dot_width,
            height: s.dot_height,
        });
        tracing::debug!(
            width = s.dot_width,
            height = s.dot_height,
            "using dot renderer"
        );
    } else if let XyRendererKind::Bar { use_y_interval, .. } = &mut plot.renderer.kind {
        if s.use_y_interval {
            *use_y_interval = true;
        }
    }

    if let Some(width) = s.line_width {
        plot.renderer.series_stroke_width = Some(width);
    }
}

fn configure_xy_plot(plot: &mut XyPlot, s: &ChartSettings) {
    set_renderer_xy(plot, s);

    apply_plot_style(&mut plot.style, s);
    plot.domain_gridlines_visible = s.domain_gridlines_visible;
    plot.range_gridlines_visible = s.range_gridlines_visible;
    plot.domain_zero_baseline_visible = s.domain_zero_baseline_visible;
    plot.range_zero_baseline_visible = s.range_zero_baseline_visible;

    let x_range = xy_domain_range(&plot.dataset, plot.renderer.kind);
    let y_range = Range::from_extent(plot.dataset.y_extent());

    if s.use_domain_symbol_axis {
        let mut axis =
            NumberAxis::symbol(s.domain_axis_label.clone(), plot.dataset.series_keys(), x_range);
        axis.gridbands_visible = s.domain_gridbands_visible;
        plot.domain_axis = axis;
    }
    if s.use_range_symbol_axis {
        let mut axis =
            NumberAxis::symbol(s.range_axis_label.clone(), plot.dataset.series_keys(), y_range);
        axis.gridbands_visible = s.range_gridbands_visible;
        plot.range_axis = axis;
    }
    if s.use_domain_number_axis {
        plot.domain_axis = NumberAxis::new(s.domain_axis_label.clone(), x_range);
    }

    if !plot.domain_axis.is_date_axis() {
        apply_axis_settings(
            &mut plot.domain_axis,
            AxisSettings {
                lower_bound: s.domain_lower_bound,
                upper_bound: s.domain_upper_bound,
                lower_margin: s.domain_lower_margin,
                upper_margin: s.domain_upper_margin,
                integer_ticks: s.domain_integer_tick_units,
                includes_zero: s.domain_auto_range_includes_zero,
            },
        );
    }
    apply_axis_settings(
        &mut plot.range_axis,
        AxisSettings {
            lower_bound: s.range_lower_bound,
            upper_bound: s.range_upper_bound,
            lower_margin: s.range_lower_margin,
            upper_margin: s.range_upper_margin,
            integer_ticks: s.range_integer_tick_units,
            includes_zero: s.range_auto_range_includes_zero,
        },
    );
}

struct AxisSettings {
    lower_bound: Option<f64>,
    upper_bound: Option<f64>,
    lower_margin: Option<f64>,
    upper_margin: Option<f64>,
    integer_ticks: bool,
    includes_zero: bool,
}

fn apply_axis_settings(axis: &mut NumberAxis, a: AxisSettings) {
    if let Some(v) = a.upper_bound {
        axis.set_upper_bound(v);
    }
    if let Some(v) = a.lower_bound {
        axis.set_lower_bound(v);
    }
    if let Some(v) = a.lower_margin {
        axis.set_lower_margin(v);
    }
    if let Some(v) = a.upper_margin {
        axis.set_upper_margin(v);
    }
    if a.integer_ticks {
        axis.integer_ticks = true;
    }
    axis.set_auto_range_includes_zero(a.includes_zero);
}

fn configure_pie_plot(plot: &mut PiePlot, s: &ChartSettings) {
    if let Some(alpha) = s.foreground_alpha {
        plot.style.foreground_alpha = alpha;
    }
    plot.section_outlines_visible = s.pie_section_outlines_visible;
    plot.style.outline_visible = s.outline_visible;
    plot.style.outline_paint = s.outline_color;
    plot.shadow_paint = s.pie_shadow_color;
}

fn apply_plot_style(style: &mut PlotStyle, s: &ChartSettings) {
    if let Some(alpha) = s.foreground_alpha {
        style.foreground_alpha = alpha;
    }
    style.outline_visible = s.outline_visible;
    style.outline_paint = s.outline_color;
}

fn apply_pie_section_label(plot: &mut PiePlot, s: &ChartSettings) -> Result<()> {
    if let Some(pattern) = s.pie_section_label.as_deref() {
        plot.label_generator = PieSectionLabelGenerator::from_patterns(
            pattern,
            &s.pie_section_number_format,
            &s.pie_section_percent_format,
        )?;
    }
    Ok(())
}

/// Assigns comma-separated colours to series 0, 1, 2, ... An unresolvable token is skipped but
/// still consumes its index.
fn apply_series_colors(paints: &mut SeriesPaints, colors: Option<&str>, diag: &mut Diagnostics) {
    let Some(colors) = colors else {
        return;
    };
    for (index, token) in tokenize(colors, ",").enumerate() {
        match parse_color(token) {
            Some(color) => paints.set(index, color),
            None => diag.warn(
                "seriesColors",
                token,
                format!(
                    "Invalid colour name or hex value specified for SeriesColors: {token}, default colour will be used instead."
                ),
            ),
        }
    }
}

/// Reads alternating `name, colour` tokens. A trailing name without a colour is reported like
/// an invalid colour.
fn apply_section_colors(plot: &mut PiePlot, colors: &str, delimiters: &str, diag: &mut Diagnostics) {
    let mut tokens = tokenize(colors, delimiters);
    while let Some(section) = tokens.next() {
        let color_name = tokens.next().unwrap_or("");
        match parse_color(color_name) {
            Some(color) => {
                plot.section_paints.insert(section.to_string(), color);
            }
            None => diag.warn(
                "sectionColors",
                color_name,
                format!(
                    "Invalid colour name or hex value specified for SectionColors: {color_name}, default colour will be used instead. Section Name: {section}"
                ),
            ),
        }
    }
}

/// Multiple-pie section colours: valid tokens go in front of the default sequence, invalid ones
/// are dropped.
fn section_supplier(colors: &str, diag: &mut Diagnostics) -> DrawingSupplier {
    let valid: Vec<Color> = tokenize(colors, ",")
        .filter_map(|token| {
            let color = parse_color(token);
            if color.is_none() {
                diag.warn(
                    "sectionColors",
                    token,
                    format!(
                        "Invalid colour name or hex value specified for sectionColors: {token}, default colour will be used instead."
                    ),
                );
            }
            color
        })
        .collect();
    DrawingSupplier::with_prepended(valid)
}

fn apply_colors(chart: &mut Chart, s: &ChartSettings) {
    if let (Some(color), Some(title)) = (s.title_color, chart.title.as_mut()) {
        title.paint = color;
    }
    if let Some(color) = s.chart_background_color {
        chart.background = Some(color);
    }
    chart.plot.style_mut().background = s.plot_background_color;
    if let Plot::MultiplePie(plot) = &mut chart.plot {
        plot.pie.style.background = s.plot_background_color;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CategoryTable {
        let mut t = CategoryTable::default();
        t.add_value("S1", "A", Some(3.0));
        t.add_value("S1", "B", Some(-2.0));
        t.add_value("S2", "A", Some(4.0));
        t.add_value("S2", "B", Some(1.0));
        t
    }

    #[test]
    fn stacked_range_sums_each_sign_separately() {
        let r = category_value_range(&table(), CategoryRendererKind::StackedBar).unwrap();
        assert_eq!(r, Range::new(-2.0, 7.0));
    }

    #[test]
    fn waterfall_range_follows_running_totals_and_closing_column() {
        let r = category_value_range(&table(), CategoryRendererKind::Waterfall).unwrap();
        assert_eq!(r, Range::new(-2.0, 4.0));
    }

    #[test]
    fn series_colour_tokens_keep_their_index() {
        let mut paints = SeriesPaints::default();
        let mut diag = Diagnostics::new();
        apply_series_colors(&mut paints, Some("red, nope ,, #0000ff"), &mut diag);
        assert_eq!(paints.get(0), Some(Color::rgb(255, 0, 0)));
        assert_eq!(paints.get(1), None);
        assert_eq!(paints.get(2), Some(Color::rgb(0, 0, 255)));
        assert_eq!(diag.len(), 1);
        assert_eq!(diag.iter().next().map(|d| d.value.as_str()), Some("nope"));
    }

    #[test]
    fn section_colours_pair_names_with_colours() {
        let mut plot = PiePlot::new(PieKind::Flat, Default::default());
        let mut diag = Diagnostics::new();
        apply_section_colors(&mut plot, "A;red;B;bogus;C", ";", &mut diag);
        assert_eq!(plot.section_paints.get("A"), Some(&Color::rgb(255, 0, 0)));
        assert!(!plot.section_paints.contains_key("B"));
        assert_eq!(diag.len(), 2);
        let values: Vec<_> = diag.iter().map(|d| d.value.as_str()).collect();
        assert_eq!(values, vec!["bogus", ""]);
    }

    #[test]
    fn multiple_pie_supplier_compacts_invalid_tokens() {
        let mut diag = Diagnostics::new();
        let supplier = section_supplier("blue, nope, green", &mut diag);
        assert_eq!(supplier.paint(0), Color::rgb(0, 0, 255));
        assert_eq!(supplier.paint(1), Color::rgb(0, 128, 0));
        assert_eq!(diag.len(), 1);
    }
}
