use xmlchart_core::color::parse_color;
use xmlchart_core::{ChartSettings, Error as CoreError};
use xmlchart_render::model::{CategoryRendererKind, Plot};
use xmlchart_render::{Error, LayoutOptions, assemble, chart_to_svg};

const CATEGORY: &str = r#"<CategoryDataset>
    <Series name="North">
        <Item><Key>Q1</Key><Value>10</Value></Item>
        <Item><Key>Q2</Key><Value>14</Value></Item>
    </Series>
    <Series name="South">
        <Item><Key>Q1</Key><Value>7</Value></Item>
        <Item><Key>Q2</Key><Value>9</Value></Item>
    </Series>
    <Series name="West">
        <Item><Key>Q1</Key><Value>3</Value></Item>
        <Item><Key>Q2</Key><Value>5</Value></Item>
    </Series>
</CategoryDataset>"#;

const PIE: &str = r#"<PieDataset>
    <Item><Key>A</Key><Value>10</Value></Item>
    <Item><Key>B</Key><Value>20</Value></Item>
</PieDataset>"#;

const XY: &str = r#"<XYDataset>
    <Series name="Temp">
        <Item><X>1</X><Y>12</Y></Item>
        <Item><X>2</X><Y>15</Y></Item>
        <Item><X>3</X><Y>11</Y></Item>
    </Series>
</XYDataset>"#;

fn settings(xml: &str) -> ChartSettings {
    ChartSettings::parse_str(xml).unwrap()
}

#[test]
fn pie_chart_reads_a_pie_dataset() {
    let assembled = assemble("PieChart", &ChartSettings::default(), PIE.as_bytes()).unwrap();
    let Plot::Pie(plot) = &assembled.chart.plot else {
        panic!("expected a pie plot");
    };
    assert_eq!(plot.dataset.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(plot.dataset.value("A"), Some(10.0));
    assert_eq!(plot.dataset.total(), 30.0);
    assert!(assembled.diagnostics.is_empty());
}

#[test]
fn invalid_series_colour_keeps_its_slot() {
    let s = settings("<configuration><seriesColors>red,nope,#0000ff</seriesColors></configuration>");
    let assembled = assemble("BarChart", &s, CATEGORY.as_bytes()).unwrap();
    let Plot::Category(plot) = &assembled.chart.plot else {
        panic!("expected a category plot");
    };
    let paints = &plot.renderer.series_paints;
    assert_eq!(paints.get(0), parse_color("red"));
    assert_eq!(paints.get(1), None);
    assert_eq!(paints.get(2), parse_color("#0000ff"));
    let diagnostics: Vec<_> = assembled.diagnostics.iter().collect();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].field, "seriesColors");
    assert_eq!(diagnostics[0].value, "nope");
}

#[test]
fn only_shape_swaps_in_a_shape_renderer() {
    let s = settings("<configuration><onlyShape>true</onlyShape></configuration>");
    let assembled = assemble("LineChart", &s, CATEGORY.as_bytes()).unwrap();
    let Plot::Category(plot) = &assembled.chart.plot else {
        panic!("expected a category plot");
    };
    assert_eq!(
        plot.renderer.kind,
        CategoryRendererKind::Line {
            lines: false,
            shapes: true
        }
    );
    // Gridline settings are applied after the renderer swap.
    assert!(!plot.domain_gridlines_visible);
}

#[test]
fn spider_bounds_set_the_radial_scale() {
    let s = settings(
        "<configuration><rangeUpperBound>20</rangeUpperBound><rangeLowerBound>2</rangeLowerBound></configuration>",
    );
    let assembled = assemble("SpiderWebChart", &s, CATEGORY.as_bytes()).unwrap();
    let Plot::SpiderWeb(plot) = &assembled.chart.plot else {
        panic!("expected a spider web plot");
    };
    assert_eq!(plot.max_value, Some(20.0));
    assert_eq!(plot.min_value, Some(2.0));
    // No legend: a blank subtitle keeps the web clear of the bottom edge.
    assert_eq!(assembled.chart.subtitle.as_ref().map(|t| t.text.as_str()), Some(" "));
}

#[test]
fn multiple_pie_section_colours_prepend_valid_tokens() {
    let s = settings("<configuration><sectionColors>blue,nope,green</sectionColors></configuration>");
    let assembled = assemble("MultiplePieChart", &s, CATEGORY.as_bytes()).unwrap();
    let Plot::MultiplePie(plot) = &assembled.chart.plot else {
        panic!("expected a multiple pie plot");
    };
    assert_eq!(Some(plot.supplier.paint(0)), parse_color("blue"));
    assert_eq!(Some(plot.supplier.paint(1)), parse_color("green"));
    assert_eq!(assembled.diagnostics.len(), 1);
    assert_eq!(plot.pies().len(), 2);
}

#[test]
fn unknown_chart_type_lists_supported_types() {
    let err = assemble("Histogram", &ChartSettings::default(), CATEGORY.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Core(CoreError::UnsupportedChartType { .. })));
    let msg = err.to_string();
    assert!(msg.contains("Histogram"), "{msg}");
    assert!(msg.contains("BarChart") && msg.contains("BubbleChart"), "{msg}");
}

#[test]
fn unknown_chart_type_reads_a_category_dataset_first() {
    let err = assemble("Histogram", &ChartSettings::default(), PIE.as_bytes()).unwrap_err();
    assert!(matches!(err, Error::Core(CoreError::Dataset(_))), "{err}");
}

#[test]
fn xy_range_bounds_freeze_the_axis() {
    let s = settings(
        "<configuration><rangeLowerBound>0</rangeLowerBound><rangeUpperBound>40</rangeUpperBound></configuration>",
    );
    let assembled = assemble("XYLineChart", &s, XY.as_bytes()).unwrap();
    let Plot::Xy(plot) = &assembled.chart.plot else {
        panic!("expected an xy plot");
    };
    let r = plot.range_axis.range();
    assert_eq!((r.lower, r.upper), (0.0, 40.0));
    assert!(!plot.range_axis.is_auto_range());
}

#[test]
fn xy_bar_chart_ignores_domain_bounds_on_its_time_axis() {
    let s = settings("<configuration><domainLowerBound>-100</domainLowerBound></configuration>");
    let assembled = assemble("XYBarChart", &s, XY.as_bytes()).unwrap();
    let Plot::Xy(plot) = &assembled.chart.plot else {
        panic!("expected an xy plot");
    };
    assert!(plot.domain_axis.is_date_axis());
    assert!(plot.domain_axis.is_auto_range());
    assert!(plot.domain_axis.range().lower > -100.0);
}

#[test]
fn svg_carries_title_and_tooltips() {
    let s = settings(
        "<configuration><title>Sales &amp; Costs</title><tooltips>true</tooltips><legend>true</legend></configuration>",
    );
    let assembled = assemble("BarChart", &s, CATEGORY.as_bytes()).unwrap();
    let svg = chart_to_svg(&assembled.chart, &LayoutOptions::default());
    assert!(svg.starts_with("<svg "));
    assert!(svg.contains(r#"width="400" height="300""#));
    assert!(svg.contains(">Sales &amp; Costs</text>"));
    assert!(svg.contains("<title>(North, Q1) = 10</title>"));
    assert!(svg.contains(">South</text>"));
}

#[test]
fn mismatched_dataset_is_an_error() {
    let err = xmlchart_render::factory::build_chart(
        xmlchart_core::ChartType::PieChart,
        &ChartSettings::default(),
        xmlchart_core::Dataset::Xy(Default::default()),
    )
    .unwrap_err();
    assert!(matches!(err, Error::DatasetMismatch { .. }));
    assert!(err.to_string().contains("PieDataset"));
}

#[test]
fn svg_parses_as_xml_with_one_link_per_bar() {
    let s = settings("<configuration><urls>true</urls></configuration>");
    let assembled = assemble("BarChart", &s, CATEGORY.as_bytes()).unwrap();
    let svg = chart_to_svg(&assembled.chart, &LayoutOptions::default());
    let doc = roxmltree::Document::parse(&svg).unwrap();
    let links = doc
        .descendants()
        .filter(|n| n.has_tag_name(("http://www.w3.org/2000/svg", "a")))
        .count();
    assert_eq!(links, 6);
}

#[test]
fn chart_model_serialises_to_json() {
    let s = settings("<configuration><title>Temps</title></configuration>");
    let assembled = assemble("XYLineChart", &s, XY.as_bytes()).unwrap();
    let value = serde_json::to_value(&assembled.chart).unwrap();
    assert!(value.is_object());
    assert!(value.to_string().contains("Temps"));
}
