use xmlchart_core::{
    CategoryLabelPositions, ChartSettings, Color, Error, LabelGeneratorRegistry, PlotOrientation,
    TableOrder,
};

#[test]
fn defaults_match_documented_values() {
    let s = ChartSettings::default();
    assert_eq!((s.image_width, s.image_height), (400, 300));
    assert_eq!((s.dot_width, s.dot_height), (1, 1));
    assert_eq!(s.bar_width, 0.9);
    assert_eq!(s.image_type, "png");
    assert_eq!(s.pie_section_number_format, "0");
    assert_eq!(s.pie_section_percent_format, "0.0%");
    assert_eq!(s.category_item_label_generator_parameter, "{2}");
    assert_eq!(s.category_item_label_generator_number_format, "0");
    assert_eq!(s.orientation, PlotOrientation::Horizontal);
    assert_eq!(s.order, TableOrder::ByColumn);
    assert_eq!(s.category_label_positions, CategoryLabelPositions::Standard);
    assert_eq!(s.plot_background_color, Some(Color::WHITE));
    assert_eq!(s.outline_color, Some(Color::GRAY));
    assert_eq!(s.pie_shadow_color, Some(Color::rgba(151, 151, 151, 128)));
    assert_eq!(s.section_colors_delimiter, ",");
    assert!(s.range_auto_range_includes_zero && s.domain_auto_range_includes_zero);
    assert!(s.range_zero_baseline_visible && s.domain_zero_baseline_visible);
    assert!(s.outline_visible && s.pie_section_outlines_visible);
    assert!(!s.generate_legend && !s.only_shape && !s.use_y_interval);
    assert!(s.title.is_none() && s.range_upper_bound.is_none() && s.foreground_alpha.is_none());
}

#[test]
fn maps_a_typical_configuration() {
    let xml = r#"<configuration>
        <title>Sales per quarter</title>
        <width> 640 </width>
        <height>480</height>
        <legend>yes</legend>
        <orientation>Vertical</orientation>
        <rangeUpperBound>100.5</rangeUpperBound>
        <foregroundAlpha>0.75</foregroundAlpha>
        <titleColor>navy</titleColor>
        <seriesColors>red, notacolour, #0000ff</seriesColors>
        <sectionColorsDelimiter>;</sectionColorsDelimiter>
        <imageType>SVG</imageType>
        <somethingElse>ignored</somethingElse>
    </configuration>"#;
    let s = ChartSettings::parse_str(xml).unwrap();
    assert_eq!(s.title.as_deref(), Some("Sales per quarter"));
    assert_eq!((s.image_width, s.image_height), (640, 480));
    assert!(s.generate_legend);
    assert_eq!(s.orientation, PlotOrientation::Vertical);
    assert_eq!(s.range_upper_bound, Some(100.5));
    assert_eq!(s.foreground_alpha, Some(0.75));
    assert_eq!(s.title_color, Some(Color::rgb(0, 0, 128)));
    assert_eq!(s.series_colors.as_deref(), Some("red, notacolour, #0000ff"));
    assert_eq!(s.section_colors_delimiter, ";");
    assert_eq!(s.image_type, "SVG");
}

#[test]
fn free_text_is_kept_verbatim() {
    let s = ChartSettings::parse_str("<configuration><title>  padded  </title></configuration>")
        .unwrap();
    assert_eq!(s.title.as_deref(), Some("  padded  "));
}

#[test]
fn invalid_number_names_the_field() {
    let err = ChartSettings::parse_str("<configuration><width>abc</width></configuration>")
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { ref field, .. } if field == "width"));
    assert!(err.to_string().contains("\"width\""), "{err}");
}

#[test]
fn invalid_boolean_and_choice_fail_fast() {
    let err = ChartSettings::parse_str("<configuration><legend>maybe</legend></configuration>")
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue { ref field, .. } if field == "legend"));

    let err = ChartSettings::parse_str(
        "<configuration><categoryLabelPositions>STANDARD</categoryLabelPositions></configuration>",
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidChoice { ref field, .. } if field == "categoryLabelPositions"));
}

#[test]
fn strict_colour_fields_reject_unknown_names() {
    let err = ChartSettings::parse_str(
        "<configuration><plotBackgroundColor>blurple</plotBackgroundColor></configuration>",
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidColor { ref field, .. } if field == "plotBackgroundColor"));
}

#[test]
fn recognised_element_without_text_is_missing() {
    for xml in [
        "<configuration><title/></configuration>",
        "<configuration><width><b>1</b></width></configuration>",
    ] {
        let err = ChartSettings::parse_str(xml).unwrap_err();
        assert!(matches!(err, Error::MissingValue { .. }), "{xml}: {err}");
    }
    // Unknown empty elements are still ignored.
    assert!(ChartSettings::parse_str("<configuration><nothing/></configuration>").is_ok());
}

#[test]
fn every_recognised_field_accepts_a_valid_value() {
    for field in ChartSettings::FIELDS {
        let value = match *field {
            "orientation" => "vertical",
            "tableOrder" => "row",
            "categoryLabelPositions" => "down_90",
            "categoryItemLabelGeneratorClass" => "StandardCategoryItemLabelGenerator",
            f if f.ends_with("Color") => "teal",
            f if f.ends_with("Visible")
                || f.ends_with("IncludesZero")
                || f.ends_with("TickUnits")
                || f.starts_with("use")
                || matches!(f, "legend" | "tooltips" | "urls" | "onlyShape") =>
            {
                "true"
            }
            "width" | "height" | "dotWidth" | "dotHeight" => "7",
            f if f.ends_with("Bound")
                || f.ends_with("Margin")
                || matches!(f, "barWidth" | "foregroundAlpha" | "lineWidth") =>
            {
                "0.5"
            }
            _ => "text",
        };
        let xml = format!("<configuration><{field}>{value}</{field}></configuration>");
        assert!(ChartSettings::parse_str(&xml).is_ok(), "{field} rejected {value}");
    }
}

#[test]
fn label_generator_is_resolved_after_all_fields() {
    let xml = r#"<configuration>
        <categoryItemLabelGeneratorClass>org.jfree.chart.labels.StandardCategoryItemLabelGenerator</categoryItemLabelGeneratorClass>
        <categoryItemLabelGeneratorNumberFormat>0.00</categoryItemLabelGeneratorNumberFormat>
        <categoryItemLabelGeneratorParameter>{1}: {2}</categoryItemLabelGeneratorParameter>
    </configuration>"#;
    let s = ChartSettings::parse_str(xml).unwrap();
    let resolved = s.category_item_label_generator.as_ref().unwrap();
    assert_eq!(resolved.key, "org.jfree.chart.labels.StandardCategoryItemLabelGenerator");

    let mut table = xmlchart_core::CategoryTable::default();
    table.add_value("S", "Q1", Some(1.5));
    assert_eq!(
        resolved.generator.generate_label(&table, 0, 0).as_deref(),
        Some("Q1: 1.50")
    );
}

#[test]
fn unknown_label_generator_is_reported() {
    let xml = "<configuration><categoryItemLabelGeneratorClass>com.acme.Gen</categoryItemLabelGeneratorClass></configuration>";
    let err = ChartSettings::parse_str(xml).unwrap_err();
    assert!(matches!(err, Error::UnknownLabelGenerator { ref key, .. } if key == "com.acme.Gen"));

    let empty = LabelGeneratorRegistry::new();
    let err = ChartSettings::parse_str_with(xml, &empty).unwrap_err();
    assert!(err.to_string().contains("com.acme.Gen"));
}

#[test]
fn malformed_configuration_is_an_xml_error() {
    let err = ChartSettings::parse_str("<configuration><title>x</configuration>").unwrap_err();
    assert!(matches!(err, Error::Xml(_)));
}
