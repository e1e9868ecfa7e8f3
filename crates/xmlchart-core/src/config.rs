//! The `<configuration>` document: a flat list of single-value elements mapped onto
//! [`ChartSettings`].
//!
//! ```xml
//! <configuration>
//!   <title>Sales</title>
//!   <width>500</width>
//!   <orientation>vertical</orientation>
//!   <seriesColors>red, #336699</seriesColors>
//! </configuration>
//! ```
//!
//! Unknown elements are ignored. A known element whose text is missing or cannot be coerced
//! fails the whole mapping. Typed values are trimmed before coercion; text values are kept
//! verbatim. Colour lists (`seriesColors`, `sectionColors`) are kept as text and resolved
//! leniently when the chart is assembled.

use crate::color::{Color, parse_color};
use crate::error::{Error, Result};
use crate::label::{LabelGeneratorRegistry, ResolvedLabelGenerator};
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlotOrientation {
    #[default]
    Horizontal,
    Vertical,
}

/// How a multiple-pie chart slices its category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableOrder {
    /// One pie per category; sections are the series.
    #[default]
    ByColumn,
    /// One pie per series; sections are the categories.
    ByRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryLabelPositions {
    #[default]
    Standard,
    Up45,
    Up90,
    Down45,
    Down90,
}

impl CategoryLabelPositions {
    /// Rotation of category tick labels, in degrees clockwise.
    pub fn angle_degrees(self) -> f64 {
        match self {
            CategoryLabelPositions::Standard => 0.0,
            CategoryLabelPositions::Up45 => -45.0,
            CategoryLabelPositions::Up90 => -90.0,
            CategoryLabelPositions::Down45 => 45.0,
            CategoryLabelPositions::Down90 => 90.0,
        }
    }
}

impl Serialize for ResolvedLabelGenerator {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key)
    }
}

/// Every chart setting with its default. Read-only once mapped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSettings {
    pub image_width: i32,
    pub image_height: i32,
    pub dot_width: i32,
    pub dot_height: i32,
    pub bar_width: f64,
    pub title: Option<String>,
    pub image_type: String,

    pub category_axis_label: Option<String>,
    pub domain_axis_label: Option<String>,
    pub range_axis_label: Option<String>,
    pub time_axis_label: Option<String>,
    pub value_axis_label: Option<String>,
    pub pie_section_label: Option<String>,
    pub pie_section_number_format: String,
    pub pie_section_percent_format: String,

    pub category_item_label_generator_class: Option<String>,
    pub category_item_label_generator_parameter: String,
    pub category_item_label_generator_number_format: String,
    /// Instantiated from the three settings above at the end of mapping.
    pub category_item_label_generator: Option<ResolvedLabelGenerator>,
    pub category_label_positions: CategoryLabelPositions,

    pub order: TableOrder,
    pub orientation: PlotOrientation,

    pub title_color: Option<Color>,
    pub chart_background_color: Option<Color>,
    pub plot_background_color: Option<Color>,
    pub category_axis_color: Option<Color>,
    pub time_axis_color: Option<Color>,
    pub value_axis_color: Option<Color>,
    pub outline_color: Option<Color>,
    pub pie_shadow_color: Option<Color>,

    pub series_colors: Option<String>,
    pub section_colors: Option<String>,
    pub section_colors_delimiter: String,

    pub range_lower_bound: Option<f64>,
    pub range_upper_bound: Option<f64>,
    pub range_lower_margin: Option<f64>,
    pub range_upper_margin: Option<f64>,
    pub domain_lower_bound: Option<f64>,
    pub domain_upper_bound: Option<f64>,
    pub domain_lower_margin: Option<f64>,
    pub domain_upper_margin: Option<f64>,

    pub foreground_alpha: Option<f32>,
    pub line_width: Option<f32>,

    pub generate_legend: bool,
    pub generate_tooltips: bool,
    pub generate_urls: bool,
    pub only_shape: bool,

    pub range_auto_range_includes_zero: bool,
    pub domain_auto_range_includes_zero: bool,
    pub range_zero_baseline_visible: bool,
    pub domain_zero_baseline_visible: bool,
    pub range_integer_tick_units: bool,
    pub domain_integer_tick_units: bool,
    pub range_gridlines_visible: bool,
    pub domain_gridlines_visible: bool,
    pub range_gridbands_visible: bool,
    pub domain_gridbands_visible: bool,

    pub outline_visible: bool,
    pub pie_section_outlines_visible: bool,

    pub use_y_interval: bool,
    pub use_domain_symbol_axis: bool,
    pub use_domain_number_axis: bool,
    pub use_range_symbol_axis: bool,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            image_width: 400,
            image_height: 300,
            dot_width: 1,
            dot_height: 1,
            bar_width: 0.9,
            title: None,
            image_type: "png".to_string(),
            category_axis_label: None,
            domain_axis_label: None,
            range_axis_label: None,
            time_axis_label: None,
            value_axis_label: None,
            pie_section_label: None,
            pie_section_number_format: "0".to_string(),
            pie_section_percent_format: "0.0%".to_string(),
            category_item_label_generator_class: None,
            category_item_label_generator_parameter: "{2}".to_string(),
            category_item_label_generator_number_format: "0".to_string(),
            category_item_label_generator: None,
            category_label_positions: CategoryLabelPositions::Standard,
            order: TableOrder::ByColumn,
            orientation: PlotOrientation::Horizontal,
            title_color: None,
            chart_background_color: None,
            plot_background_color: Some(Color::WHITE),
            category_axis_color: None,
            time_axis_color: None,
            value_axis_color: None,
            outline_color: Some(Color::GRAY),
            pie_shadow_color: Some(Color::rgba(151, 151, 151, 128)),
            series_colors: None,
            section_colors: None,
            section_colors_delimiter: ",".to_string(),
            range_lower_bound: None,
            range_upper_bound: None,
            range_lower_margin: None,
            range_upper_margin: None,
            domain_lower_bound: None,
            domain_upper_bound: None,
            domain_lower_margin: None,
            domain_upper_margin: None,
            foreground_alpha: None,
            line_width: None,
            generate_legend: false,
            generate_tooltips: false,
            generate_urls: false,
            only_shape: false,
            range_auto_range_includes_zero: true,
            domain_auto_range_includes_zero: true,
            range_zero_baseline_visible: true,
            domain_zero_baseline_visible: true,
            range_integer_tick_units: false,
            domain_integer_tick_units: false,
            range_gridlines_visible: false,
            domain_gridlines_visible: false,
            range_gridbands_visible: false,
            domain_gridbands_visible: false,
            outline_visible: true,
            pie_section_outlines_visible: true,
            use_y_interval: false,
            use_domain_symbol_axis: false,
            use_domain_number_axis: false,
            use_range_symbol_axis: false,
        }
    }
}

impl ChartSettings {
    /// Element names recognised inside `<configuration>`.
    pub const FIELDS: &'static [&'static str] = &[
        "title",
        "categoryAxisLabel",
        "categoryAxisColor",
        "valueAxisLabel",
        "valueAxisColor",
        "timeAxisLabel",
        "timeAxisColor",
        "domainAxisLabel",
        "rangeAxisLabel",
        "pieSectionLabel",
        "pieSectionNumberFormat",
        "pieSectionPercentFormat",
        "orientation",
        "tableOrder",
        "legend",
        "tooltips",
        "urls",
        "onlyShape",
        "rangeAutoRangeIncludesZero",
        "domainAutoRangeIncludesZero",
        "rangeZeroBaselineVisible",
        "domainZeroBaselineVisible",
        "rangeIntegerTickUnits",
        "domainIntegerTickUnits",
        "rangeGridlinesVisible",
        "domainGridlinesVisible",
        "rangeGridbandsVisible",
        "domainGridbandsVisible",
        "outlineVisible",
        "pieSectionOutlinesVisible",
        "useYInterval",
        "useDomainSymbolAxis",
        "useDomainNumberAxis",
        "useRangeSymbolAxis",
        "width",
        "height",
        "dotWidth",
        "dotHeight",
        "barWidth",
        "titleColor",
        "chartBackgroundColor",
        "plotBackgroundColor",
        "outlineColor",
        "pieShadowColor",
        "seriesColors",
        "sectionColors",
        "sectionColorsDelimiter",
        "rangeLowerBound",
        "rangeUpperBound",
        "rangeLowerMargin",
        "rangeUpperMargin",
        "domainLowerBound",
        "domainUpperBound",
        "domainLowerMargin",
        "domainUpperMargin",
        "foregroundAlpha",
        "lineWidth",
        "categoryItemLabelGeneratorClass",
        "categoryItemLabelGeneratorParameter",
        "categoryItemLabelGeneratorNumberFormat",
        "categoryLabelPositions",
        "imageType",
    ];

    /// Maps a `<configuration>` element using the built-in label generators.
    pub fn from_node(node: roxmltree::Node<'_, '_>) -> Result<Self> {
        Self::from_node_with(node, &LabelGeneratorRegistry::with_builtins())
    }

    /// Maps a `<configuration>` element. Any other element yields the defaults.
    pub fn from_node_with(
        node: roxmltree::Node<'_, '_>,
        registry: &LabelGeneratorRegistry,
    ) -> Result<Self> {
        let mut settings = Self::default();
        if !(node.is_element() && node.tag_name().name() == "configuration") {
            tracing::debug!(
                root = node.tag_name().name(),
                "not a <configuration> element, using defaults"
            );
            return Ok(settings);
        }

        for child in node.children().filter(|n| n.is_element()) {
            settings.apply(child.tag_name().name(), child.text())?;
        }

        if let Some(key) = settings.category_item_label_generator_class.as_deref() {
            let resolved = registry.resolve(
                key,
                &settings.category_item_label_generator_parameter,
                &settings.category_item_label_generator_number_format,
            )?;
            settings.category_item_label_generator = Some(resolved);
        }

        Ok(settings)
    }

    pub fn parse_str(xml: &str) -> Result<Self> {
        Self::parse_str_with(xml, &LabelGeneratorRegistry::with_builtins())
    }

    pub fn parse_str_with(xml: &str, registry: &LabelGeneratorRegistry) -> Result<Self> {
        let doc = roxmltree::Document::parse(xml)?;
        Self::from_node_with(doc.root_element(), registry)
    }

    fn apply(&mut self, field: &str, value: Option<&str>) -> Result<()> {
        if !Self::FIELDS.contains(&field) {
            return Ok(());
        }
        let Some(value) = value else {
            return Err(Error::MissingValue {
                field: field.to_string(),
            });
        };
        let text = || Some(value.to_string());

        match field {
            "title" => self.title = text(),
            "categoryAxisLabel" => self.category_axis_label = text(),
            "valueAxisLabel" => self.value_axis_label = text(),
            "timeAxisLabel" => self.time_axis_label = text(),
            "domainAxisLabel" => self.domain_axis_label = text(),
            "rangeAxisLabel" => self.range_axis_label = text(),
            "pieSectionLabel" => self.pie_section_label = text(),
            "pieSectionNumberFormat" => self.pie_section_number_format = value.to_string(),
            "pieSectionPercentFormat" => self.pie_section_percent_format = value.to_string(),
            "seriesColors" => self.series_colors = text(),
            "sectionColors" => self.section_colors = text(),
            "sectionColorsDelimiter" => self.section_colors_delimiter = value.to_string(),
            "categoryItemLabelGeneratorClass" => self.category_item_label_generator_class = text(),
            "categoryItemLabelGeneratorParameter" => {
                self.category_item_label_generator_parameter = value.to_string()
            }
            "categoryItemLabelGeneratorNumberFormat" => {
                self.category_item_label_generator_number_format = value.to_string()
            }
            "imageType" => self.image_type = value.to_string(),

            "categoryAxisColor" => self.category_axis_color = Some(color(field, value)?),
            "valueAxisColor" => self.value_axis_color = Some(color(field, value)?),
            "timeAxisColor" => self.time_axis_color = Some(color(field, value)?),
            "titleColor" => self.title_color = Some(color(field, value)?),
            "chartBackgroundColor" => self.chart_background_color = Some(color(field, value)?),
            "plotBackgroundColor" => self.plot_background_color = Some(color(field, value)?),
            "outlineColor" => self.outline_color = Some(color(field, value)?),
            "pieShadowColor" => self.pie_shadow_color = Some(color(field, value)?),

            "orientation" => {
                self.orientation = choice(
                    field,
                    value,
                    &[
                        ("HORIZONTAL", PlotOrientation::Horizontal),
                        ("VERTICAL", PlotOrientation::Vertical),
                    ],
                )?
            }
            "tableOrder" => {
                self.order = choice(
                    field,
                    value,
                    &[("COLUMN", TableOrder::ByColumn), ("ROW", TableOrder::ByRow)],
                )?
            }
            "categoryLabelPositions" => {
                self.category_label_positions = choice(
                    field,
                    value,
                    &[
                        ("UP_45", CategoryLabelPositions::Up45),
                        ("UP_90", CategoryLabelPositions::Up90),
                        ("DOWN_45", CategoryLabelPositions::Down45),
                        ("DOWN_90", CategoryLabelPositions::Down90),
                    ],
                )?
            }

            "legend" => self.generate_legend = boolean(field, value)?,
            "tooltips" => self.generate_tooltips = boolean(field, value)?,
            "urls" => self.generate_urls = boolean(field, value)?,
            "onlyShape" => self.only_shape = boolean(field, value)?,
            "rangeAutoRangeIncludesZero" => {
                self.range_auto_range_includes_zero = boolean(field, value)?
            }
            "domainAutoRangeIncludesZero" => {
                self.domain_auto_range_includes_zero = boolean(field, value)?
            }
            "rangeZeroBaselineVisible" => self.range_zero_baseline_visible = boolean(field, value)?,
            "domainZeroBaselineVisible" => {
                self.domain_zero_baseline_visible = boolean(field, value)?
            }
            "rangeIntegerTickUnits" => self.range_integer_tick_units = boolean(field, value)?,
            "domainIntegerTickUnits" => self.domain_integer_tick_units = boolean(field, value)?,
            "rangeGridlinesVisible" => self.range_gridlines_visible = boolean(field, value)?,
            "domainGridlinesVisible" => self.domain_gridlines_visible = boolean(field, value)?,
            "rangeGridbandsVisible" => self.range_gridbands_visible = boolean(field, value)?,
            "domainGridbandsVisible" => self.domain_gridbands_visible = boolean(field, value)?,
            "outlineVisible" => self.outline_visible = boolean(field, value)?,
            "pieSectionOutlinesVisible" => {
                self.pie_section_outlines_visible = boolean(field, value)?
            }
            "useYInterval" => self.use_y_interval = boolean(field, value)?,
            "useDomainSymbolAxis" => self.use_domain_symbol_axis = boolean(field, value)?,
            "useDomainNumberAxis" => self.use_domain_number_axis = boolean(field, value)?,
            "useRangeSymbolAxis" => self.use_range_symbol_axis = boolean(field, value)?,

            "width" => self.image_width = number(field, value)?,
            "height" => self.image_height = number(field, value)?,
            "dotWidth" => self.dot_width = number(field, value)?,
            "dotHeight" => self.dot_height = number(field, value)?,
            "barWidth" => self.bar_width = number(field, value)?,

            "rangeLowerBound" => self.range_lower_bound = Some(number(field, value)?),
            "rangeUpperBound" => self.range_upper_bound = Some(number(field, value)?),
            "rangeLowerMargin" => self.range_lower_margin = Some(number(field, value)?),
            "rangeUpperMargin" => self.range_upper_margin = Some(number(field, value)?),
            "domainLowerBound" => self.domain_lower_bound = Some(number(field, value)?),
            "domainUpperBound" => self.domain_upper_bound = Some(number(field, value)?),
            "domainLowerMargin" => self.domain_lower_margin = Some(number(field, value)?),
            "domainUpperMargin" => self.domain_upper_margin = Some(number(field, value)?),
            "foregroundAlpha" => self.foreground_alpha = Some(number(field, value)?),
            "lineWidth" => self.line_width = Some(number(field, value)?),
            _ => {}
        }
        Ok(())
    }
}

fn boolean(field: &str, value: &str) -> Result<bool> {
    let v = value.trim();
    if v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("yes") {
        Ok(true)
    } else if v.eq_ignore_ascii_case("false") || v.eq_ignore_ascii_case("no") {
        Ok(false)
    } else {
        Err(Error::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

fn number<T: std::str::FromStr>(field: &str, value: &str) -> Result<T> {
    value.trim().parse::<T>().map_err(|_| Error::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn color(field: &str, value: &str) -> Result<Color> {
    parse_color(value).ok_or_else(|| Error::InvalidColor {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn choice<T: Copy>(field: &str, value: &str, options: &[(&str, T)]) -> Result<T> {
    let v = value.trim();
    options
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(v))
        .map(|(_, t)| *t)
        .ok_or_else(|| Error::InvalidChoice {
            field: field.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_accept_yes_and_no_in_any_case() {
        assert!(boolean("legend", "YES").unwrap());
        assert!(boolean("legend", "True").unwrap());
        assert!(!boolean("legend", "no").unwrap());
        assert!(!boolean("legend", " false ").unwrap());
        assert!(boolean("legend", "1").is_err());
    }

    #[test]
    fn choices_are_case_insensitive() {
        let s = ChartSettings::parse_str(
            "<configuration><orientation>vertical</orientation><tableOrder>Row</tableOrder>\
             <categoryLabelPositions>up_45</categoryLabelPositions></configuration>",
        )
        .unwrap();
        assert_eq!(s.orientation, PlotOrientation::Vertical);
        assert_eq!(s.order, TableOrder::ByRow);
        assert_eq!(s.category_label_positions, CategoryLabelPositions::Up45);
    }

    #[test]
    fn non_configuration_root_yields_defaults() {
        let s = ChartSettings::parse_str("<settings><width>10</width></settings>").unwrap();
        assert_eq!(s.image_width, 400);
    }

    #[test]
    fn label_angles() {
        assert_eq!(CategoryLabelPositions::Up90.angle_degrees(), -90.0);
        assert_eq!(CategoryLabelPositions::Down45.angle_degrees(), 45.0);
    }
}
