#![forbid(unsafe_code)]

//! Chart assembly and headless SVG rendering.
//!
//! [`assemble`] reads the dataset for a chart-type tag, builds the chart and applies the
//! settings; [`layout::layout_chart`] positions every element; [`svg::render_svg`] writes the
//! result as an SVG document.

pub mod axis;
pub mod diagnostics;
pub mod factory;
pub mod layout;
pub mod model;
pub mod palette;
pub mod svg;
pub mod text;

use crate::factory::Assembled;
use crate::model::Chart;
use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use std::io::BufRead;
use std::sync::Arc;
use xmlchart_core::{ChartSettings, ChartType, DatasetKind};

pub use crate::diagnostics::{Diagnostic, Diagnostics};
pub use crate::layout::{ChartLayout, layout_chart};
pub use crate::svg::render_svg;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] xmlchart_core::Error),

    #[error("{chart_type} needs a {expected} but the dataset is a {found}")]
    DatasetMismatch {
        chart_type: ChartType,
        expected: DatasetKind,
        found: DatasetKind,
    },
}

impl From<xmlchart_core::DatasetError> for Error {
    fn from(err: xmlchart_core::DatasetError) -> Self {
        Error::Core(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
        }
    }
}

/// Reads the dataset chosen by the raw `chart_type` tag from `dataset`, then builds the chart.
///
/// The dataset vocabulary is picked before the tag is validated, so an unknown tag is reported
/// only once its (category) dataset has been read.
pub fn assemble<R: BufRead>(
    chart_type: &str,
    settings: &ChartSettings,
    dataset: R,
) -> Result<Assembled> {
    tracing::debug!("Generating {chart_type}");
    let dataset = xmlchart_core::dataset::read_dataset(DatasetKind::for_tag(chart_type), dataset)?;
    let chart_type: ChartType = chart_type.parse()?;
    factory::build_chart(chart_type, settings, dataset)
}

/// Lays out `chart` and serialises it as SVG.
pub fn chart_to_svg(chart: &Chart, options: &LayoutOptions) -> String {
    let layout = layout_chart(chart, options.text_measurer.as_ref());
    render_svg(&layout)
}
