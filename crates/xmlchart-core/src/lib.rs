#![forbid(unsafe_code)]

//! Configuration mapping and dataset reading for XML-described charts.
//!
//! The inputs are two XML documents: a flat `<configuration>` element whose children are
//! single-value settings, and a dataset document in one of four vocabularies
//! (`CategoryDataset`, `PieDataset`, `XYDataset`, `XYZDataset`). This crate turns them into a
//! read-only [`ChartSettings`] record and a typed [`Dataset`]; building and encoding the chart is
//! done by `xmlchart-render` and the `xmlchart` facade.

pub mod chart_type;
pub mod color;
pub mod config;
pub mod dataset;
pub mod error;
pub mod format;
pub mod label;

pub use chart_type::{ChartType, DatasetKind};
pub use color::Color;
pub use config::{CategoryLabelPositions, ChartSettings, PlotOrientation, TableOrder};
pub use dataset::{CategoryTable, Dataset, PieTable, XyItem, XySeries, XyTable, XyzItem, XyzSeries, XyzTable};
pub use error::{DatasetError, Error, Result};
pub use format::NumberFormat;
pub use label::{
    CategoryItemLabelGenerator, LabelGeneratorRegistry, PieSectionLabelGenerator,
    ResolvedLabelGenerator, StandardCategoryItemLabelGenerator,
};
