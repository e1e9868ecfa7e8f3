//! In-memory tables and their XML readers.
//!
//! All four readers share one event pump: quick-xml events are normalised (empty elements become
//! a start/end pair, text is unescaped) and fed to a handler that keeps an explicit stack of
//! frames mirroring the element nesting.

mod category;
mod xy;

pub use category::{read_category_dataset, read_pie_dataset};
pub use xy::{read_xy_dataset, read_xyz_dataset};

use crate::chart_type::DatasetKind;
use crate::error::DatasetError;
use indexmap::{IndexMap, IndexSet};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use std::io::BufRead;
use std::str;

/// Series × category table. Category order is the order in which keys were first seen across
/// all series.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryTable {
    series: IndexMap<String, IndexMap<String, Option<f64>>>,
    categories: IndexSet<String>,
}

impl CategoryTable {
    /// Sets the value for `(series, category)`, replacing an existing value in place.
    pub fn add_value(&mut self, series: &str, category: &str, value: Option<f64>) {
        self.categories.insert(category.to_string());
        self.series
            .entry(series.to_string())
            .or_default()
            .insert(category.to_string(), value);
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn series_key(&self, series: usize) -> Option<&str> {
        self.series.get_index(series).map(|(k, _)| k.as_str())
    }

    pub fn category_key(&self, category: usize) -> Option<&str> {
        self.categories.get_index(category).map(String::as_str)
    }

    pub fn series_keys(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn category_keys(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    pub fn value(&self, series: &str, category: &str) -> Option<f64> {
        self.series.get(series)?.get(category).copied().flatten()
    }

    pub fn value_at(&self, series: usize, category: usize) -> Option<f64> {
        let (_, row) = self.series.get_index(series)?;
        let key = self.categories.get_index(category)?;
        row.get(key).copied().flatten()
    }

    /// Sum of the non-null values in one category (column).
    pub fn category_total(&self, category: usize) -> f64 {
        (0..self.series_count())
            .filter_map(|s| self.value_at(s, category))
            .sum()
    }

    /// Sum of the non-null values in one series (row).
    pub fn series_total(&self, series: usize) -> f64 {
        (0..self.category_count())
            .filter_map(|c| self.value_at(series, c))
            .sum()
    }

    /// Minimum and maximum over all non-null values.
    pub fn value_extent(&self) -> Option<(f64, f64)> {
        extent(self.series.values().flat_map(|row| row.values().copied().flatten()))
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

/// Key → value table for single-series (pie) charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PieTable {
    sections: IndexMap<String, Option<f64>>,
}

impl PieTable {
    /// Sets the value for `key`, keeping the key's original position when it already exists.
    pub fn set_value(&mut self, key: &str, value: Option<f64>) {
        self.sections.insert(key.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn value(&self, key: &str) -> Option<f64> {
        self.sections.get(key).copied().flatten()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.sections.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Sum of the positive values; null, zero and negative sections do not contribute.
    pub fn total(&self) -> f64 {
        self.sections
            .values()
            .filter_map(|v| *v)
            .filter(|v| *v > 0.0)
            .sum()
    }
}

impl FromIterator<(String, Option<f64>)> for PieTable {
    fn from_iter<T: IntoIterator<Item = (String, Option<f64>)>>(iter: T) -> Self {
        Self {
            sections: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct XyItem {
    pub x: f64,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XySeries {
    pub key: String,
    pub items: Vec<XyItem>,
}

/// Named series of `(x, y)` pairs in document order. Keys may repeat; items are neither sorted
/// nor de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct XyTable {
    pub series: Vec<XySeries>,
}

impl XyTable {
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn series_keys(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.key.as_str())
    }

    pub fn x_extent(&self) -> Option<(f64, f64)> {
        extent(self.series.iter().flat_map(|s| s.items.iter().map(|i| i.x)))
    }

    pub fn y_extent(&self) -> Option<(f64, f64)> {
        extent(self.series.iter().flat_map(|s| s.items.iter().filter_map(|i| i.y)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct XyzItem {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XyzSeries {
    pub key: String,
    pub items: Vec<XyzItem>,
}

/// Named series of `(x, y, z)` triples in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct XyzTable {
    pub series: Vec<XyzSeries>,
}

impl XyzTable {
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn series_keys(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|s| s.key.as_str())
    }

    pub fn x_extent(&self) -> Option<(f64, f64)> {
        extent(self.series.iter().flat_map(|s| s.items.iter().map(|i| i.x)))
    }

    pub fn y_extent(&self) -> Option<(f64, f64)> {
        extent(self.series.iter().flat_map(|s| s.items.iter().map(|i| i.y)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "table", rename_all = "camelCase")]
pub enum Dataset {
    Category(CategoryTable),
    Pie(PieTable),
    Xy(XyTable),
    Xyz(XyzTable),
}

impl Dataset {
    pub fn kind(&self) -> DatasetKind {
        match self {
            Dataset::Category(_) => DatasetKind::Category,
            Dataset::Pie(_) => DatasetKind::Pie,
            Dataset::Xy(_) => DatasetKind::Xy,
            Dataset::Xyz(_) => DatasetKind::Xyz,
        }
    }
}

/// Reads a dataset document of the given vocabulary.
pub fn read_dataset<R: BufRead>(kind: DatasetKind, input: R) -> Result<Dataset, DatasetError> {
    Ok(match kind {
        DatasetKind::Category => {
            tracing::debug!("Reading XML CategoryDataset");
            Dataset::Category(read_category_dataset(input)?)
        }
        DatasetKind::Pie => {
            tracing::debug!("Reading XML PieDataset");
            Dataset::Pie(read_pie_dataset(input)?)
        }
        DatasetKind::Xy => {
            tracing::debug!("Reading XML XYDataset");
            Dataset::Xy(read_xy_dataset(input)?)
        }
        DatasetKind::Xyz => {
            tracing::debug!("Reading XML XYZDataset");
            Dataset::Xyz(read_xyz_dataset(input)?)
        }
    })
}

pub fn read_dataset_str(kind: DatasetKind, xml: &str) -> Result<Dataset, DatasetError> {
    read_dataset(kind, xml.as_bytes())
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Text content of a numeric element: absent, empty, non-numeric or NaN all mean "no value".
fn parse_number(text: &str) -> Option<f64> {
    let v = text.trim().parse::<f64>().ok()?;
    (!v.is_nan()).then_some(v)
}

/// Callbacks driven by [`pump`].
trait ElementHandler {
    fn start(&mut self, name: &str, element: &BytesStart<'_>) -> Result<(), DatasetError>;
    fn end(&mut self, name: &str) -> Result<(), DatasetError>;
    fn text(&mut self, text: &str);
}

fn pump<R: BufRead>(input: R, handler: &mut impl ElementHandler) -> Result<(), DatasetError> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut saw_root = false;
    // Names of the elements opened but not yet closed, innermost last.
    let mut open: Vec<String> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                saw_root = true;
                let name = str::from_utf8(e.local_name().as_ref())?.to_string();
                handler.start(&name, &e)?;
                open.push(name);
            }
            Event::Empty(e) => {
                saw_root = true;
                let name = str::from_utf8(e.local_name().as_ref())?.to_string();
                handler.start(&name, &e)?;
                handler.end(&name)?;
            }
            Event::End(e) => {
                let name = str::from_utf8(e.local_name().as_ref())?.to_string();
                handler.end(&name)?;
                open.pop();
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                handler.text(&text);
            }
            Event::CData(c) => {
                let text = str::from_utf8(&c)?;
                handler.text(text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(innermost) = open.pop() {
        return Err(DatasetError::UnexpectedEof { open: innermost });
    }
    if saw_root {
        Ok(())
    } else {
        Err(DatasetError::Empty)
    }
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, DatasetError> {
    match element.try_get_attribute(name)? {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}
