use super::{
    ElementHandler, XyItem, XySeries, XyTable, XyzItem, XyzSeries, XyzTable, attribute,
    parse_number, pump,
};
use crate::error::DatasetError;
use quick_xml::events::BytesStart;
use std::io::BufRead;

/// Reads `<XYDataset>` documents. A missing or non-numeric `<Y>` yields an x-only item.
pub fn read_xy_dataset<R: BufRead>(input: R) -> Result<XyTable, DatasetError> {
    let mut handler = XyHandler::new(Shape::Xy);
    pump(input, &mut handler)?;
    let series = handler
        .series
        .into_iter()
        .map(|(key, items)| {
            let items = items
                .into_iter()
                .map(|(x, y, _)| XyItem { x, y })
                .collect();
            XySeries { key, items }
        })
        .collect();
    Ok(XyTable { series })
}

/// Reads `<XYZDataset>` documents. Every item must carry numeric `<X>`, `<Y>` and `<Z>` values.
pub fn read_xyz_dataset<R: BufRead>(input: R) -> Result<XyzTable, DatasetError> {
    let mut handler = XyHandler::new(Shape::Xyz);
    pump(input, &mut handler)?;
    let series = handler
        .series
        .into_iter()
        .map(|(key, items)| {
            let items = items
                .into_iter()
                .map(|(x, y, z)| XyzItem {
                    x,
                    y: y.unwrap_or_default(),
                    z: z.unwrap_or_default(),
                })
                .collect();
            XyzSeries { key, items }
        })
        .collect();
    Ok(XyzTable { series })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Xy,
    Xyz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn tag(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

#[derive(Debug)]
enum Frame {
    Root,
    Series {
        index: usize,
    },
    Item {
        series: usize,
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
    },
    Value {
        axis: Axis,
        text: String,
    },
}

#[derive(Debug, Clone, Copy)]
enum Position {
    Outside,
    Root,
    Series(usize),
    Item,
    Value,
}

type RawItem = (f64, Option<f64>, Option<f64>);

struct XyHandler {
    shape: Shape,
    stack: Vec<Frame>,
    root_closed: bool,
    series: Vec<(String, Vec<RawItem>)>,
    implicit: Option<usize>,
}

impl XyHandler {
    fn root_tag(&self) -> &'static str {
        match self.shape {
            Shape::Xy => "XYDataset",
            Shape::Xyz => "XYZDataset",
        }
    }

    fn new(shape: Shape) -> Self {
        Self {
            shape,
            stack: Vec::new(),
            root_closed: false,
            series: Vec::new(),
            implicit: None,
        }
    }

    fn position(&self) -> Position {
        match self.stack.last() {
            None => Position::Outside,
            Some(Frame::Root) => Position::Root,
            Some(Frame::Series { index }) => Position::Series(*index),
            Some(Frame::Item { .. }) => Position::Item,
            Some(Frame::Value { .. }) => Position::Value,
        }
    }

    fn open_series(&mut self, key: String) -> usize {
        self.series.push((key, Vec::new()));
        self.series.len() - 1
    }

    /// Bare `<Item>` elements directly under the root collect into one implicit series.
    fn implicit_series(&mut self) -> usize {
        if let Some(index) = self.implicit {
            return index;
        }
        let key = format!("Series {}", self.series.len() + 1);
        let index = self.open_series(key);
        self.implicit = Some(index);
        index
    }

    fn value_axis(&self, name: &str) -> Option<Axis> {
        match name {
            "X" => Some(Axis::X),
            "Y" => Some(Axis::Y),
            "Z" if self.shape == Shape::Xyz => Some(Axis::Z),
            _ => None,
        }
    }

    fn finish_item(
        &mut self,
        series: usize,
        x: Option<f64>,
        y: Option<f64>,
        z: Option<f64>,
    ) -> Result<(), DatasetError> {
        let Some((key, items)) = self.series.get_mut(series) else {
            return Ok(());
        };
        let missing = |tag: &'static str| DatasetError::MissingValue {
            tag,
            series: key.clone(),
            item: items.len(),
        };
        let x = x.ok_or_else(|| missing(Axis::X.tag()))?;
        if self.shape == Shape::Xyz {
            if y.is_none() {
                return Err(missing(Axis::Y.tag()));
            }
            if z.is_none() {
                return Err(missing(Axis::Z.tag()));
            }
        }
        items.push((x, y, z));
        Ok(())
    }
}

impl ElementHandler for XyHandler {
    fn start(&mut self, name: &str, element: &BytesStart<'_>) -> Result<(), DatasetError> {
        let axis = self.value_axis(name);
        let frame = match (self.position(), name, axis) {
            (Position::Outside, root, _) if root == self.root_tag() && !self.root_closed => {
                Frame::Root
            }
            (Position::Outside, found, _) => {
                return Err(DatasetError::UnexpectedRoot {
                    found: found.to_string(),
                    expected: match self.shape {
                        Shape::Xy => "<XYDataset>",
                        Shape::Xyz => "<XYZDataset>",
                    },
                });
            }
            (Position::Root, "Series", _) => {
                let key = attribute(element, "name")?.ok_or(DatasetError::MissingSeriesName)?;
                Frame::Series {
                    index: self.open_series(key),
                }
            }
            (Position::Root, "Item", _) => Frame::Item {
                series: self.implicit_series(),
                x: None,
                y: None,
                z: None,
            },
            (Position::Series(series), "Item", _) => Frame::Item {
                series,
                x: None,
                y: None,
                z: None,
            },
            (Position::Item, _, Some(axis)) => Frame::Value {
                axis,
                text: String::new(),
            },
            (position, found, _) => {
                let expected = match (position, self.shape) {
                    (Position::Root | Position::Outside, _) => "<Series> or <Item>",
                    (Position::Series(_), _) => "<Item>",
                    (Position::Item, Shape::Xy) => "<X> or <Y>",
                    (Position::Item, Shape::Xyz) => "<X>, <Y> or <Z>",
                    (Position::Value, _) => "text content",
                };
                return Err(DatasetError::UnexpectedElement {
                    found: found.to_string(),
                    expected,
                });
            }
        };
        self.stack.push(frame);
        Ok(())
    }

    fn end(&mut self, _name: &str) -> Result<(), DatasetError> {
        let Some(frame) = self.stack.pop() else {
            return Ok(());
        };
        match frame {
            Frame::Root => self.root_closed = true,
            Frame::Series { .. } => {}
            Frame::Value { axis, text } => {
                let parsed = parse_number(&text);
                if let Some(Frame::Item { x, y, z, .. }) = self.stack.last_mut() {
                    match axis {
                        Axis::X => *x = parsed,
                        Axis::Y => *y = parsed,
                        Axis::Z => *z = parsed,
                    }
                }
            }
            Frame::Item { series, x, y, z } => self.finish_item(series, x, y, z)?,
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(Frame::Value { text: buf, .. }) = self.stack.last_mut() {
            buf.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_y_yields_x_only_item() {
        let xml = r#"<XYDataset>
          <Series name="s1">
            <Item><X>1</X><Y>2</Y></Item>
            <Item><X>2</X><Y></Y></Item>
            <Item><X>3</X></Item>
          </Series>
        </XYDataset>"#;
        let t = read_xy_dataset(xml.as_bytes()).unwrap();
        assert_eq!(
            t.series[0].items,
            vec![
                XyItem { x: 1.0, y: Some(2.0) },
                XyItem { x: 2.0, y: None },
                XyItem { x: 3.0, y: None },
            ]
        );
    }

    #[test]
    fn bare_items_form_an_implicit_series() {
        let xml = "<XYDataset><Item><X>1</X><Y>1</Y></Item><Item><X>0</X><Y>4</Y></Item></XYDataset>";
        let t = read_xy_dataset(xml.as_bytes()).unwrap();
        assert_eq!(t.series.len(), 1);
        assert_eq!(t.series[0].key, "Series 1");
        assert_eq!(t.series[0].items[1], XyItem { x: 0.0, y: Some(4.0) });
    }

    #[test]
    fn missing_x_is_an_error() {
        let xml = r#"<XYDataset><Series name="a"><Item><Y>1</Y></Item></Series></XYDataset>"#;
        let err = read_xy_dataset(xml.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingValue { tag: "X", ref series, item: 0 } if series == "a"
        ));
    }

    #[test]
    fn xyz_requires_all_three_components() {
        let xml = r#"<XYZDataset><Series name="b">
            <Item><X>1</X><Y>2</Y><Z>3</Z></Item>
            <Item><X>1</X><Y>2</Y><Z>abc</Z></Item>
        </Series></XYZDataset>"#;
        let err = read_xyz_dataset(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingValue { tag: "Z", item: 1, .. }), "{err}");
    }

    #[test]
    fn z_is_not_part_of_the_xy_vocabulary() {
        let xml = r#"<XYDataset><Series name="a"><Item><X>1</X><Z>1</Z></Item></Series></XYDataset>"#;
        let err = read_xy_dataset(xml.as_bytes()).unwrap_err();
        assert_eq!(err.to_string(), "Expecting <X> or <Y> but found <Z>");
    }

    #[test]
    fn unknown_root_is_named_in_the_error() {
        let err = read_xy_dataset("<Chart/>".as_bytes()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Element not recognised: Chart (expected <XYDataset>)"
        );
    }
}
