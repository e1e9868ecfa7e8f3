use super::{CategoryTable, ElementHandler, PieTable, attribute, parse_number, pump};
use crate::error::DatasetError;
use quick_xml::events::BytesStart;
use std::io::BufRead;

const CATEGORY_ROOT: &str = "CategoryDataset";
const PIE_ROOT: &str = "PieDataset";

/// Reads `<CategoryDataset><Series name=".."><Item><Key/><Value/></Item>..</Series>..`.
pub fn read_category_dataset<R: BufRead>(input: R) -> Result<CategoryTable, DatasetError> {
    let mut handler = KeyedHandler::new(Vocabulary::Category);
    pump(input, &mut handler)?;
    Ok(handler.category)
}

/// Reads `<PieDataset><Item><Key/><Value/></Item>..</PieDataset>`.
pub fn read_pie_dataset<R: BufRead>(input: R) -> Result<PieTable, DatasetError> {
    let mut handler = KeyedHandler::new(Vocabulary::Pie);
    pump(input, &mut handler)?;
    Ok(handler.pie)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vocabulary {
    Category,
    Pie,
}

#[derive(Debug)]
enum Frame {
    Root,
    Series {
        name: String,
    },
    Item {
        index: usize,
        key: Option<String>,
        value: Option<f64>,
    },
    Key(String),
    Value(String),
}

#[derive(Debug, Clone, Copy)]
enum Position {
    Outside,
    Root,
    Series,
    Item,
    Text,
}

struct KeyedHandler {
    vocabulary: Vocabulary,
    stack: Vec<Frame>,
    root_closed: bool,
    items: usize,
    category: CategoryTable,
    pie: PieTable,
}

impl KeyedHandler {
    fn new(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            stack: Vec::new(),
            root_closed: false,
            items: 0,
            category: CategoryTable::default(),
            pie: PieTable::default(),
        }
    }

    fn root_tag(&self) -> &'static str {
        match self.vocabulary {
            Vocabulary::Category => CATEGORY_ROOT,
            Vocabulary::Pie => PIE_ROOT,
        }
    }

    fn open_item(&mut self) -> Frame {
        let index = self.items;
        self.items += 1;
        Frame::Item {
            index,
            key: None,
            value: None,
        }
    }

    fn position(&self) -> Position {
        match self.stack.last() {
            None => Position::Outside,
            Some(Frame::Root) => Position::Root,
            Some(Frame::Series { .. }) => Position::Series,
            Some(Frame::Item { .. }) => Position::Item,
            Some(Frame::Key(_) | Frame::Value(_)) => Position::Text,
        }
    }

    fn series_name(&self) -> Option<&str> {
        self.stack.iter().rev().find_map(|f| match f {
            Frame::Series { name } => Some(name.as_str()),
            _ => None,
        })
    }
}

impl ElementHandler for KeyedHandler {
    fn start(&mut self, name: &str, element: &BytesStart<'_>) -> Result<(), DatasetError> {
        let vocabulary = self.vocabulary;
        let frame = match (self.position(), name) {
            (Position::Outside, tag) if tag == self.root_tag() && !self.root_closed => Frame::Root,
            (Position::Outside, found) => {
                return Err(DatasetError::UnexpectedRoot {
                    found: found.to_string(),
                    expected: match vocabulary {
                        Vocabulary::Category => "<CategoryDataset>",
                        Vocabulary::Pie => "<PieDataset>",
                    },
                });
            }
            (Position::Root, "Series") if vocabulary == Vocabulary::Category => {
                let name = attribute(element, "name")?.ok_or(DatasetError::MissingSeriesName)?;
                Frame::Series { name }
            }
            (Position::Root, "Item") if vocabulary == Vocabulary::Pie => self.open_item(),
            (Position::Series, "Item") => self.open_item(),
            (Position::Item, "Key") => Frame::Key(String::new()),
            (Position::Item, "Value") => Frame::Value(String::new()),
            (position, found) => {
                let expected = match position {
                    Position::Root if vocabulary == Vocabulary::Category => "<Series>",
                    Position::Root | Position::Series | Position::Outside => "<Item>",
                    Position::Item => "<Key> or <Value>",
                    Position::Text => "text content",
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
            Frame::Key(text) => {
                if let Some(Frame::Item { key, .. }) = self.stack.last_mut() {
                    *key = Some(text.trim().to_string());
                }
            }
            Frame::Value(text) => {
                if let Some(Frame::Item { value, .. }) = self.stack.last_mut() {
                    *value = parse_number(&text);
                }
            }
            Frame::Item { index, key, value } => {
                let key = key.ok_or(DatasetError::MissingKey { item: index })?;
                match self.vocabulary {
                    Vocabulary::Pie => self.pie.set_value(&key, value),
                    Vocabulary::Category => {
                        let series = self.series_name().unwrap_or_default().to_string();
                        self.category.add_value(&series, &key, value);
                    }
                }
            }
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(Frame::Key(buf) | Frame::Value(buf)) = self.stack.last_mut() {
            buf.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_pie_dataset_in_document_order() {
        let xml = r#"<PieDataset>
            <Item><Key>A</Key><Value>10</Value></Item>
            <Item><Key>B</Key><Value> 20.5 </Value></Item>
            <Item><Key>C</Key><Value/></Item>
        </PieDataset>"#;
        let t = read_pie_dataset(xml.as_bytes()).unwrap();
        assert_eq!(t.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
        assert_eq!(t.value("B"), Some(20.5));
        assert_eq!(t.value("C"), None);
    }

    #[test]
    fn reads_category_dataset_series_and_keys() {
        let xml = r#"<?xml version="1.0"?>
        <CategoryDataset>
          <Series name="2024">
            <Item><Key>Q1</Key><Value>1</Value></Item>
            <Item><Key>Q2</Key><Value>2</Value></Item>
          </Series>
          <Series name="R&amp;D">
            <Item><Key>Q2</Key><Value>x</Value></Item>
          </Series>
        </CategoryDataset>"#;
        let t = read_category_dataset(xml.as_bytes()).unwrap();
        assert_eq!(t.series_keys().collect::<Vec<_>>(), vec!["2024", "R&D"]);
        assert_eq!(t.category_keys().collect::<Vec<_>>(), vec!["Q1", "Q2"]);
        assert_eq!(t.value("2024", "Q2"), Some(2.0));
        assert_eq!(t.value("R&D", "Q2"), None);
    }

    #[test]
    fn rejects_wrong_root_and_misplaced_elements() {
        let err = read_pie_dataset("<CategoryDataset/>".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("CategoryDataset"), "{err}");

        let err =
            read_category_dataset("<CategoryDataset><Item/></CategoryDataset>".as_bytes()).unwrap_err();
        assert!(
            matches!(err, DatasetError::UnexpectedElement { ref found, .. } if found == "Item"),
            "{err}"
        );

        let err = read_category_dataset("<CategoryDataset><Series/></CategoryDataset>".as_bytes())
            .unwrap_err();
        assert!(matches!(err, DatasetError::MissingSeriesName));
    }

    #[test]
    fn item_without_key_is_an_error() {
        let err =
            read_pie_dataset("<PieDataset><Item><Value>1</Value></Item></PieDataset>".as_bytes())
                .unwrap_err();
        assert!(matches!(err, DatasetError::MissingKey { item: 0 }));
    }

    #[test]
    fn malformed_xml_is_reported() {
        let err = read_pie_dataset("<PieDataset><Item></PieDataset>".as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::Xml(_)), "{err}");
        assert!(matches!(
            read_pie_dataset("".as_bytes()).unwrap_err(),
            DatasetError::Empty
        ));
    }
}
