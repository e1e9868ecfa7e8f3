use crate::dataset::CategoryTable;
use crate::error::{Error, Result};
use crate::format::NumberFormat;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Produces the text drawn next to a category item (a bar, a line vertex, a radar point).
pub trait CategoryItemLabelGenerator: fmt::Debug + Send + Sync {
    fn generate_label(&self, dataset: &CategoryTable, series: usize, category: usize)
    -> Option<String>;

    /// Label for a whole category, used for radar axis labels.
    fn generate_column_label(&self, dataset: &CategoryTable, category: usize) -> Option<String> {
        dataset.category_key(category).map(str::to_string)
    }
}

/// Constructor contract for pluggable category label generators: a label pattern plus the
/// number format used for the `{2}` argument.
pub type LabelGeneratorFactory = fn(
    pattern: &str,
    number_format: NumberFormat,
) -> std::result::Result<Box<dyn CategoryItemLabelGenerator>, String>;

/// Label generators addressable by name from the `categoryItemLabelGeneratorClass` setting.
#[derive(Clone, Default)]
pub struct LabelGeneratorRegistry {
    factories: HashMap<&'static str, LabelGeneratorFactory>,
}

impl fmt::Debug for LabelGeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

impl LabelGeneratorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, factory: LabelGeneratorFactory) {
        self.factories.insert(key, factory);
    }

    pub fn get(&self, key: &str) -> Option<LabelGeneratorFactory> {
        self.factories.get(key).copied()
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.factories.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.insert(
            "StandardCategoryItemLabelGenerator",
            StandardCategoryItemLabelGenerator::boxed,
        );
        reg.insert(
            "org.jfree.chart.labels.StandardCategoryItemLabelGenerator",
            StandardCategoryItemLabelGenerator::boxed,
        );
        reg
    }

    /// Looks up `key` and instantiates the generator with `pattern` and the compiled
    /// `number_format` pattern.
    pub fn resolve(
        &self,
        key: &str,
        pattern: &str,
        number_format: &str,
    ) -> Result<ResolvedLabelGenerator> {
        let Some(factory) = self.get(key) else {
            return Err(Error::UnknownLabelGenerator {
                key: key.to_string(),
                available: self.keys().join(", "),
            });
        };
        let format = NumberFormat::parse(number_format).map_err(|e| Error::LabelGenerator {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        let generator = factory(pattern, format).map_err(|message| Error::LabelGenerator {
            key: key.to_string(),
            message,
        })?;
        Ok(ResolvedLabelGenerator {
            key: key.to_string(),
            generator: Arc::from(generator),
        })
    }
}

/// A generator instantiated during configuration mapping, tagged with the key it came from.
#[derive(Debug, Clone)]
pub struct ResolvedLabelGenerator {
    pub key: String,
    pub generator: Arc<dyn CategoryItemLabelGenerator>,
}

/// `{0}` series key, `{1}` category key, `{2}` formatted value, `{3}` percent of the
/// category's total.
#[derive(Debug, Clone)]
pub struct StandardCategoryItemLabelGenerator {
    pattern: String,
    number_format: NumberFormat,
    percent_format: NumberFormat,
}

impl StandardCategoryItemLabelGenerator {
    pub const DEFAULT_PATTERN: &'static str = "{2}";

    pub fn new(pattern: &str, number_format: NumberFormat) -> Self {
        Self {
            pattern: pattern.to_string(),
            number_format,
            percent_format: NumberFormat::percent(),
        }
    }

    fn boxed(
        pattern: &str,
        number_format: NumberFormat,
    ) -> std::result::Result<Box<dyn CategoryItemLabelGenerator>, String> {
        if pattern.is_empty() {
            return Err("label pattern is empty".to_string());
        }
        Ok(Box::new(Self::new(pattern, number_format)))
    }
}

impl CategoryItemLabelGenerator for StandardCategoryItemLabelGenerator {
    fn generate_label(
        &self,
        dataset: &CategoryTable,
        series: usize,
        category: usize,
    ) -> Option<String> {
        let series_key = dataset.series_key(series)?;
        let category_key = dataset.category_key(category)?;
        let value = dataset.value_at(series, category);

        let formatted = value.map_or_else(|| "-".to_string(), |v| self.number_format.format(v));
        let total = dataset.category_total(category);
        let percent = match value {
            Some(v) if total != 0.0 => self.percent_format.format(v / total),
            _ => "-".to_string(),
        };

        Some(message_format(
            &self.pattern,
            &[series_key, category_key, formatted.as_str(), percent.as_str()],
        ))
    }
}

/// Pie section labels: `{0}` key, `{1}` formatted value, `{2}` formatted percent, `{3}`
/// formatted total.
#[derive(Debug, Clone)]
pub struct PieSectionLabelGenerator {
    pattern: String,
    number_format: NumberFormat,
    percent_format: NumberFormat,
}

impl Default for PieSectionLabelGenerator {
    fn default() -> Self {
        Self {
            pattern: "{0}".to_string(),
            number_format: NumberFormat::number(),
            percent_format: NumberFormat::percent(),
        }
    }
}

impl PieSectionLabelGenerator {
    pub fn new(pattern: &str, number_format: NumberFormat, percent_format: NumberFormat) -> Self {
        Self {
            pattern: pattern.to_string(),
            number_format,
            percent_format,
        }
    }

    pub fn from_patterns(pattern: &str, number_format: &str, percent_format: &str) -> Result<Self> {
        Ok(Self::new(
            pattern,
            NumberFormat::parse(number_format)?,
            NumberFormat::parse(percent_format)?,
        ))
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn generate(&self, key: &str, value: Option<f64>, total: f64) -> String {
        let formatted = value.map_or_else(|| "null".to_string(), |v| self.number_format.format(v));
        let percent = match value {
            Some(v) if total > 0.0 => self.percent_format.format(v / total),
            _ => self.percent_format.format(0.0),
        };
        let total = self.number_format.format(total);
        message_format(
            &self.pattern,
            &[key, formatted.as_str(), percent.as_str(), total.as_str()],
        )
    }
}

impl Serialize for PieSectionLabelGenerator {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("PieSectionLabelGenerator", 3)?;
        st.serialize_field("pattern", &self.pattern)?;
        st.serialize_field("numberFormat", self.number_format.pattern())?;
        st.serialize_field("percentFormat", self.percent_format.pattern())?;
        st.end()
    }
}

/// Substitutes `{n}` placeholders. A single quote starts a literal section and `''` is an
/// escaped quote; unknown or malformed placeholders are kept verbatim.
pub fn message_format(pattern: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(pattern.len() + 16);
    let mut quoted = false;
    let mut chars = pattern.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' => {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    out.push('\'');
                } else {
                    quoted = !quoted;
                }
            }
            '{' if !quoted => {
                let mut body = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    body.push(c);
                }
                let index = body.split(',').next().unwrap_or("").trim();
                match index.parse::<usize>().ok().and_then(|i| args.get(i)) {
                    Some(arg) if closed => out.push_str(arg),
                    _ => {
                        out.push('{');
                        out.push_str(&body);
                        if closed {
                            out.push('}');
                        }
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> CategoryTable {
        let mut t = CategoryTable::default();
        t.add_value("2024", "Q1", Some(30.0));
        t.add_value("2025", "Q1", Some(10.0));
        t.add_value("2024", "Q2", None);
        t
    }

    #[test]
    fn message_format_substitutes_and_quotes() {
        assert_eq!(message_format("{0} = {1}", &["a", "b"]), "a = b");
        assert_eq!(message_format("'{0}' is {0}", &["x"]), "{0} is x");
        assert_eq!(message_format("it''s {0}", &["x"]), "it's x");
        assert_eq!(message_format("{7} {x", &["x"]), "{7} {x");
    }

    #[test]
    fn standard_generator_formats_value_and_percent() {
        let g = StandardCategoryItemLabelGenerator::new("{0}/{1}: {2} ({3})", NumberFormat::integer());
        let t = table();
        assert_eq!(g.generate_label(&t, 0, 0).as_deref(), Some("2024/Q1: 30 (75%)"));
        assert_eq!(g.generate_label(&t, 0, 1).as_deref(), Some("2024/Q2: - (-)"));
        assert_eq!(g.generate_label(&t, 5, 0), None);
    }

    #[test]
    fn registry_resolves_builtins_and_reports_unknown_keys() {
        let reg = LabelGeneratorRegistry::with_builtins();
        let resolved = reg
            .resolve("org.jfree.chart.labels.StandardCategoryItemLabelGenerator", "{2}", "0.0")
            .unwrap();
        assert_eq!(
            resolved.generator.generate_label(&table(), 1, 0).as_deref(),
            Some("10.0")
        );

        let err = reg.resolve("com.example.Missing", "{2}", "0").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("com.example.Missing"), "{msg}");
        assert!(msg.contains("StandardCategoryItemLabelGenerator"), "{msg}");
    }

    #[test]
    fn registry_reports_bad_number_format_with_key() {
        let reg = LabelGeneratorRegistry::with_builtins();
        let err = reg
            .resolve("StandardCategoryItemLabelGenerator", "{2}", "0.0.0")
            .unwrap_err();
        assert!(matches!(err, Error::LabelGenerator { ref key, .. } if key == "StandardCategoryItemLabelGenerator"));
    }

    #[test]
    fn pie_section_labels() {
        let g = PieSectionLabelGenerator::from_patterns("{0}: {1} ({2})", "0", "0.0%").unwrap();
        assert_eq!(g.generate("A", Some(10.0), 30.0), "A: 10 (33.3%)");
        assert_eq!(PieSectionLabelGenerator::default().generate("B", Some(1.0), 2.0), "B");
    }
}
