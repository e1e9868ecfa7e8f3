pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Value for \"{field}\" cannot be parsed")]
    MissingValue { field: String },

    #[error("Unable to convert value of \"{field}\": '{value}'")]
    InvalidValue { field: String, value: String },

    #[error("Wrong value for \"{field}\": '{value}'")]
    InvalidChoice { field: String, value: String },

    #[error("Invalid colour name or hex value for \"{field}\": '{value}'")]
    InvalidColor { field: String, value: String },

    #[error("Unknown category item label generator \"{key}\" (registered: {available})")]
    UnknownLabelGenerator { key: String, available: String },

    #[error("Cannot instantiate category item label generator \"{key}\": {message}")]
    LabelGenerator { key: String, message: String },

    #[error("Invalid number format pattern \"{pattern}\": {message}")]
    NumberFormat { pattern: String, message: String },

    #[error("Illegal chart type \"{chart_type}\". Choose one of: {supported}")]
    UnsupportedChartType {
        chart_type: String,
        supported: String,
    },

    #[error("XML document error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),

    #[error("utf8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("dataset document has no root element")]
    Empty,

    #[error("dataset document ends inside <{open}>")]
    UnexpectedEof { open: String },

    #[error("Element not recognised: {found} (expected {expected})")]
    UnexpectedRoot {
        found: String,
        expected: &'static str,
    },

    #[error("Expecting {expected} but found <{found}>")]
    UnexpectedElement {
        found: String,
        expected: &'static str,
    },

    #[error("<Series> element is missing its \"name\" attribute")]
    MissingSeriesName,

    #[error("item {item} of series \"{series}\" has no <{tag}> value")]
    MissingValue {
        tag: &'static str,
        series: String,
        item: usize,
    },

    #[error("item {item} has no <Key>")]
    MissingKey { item: usize },
}
