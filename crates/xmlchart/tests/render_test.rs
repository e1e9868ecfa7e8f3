#![cfg(feature = "render")]

use std::io::{self, Read, Write};
use xmlchart::render::{
    ChartRenderer, HttpResponseBuffer, ImageFormat, RenderError, ResponseSink, render,
    stream_render,
};

const CATEGORY: &str = r#"<CategoryDataset>
    <Series name="North">
        <Item><Key>Q1</Key><Value>10</Value></Item>
        <Item><Key>Q2</Key><Value>14</Value></Item>
    </Series>
</CategoryDataset>"#;

fn config(image_type: &str) -> String {
    format!(
        "<configuration><title>Sales</title><imageType>{image_type}</imageType><width>320</width><height>200</height></configuration>"
    )
}

#[test]
fn svg_output_is_a_well_formed_document() {
    let bytes = render("BarChart", Some(&config("svg")), Some(CATEGORY))
        .unwrap()
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let doc = roxmltree::Document::parse(&text).unwrap();
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "svg");
    assert_eq!(root.attribute("width"), Some("320"));
    assert_eq!(root.attribute("height"), Some("200"));
}

#[test]
fn svgz_output_gunzips_to_the_svg_output() {
    let svg = render("BarChart", Some(&config("svg")), Some(CATEGORY))
        .unwrap()
        .unwrap();
    let svgz = render("BarChart", Some(&config("SVGZ")), Some(CATEGORY))
        .unwrap()
        .unwrap();
    let mut unzipped = Vec::new();
    flate2::read::GzDecoder::new(svgz.as_slice())
        .read_to_end(&mut unzipped)
        .unwrap();
    assert_eq!(unzipped, svg);
}

#[test]
fn absent_documents_render_nothing() {
    assert!(render("BarChart", None, Some(CATEGORY)).unwrap().is_none());
    assert!(render("BarChart", Some(&config("svg")), None).unwrap().is_none());

    let mut sink = HttpResponseBuffer::new();
    stream_render("BarChart", None, Some(CATEGORY), &mut sink).unwrap();
    assert_eq!(sink, HttpResponseBuffer::new());
}

#[test]
fn render_image_reports_format_and_diagnostics() {
    let configuration =
        "<configuration><imageType>svg</imageType><seriesColors>nope</seriesColors></configuration>";
    let image = ChartRenderer::new()
        .render_image("BarChart", Some(configuration), Some(CATEGORY))
        .unwrap()
        .unwrap();
    assert_eq!(image.format, ImageFormat::Svg);
    assert_eq!(image.diagnostics.len(), 1);
}

#[test]
fn stream_render_sets_headers_and_closes() {
    let mut sink = HttpResponseBuffer::new();
    stream_render("LineChart", Some(&config("svgz")), Some(CATEGORY), &mut sink).unwrap();
    assert_eq!(sink.content_type.as_deref(), Some("image/svg+xml"));
    assert_eq!(sink.header("Content-Encoding"), Some("gzip"));
    assert!(sink.body.starts_with(&[0x1f, 0x8b]));
    assert!(sink.closed);
}

#[test]
fn build_failures_close_the_sink_without_a_body() {
    let mut sink = HttpResponseBuffer::new();
    let err = stream_render("Histogram", Some(&config("svg")), Some(CATEGORY), &mut sink)
        .unwrap_err();
    assert!(matches!(err, RenderError::Render(_)), "{err}");
    assert!(err.to_string().contains("Illegal chart type"));
    assert!(sink.content_type.is_none());
    assert!(sink.body.is_empty());
    assert!(sink.closed);
}

#[test]
fn invalid_configuration_closes_the_sink() {
    let mut sink = HttpResponseBuffer::new();
    let err = stream_render(
        "BarChart",
        Some("<configuration><width>abc</width></configuration>"),
        Some(CATEGORY),
        &mut sink,
    )
    .unwrap_err();
    assert!(err.to_string().contains("\"width\""), "{err}");
    assert!(sink.body.is_empty());
    assert!(sink.closed);
}

#[test]
fn truncated_dataset_closes_the_sink() {
    let mut sink = HttpResponseBuffer::new();
    let err = stream_render(
        "BarChart",
        Some(&config("svg")),
        Some("<CategoryDataset><Series name=\"S\">"),
        &mut sink,
    )
    .unwrap_err();
    assert!(err.to_string().contains("ends inside <Series>"), "{err}");
    assert!(sink.closed);
}

struct BrokenPipe {
    writer: FailingWriter,
    closed: bool,
}

struct FailingWriter;

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseSink for BrokenPipe {
    fn set_content_type(&mut self, _content_type: &str) {}

    fn set_header(&mut self, _name: &str, _value: &str) {}

    fn output_stream(&mut self) -> io::Result<&mut dyn Write> {
        Ok(&mut self.writer)
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[test]
fn io_failures_are_reported_and_the_sink_is_closed() {
    let mut sink = BrokenPipe {
        writer: FailingWriter,
        closed: false,
    };
    let err = stream_render("BarChart", Some(&config("svg")), Some(CATEGORY), &mut sink)
        .unwrap_err();
    assert!(matches!(err, RenderError::Io(_)));
    assert!(
        err.to_string()
            .starts_with("IO issue while serializing image. "),
        "{err}"
    );
    assert!(sink.closed);
}

#[cfg(feature = "raster")]
#[test]
fn png_is_the_default_format() {
    let pie = "<PieDataset><Item><Key>A</Key><Value>1</Value></Item></PieDataset>";
    let bytes = render("PieChart", Some("<configuration/>"), Some(pie))
        .unwrap()
        .unwrap();
    assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[cfg(feature = "raster")]
#[test]
fn jpeg_output_has_a_jpeg_signature() {
    let bytes = render("BarChart", Some(&config("jpg")), Some(CATEGORY))
        .unwrap()
        .unwrap();
    assert!(bytes.starts_with(&[0xff, 0xd8, 0xff]));
}

#[cfg(not(feature = "raster"))]
#[test]
fn raster_formats_need_the_raster_feature() {
    let err = render("BarChart", Some(&config("png")), Some(CATEGORY)).unwrap_err();
    assert!(matches!(
        err,
        RenderError::RasterUnavailable {
            format: ImageFormat::Png
        }
    ));
}

#[cfg(feature = "raster")]
#[test]
fn pie_bar_and_line_encode_as_png_and_svg() {
    let pie = "<PieDataset><Item><Key>A</Key><Value>10</Value></Item><Item><Key>B</Key><Value>20</Value></Item></PieDataset>";
    for (chart_type, data) in [("PieChart", pie), ("BarChart", CATEGORY), ("LineChart", CATEGORY)] {
        for image_type in ["png", "svg"] {
            let bytes = render(chart_type, Some(&config(image_type)), Some(data))
                .unwrap()
                .unwrap();
            assert!(!bytes.is_empty(), "{chart_type} as {image_type}");
        }
    }
}
