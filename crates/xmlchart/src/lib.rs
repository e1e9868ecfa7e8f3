#![forbid(unsafe_code)]

//! `xmlchart` draws charts described by two XML documents: a `<configuration>` element of
//! single-value settings and a dataset (`CategoryDataset`, `PieDataset`, `XYDataset` or
//! `XYZDataset`).
//!
//! # Features
//!
//! - `render`: chart assembly plus SVG/SVGZ output (`xmlchart::render`)
//! - `raster`: PNG/JPEG output via pure-Rust SVG rasterization

pub use xmlchart_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use xmlchart_render::factory::{Assembled, build_chart};
    pub use xmlchart_render::model::{Chart, Plot};
    pub use xmlchart_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use xmlchart_render::{
        ChartLayout, Diagnostic, Diagnostics, LayoutOptions, assemble, chart_to_svg, layout_chart,
        render_svg,
    };

    mod format;
    pub mod sink;

    #[cfg(feature = "raster")]
    pub mod raster;

    pub use format::ImageFormat;
    pub use sink::{HttpResponseBuffer, HttpStreamSink, ResponseSink};

    use std::io::Write;
    use xmlchart_core::{ChartSettings, LabelGeneratorRegistry};

    #[derive(Debug, thiserror::Error)]
    pub enum RenderError {
        #[error(transparent)]
        Core(#[from] xmlchart_core::Error),
        #[error(transparent)]
        Render(#[from] xmlchart_render::Error),
        #[cfg(feature = "raster")]
        #[error(transparent)]
        Raster(#[from] raster::RasterError),
        #[error("{format} output requires the `raster` feature")]
        RasterUnavailable { format: ImageFormat },
        #[error("IO issue while serializing image. {0}")]
        Io(#[from] std::io::Error),
    }

    pub type Result<T> = std::result::Result<T, RenderError>;

    /// An encoded chart with the soft failures met while building it.
    #[derive(Debug, Clone)]
    pub struct RenderedImage {
        pub format: ImageFormat,
        pub bytes: Vec<u8>,
        pub diagnostics: Diagnostics,
    }

    /// Bundles the label-generator registry, layout and raster options so callers pass three
    /// documents per chart instead of six parameters.
    #[derive(Clone)]
    pub struct ChartRenderer {
        pub registry: LabelGeneratorRegistry,
        pub layout: LayoutOptions,
        #[cfg(feature = "raster")]
        pub raster: raster::RasterOptions,
    }

    impl Default for ChartRenderer {
        fn default() -> Self {
            Self {
                registry: LabelGeneratorRegistry::with_builtins(),
                layout: LayoutOptions::default(),
                #[cfg(feature = "raster")]
                raster: raster::RasterOptions::default(),
            }
        }
    }

    impl ChartRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_registry(mut self, registry: LabelGeneratorRegistry) -> Self {
            self.registry = registry;
            self
        }

        /// Maps the configuration, reads the dataset and assembles the chart.
        pub fn build(
            &self,
            chart_type: &str,
            configuration: &str,
            data: &str,
        ) -> Result<(ChartSettings, Assembled)> {
            let settings = ChartSettings::parse_str_with(configuration, &self.registry)?;
            let assembled = assemble(chart_type, &settings, data.as_bytes())?;
            Ok((settings, assembled))
        }

        /// Builds and encodes a chart in the configured image format. Returns `None` when either
        /// document is absent.
        pub fn render_image(
            &self,
            chart_type: &str,
            configuration: Option<&str>,
            data: Option<&str>,
        ) -> Result<Option<RenderedImage>> {
            let (Some(configuration), Some(data)) = (configuration, data) else {
                return Ok(None);
            };
            let (settings, assembled) = self.build(chart_type, configuration, data)?;
            let format = ImageFormat::from_name(&settings.image_type);
            let bytes = self.encode(&assembled.chart, format)?;
            Ok(Some(RenderedImage {
                format,
                bytes,
                diagnostics: assembled.diagnostics,
            }))
        }

        pub fn render(
            &self,
            chart_type: &str,
            configuration: Option<&str>,
            data: Option<&str>,
        ) -> Result<Option<Vec<u8>>> {
            Ok(self
                .render_image(chart_type, configuration, data)?
                .map(|image| image.bytes))
        }

        /// Builds a chart and writes it to `sink` with a matching content type (and a `gzip`
        /// content encoding for SVGZ). Nothing is written when either document is absent.
        ///
        /// Once both documents are present the sink is closed on every exit path, including
        /// configuration, dataset and chart-type failures.
        pub fn stream_render(
            &self,
            chart_type: &str,
            configuration: Option<&str>,
            data: Option<&str>,
            sink: &mut dyn ResponseSink,
        ) -> Result<Diagnostics> {
            let (Some(configuration), Some(data)) = (configuration, data) else {
                return Ok(Diagnostics::new());
            };
            let mut response = sink::Closing::new(sink);
            let (settings, assembled) = self.build(chart_type, configuration, data)?;
            let format = ImageFormat::from_name(&settings.image_type);

            response.set_content_type(format.content_type());
            if let Some(encoding) = format.content_encoding() {
                response.set_header("Content-Encoding", encoding);
            }
            let bytes = self.encode(&assembled.chart, format)?;
            let out = response.output_stream()?;
            out.write_all(&bytes)?;
            out.flush()?;
            response.finish()?;
            Ok(assembled.diagnostics)
        }

        /// Encodes an assembled chart.
        pub fn encode(&self, chart: &Chart, format: ImageFormat) -> Result<Vec<u8>> {
            let svg = chart_to_svg(chart, &self.layout);
            match format {
                ImageFormat::Svg => Ok(svg.into_bytes()),
                ImageFormat::Svgz => gzip(svg.as_bytes()),
                ImageFormat::Png | ImageFormat::Jpeg => self.rasterize(&svg, format),
            }
        }

        #[cfg(feature = "raster")]
        fn rasterize(&self, svg: &str, format: ImageFormat) -> Result<Vec<u8>> {
            Ok(match format {
                ImageFormat::Jpeg => raster::svg_to_jpeg(svg, &self.raster)?,
                _ => raster::svg_to_png(svg, &self.raster)?,
            })
        }

        #[cfg(not(feature = "raster"))]
        fn rasterize(&self, _svg: &str, format: ImageFormat) -> Result<Vec<u8>> {
            Err(RenderError::RasterUnavailable { format })
        }
    }

    fn gzip(bytes: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(bytes)?;
        Ok(encoder.finish()?)
    }

    /// Renders with default options. See [`ChartRenderer::render`].
    pub fn render(
        chart_type: &str,
        configuration: Option<&str>,
        data: Option<&str>,
    ) -> Result<Option<Vec<u8>>> {
        ChartRenderer::default().render(chart_type, configuration, data)
    }

    /// Streams with default options. See [`ChartRenderer::stream_render`].
    pub fn stream_render(
        chart_type: &str,
        configuration: Option<&str>,
        data: Option<&str>,
        sink: &mut dyn ResponseSink,
    ) -> Result<Diagnostics> {
        ChartRenderer::default().stream_render(chart_type, configuration, data, sink)
    }
}
