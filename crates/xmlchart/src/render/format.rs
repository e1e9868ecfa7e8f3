use std::fmt;

/// Output encodings selectable through the `imageType` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Svg,
    Svgz,
}

impl ImageFormat {
    /// Case-insensitive lookup. Unknown names fall back to PNG.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "PNG" => Self::Png,
            "JPEG" | "JPG" => Self::Jpeg,
            "SVG" => Self::Svg,
            "SVGZ" => Self::Svgz,
            _ => {
                tracing::debug!(image_type = name, "Fall back to default renderer");
                Self::Png
            }
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Svg | Self::Svgz => "image/svg+xml",
        }
    }

    /// `Content-Encoding` to announce alongside the body, if any.
    pub fn content_encoding(self) -> Option<&'static str> {
        match self {
            Self::Svgz => Some("gzip"),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Svg => "svg",
            Self::Svgz => "svgz",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Svg => "SVG",
            Self::Svgz => "SVGZ",
        })
    }
}
