use serde::Serialize;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Serialize)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: f64,
    pub bold: bool,
}

impl TextStyle {
    pub fn sized(font_size: f64) -> Self {
        Self {
            font_family: None,
            font_size,
            bold: false,
        }
    }

    pub fn bold(font_size: f64) -> Self {
        Self {
            bold: true,
            ..Self::sized(font_size)
        }
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::sized(10.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

/// Text extents used by layout. Rasterisation uses real fonts, so a measurer only has to be
/// close enough for label placement.
pub trait TextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;
}

/// Font-free measurement: every display column is `char_width_factor` ems wide.
#[derive(Debug, Clone, Default)]
pub struct DeterministicTextMeasurer {
    pub char_width_factor: f64,
    pub line_height_factor: f64,
}

impl TextMeasurer for DeterministicTextMeasurer {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let char_width_factor = if self.char_width_factor == 0.0 {
            0.6
        } else {
            self.char_width_factor
        };
        let line_height_factor = if self.line_height_factor == 0.0 {
            1.2
        } else {
            self.line_height_factor
        };
        let weight = if style.bold { 1.1 } else { 1.0 };

        let font_size = style.font_size.max(1.0);
        let lines: Vec<&str> = text.split('\n').collect();
        let columns = lines.iter().map(|l| l.width()).max().unwrap_or(0);

        TextMetrics {
            width: columns as f64 * font_size * char_width_factor * weight,
            height: lines.len() as f64 * font_size * line_height_factor,
            line_count: lines.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_characters_take_two_columns() {
        let m = DeterministicTextMeasurer::default();
        let style = TextStyle::sized(10.0);
        assert_eq!(m.measure("ab", &style).width, 12.0);
        assert_eq!(m.measure("日本", &style).width, 24.0);
    }

    #[test]
    fn lines_stack_vertically() {
        let m = DeterministicTextMeasurer::default();
        let metrics = m.measure("one\nthree", &TextStyle::sized(10.0));
        assert_eq!(metrics.line_count, 2);
        assert_eq!(metrics.height, 24.0);
        assert_eq!(metrics.width, 30.0);
    }
}
