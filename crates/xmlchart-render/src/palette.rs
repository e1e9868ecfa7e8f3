use serde::Serialize;
use xmlchart_core::Color;

/// Default series/section colours, in assignment order.
pub const DEFAULT_PAINT_SEQUENCE: [Color; 34] = [
    Color::rgb(0xff, 0x55, 0x55),
    Color::rgb(0x55, 0x55, 0xff),
    Color::rgb(0x55, 0xff, 0x55),
    Color::rgb(0xff, 0xff, 0x55),
    Color::rgb(0xff, 0x55, 0xff),
    Color::rgb(0x55, 0xff, 0xff),
    Color::rgb(0xff, 0xaf, 0xaf),
    Color::GRAY,
    Color::rgb(0xc0, 0x00, 0x00),
    Color::rgb(0x00, 0x00, 0xc0),
    Color::rgb(0x00, 0xc0, 0x00),
    Color::rgb(0xc0, 0xc0, 0x00),
    Color::rgb(0xc0, 0x00, 0xc0),
    Color::rgb(0x00, 0xc0, 0xc0),
    Color::DARK_GRAY,
    Color::rgb(0xff, 0x40, 0x40),
    Color::rgb(0x40, 0x40, 0xff),
    Color::rgb(0x40, 0xff, 0x40),
    Color::rgb(0xff, 0xff, 0x40),
    Color::rgb(0xff, 0x40, 0xff),
    Color::rgb(0x40, 0xff, 0xff),
    Color::LIGHT_GRAY,
    Color::rgb(0x80, 0x00, 0x00),
    Color::rgb(0x00, 0x00, 0x80),
    Color::rgb(0x00, 0x80, 0x00),
    Color::rgb(0x80, 0x80, 0x00),
    Color::rgb(0x80, 0x00, 0x80),
    Color::rgb(0x00, 0x80, 0x80),
    Color::rgb(0xff, 0x80, 0x80),
    Color::rgb(0x80, 0x80, 0xff),
    Color::rgb(0x80, 0xff, 0x80),
    Color::rgb(0xff, 0xff, 0x80),
    Color::rgb(0xff, 0x80, 0xff),
    Color::rgb(0x80, 0xff, 0xff),
];

/// Hands out colours for series or sections that have no explicit paint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawingSupplier {
    paints: Vec<Color>,
}

impl Default for DrawingSupplier {
    fn default() -> Self {
        Self {
            paints: DEFAULT_PAINT_SEQUENCE.to_vec(),
        }
    }
}

impl DrawingSupplier {
    /// A supplier that hands out `colors` first and then the default sequence.
    pub fn with_prepended(colors: impl IntoIterator<Item = Color>) -> Self {
        let mut paints: Vec<Color> = colors.into_iter().collect();
        paints.extend_from_slice(&DEFAULT_PAINT_SEQUENCE);
        Self { paints }
    }

    /// The `index`-th paint, wrapping around the sequence.
    pub fn paint(&self, index: usize) -> Color {
        self.paints[index % self.paints.len()]
    }

    pub fn paints(&self) -> &[Color] {
        &self.paints
    }
}
