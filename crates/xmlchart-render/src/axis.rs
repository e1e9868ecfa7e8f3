use chrono::{DateTime, Utc};
use serde::Serialize;
use xmlchart_core::{Color, NumberFormat};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Range {
    pub lower: f64,
    pub upper: f64,
}

impl Range {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn length(self) -> f64 {
        self.upper - self.lower
    }

    pub fn from_extent(extent: Option<(f64, f64)>) -> Option<Self> {
        extent.map(|(lower, upper)| Self { lower, upper })
    }

    pub fn include(self, value: f64) -> Self {
        Self {
            lower: self.lower.min(value),
            upper: self.upper.max(value),
        }
    }
}

/// A numeric value axis.
///
/// While auto-ranging, the visible range is derived from the data range: zero is optionally
/// included, then the lower and upper margins (fractions of the span) are added, without ever
/// pushing a bound across zero. Setting either bound switches auto-ranging off and freezes the
/// range; margin and zero-inclusion changes after that are recorded but no longer recompute it.
///
/// A symbol axis is a number axis whose integer positions are labelled with names; its
/// auto-range margins are a plain half unit on each side. A date axis reads values as
/// milliseconds since the Unix epoch and labels ticks with calendar dates or clock times.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberAxis {
    pub label: Option<String>,
    pub label_paint: Color,
    pub tick_label_paint: Color,
    pub line_paint: Color,
    pub symbols: Vec<String>,
    pub gridbands_visible: bool,
    pub integer_ticks: bool,
    date: bool,
    auto_range: bool,
    auto_range_includes_zero: bool,
    lower_margin: f64,
    upper_margin: f64,
    data_range: Option<Range>,
    range: Range,
}

impl NumberAxis {
    pub const DEFAULT_MARGIN: f64 = 0.05;
    pub const MIN_AUTO_RANGE: f64 = 1e-8;
    const SYMBOL_MARGIN: f64 = 0.5;

    pub fn new(label: Option<String>, data_range: Option<Range>) -> Self {
        let mut axis = Self {
            label,
            label_paint: Color::BLACK,
            tick_label_paint: Color::DARK_GRAY,
            line_paint: Color::GRAY,
            symbols: Vec::new(),
            gridbands_visible: false,
            integer_ticks: false,
            date: false,
            auto_range: true,
            auto_range_includes_zero: true,
            lower_margin: Self::DEFAULT_MARGIN,
            upper_margin: Self::DEFAULT_MARGIN,
            data_range,
            range: Range::new(0.0, 1.0),
        };
        axis.auto_adjust_range();
        axis
    }

    pub fn symbol(label: Option<String>, symbols: Vec<String>, data_range: Option<Range>) -> Self {
        let mut axis = Self::new(label, data_range);
        axis.symbols = symbols;
        axis.integer_ticks = true;
        axis.auto_adjust_range();
        axis
    }

    /// A time axis; zero is never included in its auto-range.
    pub fn date(label: Option<String>, data_range: Option<Range>) -> Self {
        let mut axis = Self::new(label, data_range);
        axis.date = true;
        axis.set_auto_range_includes_zero(false);
        axis
    }

    pub fn is_date_axis(&self) -> bool {
        self.date
    }

    pub fn is_symbol_axis(&self) -> bool {
        !self.symbols.is_empty()
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn is_auto_range(&self) -> bool {
        self.auto_range
    }

    pub fn auto_range_includes_zero(&self) -> bool {
        self.auto_range_includes_zero
    }

    pub fn margins(&self) -> (f64, f64) {
        (self.lower_margin, self.upper_margin)
    }

    pub fn set_auto_range_includes_zero(&mut self, flag: bool) {
        self.auto_range_includes_zero = flag;
        if self.auto_range {
            self.auto_adjust_range();
        }
    }

    pub fn set_lower_margin(&mut self, margin: f64) {
        self.lower_margin = margin;
        if self.auto_range {
            self.auto_adjust_range();
        }
    }

    pub fn set_upper_margin(&mut self, margin: f64) {
        self.upper_margin = margin;
        if self.auto_range {
            self.auto_adjust_range();
        }
    }

    /// Freezes the range with a new upper bound. A bound at or below the current lower bound
    /// yields a unit range ending at `value`.
    pub fn set_upper_bound(&mut self, value: f64) {
        if self.range.lower < value {
            self.set_range(self.range.lower, value);
        } else {
            self.set_range(value - 1.0, value);
        }
    }

    /// Freezes the range with a new lower bound. A bound at or above the current upper bound
    /// yields a unit range starting at `value`.
    pub fn set_lower_bound(&mut self, value: f64) {
        if self.range.upper > value {
            self.set_range(value, self.range.upper);
        } else {
            self.set_range(value, value + 1.0);
        }
    }

    pub fn set_range(&mut self, lower: f64, upper: f64) {
        self.auto_range = false;
        self.range = Range::new(lower, upper);
    }

    fn auto_adjust_range(&mut self) {
        let data = self.data_range.unwrap_or(Range::new(0.0, 1.0));
        let (mut lower, mut upper) = (data.lower, data.upper);
        if self.auto_range_includes_zero {
            lower = lower.min(0.0);
            upper = upper.max(0.0);
        }

        if upper - lower < Self::MIN_AUTO_RANGE {
            let adjust = if lower == 0.0 { 0.5 } else { lower.abs() / 10.0 };
            lower -= adjust;
            upper += adjust;
        }

        if self.is_symbol_axis() {
            self.range = Range::new(lower - Self::SYMBOL_MARGIN, upper + Self::SYMBOL_MARGIN);
            return;
        }

        let span = upper - lower;
        let (lower_pad, upper_pad) = (self.lower_margin * span, self.upper_margin * span);
        upper = if upper <= 0.0 {
            (upper + upper_pad).min(0.0)
        } else {
            upper + upper_pad
        };
        lower = if lower >= 0.0 {
            (lower - lower_pad).max(0.0)
        } else {
            lower - lower_pad
        };

        self.range = Range::new(lower, upper);
    }

    /// Maps `value` onto the pixel interval where `start` shows the lower bound.
    pub fn value_to_px(&self, value: f64, start: f64, end: f64) -> f64 {
        let span = self.range.length();
        if span == 0.0 || !span.is_finite() {
            return (start + end) / 2.0;
        }
        start + (value - self.range.lower) / span * (end - start)
    }

    /// Smallest standard tick unit that keeps ticks at least `min_spacing` pixels apart.
    pub fn tick_unit(&self, length: f64, min_spacing: f64) -> f64 {
        let span = self.range.length();
        if !(span > 0.0 && span.is_finite() && length > 0.0) {
            return 1.0;
        }
        let raw = span * min_spacing / length;
        if self.date {
            return DATE_UNITS
                .iter()
                .copied()
                .find(|unit| *unit >= raw)
                .unwrap_or_else(|| (raw / YEAR_MS).ceil() * YEAR_MS);
        }
        let steps: &[f64] = if self.integer_ticks {
            &[1.0, 2.0, 5.0]
        } else {
            &[1.0, 2.5, 5.0]
        };
        let mut magnitude = 10f64.powf(raw.log10().floor());
        if self.integer_ticks {
            magnitude = magnitude.max(1.0);
        }
        loop {
            for step in steps {
                let unit = step * magnitude;
                if unit >= raw {
                    return unit;
                }
            }
            magnitude *= 10.0;
        }
    }

    /// Tick values within the visible range, at multiples of `unit`.
    pub fn ticks(&self, unit: f64) -> Vec<f64> {
        let Range { lower, upper } = self.range;
        if !(unit > 0.0 && lower.is_finite() && upper.is_finite()) {
            return Vec::new();
        }
        let first = (lower / unit).ceil();
        let eps = unit * 1e-9;
        (0..1000)
            .map(|i| (first + f64::from(i)) * unit)
            .take_while(|v| *v <= upper + eps)
            .collect()
    }

    pub fn tick_label(&self, value: f64, unit: f64) -> String {
        if self.is_symbol_axis() {
            let index = value.round();
            if (value - index).abs() > 1e-9 || index < 0.0 {
                return String::new();
            }
            return self
                .symbols
                .get(index as usize)
                .cloned()
                .unwrap_or_default();
        }
        if self.date {
            return date_label(value, unit);
        }
        tick_format(unit).format(value)
    }
}

const SECOND_MS: f64 = 1000.0;
const MINUTE_MS: f64 = 60.0 * SECOND_MS;
const HOUR_MS: f64 = 60.0 * MINUTE_MS;
const DAY_MS: f64 = 24.0 * HOUR_MS;
const YEAR_MS: f64 = 365.0 * DAY_MS;

const DATE_UNITS: [f64; 16] = [
    SECOND_MS,
    5.0 * SECOND_MS,
    15.0 * SECOND_MS,
    30.0 * SECOND_MS,
    MINUTE_MS,
    5.0 * MINUTE_MS,
    15.0 * MINUTE_MS,
    30.0 * MINUTE_MS,
    HOUR_MS,
    6.0 * HOUR_MS,
    12.0 * HOUR_MS,
    DAY_MS,
    7.0 * DAY_MS,
    30.0 * DAY_MS,
    91.0 * DAY_MS,
    YEAR_MS,
];

fn date_label(millis: f64, unit: f64) -> String {
    let Some(dt) = DateTime::<Utc>::from_timestamp_millis(millis.round() as i64) else {
        return String::new();
    };
    let pattern = if unit >= DAY_MS {
        "%Y-%m-%d"
    } else if unit >= MINUTE_MS {
        "%H:%M"
    } else {
        "%H:%M:%S"
    };
    dt.format(pattern).to_string()
}

fn tick_format(unit: f64) -> NumberFormat {
    let mut decimals = 0usize;
    let mut scaled = unit;
    while (scaled - scaled.round()).abs() > 1e-9 && decimals < 10 {
        scaled *= 10.0;
        decimals += 1;
    }
    let pattern = if decimals == 0 {
        "#,##0".to_string()
    } else {
        format!("#,##0.{}", "0".repeat(decimals))
    };
    NumberFormat::parse(&pattern).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn auto_range_includes_zero_and_margins() {
        let axis = NumberAxis::new(None, Some(Range::new(10.0, 20.0)));
        let r = axis.range();
        assert_eq!(r.lower, 0.0);
        assert!(close(r.upper, 21.0), "{r:?}");
    }

    #[test]
    fn margins_recompute_only_while_auto_ranging() {
        let mut axis = NumberAxis::new(None, Some(Range::new(10.0, 20.0)));
        axis.set_auto_range_includes_zero(false);
        assert!(close(axis.range().lower, 9.5));
        assert!(close(axis.range().upper, 20.5));

        axis.set_upper_margin(0.5);
        assert!(close(axis.range().upper, 25.0));

        axis.set_upper_bound(30.0);
        assert!(!axis.is_auto_range());
        assert!(close(axis.range().lower, 9.5));
        axis.set_lower_margin(0.9);
        assert!(close(axis.range().lower, 9.5));
        assert_eq!(axis.margins(), (0.9, 0.5));
    }

    #[test]
    fn crossing_bounds_collapse_to_unit_ranges() {
        let mut axis = NumberAxis::new(None, Some(Range::new(0.0, 10.0)));
        axis.set_upper_bound(-5.0);
        assert_eq!(axis.range(), Range::new(-6.0, -5.0));
        axis.set_lower_bound(3.0);
        assert_eq!(axis.range(), Range::new(3.0, 4.0));
    }

    #[test]
    fn sticky_zero_keeps_all_negative_data_below_zero() {
        let axis = NumberAxis::new(None, Some(Range::new(-8.0, -2.0)));
        assert_eq!(axis.range().upper, 0.0);
        assert!(close(axis.range().lower, -8.4));
    }

    #[test]
    fn symbol_axis_pads_half_a_unit() {
        let mut axis = NumberAxis::symbol(
            None,
            vec!["a".into(), "b".into(), "c".into()],
            Some(Range::new(0.0, 2.0)),
        );
        axis.set_auto_range_includes_zero(false);
        assert_eq!(axis.range(), Range::new(-0.5, 2.5));
        assert_eq!(axis.tick_label(1.0, 1.0), "b");
        assert_eq!(axis.tick_label(1.5, 1.0), "");
        assert_eq!(axis.tick_label(7.0, 1.0), "");
    }

    #[test]
    fn tick_units_follow_standard_steps() {
        let axis = NumberAxis::new(None, Some(Range::new(0.0, 95.0)));
        // span 99.75 over 300px with 50px spacing → raw 16.6 → 25
        assert_eq!(axis.tick_unit(300.0, 50.0), 25.0);
        let ticks = axis.ticks(25.0);
        assert_eq!(ticks, vec![0.0, 25.0, 50.0, 75.0]);
        assert_eq!(axis.tick_label(1234.0, 25.0), "1,234");
        assert_eq!(axis.tick_label(0.25, 0.25), "0.25");
    }

    #[test]
    fn integer_ticks_never_go_below_one() {
        let mut axis = NumberAxis::new(None, Some(Range::new(0.0, 2.0)));
        axis.integer_ticks = true;
        assert_eq!(axis.tick_unit(500.0, 40.0), 1.0);
    }

    #[test]
    fn date_axis_labels_epoch_millis() {
        let day = 86_400_000.0;
        let axis = NumberAxis::date(None, Some(Range::new(0.0, 10.0 * day)));
        assert!(axis.is_date_axis());
        assert!(!axis.auto_range_includes_zero());
        let unit = axis.tick_unit(400.0, 80.0);
        assert_eq!(unit, 7.0 * day);
        assert_eq!(axis.tick_label(0.0, unit), "1970-01-01");
        assert_eq!(axis.tick_label(3_600_000.0, 60_000.0), "01:00");
    }

    #[test]
    fn degenerate_data_range_is_widened() {
        let mut axis = NumberAxis::new(None, Some(Range::new(5.0, 5.0)));
        axis.set_auto_range_includes_zero(false);
        let r = axis.range();
        assert!(r.lower < 5.0 && r.upper > 5.0, "{r:?}");
    }
}
