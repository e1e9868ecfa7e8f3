use crate::error::{Error, Result};

/// A compiled decimal number pattern such as `#,##0.00`, `0.0%` or `'$'0`.
///
/// Supported syntax: `0` (required digit), `#` (optional digit), `,` (grouping), `.` (decimal
/// separator), `%` / `‰` (multiply by 100 / 1000), quoted literals, free prefix/suffix text and
/// an optional `;`-separated negative sub-pattern (only its prefix/suffix are used).
/// Rounding is half-even.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormat {
    pattern: String,
    positive_prefix: String,
    positive_suffix: String,
    negative_prefix: String,
    negative_suffix: String,
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    grouping: usize,
    multiplier: f64,
}

impl NumberFormat {
    pub fn parse(pattern: &str) -> Result<Self> {
        let err = |message: &str| Error::NumberFormat {
            pattern: pattern.to_string(),
            message: message.to_string(),
        };

        let (positive, negative) = split_subpatterns(pattern);
        let pos = parse_subpattern(positive).map_err(err)?;
        let (negative_prefix, negative_suffix) = match negative {
            Some(neg) => {
                let n = parse_subpattern(neg).map_err(err)?;
                (n.prefix, n.suffix)
            }
            None => (format!("-{}", pos.prefix), pos.suffix.clone()),
        };

        Ok(Self {
            pattern: pattern.to_string(),
            positive_prefix: pos.prefix,
            positive_suffix: pos.suffix,
            negative_prefix,
            negative_suffix,
            min_int: pos.min_int,
            min_frac: pos.min_frac,
            max_frac: pos.max_frac,
            grouping: pos.grouping,
            multiplier: pos.multiplier,
        })
    }

    /// General-purpose number format (`#,##0.###`).
    pub fn number() -> Self {
        Self::parse("#,##0.###").unwrap_or_else(|_| Self::integer())
    }

    /// Whole-percent format (`0%`).
    pub fn percent() -> Self {
        Self {
            pattern: "0%".to_string(),
            positive_suffix: "%".to_string(),
            negative_suffix: "%".to_string(),
            multiplier: 100.0,
            ..Self::integer()
        }
    }

    /// Plain integer format (`0`).
    pub fn integer() -> Self {
        Self {
            pattern: "0".to_string(),
            positive_prefix: String::new(),
            positive_suffix: String::new(),
            negative_prefix: "-".to_string(),
            negative_suffix: String::new(),
            min_int: 1,
            min_frac: 0,
            max_frac: 0,
            grouping: 0,
            multiplier: 1.0,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return "NaN".to_string();
        }
        let negative = value < 0.0;
        let (prefix, suffix) = if negative {
            (&self.negative_prefix, &self.negative_suffix)
        } else {
            (&self.positive_prefix, &self.positive_suffix)
        };

        let scaled = value.abs() * self.multiplier;
        if scaled.is_infinite() {
            return format!("{prefix}\u{221e}{suffix}");
        }

        let fixed = format!("{:.*}", self.max_frac, scaled);
        let (int_raw, frac_raw) = match fixed.split_once('.') {
            Some((i, f)) => (i, f),
            None => (fixed.as_str(), ""),
        };

        let mut frac = frac_raw.to_string();
        while frac.len() > self.min_frac && frac.ends_with('0') {
            frac.pop();
        }

        let mut int = int_raw.trim_start_matches('0').to_string();
        while int.len() < self.min_int {
            int.insert(0, '0');
        }
        if int.is_empty() && frac.is_empty() {
            int.push('0');
        }
        let int = group_digits(&int, self.grouping);

        // Rounded to zero: no sign.
        let is_zero = int.chars().chain(frac.chars()).all(|c| c == '0' || c == ',');
        let (prefix, suffix) = if negative && is_zero {
            (&self.positive_prefix, &self.positive_suffix)
        } else {
            (prefix, suffix)
        };

        if frac.is_empty() {
            format!("{prefix}{int}{suffix}")
        } else {
            format!("{prefix}{int}.{frac}{suffix}")
        }
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::number()
    }
}

fn group_digits(int: &str, size: usize) -> String {
    if size == 0 || int.len() <= size {
        return int.to_string();
    }
    let mut out = String::with_capacity(int.len() + int.len() / size);
    let lead = int.len() % size;
    for (i, ch) in int.chars().enumerate() {
        if i != 0 && (i + size - lead) % size == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn split_subpatterns(pattern: &str) -> (&str, Option<&str>) {
    let mut quoted = false;
    for (i, ch) in pattern.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            ';' if !quoted => return (&pattern[..i], Some(&pattern[i + 1..])),
            _ => {}
        }
    }
    (pattern, None)
}

struct SubPattern {
    prefix: String,
    suffix: String,
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    grouping: usize,
    multiplier: f64,
}

#[derive(PartialEq)]
enum Phase {
    Prefix,
    Number,
    Suffix,
}

fn parse_subpattern(p: &str) -> std::result::Result<SubPattern, &'static str> {
    let mut out = SubPattern {
        prefix: String::new(),
        suffix: String::new(),
        min_int: 0,
        min_frac: 0,
        max_frac: 0,
        grouping: 0,
        multiplier: 1.0,
    };

    let mut phase = Phase::Prefix;
    let mut quoted = false;
    let mut seen_decimal = false;
    let mut seen_int_zero = false;
    let mut seen_frac_hash = false;
    let mut last_group: Option<usize> = None;
    let mut int_digits = 0usize;
    let mut digit_count = 0usize;

    let mut chars = p.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                push_affix(&mut out, &phase, '\'');
            } else {
                quoted = !quoted;
            }
            continue;
        }
        if quoted {
            push_affix(&mut out, &phase, ch);
            continue;
        }

        let is_number_char = matches!(ch, '0' | '#' | ',' | '.');
        if is_number_char && phase == Phase::Prefix {
            phase = Phase::Number;
        }
        if is_number_char && phase == Phase::Suffix {
            return Err("unquoted special character in suffix");
        }
        if !is_number_char && phase == Phase::Number {
            phase = Phase::Suffix;
        }

        if phase != Phase::Number {
            match ch {
                '%' => out.multiplier = 100.0,
                '\u{2030}' => out.multiplier = 1000.0,
                _ => {}
            }
            push_affix(&mut out, &phase, ch);
            continue;
        }

        match ch {
            '.' => {
                if seen_decimal {
                    return Err("multiple decimal separators");
                }
                if last_group == Some(int_digits) {
                    return Err("grouping separator directly before decimal separator");
                }
                seen_decimal = true;
            }
            ',' => {
                if seen_decimal {
                    return Err("grouping separator in fraction");
                }
                last_group = Some(int_digits);
            }
            '0' if seen_decimal => {
                if seen_frac_hash {
                    return Err("'0' after '#' in fraction");
                }
                out.min_frac += 1;
                out.max_frac += 1;
                digit_count += 1;
            }
            '#' if seen_decimal => {
                seen_frac_hash = true;
                out.max_frac += 1;
                digit_count += 1;
            }
            '0' => {
                seen_int_zero = true;
                out.min_int += 1;
                int_digits += 1;
                digit_count += 1;
            }
            '#' => {
                if seen_int_zero {
                    return Err("'#' after '0' in integer part");
                }
                int_digits += 1;
                digit_count += 1;
            }
            _ => {}
        }
    }

    if quoted {
        return Err("unterminated quote");
    }
    if let Some(pos) = last_group {
        if pos == int_digits && !seen_decimal {
            return Err("grouping separator at end of integer part");
        }
        out.grouping = int_digits - pos;
    }
    if digit_count == 0 {
        out.min_int = 1;
    }
    Ok(out)
}

fn push_affix(out: &mut SubPattern, phase: &Phase, ch: char) {
    match phase {
        Phase::Prefix => out.prefix.push(ch),
        _ => out.suffix.push(ch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(pattern: &str, v: f64) -> String {
        NumberFormat::parse(pattern).unwrap().format(v)
    }

    #[test]
    fn integer_pattern_rounds_half_even() {
        assert_eq!(fmt("0", 2.5), "2");
        assert_eq!(fmt("0", 3.5), "4");
        assert_eq!(fmt("0", 10.0), "10");
        assert_eq!(fmt("0", -7.2), "-7");
    }

    #[test]
    fn fraction_digits_are_min_and_max_bounded() {
        assert_eq!(fmt("0.00", 1.5), "1.50");
        assert_eq!(fmt("0.##", 1.5), "1.5");
        assert_eq!(fmt("0.##", 2.0), "2");
        assert_eq!(fmt("#.##", 0.25), ".25");
        assert_eq!(fmt("0.0#", 3.14159), "3.14");
    }

    #[test]
    fn grouping_and_percent() {
        assert_eq!(fmt("#,##0", 1234567.0), "1,234,567");
        assert_eq!(fmt("#,##0.00", 1234.5), "1,234.50");
        assert_eq!(fmt("0.0%", 0.256), "25.6%");
        assert_eq!(fmt("0%", 1.0 / 3.0), "33%");
    }

    #[test]
    fn affixes_and_negative_subpattern() {
        assert_eq!(fmt("'$'0.00", 3.0), "$3.00");
        assert_eq!(fmt("0 units", 4.0), "4 units");
        assert_eq!(fmt("0;(0)", -4.0), "(4)");
        assert_eq!(fmt("0", -0.2), "0");
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        for p in ["0.0.0", "0.#0", "0#", "#,", "'0", "0.0,0"] {
            let err = NumberFormat::parse(p).unwrap_err();
            assert!(
                matches!(err, Error::NumberFormat { .. }),
                "pattern {p:?} should fail"
            );
        }
    }

    #[test]
    fn builtin_formats() {
        assert_eq!(NumberFormat::number().format(1234.56789), "1,234.568");
        assert_eq!(NumberFormat::percent().format(0.5), "50%");
        assert_eq!(NumberFormat::integer().format(9.99), "10");
    }
}
