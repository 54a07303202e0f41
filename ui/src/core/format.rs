//! Formatting helpers for presenting KPI values.
//!
//! `format_value` is the single entry point used by the card and the
//! comparator. It never panics on malformed input: numbers that fail to
//! parse and dates that cannot be read are returned wrapped but otherwise
//! untouched, so a bad upstream value stays visible instead of vanishing.

use serde::{Deserialize, Serialize};

use super::dates::{format_date, format_date_time, format_pattern, parse_time, parse_timestamp};
use super::locale::Locale;

/// How a raw value should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Number,
    Date,
    #[default]
    String,
}

/// Display wrappers attached to a measure (`$` before, ` kg` after).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posttext: Option<String>,
}

impl Meta {
    pub fn new(pretext: impl Into<String>, posttext: impl Into<String>) -> Self {
        Self {
            pretext: Some(pretext.into()),
            posttext: Some(posttext.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormatOptions {
    pub kind: ValueKind,
    /// Fixed fractional digits. `None` means 0–2 digits.
    pub decimal_places: Option<u32>,
    pub truncate_at: Option<usize>,
    pub date_format_pattern: Option<String>,
    pub meta: Option<Meta>,
}

impl FormatOptions {
    pub fn number() -> Self {
        Self {
            kind: ValueKind::Number,
            ..Self::default()
        }
    }

    pub fn date() -> Self {
        Self {
            kind: ValueKind::Date,
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::default()
    }

    pub fn decimal_places(mut self, decimal_places: Option<u32>) -> Self {
        self.decimal_places = decimal_places;
        self
    }

    pub fn truncate_at(mut self, limit: usize) -> Self {
        self.truncate_at = Some(limit);
        self
    }

    pub fn date_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.date_format_pattern = Some(pattern.into());
        self
    }

    pub fn meta(mut self, meta: Option<Meta>) -> Self {
        self.meta = meta;
        self
    }

    fn pretext(&self) -> &str {
        self.meta
            .as_ref()
            .and_then(|meta| meta.pretext.as_deref())
            .unwrap_or("")
    }

    fn posttext(&self) -> &str {
        self.meta
            .as_ref()
            .and_then(|meta| meta.posttext.as_deref())
            .unwrap_or("")
    }

    fn wrap(&self, core: &str) -> String {
        format!("{}{core}{}", self.pretext(), self.posttext())
    }
}

/// Format `raw` with the default (`en-US`) locale.
pub fn format_value(raw: Option<&str>, opts: &FormatOptions) -> Option<String> {
    format_value_in(raw, opts, &Locale::default())
}

/// Format `raw` for display. `None` stays `None`; callers decide what absence looks like.
pub fn format_value_in(raw: Option<&str>, opts: &FormatOptions, locale: &Locale) -> Option<String> {
    let raw = raw?;

    let formatted = match opts.kind {
        ValueKind::Number => match parse_float(raw) {
            Some(value) => opts.wrap(&format_number(value, opts.decimal_places, locale)),
            None => opts.wrap(raw),
        },
        ValueKind::Date => match parse_timestamp(raw) {
            Some(ts) if ts.is_day_granularity() => opts.wrap(&format_date(ts.at.date(), locale)),
            Some(ts) => opts.wrap(&format_date_time(ts.at, locale)),
            None => opts.wrap(raw),
        },
        ValueKind::String => format_text(raw, opts),
    };

    Some(formatted)
}

fn format_text(raw: &str, opts: &FormatOptions) -> String {
    if let Some(limit) = opts.truncate_at.filter(|limit| *limit > 0) {
        if raw.chars().count() > limit {
            // Cut mid-value: no posttext after the ellipsis.
            let head: String = raw.chars().take(limit).collect();
            return format!("{}{head}...", opts.pretext());
        }
        return opts.wrap(raw);
    }

    if let Some(pattern) = opts
        .date_format_pattern
        .as_deref()
        .filter(|pattern| !pattern.is_empty())
    {
        if !raw.is_empty() {
            return match parse_time(raw) {
                Some(at) => opts.wrap(&format_pattern(at, pattern)),
                None => opts.wrap(raw),
            };
        }
    }

    raw.to_string()
}

/// Locale-grouped number with either fixed or 0–2 fractional digits.
///
/// Ties round away from zero.
pub fn format_number(value: f64, decimal_places: Option<u32>, locale: &Locale) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-∞" } else { "∞" }.to_string();
    }

    let (min_digits, max_digits) = match decimal_places {
        Some(places) => (places as usize, places as usize),
        None => (0, 2),
    };

    let rounded = round_half_away(value, max_digits as u32);
    let fixed = format!("{:.*}", max_digits, rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut fraction = frac_part.to_string();
    while fraction.len() > min_digits && fraction.ends_with('0') {
        fraction.pop();
    }

    let mut out = String::with_capacity(fixed.len() + 4);
    let is_zero = !fixed.bytes().any(|b| matches!(b, b'1'..=b'9'));
    if rounded < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_digits(int_part, locale));
    if !fraction.is_empty() {
        out.push(locale.decimal);
        out.push_str(&fraction);
    }
    out
}

fn round_half_away(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places.min(15) as i32);
    let scaled = value * factor;
    // Past 2^53 there is no fractional part left to round.
    if !scaled.is_finite() || scaled.abs() >= 9.0e15 {
        return value;
    }
    scaled.round() / factor
}

fn group_digits(int_part: &str, locale: &Locale) -> String {
    if int_part.len() < locale.min_grouping_digits {
        return int_part.to_string();
    }

    let mut out = String::with_capacity(int_part.len() + int_part.len() / 3 * locale.group.len());
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            out.push_str(locale.group);
        }
        out.push(ch);
    }
    out
}

/// Lenient float parsing: reads the longest numeric prefix (`"12.5kg"` is
/// `12.5`), accepts a signed `Infinity`, and returns `None` when no digits lead
/// the string.
pub fn parse_float(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut cursor = 0;

    let negative = matches!(bytes.first(), Some(b'-'));
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        cursor = 1;
    }

    if s[cursor..].starts_with("Infinity") {
        return Some(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = cursor;
    while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
        cursor += 1;
    }
    let int_digits = &s[int_start..cursor];

    let mut frac_digits = "";
    if cursor < bytes.len() && bytes[cursor] == b'.' {
        let frac_start = cursor + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = &s[frac_start..frac_end];
        cursor = frac_end;
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }

    let mut exponent = "";
    if cursor < bytes.len() && matches!(bytes[cursor], b'e' | b'E') {
        let mut exp_end = cursor + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            exponent = &s[cursor..exp_end];
        }
    }

    let mut literal = String::with_capacity(cursor + 4);
    if negative {
        literal.push('-');
    }
    literal.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        literal.push('.');
        literal.push_str(frac_digits);
    }
    literal.push_str(exponent);

    literal.parse::<f64>().ok()
}
