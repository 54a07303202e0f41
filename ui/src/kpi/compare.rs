//! Current vs. previous period comparison for the headline metric.

use tracing::debug;

use super::data::{DimensionRef, MetricRef, ResultSet};
use crate::core::format::{format_value_in, parse_float, FormatOptions};
use crate::core::locale::Locale;

/// Shown in place of a percentage when the previous period is zero or unreadable.
pub const INFINITY_SYMBOL: &str = "∞";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
    pub decimal_places: Option<u32>,
    pub show_null_as_zero: bool,
    pub locale: Locale,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            decimal_places: None,
            show_null_as_zero: true,
            locale: Locale::EN_US,
        }
    }
}

impl CompareOptions {
    pub fn placeholder(&self) -> &'static str {
        if self.show_null_as_zero {
            "0"
        } else {
            "--"
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub current_formatted: String,
    pub previous_formatted: String,
    /// Whole percentage points as a float, so very large ratios stay exact
    /// to the rounding step. Zero whenever no comparison could be made.
    pub percent_delta: f64,
    pub is_infinite: bool,
}

impl ComparisonResult {
    fn placeholder(opts: &CompareOptions) -> Self {
        Self {
            current_formatted: opts.placeholder().to_string(),
            previous_formatted: opts.placeholder().to_string(),
            percent_delta: 0.0,
            is_infinite: false,
        }
    }

    pub fn is_negative(&self) -> bool {
        self.percent_delta < 0.0
    }
}

/// Derive the formatted headline value and period-over-period delta.
///
/// Grouped views, missing metrics and empty or unreadable current values all
/// yield the placeholder result. A missing previous value keeps the current
/// value and leaves the delta at zero.
pub fn compare(
    current: &ResultSet,
    previous: Option<&ResultSet>,
    metric: Option<&MetricRef>,
    dimension: Option<&DimensionRef>,
    opts: &CompareOptions,
) -> ComparisonResult {
    let mut result = ComparisonResult::placeholder(opts);

    let Some(metric) = metric.filter(|metric| !metric.name.is_empty()) else {
        return result;
    };
    if dimension.is_some() || current.is_empty() {
        return result;
    }

    let Some(n) = current
        .first_value(&metric.name)
        .and_then(|raw| parse_float(&raw))
    else {
        debug!(metric = %metric.name, "current value missing or unreadable");
        return result;
    };

    let number = FormatOptions::number()
        .decimal_places(opts.decimal_places)
        .meta(metric.meta.clone());
    let render = |value: f64| {
        format_value_in(Some(&value.to_string()), &number, &opts.locale)
            .unwrap_or_else(|| value.to_string())
    };

    result.current_formatted = render(n);

    let Some(raw_prev) = previous.and_then(|set| set.first_value(&metric.name)) else {
        return result;
    };

    let prev = parse_float(&raw_prev).unwrap_or(f64::NAN);
    if prev.is_nan() || prev == 0.0 {
        result.previous_formatted = INFINITY_SYMBOL.to_string();
        result.is_infinite = true;
        return result;
    }

    // Round the ratio first, then subtract.
    let ratio = ((n / prev) * 100.0).round();
    if !ratio.is_finite() {
        debug!(metric = %metric.name, "ratio overflowed; reporting as infinite");
        result.previous_formatted = INFINITY_SYMBOL.to_string();
        result.is_infinite = true;
        return result;
    }
    let delta = ratio - 100.0;
    result.percent_delta = delta;
    result.previous_formatted = render(delta);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::Meta;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn single(field: &str, value: Value) -> ResultSet {
        let mut row = super::super::data::Row::new();
        row.insert(field.to_string(), value);
        ResultSet::from_rows(vec![row])
    }

    fn metric() -> MetricRef {
        MetricRef::new("orders.count")
    }

    #[test]
    fn growth_is_rounded_before_subtracting() {
        let current = single("orders.count", json!("150"));
        let previous = single("orders.count", json!("100"));
        let result = compare(
            &current,
            Some(&previous),
            Some(&metric()),
            None,
            &CompareOptions::default(),
        );
        assert_eq!(result.current_formatted, "150");
        assert_eq!(result.percent_delta, 50.0);
        assert_eq!(result.previous_formatted, "50");
        assert!(!result.is_infinite);
    }

    #[test]
    fn decline_reports_negative_delta() {
        let current = single("orders.count", json!("100"));
        let previous = single("orders.count", json!("150"));
        let result = compare(
            &current,
            Some(&previous),
            Some(&metric()),
            None,
            &CompareOptions::default(),
        );
        assert_eq!(result.percent_delta, -33.0);
        assert_eq!(result.previous_formatted, "-33");
        assert!(result.is_negative());
    }

    #[test]
    fn zero_previous_is_infinite() {
        let current = single("orders.count", json!("12"));
        let previous = single("orders.count", json!("0"));
        let result = compare(
            &current,
            Some(&previous),
            Some(&metric()),
            None,
            &CompareOptions::default(),
        );
        assert!(result.is_infinite);
        assert_eq!(result.previous_formatted, INFINITY_SYMBOL);
        assert_eq!(result.percent_delta, 0.0);
        assert_eq!(result.current_formatted, "12");
    }

    #[test]
    fn unreadable_previous_is_infinite() {
        let current = single("orders.count", json!("12"));
        let previous = single("orders.count", json!("n/a"));
        let result = compare(
            &current,
            Some(&previous),
            Some(&metric()),
            None,
            &CompareOptions::default(),
        );
        assert!(result.is_infinite);
    }

    #[test]
    fn missing_previous_keeps_current_only() {
        let current = single("orders.count", json!("1234.5"));
        let result = compare(
            &current,
            None,
            Some(&metric()),
            None,
            &CompareOptions::default(),
        );
        assert_eq!(result.current_formatted, "1,234.5");
        assert_eq!(result.previous_formatted, "0");
        assert_eq!(result.percent_delta, 0.0);

        let null_previous = single("orders.count", Value::Null);
        let result = compare(
            &current,
            Some(&null_previous),
            Some(&metric()),
            None,
            &CompareOptions::default(),
        );
        assert_eq!(result.previous_formatted, "0");
        assert!(!result.is_infinite);
    }

    #[test]
    fn degenerate_inputs_fall_back_to_placeholder() {
        let opts = CompareOptions::default();
        let empty = ResultSet::default();
        let null_value = single("orders.count", Value::Null);
        let garbage = single("orders.count", json!("abc"));
        let other_field = single("orders.total", json!("5"));

        for current in [&empty, &null_value, &garbage, &other_field] {
            let result = compare(current, Some(&garbage), Some(&metric()), None, &opts);
            assert_eq!(result.current_formatted, "0");
            assert_eq!(result.percent_delta, 0.0);
            assert!(!result.is_infinite);
        }

        let result = compare(&garbage, None, None, None, &opts);
        assert_eq!(result.current_formatted, "0");
    }

    #[test]
    fn dashes_when_nulls_are_not_zero() {
        let opts = CompareOptions {
            show_null_as_zero: false,
            ..CompareOptions::default()
        };
        let result = compare(&ResultSet::default(), None, Some(&metric()), None, &opts);
        assert_eq!(result.current_formatted, "--");
        assert_eq!(result.previous_formatted, "--");
    }

    #[test]
    fn grouped_views_skip_comparison() {
        let current = single("orders.count", json!("150"));
        let previous = single("orders.count", json!("100"));
        let dimension = DimensionRef::new("orders.status");
        let result = compare(
            &current,
            Some(&previous),
            Some(&metric()),
            Some(&dimension),
            &CompareOptions::default(),
        );
        assert_eq!(result.current_formatted, "0");
        assert_eq!(result.percent_delta, 0.0);
    }

    #[test]
    fn meta_and_precision_apply_to_both_values() {
        let current = single("revenue", json!(200));
        let previous = single("revenue", json!(160));
        let metric = MetricRef::new("revenue").with_meta(Meta::new("$", ""));
        let opts = CompareOptions {
            decimal_places: Some(2),
            ..CompareOptions::default()
        };
        let result = compare(&current, Some(&previous), Some(&metric), None, &opts);
        assert_eq!(result.current_formatted, "$200.00");
        assert_eq!(result.percent_delta, 25.0);
        assert_eq!(result.previous_formatted, "$25.00");
    }

    #[test]
    fn huge_ratios_stay_in_float_range() {
        let previous = single("orders.count", json!("1"));
        let opts = CompareOptions::default();

        let falling = compare(
            &single("orders.count", json!("-1e20")),
            Some(&previous),
            Some(&metric()),
            None,
            &opts,
        );
        assert_eq!(falling.percent_delta, -1e22);
        assert!(falling.is_negative());
        assert_eq!(falling.previous_formatted, "-10,000,000,000,000,000,000,000");

        let rising = compare(
            &single("orders.count", json!("1e20")),
            Some(&previous),
            Some(&metric()),
            None,
            &opts,
        );
        assert_eq!(rising.percent_delta, 1e22);
        assert_eq!(rising.previous_formatted, "10,000,000,000,000,000,000,000");
        assert!(!rising.is_infinite);
    }

    #[test]
    fn overflowing_ratio_is_infinite() {
        let result = compare(
            &single("orders.count", json!("1e308")),
            Some(&single("orders.count", json!("1e-10"))),
            Some(&metric()),
            None,
            &CompareOptions::default(),
        );
        assert!(result.is_infinite);
        assert_eq!(result.previous_formatted, INFINITY_SYMBOL);
        assert_eq!(result.percent_delta, 0.0);
    }

    #[test]
    fn locale_controls_grouping() {
        let current = single("orders.count", json!("1234567.891"));
        let opts = CompareOptions {
            locale: Locale::DE_DE,
            ..CompareOptions::default()
        };
        let result = compare(&current, None, Some(&metric()), None, &opts);
        assert_eq!(result.current_formatted, "1.234.567,89");
    }
}
