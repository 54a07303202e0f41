//! Everything the card renders, derived from configuration, theme and results.
//!
//! Kept free of Dioxus so the same model drives the live card and the PNG
//! snapshot scene.

use super::compare::{compare, CompareOptions, ComparisonResult};
use super::data::{cell_text, ResultSet};
use crate::config::KpiConfig;
use crate::core::locale::Locale;
use crate::theme::KpiTheme;

#[derive(Debug, Clone, PartialEq)]
pub enum CardBody {
    /// The host reported a query error; shown verbatim.
    Error(String),
    Kpi(KpiDisplay),
}

#[derive(Debug, Clone, PartialEq)]
pub struct KpiDisplay {
    /// The big number, or the category value in grouped views.
    pub headline: String,
    /// Metric under the category when `displayMetric` is set.
    pub subline: Option<String>,
    pub comparison: Option<ComparisonLine>,
    pub font_size: f32,
    pub meta_font_size: f32,
    pub loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonLine {
    /// `<prefix><delta>%<suffix>`
    pub text: String,
    pub negative: bool,
    pub infinite: bool,
    /// Relative period for the "vs …" label, when it should be shown.
    pub period: Option<String>,
}

fn affix(config: &KpiConfig, core: &str) -> String {
    format!(
        "{}{core}{}",
        config.prefix.as_deref().unwrap_or(""),
        config.suffix.as_deref().unwrap_or("")
    )
}

pub fn compare_options(config: &KpiConfig, locale: Locale) -> CompareOptions {
    CompareOptions {
        decimal_places: config.decimal_places(),
        show_null_as_zero: config.show_null_values_as_zero,
        locale,
    }
}

/// Run the comparator for this configuration.
pub fn comparison_for(
    config: &KpiConfig,
    results: &ResultSet,
    previous: Option<&ResultSet>,
    locale: Locale,
) -> ComparisonResult {
    compare(
        results,
        previous,
        config.metric.as_ref(),
        config.dimension.as_ref(),
        &compare_options(config, locale),
    )
}

pub fn build_card(
    config: &KpiConfig,
    theme: &KpiTheme,
    results: &ResultSet,
    previous: Option<&ResultSet>,
    locale: Locale,
) -> CardBody {
    if let Some(error) = results.error.as_deref() {
        return CardBody::Error(error.to_string());
    }

    let comparison = comparison_for(config, results, previous, locale);
    let font_size = config
        .font_size
        .filter(|size| *size > 0.0)
        .unwrap_or(theme.kpi_font_size);
    let meta_font_size = theme.meta_font_size(font_size);

    let display = match config.dimension.as_ref() {
        Some(dimension) => KpiDisplay {
            headline: results
                .data
                .first()
                .and_then(|row| row.get(&dimension.name))
                .and_then(cell_text)
                .unwrap_or_default(),
            subline: (config.display_metric && config.metric.is_some())
                .then(|| affix(config, &comparison.current_formatted)),
            comparison: None,
            font_size,
            meta_font_size,
            loading: results.is_loading,
        },
        None => KpiDisplay {
            headline: affix(config, &comparison.current_formatted),
            subline: None,
            comparison: config
                .prev_time_filter
                .as_ref()
                .filter(|range| range.has_end())
                .map(|range| ComparisonLine {
                    text: affix(config, &format!("{}%", comparison.previous_formatted)),
                    negative: comparison.is_negative(),
                    infinite: comparison.is_infinite,
                    period: config
                        .show_prev_period_label
                        .then(|| range.relative_label().map(str::to_string))
                        .flatten(),
                }),
            font_size,
            meta_font_size,
            loading: results.is_loading,
        },
    };

    CardBody::Kpi(display)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::data::{DimensionRef, MetricRef, Row, TimeRange};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn rows(pairs: &[(&str, serde_json::Value)]) -> ResultSet {
        let mut row = Row::new();
        for (key, value) in pairs {
            row.insert(key.to_string(), value.clone());
        }
        ResultSet::from_rows(vec![row])
    }

    fn config() -> KpiConfig {
        KpiConfig {
            metric: Some(MetricRef::new("sales")),
            prefix: Some("$".into()),
            suffix: Some("k".into()),
            prev_time_filter: Some(TimeRange {
                from: Some("2024-01-01".into()),
                to: Some("2024-01-31".into()),
                relative_time_string: Some("last month".into()),
            }),
            ..KpiConfig::default()
        }
    }

    fn kpi(body: CardBody) -> KpiDisplay {
        match body {
            CardBody::Kpi(display) => display,
            CardBody::Error(err) => panic!("unexpected error body: {err}"),
        }
    }

    #[test]
    fn headline_and_comparison_are_affixed() {
        let display = kpi(build_card(
            &config(),
            &KpiTheme::default(),
            &rows(&[("sales", json!("80"))]),
            Some(&rows(&[("sales", json!("100"))])),
            Locale::EN_US,
        ));
        assert_eq!(display.headline, "$80k");
        let line = display.comparison.unwrap();
        assert_eq!(line.text, "$-20%k");
        assert!(line.negative);
        assert_eq!(line.period.as_deref(), Some("last month"));
        assert_eq!(display.font_size, 44.0);
        assert!((display.meta_font_size - 44.0 / 3.0).abs() < 1e-4);
    }

    #[test]
    fn comparison_hidden_without_range_end() {
        let mut config = config();
        config.prev_time_filter = Some(TimeRange::default());
        let display = kpi(build_card(
            &config,
            &KpiTheme::default(),
            &rows(&[("sales", json!("80"))]),
            None,
            Locale::EN_US,
        ));
        assert!(display.comparison.is_none());
    }

    #[test]
    fn period_label_respects_toggle() {
        let mut config = config();
        config.show_prev_period_label = false;
        let display = kpi(build_card(
            &config,
            &KpiTheme::default(),
            &rows(&[("sales", json!("80"))]),
            Some(&rows(&[("sales", json!("0"))])),
            Locale::EN_US,
        ));
        let line = display.comparison.unwrap();
        assert!(line.infinite);
        assert_eq!(line.text, "$∞%k");
        assert_eq!(line.period, None);
    }

    #[test]
    fn grouped_view_shows_category_and_optional_metric() {
        let mut config = config();
        config.dimension = Some(DimensionRef::new("region"));
        config.display_metric = true;
        config.font_size = Some(60.0);
        let display = kpi(build_card(
            &config,
            &KpiTheme::default(),
            &rows(&[("region", json!("EMEA")), ("sales", json!("10"))]),
            None,
            Locale::EN_US,
        ));
        assert_eq!(display.headline, "EMEA");
        // Grouped views skip the comparator, so the metric is the placeholder.
        assert_eq!(display.subline.as_deref(), Some("$0k"));
        assert!(display.comparison.is_none());
        assert_eq!(display.meta_font_size, 20.0);
    }

    #[test]
    fn upstream_error_short_circuits() {
        let results = ResultSet {
            error: Some("boom".into()),
            ..ResultSet::default()
        };
        let body = build_card(&config(), &KpiTheme::default(), &results, None, Locale::EN_US);
        assert_eq!(body, CardBody::Error("boom".into()));
    }
}
