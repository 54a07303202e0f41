//! Sample dashboard shared by the web and desktop hosts.

use dioxus::prelude::*;
use serde_json::json;
use tracing::{info, warn};

use crate::config::KpiConfig;
use crate::export::{export_table, TableSource};
use crate::kpi::{KpiCard, ResultSet, Row};
use crate::theme::KpiTheme;

struct Sample {
    config: &'static str,
    current: fn() -> ResultSet,
    previous: Option<fn() -> ResultSet>,
}

const SAMPLES: &[Sample] = &[
    Sample {
        config: r#"{
            "title": "Revenue",
            "description": "Gross revenue this month",
            "metric": { "name": "revenue", "title": "Revenue", "meta": { "pretext": "$" } },
            "dps": 2,
            "enableDownloadAsCSV": true,
            "enableDownloadAsPNG": true,
            "prevTimeFilter": { "from": "2024-04-01", "to": "2024-04-30", "relativeTimeString": "last month" }
        }"#,
        current: || rows(json!([{ "revenue": "128450.5" }])),
        previous: Some(|| rows(json!([{ "revenue": "112000" }]))),
    },
    Sample {
        config: r#"{
            "title": "Churned accounts",
            "metric": { "name": "churned" },
            "suffix": " accts",
            "enableDownloadAsCSV": true,
            "iconName": "alert",
            "iconPosition": "top_right",
            "prevTimeFilter": { "from": "2024-04-01", "to": "2024-04-30", "relativeTimeString": "last month" }
        }"#,
        current: || rows(json!([{ "churned": 42 }])),
        previous: Some(|| rows(json!([{ "churned": 0 }]))),
    },
    Sample {
        config: r#"{
            "title": "Top region",
            "metric": { "name": "orders" },
            "dimension": { "name": "region" },
            "displayMetric": true,
            "enableDownloadAsPNG": true
        }"#,
        current: || rows(json!([{ "region": "EMEA", "orders": "5120" }, { "region": "APAC", "orders": "4380" }])),
        previous: None,
    },
    Sample {
        config: r#"{ "title": "Broken query", "metric": { "name": "x" } }"#,
        current: || ResultSet {
            error: Some("column \"x\" does not exist".to_string()),
            ..ResultSet::default()
        },
        previous: None,
    },
];

fn rows(value: serde_json::Value) -> ResultSet {
    serde_json::from_value::<Vec<Row>>(value)
        .map(ResultSet::from_rows)
        .unwrap_or_default()
}

/// Grid of sample cards plus a language picker.
#[component]
pub fn Showcase() -> Element {
    let mut lang = use_signal(|| "en-US".to_string());
    let languages = crate::i18n::available_languages();

    let cards: Vec<(usize, KpiConfig, ResultSet, Option<ResultSet>)> = SAMPLES
        .iter()
        .enumerate()
        .filter_map(|(index, sample)| match KpiConfig::from_json(sample.config) {
            Ok(config) => Some((
                index,
                config,
                (sample.current)(),
                sample.previous.map(|previous| previous()),
            )),
            Err(err) => {
                warn!(index, error = %err, "skipping sample with invalid configuration");
                None
            }
        })
        .collect();

    let download_all = move |_: ()| {
        let everything: Vec<ResultSet> = SAMPLES.iter().map(|sample| (sample.current)()).collect();
        match export_table(Some(&TableSource::Many(everything)), None, "all-samples") {
            Ok(delivery) => info!(delivery = %delivery.describe(), "exported all samples"),
            Err(err) => warn!(error = %err, "download all failed"),
        }
    };

    rsx! {
        div { class: "kpi-demo__toolbar",
            select {
                value: "{lang}",
                onchange: move |evt| {
                    let tag = evt.value();
                    if let Err(err) = crate::i18n::set_language(&tag) {
                        warn!(tag = %tag, error = %err, "language switch failed");
                    }
                    lang.set(tag);
                },
                for tag in languages {
                    option { key: "{tag}", value: "{tag}", "{tag}" }
                }
            }
        }
        // Keyed by language so every card remounts with the new bundle.
        div { key: "{lang}", class: "kpi-demo",
            for (index, config, current, previous) in cards {
                KpiCard {
                    key: "{index}",
                    config,
                    theme: KpiTheme::default(),
                    results: current,
                    prev_results: previous,
                    on_download_all: download_all,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_parse() {
        for sample in SAMPLES {
            KpiConfig::from_json(sample.config).unwrap();
            assert!(!(sample.current)().is_empty() || (sample.current)().error.is_some());
        }
    }
}
