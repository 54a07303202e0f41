use dioxus::prelude::*;
use uuid::Uuid;

use super::data::ResultSet;
use super::display::{build_card, CardBody, ComparisonLine, KpiDisplay};
use crate::config::KpiConfig;
use crate::export::{
    DownloadMenu, ExportInputs, ExportState, SnapshotRegion, SnapshotScene, TableSource,
};
use crate::i18n::current_locale;
use crate::t;
use crate::theme::KpiTheme;

#[cfg(test)]
thread_local! {
    static CARD_BUILDS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Single-value KPI card with optional comparison line and download menu.
#[component]
pub fn KpiCard(
    config: KpiConfig,
    #[props(default)] theme: KpiTheme,
    results: ResultSet,
    prev_results: Option<ResultSet>,
    // Offered as "Download all (CSV)" when CSV export is enabled.
    on_download_all: Option<EventHandler<()>>,
) -> Element {
    let export_state = use_signal(ExportState::default);
    let region_id = use_hook(Uuid::new_v4);
    let locale = current_locale();

    // Menu and preparing changes re-render the card; the derived values only
    // follow configuration, theme, results and locale.
    let body = use_memo(use_reactive!(|config, theme, results, prev_results, locale| {
        #[cfg(test)]
        CARD_BUILDS.with(|count| count.set(count.get() + 1));
        build_card(&config, &theme, &results, prev_results.as_ref(), locale)
    }));
    let inputs = use_memo(use_reactive!(|config, theme, results, prev_results| {
        export_inputs(
            &config,
            &theme,
            &results,
            prev_results.as_ref(),
            &body.read(),
            region_id,
        )
    }));
    let capabilities = config.capabilities(on_download_all.is_some());
    let preparing = export_state().preparing;

    let style = format!(
        "{}--kpi-alignment:{};--kpi-justify:{};",
        theme.css_variables(),
        theme.kpi_alignment.as_css(),
        theme.kpi_alignment.as_flex()
    );
    let title = config.title.clone().filter(|title| !title.is_empty());
    let description = config.description.clone().filter(|text| !text.is_empty());
    let icon = config
        .icon_name
        .clone()
        .filter(|name| !name.is_empty())
        .map(|name| (name, config.icon_position.css_class()));
    let content = match body() {
        CardBody::Error(message) => {
            let label = t!("kpi-error-label");
            rsx! {
                div { class: "kpi-card__error", role: "alert",
                    strong { "{label}" }
                    " {message}"
                }
            }
        }
        CardBody::Kpi(display) => rsx! {
            KpiBody { display, icon }
        },
    };
    let card_class = if preparing {
        "kpi-card kpi-card--preparing"
    } else {
        "kpi-card"
    };

    rsx! {
        div { class: "{card_class}", style: "{style}",
            div { class: "kpi-card__header",
                div { class: "kpi-card__heading",
                    if let Some(title) = title {
                        h2 { class: "kpi-card__title", "{title}" }
                    }
                    if let Some(description) = description {
                        p { class: "kpi-card__description", "{description}" }
                    }
                }
                DownloadMenu {
                    capabilities,
                    inputs,
                    state: export_state,
                    on_download_all,
                }
            }
            {content}
        }
    }
}

#[component]
fn KpiBody(display: KpiDisplay, icon: Option<(String, &'static str)>) -> Element {
    if display.loading {
        let loading = t!("kpi-loading");
        return rsx! {
            div { class: "kpi-card__loading", role: "status", aria_label: "{loading}",
                span { class: "kpi-card__spinner" }
            }
        };
    }

    let headline_style = format!("font-size:{}px;", display.font_size);
    let meta_style = format!("font-size:{}px;", display.meta_font_size);
    let body_class = match &icon {
        Some((_, position)) => format!("kpi-card__body {position}"),
        None => "kpi-card__body".to_string(),
    };

    rsx! {
        div { class: "{body_class}",
            if let Some((name, _)) = icon {
                span { class: "kpi-icon kpi-icon-{name}", aria_hidden: "true" }
            }
            div { class: "kpi-card__values",
                div { class: "kpi-card__headline", style: "{headline_style}", "{display.headline}" }
                if let Some(subline) = display.subline.clone() {
                    div { class: "kpi-card__subline", style: "{meta_style}", "{subline}" }
                }
                if let Some(line) = display.comparison.clone() {
                    Comparison { line, style: meta_style.clone() }
                }
            }
        }
    }
}

#[component]
fn Comparison(line: ComparisonLine, style: String) -> Element {
    let class = if line.negative {
        "kpi-card__comparison kpi-card__comparison--negative"
    } else {
        "kpi-card__comparison"
    };
    let chevron = if line.negative { "▼" } else { "▲" };
    let versus = line
        .period
        .as_deref()
        .map(|period| t!("kpi-versus", period = period));

    rsx! {
        div { class: "{class}", style: "{style}",
            span { class: "kpi-card__chevron", aria_hidden: "true", "{chevron}" }
            span { class: "kpi-card__delta", "{line.text}" }
            if let Some(versus) = versus {
                span { class: "kpi-card__versus", "{versus}" }
            }
        }
    }
}

/// What the download menu works from. The snapshot region only exists
/// when PNG export is on and there is a value to draw.
pub(crate) fn export_inputs(
    config: &KpiConfig,
    theme: &KpiTheme,
    results: &ResultSet,
    previous: Option<&ResultSet>,
    body: &CardBody,
    region_id: Uuid,
) -> ExportInputs {
    let region = match body {
        CardBody::Kpi(display) if config.enable_download_as_png && !display.loading => {
            let scene = SnapshotScene::compose(config, theme, display, |period| {
                t!("kpi-versus", period = period)
            });
            Some(SnapshotRegion {
                id: region_id,
                scene,
            })
        }
        _ => None,
    };

    ExportInputs {
        name: config.export_name(),
        table: config
            .enable_download_as_csv
            .then(|| TableSource::from(results.clone())),
        baseline: previous.cloned(),
        region,
    }
}
