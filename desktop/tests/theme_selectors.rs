#![cfg(test)]
/*!
Selector lint for the shared KPI stylesheet.

Components in `ui/src` refer to classes by string. A renamed or dropped rule
only shows up as broken styling at runtime, so this checks the curated list
below plus every icon placement class against `ui/assets/theme/kpi.css`.

When adding structural markup to the card or the download menu, add its
selector here.
*/

const THEME_CSS: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../ui/assets/theme/kpi.css"
));

const REQUIRED_SELECTORS: &[&str] = &[
    ":root",
    "body {",
    // Card
    ".kpi-card {",
    ".kpi-card__header",
    ".kpi-card__title",
    ".kpi-card__description",
    ".kpi-card__body",
    ".kpi-card__headline",
    ".kpi-card__subline",
    ".kpi-card__comparison",
    ".kpi-card__comparison--negative",
    ".kpi-card__versus",
    ".kpi-card__error",
    ".kpi-card__loading",
    ".kpi-card__spinner",
    ".kpi-card--preparing",
    ".kpi-icon {",
    // Download menu
    ".kpi-download {",
    ".kpi-download__trigger",
    ".kpi-download__menu",
    ".kpi-download__item",
    ".kpi-download__item--focused",
    // Demo host
    ".kpi-demo {",
    ".kpi-demo__toolbar",
];

#[test]
fn stylesheet_contains_required_selectors() {
    let missing: Vec<&str> = REQUIRED_SELECTORS
        .iter()
        .copied()
        .filter(|sel| !THEME_CSS.contains(sel))
        .collect();

    if !missing.is_empty() {
        panic!(
            "Missing {} required CSS selectors in kpi.css:\n{}",
            missing.len(),
            missing.join("\n")
        );
    }
}

#[test]
fn every_icon_position_has_a_rule() {
    use ui::IconPosition::*;
    for position in [TopLeft, TopRight, Left, Right, BottomLeft, BottomRight] {
        let selector = format!(".{}", position.css_class());
        assert!(
            THEME_CSS.contains(&selector),
            "no rule for icon placement {selector}"
        );
    }
}
