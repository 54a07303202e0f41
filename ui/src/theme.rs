//! Theme tokens the card reads. The host owns the full theme; only the values
//! used for presentation here are modelled.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    #[default]
    Center,
    Right,
}

impl Alignment {
    pub fn as_css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }

    /// Flexbox value for `align-items` matching the text alignment.
    pub fn as_flex(self) -> &'static str {
        match self {
            Alignment::Left => "flex-start",
            Alignment::Center => "center",
            Alignment::Right => "flex-end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KpiTheme {
    pub font_family: String,
    pub font_color_normal: String,
    /// Base body font size in px.
    pub font_size: f32,
    pub kpi_font_size: f32,
    pub kpi_negative_color: String,
    pub kpi_alignment: Alignment,
    pub download_menu: DownloadMenuTheme,
}

impl Default for KpiTheme {
    fn default() -> Self {
        Self {
            font_family: "Inter, Helvetica, Arial, sans-serif".to_string(),
            font_color_normal: "#333942".to_string(),
            font_size: 14.0,
            kpi_font_size: 44.0,
            kpi_negative_color: "#FF6B6C".to_string(),
            kpi_alignment: Alignment::Center,
            download_menu: DownloadMenuTheme::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DownloadMenuTheme {
    pub background_color: String,
    pub border: String,
    pub border_radius: String,
    pub box_shadow: String,
    pub font_color: String,
    pub hover_background_color: String,
    pub hover_font_color: String,
}

impl Default for DownloadMenuTheme {
    fn default() -> Self {
        Self {
            background_color: "#FFFFFF".to_string(),
            border: "1px solid #E5E7EB".to_string(),
            border_radius: "6px".to_string(),
            box_shadow: "0 4px 12px rgba(0, 0, 0, 0.08)".to_string(),
            font_color: "#333942".to_string(),
            hover_background_color: "#F3F4F6".to_string(),
            hover_font_color: "#111827".to_string(),
        }
    }
}

impl KpiTheme {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Size of secondary lines: a third of the headline, never below the body size.
    pub fn meta_font_size(&self, headline: f32) -> f32 {
        (headline / 3.0).max(self.font_size)
    }

    /// CSS custom properties consumed by `kpi.css`.
    pub fn css_variables(&self) -> String {
        let menu = &self.download_menu;
        format!(
            "--kpi-font-family:{};--kpi-font-color:{};--kpi-negative-color:{};\
             --kpi-menu-bg:{};--kpi-menu-border:{};--kpi-menu-radius:{};--kpi-menu-shadow:{};\
             --kpi-menu-font-color:{};--kpi-menu-hover-bg:{};--kpi-menu-hover-color:{};",
            self.font_family,
            self.font_color_normal,
            self.kpi_negative_color,
            menu.background_color,
            menu.border,
            menu.border_radius,
            menu.box_shadow,
            menu.font_color,
            menu.hover_background_color,
            menu.hover_font_color,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_theme_keeps_defaults() {
        let theme = KpiTheme::from_json(r#"{"kpiFontSize": 60, "kpiAlignment": "left"}"#).unwrap();
        assert_eq!(theme.kpi_font_size, 60.0);
        assert_eq!(theme.kpi_alignment, Alignment::Left);
        assert_eq!(theme.font_size, 14.0);
        assert_eq!(theme.download_menu, DownloadMenuTheme::default());
    }

    #[test]
    fn meta_font_never_drops_below_body() {
        let theme = KpiTheme::default();
        assert_eq!(theme.meta_font_size(60.0), 20.0);
        assert_eq!(theme.meta_font_size(30.0), 14.0);
    }

    #[test]
    fn css_variables_include_menu_tokens() {
        let vars = KpiTheme::default().css_variables();
        assert!(vars.contains("--kpi-menu-border:1px solid #E5E7EB;"));
        assert!(vars.contains("--kpi-negative-color:#FF6B6C;"));
    }
}
