//! Widget configuration as supplied by the host editor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::export::Capabilities;
use crate::kpi::data::{DimensionRef, MetricRef, TimeRange};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid widget configuration: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the optional icon sits inside the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconPosition {
    TopLeft,
    TopRight,
    #[default]
    Left,
    Right,
    BottomLeft,
    BottomRight,
}

impl IconPosition {
    pub fn css_class(self) -> &'static str {
        match self {
            IconPosition::TopLeft => "kpi-icon--top-left",
            IconPosition::TopRight => "kpi-icon--top-right",
            IconPosition::Left => "kpi-icon--left",
            IconPosition::Right => "kpi-icon--right",
            IconPosition::BottomLeft => "kpi-icon--bottom-left",
            IconPosition::BottomRight => "kpi-icon--bottom-right",
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiConfig {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metric: Option<MetricRef>,
    #[serde(default)]
    pub dimension: Option<DimensionRef>,
    /// Show the metric under the category when a dimension is selected.
    #[serde(default)]
    pub display_metric: bool,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    /// Decimal places; negative values mean "default precision".
    #[serde(default)]
    pub dps: Option<i32>,
    #[serde(default)]
    pub font_size: Option<f32>,
    #[serde(default = "default_true")]
    pub show_null_values_as_zero: bool,
    #[serde(default = "default_true")]
    pub show_prev_period_label: bool,
    #[serde(default)]
    pub icon_name: Option<String>,
    #[serde(default)]
    pub icon_position: IconPosition,
    #[serde(default, rename = "enableDownloadAsCSV")]
    pub enable_download_as_csv: bool,
    #[serde(default, rename = "enableDownloadAsPNG")]
    pub enable_download_as_png: bool,
    #[serde(default)]
    pub prev_time_filter: Option<TimeRange>,
}

impl Default for KpiConfig {
    fn default() -> Self {
        Self {
            title: None,
            description: None,
            metric: None,
            dimension: None,
            display_metric: false,
            prefix: None,
            suffix: None,
            dps: None,
            font_size: None,
            show_null_values_as_zero: true,
            show_prev_period_label: true,
            icon_name: None,
            icon_position: IconPosition::default(),
            enable_download_as_csv: false,
            enable_download_as_png: false,
            prev_time_filter: None,
        }
    }
}

impl KpiConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn decimal_places(&self) -> Option<u32> {
        self.dps.and_then(|dps| u32::try_from(dps).ok())
    }

    /// Seed for export filenames: the title, or a generic name when untitled.
    pub fn export_name(&self) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or("kpi")
            .to_string()
    }

    pub fn capabilities(&self, download_all: bool) -> Capabilities {
        Capabilities {
            table: self.enable_download_as_csv,
            snapshot: self.enable_download_as_png,
            download_all,
        }
    }
}
