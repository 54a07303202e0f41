//! Shared UI crate for Kpicard: the KPI card component, its formatting and
//! comparison logic, and the CSV/PNG export flow. Hosts live in `web/` and
//! `desktop/`.

pub mod config;
pub mod core;
pub mod demo;
pub mod export;
pub mod i18n;
pub mod kpi;
pub mod logging;
pub mod theme;

pub use config::{ConfigError, IconPosition, KpiConfig};
pub use kpi::KpiCard;
pub use theme::{Alignment, DownloadMenuTheme, KpiTheme};

/// Stylesheet for the card and its download menu; hosts inline it.
pub const KPI_CSS: &str = include_str!("../assets/theme/kpi.css");
