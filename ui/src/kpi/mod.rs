//! The KPI card: result-set model, comparison, display model and component.

pub mod compare;
pub mod data;
pub mod display;
pub mod view;

pub use compare::{compare, CompareOptions, ComparisonResult, INFINITY_SYMBOL};
pub use data::{DimensionRef, MetricRef, ResultSet, Row, TimeRange};
pub use display::{build_card, CardBody, ComparisonLine, KpiDisplay};
pub use view::KpiCard;
