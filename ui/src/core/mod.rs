//! Platform-agnostic building blocks: formatting, locales, dates, timers.

pub mod dates;
pub mod format;
pub mod locale;
pub mod platform;
pub mod timing;
