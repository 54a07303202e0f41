//! Locale conventions for number and date presentation.
//!
//! The set is deliberately small: it covers the languages we ship `.ftl`
//! bundles for plus a couple of common host locales. Unknown tags fall back
//! to `en-US`, matching the fluent fallback language.

/// Order of the day / month / year fields in a short date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    MonthDayYear,
    DayMonthYear,
}

/// Clock convention used by date-time strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    TwelveHour,
    TwentyFourHour,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    /// Language tag this locale was resolved to.
    pub tag: &'static str,
    /// Thousands separator.
    pub group: &'static str,
    pub decimal: char,
    /// Integers with fewer digits than this are never grouped (`es` uses 5).
    pub min_grouping_digits: usize,
    pub date_order: DateOrder,
    pub date_separator: char,
    /// Zero-pad day and month in short dates.
    pub pad_date: bool,
    /// Text placed between the date and the time of day.
    pub date_time_joiner: &'static str,
    pub clock: Clock,
}

impl Locale {
    pub const EN_US: Locale = Locale {
        tag: "en-US",
        group: ",",
        decimal: '.',
        min_grouping_digits: 4,
        date_order: DateOrder::MonthDayYear,
        date_separator: '/',
        pad_date: false,
        date_time_joiner: ", ",
        clock: Clock::TwelveHour,
    };

    pub const EN_GB: Locale = Locale {
        tag: "en-GB",
        group: ",",
        decimal: '.',
        min_grouping_digits: 4,
        date_order: DateOrder::DayMonthYear,
        date_separator: '/',
        pad_date: true,
        date_time_joiner: ", ",
        clock: Clock::TwentyFourHour,
    };

    pub const ES_ES: Locale = Locale {
        tag: "es-ES",
        group: ".",
        decimal: ',',
        min_grouping_digits: 5,
        date_order: DateOrder::DayMonthYear,
        date_separator: '/',
        pad_date: false,
        date_time_joiner: ", ",
        clock: Clock::TwentyFourHour,
    };

    pub const FR_FR: Locale = Locale {
        tag: "fr-FR",
        group: "\u{202f}",
        decimal: ',',
        min_grouping_digits: 4,
        date_order: DateOrder::DayMonthYear,
        date_separator: '/',
        pad_date: true,
        date_time_joiner: " ",
        clock: Clock::TwentyFourHour,
    };

    pub const DE_DE: Locale = Locale {
        tag: "de-DE",
        group: ".",
        decimal: ',',
        min_grouping_digits: 4,
        date_order: DateOrder::DayMonthYear,
        date_separator: '.',
        pad_date: false,
        date_time_joiner: ", ",
        clock: Clock::TwentyFourHour,
    };

    /// Resolve a BCP-47 language tag (`fr`, `en-GB`, `es_ES`) to a locale.
    pub fn from_tag(tag: &str) -> Locale {
        let normalized = tag.trim().replace('_', "-").to_ascii_lowercase();
        let (language, region) = normalized
            .split_once('-')
            .map(|(lang, rest)| (lang.to_string(), rest.to_string()))
            .unwrap_or_else(|| (normalized.clone(), String::new()));

        match (language.as_str(), region.as_str()) {
            ("en", "gb") | ("en", "ie") | ("en", "au") | ("en", "nz") => Locale::EN_GB,
            ("en", _) => Locale::EN_US,
            ("es", _) => Locale::ES_ES,
            ("fr", _) => Locale::FR_FR,
            ("de", _) => Locale::DE_DE,
            _ => Locale::EN_US,
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::EN_US
    }
}
