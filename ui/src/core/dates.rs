//! Timestamp parsing and locale / pattern based date presentation.

use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, Time, UtcOffset,
};

use super::locale::{Clock, DateOrder, Locale};

/// A parsed timestamp reduced to wall-clock time.
///
/// Values carrying an explicit offset are normalised to UTC; values without
/// one are kept as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub at: PrimitiveDateTime,
    pub has_offset: bool,
}

impl Timestamp {
    /// Day-granularity values arrive as midnight timestamps without an offset.
    pub fn is_day_granularity(&self) -> bool {
        !self.has_offset && self.at.time() == Time::MIDNIGHT
    }
}

/// Parse the ISO-ish timestamps hosts send (`2024-01-15`, `2024-01-15T00:00:00.000`,
/// `2024-01-15T10:30:00Z`). Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(with_offset) = OffsetDateTime::parse(raw, &Rfc3339) {
        let utc = with_offset.to_offset(UtcOffset::UTC);
        return Some(Timestamp {
            at: PrimitiveDateTime::new(utc.date(), utc.time()),
            has_offset: true,
        });
    }

    let normalized = raw.replacen(' ', "T", 1);
    let naive = PrimitiveDateTime::parse(
        &normalized,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            &normalized,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
    })
    .or_else(|_| {
        PrimitiveDateTime::parse(
            &normalized,
            format_description!("[year]-[month]-[day]T[hour]:[minute]"),
        )
    })
    .ok()
    .or_else(|| {
        Date::parse(&normalized, format_description!("[year]-[month]-[day]"))
            .ok()
            .map(|date| date.midnight())
    })?;

    Some(Timestamp {
        at: naive,
        has_offset: false,
    })
}

/// Wall-clock time for pattern formatting; offsets are folded into UTC.
pub fn parse_time(raw: &str) -> Option<PrimitiveDateTime> {
    parse_timestamp(raw).map(|ts| ts.at)
}

/// Short locale date, e.g. `1/15/2024` (en-US) or `15/01/2024` (fr-FR).
pub fn format_date(date: Date, locale: &Locale) -> String {
    let sep = locale.date_separator;
    let (day, month) = if locale.pad_date {
        (
            format!("{:02}", date.day()),
            format!("{:02}", u8::from(date.month())),
        )
    } else {
        (date.day().to_string(), u8::from(date.month()).to_string())
    };
    let year = date.year();

    match locale.date_order {
        DateOrder::MonthDayYear => format!("{month}{sep}{day}{sep}{year}"),
        DateOrder::DayMonthYear => format!("{day}{sep}{month}{sep}{year}"),
    }
}

/// Short locale date followed by the time of day.
pub fn format_date_time(at: PrimitiveDateTime, locale: &Locale) -> String {
    let date = format_date(at.date(), locale);
    let (hour, minute, second) = (at.hour(), at.minute(), at.second());
    let clock = match locale.clock {
        Clock::TwelveHour => {
            let suffix = if hour < 12 { "AM" } else { "PM" };
            let display_hour = match hour % 12 {
                0 => 12,
                h => h,
            };
            format!("{display_hour}:{minute:02}:{second:02} {suffix}")
        }
        Clock::TwentyFourHour => format!("{hour:02}:{minute:02}:{second:02}"),
    };
    format!("{date}{}{clock}", locale.date_time_joiner)
}

/// Apply a date-fns style pattern (`yyyy-MM-dd`, `MMM d, yyyy`, `HH:mm`, `'Q'Q yyyy`).
///
/// Quoted text is copied verbatim (`''` yields a single quote). Letters
/// outside the supported set are emitted unchanged.
pub fn format_pattern(at: PrimitiveDateTime, pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            i += 1;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push('\'');
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                out.push(chars[i]);
                i += 1;
            }
            continue;
        }

        if ch.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i] == ch {
                i += 1;
            }
            out.push_str(&render_token(at, ch, i - start));
            continue;
        }

        out.push(ch);
        i += 1;
    }

    out
}

fn render_token(at: PrimitiveDateTime, letter: char, width: usize) -> String {
    let month = at.month();
    let hour = at.hour();

    match (letter, width) {
        ('y', 2) => format!("{:02}", at.year().rem_euclid(100)),
        ('y', w) => format!("{:0w$}", at.year(), w = w),
        ('M' | 'L', 1) => u8::from(month).to_string(),
        ('M' | 'L', 2) => format!("{:02}", u8::from(month)),
        ('M' | 'L', 3) => month.to_string().chars().take(3).collect(),
        ('M' | 'L', 4) => month.to_string(),
        ('M' | 'L', _) => month.to_string().chars().take(1).collect(),
        ('d', 1) => at.day().to_string(),
        ('d', _) => format!("{:02}", at.day()),
        ('E', 1..=3) => at.weekday().to_string().chars().take(3).collect(),
        ('E', 4) => at.weekday().to_string(),
        ('E', _) => at.weekday().to_string().chars().take(1).collect(),
        ('H', 1) => hour.to_string(),
        ('H', _) => format!("{hour:02}"),
        ('h', w) => {
            let twelve = match hour % 12 {
                0 => 12,
                h => h,
            };
            if w == 1 {
                twelve.to_string()
            } else {
                format!("{twelve:02}")
            }
        }
        ('m', 1) => at.minute().to_string(),
        ('m', _) => format!("{:02}", at.minute()),
        ('s', 1) => at.second().to_string(),
        ('s', _) => format!("{:02}", at.second()),
        ('S', w) => {
            let nanos = format!("{:09}", at.nanosecond());
            nanos.chars().take(w.min(9)).collect()
        }
        ('a', _) => (if hour < 12 { "AM" } else { "PM" }).to_string(),
        ('Q', w) => {
            let quarter = (u8::from(month) - 1) / 3 + 1;
            match w {
                1 => quarter.to_string(),
                2 => format!("{quarter:02}"),
                3 => format!("Q{quarter}"),
                _ => format!("{} quarter", ordinal(quarter)),
            }
        }
        (other, w) => std::iter::repeat(other).take(w).collect(),
    }
}

fn ordinal(n: u8) -> String {
    let suffix = match n {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn midnight_without_offset_is_day_granularity() {
        let ts = parse_timestamp("2024-01-15T00:00:00.000").unwrap();
        assert!(ts.is_day_granularity());

        let with_time = parse_timestamp("2024-01-15T10:30:00.000").unwrap();
        assert!(!with_time.is_day_granularity());

        let utc_midnight = parse_timestamp("2024-01-15T00:00:00Z").unwrap();
        assert!(!utc_midnight.is_day_granularity());
    }

    #[test]
    fn offsets_are_folded_into_utc() {
        let ts = parse_timestamp("2024-03-01T09:15:00+02:00").unwrap();
        assert_eq!(ts.at, datetime!(2024-03-01 07:15:00));
    }

    #[test]
    fn plain_dates_parse_as_midnight() {
        let ts = parse_timestamp("2023-12-31").unwrap();
        assert_eq!(ts.at, datetime!(2023-12-31 00:00:00));
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn locale_dates() {
        let at = datetime!(2024-01-05 15:04:05);
        assert_eq!(format_date(at.date(), &Locale::EN_US), "1/5/2024");
        assert_eq!(format_date(at.date(), &Locale::FR_FR), "05/01/2024");
        assert_eq!(format_date(at.date(), &Locale::DE_DE), "5.1.2024");
        assert_eq!(format_date_time(at, &Locale::EN_US), "1/5/2024, 3:04:05 PM");
        assert_eq!(format_date_time(at, &Locale::FR_FR), "05/01/2024 15:04:05");
    }

    #[test]
    fn twelve_hour_clock_handles_midnight_and_noon() {
        let midnight = datetime!(2024-06-01 00:07:00);
        let noon = datetime!(2024-06-01 12:00:00);
        assert!(format_date_time(midnight, &Locale::EN_US).ends_with("12:07:00 AM"));
        assert!(format_date_time(noon, &Locale::EN_US).ends_with("12:00:00 PM"));
    }

    #[test]
    fn pattern_tokens() {
        let at = datetime!(2024-02-09 08:05:03.250);
        assert_eq!(format_pattern(at, "yyyy-MM-dd"), "2024-02-09");
        assert_eq!(format_pattern(at, "MMM d, yy"), "Feb 9, 24");
        assert_eq!(format_pattern(at, "MMMM yyyy"), "February 2024");
        assert_eq!(format_pattern(at, "EEE HH:mm:ss.SSS"), "Fri 08:05:03.250");
        assert_eq!(format_pattern(at, "h:mm a"), "8:05 AM");
        assert_eq!(format_pattern(at, "QQQ yyyy"), "Q1 2024");
    }

    #[test]
    fn pattern_quoted_literals() {
        let at = datetime!(2024-07-04 18:00:00);
        assert_eq!(format_pattern(at, "'Week of' MMM d"), "Week of Jul 4");
        assert_eq!(format_pattern(at, "HH'h' ''yy"), "18h '24");
    }
}
