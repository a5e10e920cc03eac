use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, Timelike};
use thiserror::Error;

/// Calendar units understood by [`diff`], [`add`] and [`start_of`].
///
/// Duration conversions use a fixed factor table (1 day = 24 h,
/// 1 month = 30 days, 1 year = 12 months) — an approximation, not
/// calendar-exact arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl TimeUnit {
    /// Coarseness rank: year > month > day > hour > minute > second > ms.
    fn rank(self) -> u8 {
        match self {
            TimeUnit::Millisecond => 0,
            TimeUnit::Second => 1,
            TimeUnit::Minute => 2,
            TimeUnit::Hour => 3,
            TimeUnit::Day => 4,
            TimeUnit::Month => 5,
            TimeUnit::Year => 6,
        }
    }

    /// Milliseconds per unit under the fixed factor table.
    fn millis(self) -> i64 {
        match self {
            TimeUnit::Millisecond => 1,
            TimeUnit::Second => 1_000,
            TimeUnit::Minute => 60_000,
            TimeUnit::Hour => 3_600_000,
            TimeUnit::Day => 86_400_000,
            TimeUnit::Month => 30 * 86_400_000,
            TimeUnit::Year => 360 * 86_400_000,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DateParseError {
    #[error("empty date string")]
    Empty,
    #[error("invalid number in date `{0}`")]
    BadNumber(String),
    #[error("no such calendar date `{0}`")]
    OutOfRange(String),
}

/// Display languages for month names, matching the locales the widget ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Language {
    #[default]
    En,
    Ru,
    PtBr,
}

impl Language {
    pub fn month_names(self) -> [&'static str; 12] {
        match self {
            Language::En => [
                "January", "February", "March", "April", "May", "June", "July", "August",
                "September", "October", "November", "December",
            ],
            Language::Ru => [
                "Январь", "Февраль", "Март", "Апрель", "Май", "Июнь", "Июль", "Август",
                "Сентябрь", "Октябрь", "Ноябрь", "Декабрь",
            ],
            Language::PtBr => [
                "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho", "Julho", "Agosto",
                "Setembro", "Outubro", "Novembro", "Dezembro",
            ],
        }
    }
}

/// Parse `Y-M-D[ H:M:S[.mmm]]` with custom separators.
///
/// Months are 1-indexed in the text. A missing time component means
/// midnight; the fractional part is interpreted as a fraction of a second
/// (`.5` is 500 ms). Time fields split on any of `time_seps`.
pub fn parse_with(
    text: &str,
    date_sep: char,
    time_seps: &[char],
) -> Result<NaiveDateTime, DateParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DateParseError::Empty);
    }

    let mut halves = text.splitn(2, ' ');
    let date_part = halves.next().unwrap_or_default();
    let time_part = halves.next();

    let nums = date_part
        .split(date_sep)
        .map(|v| {
            v.trim()
                .parse::<i32>()
                .map_err(|_| DateParseError::BadNumber(v.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if nums.len() != 3 {
        return Err(DateParseError::OutOfRange(text.to_string()));
    }

    let date = NaiveDate::from_ymd_opt(nums[0], nums[1] as u32, nums[2] as u32)
        .ok_or_else(|| DateParseError::OutOfRange(text.to_string()))?;

    let (mut h, mut min, mut s, mut ms) = (0u32, 0u32, 0u32, 0u32);
    if let Some(time_part) = time_part {
        let fields: Vec<&str> = time_part
            .split(|c: char| time_seps.contains(&c))
            .filter(|f| !f.is_empty())
            .collect();
        for (i, field) in fields.iter().enumerate().take(4) {
            if i == 3 {
                // fractional seconds
                let frac: f64 = format!("0.{field}")
                    .parse()
                    .map_err(|_| DateParseError::BadNumber(field.to_string()))?;
                ms = (frac * 1000.0).round() as u32;
                continue;
            }
            let v: u32 = field
                .parse()
                .map_err(|_| DateParseError::BadNumber(field.to_string()))?;
            match i {
                0 => h = v,
                1 => min = v,
                _ => s = v,
            }
        }
    }

    date.and_hms_milli_opt(h, min, s, ms)
        .ok_or_else(|| DateParseError::OutOfRange(text.to_string()))
}

/// [`parse_with`] using the default `-` date and `:`/`.` time separators.
pub fn parse(text: &str) -> Result<NaiveDateTime, DateParseError> {
    parse_with(text, '-', &[':', '.'])
}

// Token table for format(), longest first so MMMM is not shadowed by MM.
const FORMAT_TOKENS: &[&str] = &[
    "MMMM", "MMM", "YYYY", "SSS", "MM", "DD", "HH", "mm", "ss", "D",
];

/// Format an instant by token substitution.
///
/// Tokens: `YYYY MM DD HH mm ss SSS D MMM MMMM`. Matched longest-first with
/// a single left-to-right scan; unrecognized characters pass through.
pub fn format(d: NaiveDateTime, pattern: &str, lang: Language) -> String {
    let months = lang.month_names();
    let token_value = |token: &str| -> String {
        match token {
            "YYYY" => pad_num(d.year(), 4),
            "MM" => pad_num(d.month() as i32, 2),
            "DD" | "D" => pad_num(d.day() as i32, 2),
            "HH" => pad_num(d.hour() as i32, 2),
            "mm" => pad_num(d.minute() as i32, 2),
            "ss" => pad_num(d.second() as i32, 2),
            "SSS" => pad_num((d.nanosecond() / 1_000_000) as i32, 3),
            "MMMM" | "MMM" => months[d.month0() as usize].to_string(),
            _ => token.to_string(),
        }
    };

    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;
    'outer: while !rest.is_empty() {
        for token in FORMAT_TOKENS {
            if rest.starts_with(token) {
                out.push_str(&token_value(token));
                rest = &rest[token.len()..];
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

fn pad_num(v: i32, width: usize) -> String {
    format!("{v:0width$}")
}

/// `(a - b)` in whole `unit`s, truncated toward zero, using the fixed
/// factor table (months are 30 days, years 12 such months).
pub fn diff(a: NaiveDateTime, b: NaiveDateTime, unit: TimeUnit) -> i64 {
    let millis = (a - b).num_milliseconds();
    millis / unit.millis()
}

/// Add `qty` `unit`s. Month and year additions are calendar-aware and clamp
/// the day of month (`Jan 31 + 1 month` is `Feb 28`); day and finer units
/// are exact durations. Saturates at the chrono range limits.
pub fn add(d: NaiveDateTime, qty: i64, unit: TimeUnit) -> NaiveDateTime {
    let by_months = |months: i64| -> NaiveDateTime {
        if months >= 0 {
            d.checked_add_months(Months::new(months as u32)).unwrap_or(d)
        } else {
            d.checked_sub_months(Months::new((-months) as u32)).unwrap_or(d)
        }
    };
    match unit {
        TimeUnit::Year => by_months(qty * 12),
        TimeUnit::Month => by_months(qty),
        TimeUnit::Day => d.checked_add_signed(Duration::days(qty)).unwrap_or(d),
        TimeUnit::Hour => d.checked_add_signed(Duration::hours(qty)).unwrap_or(d),
        TimeUnit::Minute => d.checked_add_signed(Duration::minutes(qty)).unwrap_or(d),
        TimeUnit::Second => d.checked_add_signed(Duration::seconds(qty)).unwrap_or(d),
        TimeUnit::Millisecond => d
            .checked_add_signed(Duration::milliseconds(qty))
            .unwrap_or(d),
    }
}

/// Add a millisecond quantity given as `f64`, rounding to the nearest ms.
/// Drag inversion produces fractional hours; this keeps the precision.
pub fn add_millis_f64(d: NaiveDateTime, millis: f64) -> NaiveDateTime {
    d.checked_add_signed(Duration::milliseconds(millis.round() as i64))
        .unwrap_or(d)
}

/// Truncate to the start of `unit`: every field ranked strictly finer is
/// zeroed (the day of month is set to 1). Idempotent.
pub fn start_of(d: NaiveDateTime, unit: TimeUnit) -> NaiveDateTime {
    let rank = unit.rank();
    let reset = |field_unit: TimeUnit| field_unit.rank() < rank;

    let year = d.year();
    let month = if reset(TimeUnit::Month) { 1 } else { d.month() };
    let day = if reset(TimeUnit::Day) { 1 } else { d.day() };
    let hour = if reset(TimeUnit::Hour) { 0 } else { d.hour() };
    let minute = if reset(TimeUnit::Minute) { 0 } else { d.minute() };
    let second = if reset(TimeUnit::Second) { 0 } else { d.second() };
    let milli = if reset(TimeUnit::Millisecond) {
        0
    } else {
        d.nanosecond() / 1_000_000
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_milli_opt(hour, minute, second, milli))
        .unwrap_or(d)
}

/// Day count of the instant's month, with the Gregorian leap rule for
/// February.
pub fn days_in_month(d: NaiveDateTime) -> u32 {
    const DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let month0 = d.month0() as usize;
    if month0 != 1 {
        return DAYS[month0];
    }
    let year = d.year();
    if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
        29
    } else {
        28
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn dt_ms(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_milli_opt(h, mi, s, ms)
            .unwrap()
    }

    #[test]
    fn parse_date_only_is_midnight() {
        assert_eq!(parse("2024-01-05").unwrap(), dt(2024, 1, 5, 0, 0, 0));
    }

    #[test]
    fn parse_with_time_and_millis() {
        assert_eq!(
            parse("2024-01-05 10:15:30.500").unwrap(),
            dt_ms(2024, 1, 5, 10, 15, 30, 500)
        );
        // partial time fields default to zero
        assert_eq!(parse("2024-01-05 10:15").unwrap(), dt(2024, 1, 5, 10, 15, 0));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("not-a-date").is_err());
        assert!(parse("2024-13-01").is_err());
        assert!(parse("2024-02-30").is_err());
    }

    #[test]
    fn format_parse_round_trip_with_millis() {
        let d = dt_ms(2019, 7, 9, 23, 4, 5, 37);
        let text = format(d, "YYYY-MM-DD HH:mm:ss.SSS", Language::En);
        assert_eq!(text, "2019-07-09 23:04:05.037");
        assert_eq!(parse(&text).unwrap(), d);
    }

    #[test]
    fn format_matches_longest_token_first() {
        let d = dt(2024, 3, 5, 0, 0, 0);
        assert_eq!(format(d, "MMMM", Language::En), "March");
        assert_eq!(format(d, "MMM", Language::En), "March");
        assert_eq!(format(d, "MM", Language::En), "03");
        assert_eq!(format(d, "D MMM", Language::En), "05 March");
        assert_eq!(format(d, "MMMM", Language::Ru), "Март");
    }

    #[test]
    fn diff_truncates_toward_zero() {
        let a = dt(2024, 1, 1, 0, 0, 0);
        assert_eq!(diff(add(a, 36, TimeUnit::Hour), a, TimeUnit::Day), 1);
        assert_eq!(diff(add(a, -36, TimeUnit::Hour), a, TimeUnit::Day), -1);
        assert_eq!(diff(a, a, TimeUnit::Year), 0);
    }

    #[test]
    fn add_diff_inverse_for_exact_units() {
        let d = dt_ms(2022, 6, 15, 8, 30, 0, 250);
        let units = [
            TimeUnit::Millisecond,
            TimeUnit::Second,
            TimeUnit::Minute,
            TimeUnit::Hour,
            TimeUnit::Day,
        ];
        for unit in units {
            for n in [-37i64, -1, 0, 1, 5, 123] {
                assert_eq!(diff(add(d, n, unit), d, unit), n, "{unit:?} x {n}");
            }
        }
    }

    #[test]
    fn add_month_is_calendar_aware_and_clamps() {
        let d = dt(2023, 1, 31, 12, 0, 0);
        assert_eq!(add(d, 1, TimeUnit::Month), dt(2023, 2, 28, 12, 0, 0));
        assert_eq!(add(d, -2, TimeUnit::Month), dt(2022, 11, 30, 12, 0, 0));
        // a 30-day month round trips exactly under the factor table
        let apr = dt(2023, 4, 1, 0, 0, 0);
        assert_eq!(diff(add(apr, 1, TimeUnit::Month), apr, TimeUnit::Month), 1);
    }

    #[test]
    fn add_year_small_spans_survive_the_factor_table() {
        let d = dt(2023, 1, 1, 0, 0, 0);
        assert_eq!(diff(add(d, 1, TimeUnit::Year), d, TimeUnit::Year), 1);
        assert_eq!(diff(add(d, 2, TimeUnit::Year), d, TimeUnit::Year), 2);
    }

    #[test]
    fn start_of_zeroes_finer_fields() {
        let d = dt_ms(2024, 9, 17, 13, 45, 59, 999);
        assert_eq!(start_of(d, TimeUnit::Day), dt(2024, 9, 17, 0, 0, 0));
        assert_eq!(start_of(d, TimeUnit::Month), dt(2024, 9, 1, 0, 0, 0));
        assert_eq!(start_of(d, TimeUnit::Year), dt(2024, 1, 1, 0, 0, 0));
        assert_eq!(start_of(d, TimeUnit::Hour), dt(2024, 9, 17, 13, 0, 0));
        assert_eq!(start_of(d, TimeUnit::Millisecond), d);
    }

    #[test]
    fn start_of_is_idempotent() {
        let d = dt_ms(2021, 12, 31, 23, 59, 59, 999);
        for unit in [
            TimeUnit::Year,
            TimeUnit::Month,
            TimeUnit::Day,
            TimeUnit::Hour,
            TimeUnit::Minute,
            TimeUnit::Second,
        ] {
            let once = start_of(d, unit);
            assert_eq!(start_of(once, unit), once, "{unit:?}");
        }
    }

    #[test]
    fn days_in_month_leap_rule() {
        assert_eq!(days_in_month(dt(2000, 2, 1, 0, 0, 0)), 29);
        assert_eq!(days_in_month(dt(1900, 2, 1, 0, 0, 0)), 28);
        assert_eq!(days_in_month(dt(2024, 2, 1, 0, 0, 0)), 29);
        assert_eq!(days_in_month(dt(2023, 2, 1, 0, 0, 0)), 28);
        assert_eq!(days_in_month(dt(2023, 4, 1, 0, 0, 0)), 30);
        assert_eq!(days_in_month(dt(2023, 12, 1, 0, 0, 0)), 31);
    }
}
