use std::collections::HashMap;

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use once_cell::sync::Lazy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockFormat {
    Twelve,
    TwentyFour,
}

/// Words and formats used to display post timestamps.
#[derive(Debug, Clone)]
pub struct Locale {
    pub name: &'static str,
    pub default_time_fmt: ClockFormat,
    pub short_days: [&'static str; 7],
    pub days: [&'static str; 7],
    pub short_months: [&'static str; 12],
    pub months: [&'static str; 12],
    /// less than a minute
    pub ltm: &'static str,
    /// about a minute
    pub abm: &'static str,
    pub m: &'static str,
    pub h: &'static str,
    /// about some hours
    pub abh: &'static str,
    pub d: &'static str,
    pub at: &'static str,
    pub ds: &'static str,
    /// Two through five days, in order.
    pub shortds: [&'static str; 4],
}

pub static ENGLISH: Locale = Locale {
    name: "en",
    default_time_fmt: ClockFormat::Twelve,
    short_days: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
    days: [
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday",
    ],
    short_months: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    months: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
    ltm: "less than a minute ago",
    abm: "about a minute ago",
    m: "%d minutes ago",
    h: "about an hour ago",
    abh: "about %d hours ago",
    d: "yesterday",
    at: "at",
    ds: "%d days ago",
    shortds: [
        "two days ago",
        "three days ago",
        "four days ago",
        "five days ago",
    ],
};

static REGISTRY: Lazy<HashMap<&'static str, &'static Locale>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(ENGLISH.name, &ENGLISH);
    map
});

/// Resolve a configured locale name, falling back to English.
pub fn lookup(name: &str) -> &'static Locale {
    let key = name.trim().to_ascii_lowercase();
    let base = key.split(['-', '_']).next().unwrap_or_default();
    REGISTRY
        .get(key.as_str())
        .or_else(|| REGISTRY.get(base))
        .copied()
        .unwrap_or(&ENGLISH)
}

/// Format `date` using `%`-directives.
///
/// `%i` is the unpadded 12-hour hour and `%D` the unpadded day of month;
/// unknown directives are left untouched.
pub fn strftime<Tz: TimeZone>(date: &DateTime<Tz>, format: &str, locale: &Locale) -> String {
    let weekday = date.weekday().num_days_from_sunday() as usize;
    let month = date.month0() as usize;
    let hours = date.hour();

    let mut out = String::with_capacity(format.len() + 16);
    let mut chars = format.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        let Some(directive) = chars.next() else {
            out.push('%');
            break;
        };
        match directive {
            'a' => out.push_str(locale.short_days[weekday]),
            'A' => out.push_str(locale.days[weekday]),
            'b' => out.push_str(locale.short_months[month]),
            'B' => out.push_str(locale.months[month]),
            'd' => out.push_str(&format!("{:02}", date.day())),
            'D' => out.push_str(&date.day().to_string()),
            'H' => out.push_str(&format!("{:02}", hours)),
            'I' => out.push_str(&format!("{:02}", twelve_hour(hours))),
            'i' => out.push_str(&twelve_hour(hours).to_string()),
            'm' => out.push_str(&format!("{:02}", month + 1)),
            'M' => out.push_str(&format!("{:02}", date.minute())),
            'p' => out.push_str(if hours >= 12 { "PM" } else { "AM" }),
            'S' => out.push_str(&format!("{:02}", date.second())),
            'w' => out.push_str(&weekday.to_string()),
            'y' => out.push_str(&format!("{:02}", date.year().rem_euclid(100))),
            'Y' => out.push_str(&date.year().to_string()),
            '%' => out.push('%'),
            other => {
                out.push('%');
                out.push(other);
            }
        }
    }
    out
}

fn twelve_hour(hours: u32) -> u32 {
    match hours % 12 {
        0 => 12,
        h => h,
    }
}

/// Clock time in the locale's preferred convention, e.g. `3:04 PM`.
pub fn clock_time<Tz: TimeZone>(date: &DateTime<Tz>, locale: &Locale) -> String {
    match locale.default_time_fmt {
        ClockFormat::Twelve => strftime(date, "%i:%M %p", locale),
        ClockFormat::TwentyFour => strftime(date, "%H:%M", locale),
    }
}

/// How long ago `from` was, as of `now`.
pub fn relative<Tz: TimeZone, Tz2: TimeZone>(
    from: &DateTime<Tz>,
    now: &DateTime<Tz2>,
    locale: &Locale,
    include_time: bool,
) -> String {
    let delta = now.timestamp() - from.timestamp();
    let delta = delta.max(0);

    if delta < 60 {
        locale.ltm.to_string()
    } else if delta < 120 {
        locale.abm.to_string()
    } else if delta < 45 * 60 {
        locale.m.replace("%d", &(delta / 60).to_string())
    } else if delta < 120 * 60 {
        locale.h.to_string()
    } else if delta < 24 * 60 * 60 {
        locale.abh.replace("%d", &(delta / 3600).to_string())
    } else if delta < 48 * 60 * 60 {
        if include_time {
            format!("{} {} {}", locale.d, locale.at, clock_time(from, locale))
        } else {
            locale.d.to_string()
        }
    } else {
        let days = delta / 86_400;
        match days {
            2..=5 => locale.shortds[(days - 2) as usize].to_string(),
            _ => locale.ds.replace("%d", &days.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn at(rfc3339: &str) -> DateTime<chrono::FixedOffset> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap()
    }

    #[test]
    fn post_time_format_matches_feed_markup() {
        let date = at("2024-03-01T10:00:00Z");
        assert_eq!(
            strftime(&date, "%i:%M <small>%p</small> %D %b %Y", &ENGLISH),
            "10:00 <small>AM</small> 1 Mar 2024"
        );
    }

    #[test]
    fn noon_and_midnight_use_twelve() {
        assert_eq!(strftime(&at("2024-03-01T12:05:00Z"), "%i %p", &ENGLISH), "12 PM");
        assert_eq!(strftime(&at("2024-03-01T00:05:00Z"), "%I %p", &ENGLISH), "12 AM");
    }

    #[test]
    fn weekday_and_padding_directives() {
        let date = at("2024-03-03T09:07:05Z");
        assert_eq!(
            strftime(&date, "%a %A %B %d %m %H:%M:%S %w %y %% %q", &ENGLISH),
            "Sun Sunday March 03 03 09:07:05 0 24 % %q"
        );
    }

    #[test]
    fn relative_buckets() {
        let now = Utc::now();
        let cases = [
            (Duration::seconds(30), "less than a minute ago"),
            (Duration::seconds(90), "about a minute ago"),
            (Duration::minutes(10), "10 minutes ago"),
            (Duration::minutes(60), "about an hour ago"),
            (Duration::hours(5), "about 5 hours ago"),
            (Duration::hours(30), "yesterday"),
            (Duration::days(3), "three days ago"),
            (Duration::days(9), "9 days ago"),
        ];
        for (ago, expected) in cases {
            assert_eq!(relative(&(now - ago), &now, &ENGLISH, false), expected);
        }
    }

    #[test]
    fn yesterday_can_include_clock_time() {
        let from = at("2024-03-01T15:04:00Z");
        let now = at("2024-03-02T18:00:00Z");
        assert_eq!(relative(&from, &now, &ENGLISH, true), "yesterday at 3:04 PM");
    }

    #[test]
    fn unknown_locale_falls_back_to_english() {
        assert_eq!(lookup("en-GB").name, "en");
        assert_eq!(lookup("xx").name, "en");
    }
}
