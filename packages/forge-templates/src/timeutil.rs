//! Date formatting and relative "time since" rendering.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};

use crate::i18n::Translator;
use crate::safe::{escape_html, SafeHtml};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 12 * MONTH;

/// RFC 1123 with numeric zone: `Mon, 02 Jan 2006 15:04:05 -0700`
pub const DATE_FMT_LONG: &str = "%a, %d %b %Y %H:%M:%S %z";

/// `Jan 02, 2006`
pub const DATE_FMT_SHORT: &str = "%b %d, %Y";

pub fn date_fmt_long<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    t.format(DATE_FMT_LONG).to_string()
}

pub fn date_fmt_short<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    t.format(DATE_FMT_SHORT).to_string()
}

/// Translated description of the largest whole unit in `diff` seconds
fn time_diff_label(diff: i64, lang: &str, tr: &dyn Translator) -> String {
    let n = |v: i64| vec![v.to_string()];
    match diff {
        d if d <= 0 => tr.tr(lang, "tool.now", &[]),
        d if d < 2 => tr.tr(lang, "tool.1s", &[]),
        d if d < MINUTE => tr.tr(lang, "tool.seconds", &n(d)),
        d if d < 2 * MINUTE => tr.tr(lang, "tool.1m", &[]),
        d if d < HOUR => tr.tr(lang, "tool.minutes", &n(d / MINUTE)),
        d if d < 2 * HOUR => tr.tr(lang, "tool.1h", &[]),
        d if d < DAY => tr.tr(lang, "tool.hours", &n(d / HOUR)),
        d if d < 2 * DAY => tr.tr(lang, "tool.1d", &[]),
        d if d < WEEK => tr.tr(lang, "tool.days", &n(d / DAY)),
        d if d < 2 * WEEK => tr.tr(lang, "tool.1w", &[]),
        d if d < MONTH => tr.tr(lang, "tool.weeks", &n(d / WEEK)),
        d if d < 2 * MONTH => tr.tr(lang, "tool.1mon", &[]),
        d if d < YEAR => tr.tr(lang, "tool.months", &n(d / MONTH)),
        d if d < 2 * YEAR => tr.tr(lang, "tool.1y", &[]),
        d => tr.tr(lang, "tool.years", &n(d / YEAR)),
    }
}

/// Relative description of `then` as seen from `now` ("3 days ago", "in 2 hours")
pub fn time_since(
    then: DateTime<Utc>,
    now: DateTime<Utc>,
    lang: &str,
    tr: &dyn Translator,
) -> String {
    let (label, diff) = if then > now {
        ("tool.from_now", then.timestamp() - now.timestamp())
    } else {
        ("tool.ago", now.timestamp() - then.timestamp())
    };
    if diff <= 0 {
        return tr.tr(lang, "tool.now", &[]);
    }
    let description = time_diff_label(diff, lang, tr);
    tr.tr(lang, label, &[description])
}

/// [`time_since`] wrapped in a span whose title holds the absolute date
pub fn html_time_since(
    then: DateTime<Utc>,
    now: DateTime<Utc>,
    lang: &str,
    tr: &dyn Translator,
) -> SafeHtml {
    SafeHtml::trusted(format!(
        r#"<span class="time-since" title="{}">{}</span>"#,
        escape_html(&date_fmt_long(&then)),
        escape_html(&time_since(then, now, lang, tr))
    ))
}

/// Unix seconds to a UTC timestamp; out-of-range values clamp to the epoch
pub fn from_unix(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

/// Parse an RFC 3339 timestamp keeping its offset
pub fn parse_rfc3339(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

/// Compact duration: `1h 2min 3s`, `5min`, `42s`
pub fn sec_to_time(duration: i64) -> String {
    let seconds = duration % 60;
    let minutes = (duration / 60) % 60;
    let hours = duration / 3600;

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}min", minutes));
    }
    if seconds > 0 {
        parts.push(format!("{}s", seconds));
    }
    parts.join(" ")
}

/// Milliseconds elapsed since `start`, e.g. `"12ms"`
pub fn load_time(start: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format!("{}ms", (now - start).num_milliseconds())
}
