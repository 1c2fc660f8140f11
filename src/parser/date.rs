//! Date resolution for archival mail.
//!
//! Real archives carry every date shape imaginable: RFC 2822 with and without
//! zones, RFC 1036 two-digit years, `asctime`, dotted times, trailing garbage,
//! and pre-2000 clients that wrote the year as `100` for 2000. The resolver
//! locates a date-looking substring in each candidate header value, parses it
//! through an ordered cascade of strategies, then picks one canonical naive
//! timestamp:
//!
//! 1. Parse every `Date:` value.
//! 2. Keep the *safe* ones: year >= 1900 and not past the run's future cutoff.
//! 3. If none are safe, parse `Received:` / `X-Received:` and use whatever parses.
//! 4. If still none, millennium-correct the `Date:` values with year < 1900.
//! 5. Take the earliest survivor.
//!
//! Timezones are parsed for disambiguation and then discarded, never converted.

use std::num::NonZeroUsize;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use lru::LruCache;
use regex::Regex;
use tracing::{debug, trace};

use crate::model::header_map::HeaderMap;

/// Headers searched when no declared date is usable.
pub const FALLBACK_DATE_HEADERS: [&str; 2] = ["received", "x-received"];

/// Default grace window for "future" dates, in days.
pub const DEFAULT_FUTURE_GRACE_DAYS: i64 = 3;

/// Largest accepted grace window, in days.
pub const MAX_FUTURE_GRACE_DAYS: i64 = 3650;

/// Lengths of `"Fri, 15 Jun 2012 16:52:52"` and `"Fri, 5 Jun 2012 16:52:52"`.
const PREFIX_LENGTHS: [usize; 2] = [25, 24];

/// The run's notion of "now", fixed once per run.
///
/// Holds the future cutoff (now + grace window). Every message of a run is
/// judged against the same cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    cutoff: NaiveDateTime,
}

impl Clock {
    /// Clock anchored at the local wall-clock time.
    pub fn system(grace_days: i64) -> Self {
        Self::fixed(Local::now().naive_local(), grace_days)
    }

    /// Clock anchored at an explicit instant.
    ///
    /// A grace window past the representable range saturates the cutoff.
    pub fn fixed(now: NaiveDateTime, grace_days: i64) -> Self {
        let cutoff = Duration::try_days(grace_days)
            .and_then(|grace| now.checked_add_signed(grace))
            .unwrap_or(if grace_days < 0 {
                NaiveDateTime::MIN
            } else {
                NaiveDateTime::MAX
            });
        Self { cutoff }
    }

    /// Latest timestamp still considered "not in the future".
    pub fn cutoff(&self) -> NaiveDateTime {
        self.cutoff
    }

    /// Processing year used by the millennium correction and two-digit pivot.
    pub fn year(&self) -> i32 {
        self.cutoff.year()
    }
}

/// Precompiled date-shape patterns.
///
/// Built once at startup and shared by reference with every resolver.
#[derive(Debug, Clone)]
pub struct DatePatterns {
    finder: Regex,
}

impl Default for DatePatterns {
    fn default() -> Self {
        Self::new()
    }
}

impl DatePatterns {
    pub fn new() -> Self {
        let rfc2822_notz = concat!(
            r"(?:(?:Sun|Mon|Tue|Wed|Thu|Fri|Sat),\s+)?",
            r"(?:0[1-9]|[1-2]?[0-9]|3[01])\s+",
            r"(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+",
            r"(?:[0-1][0-9]{3}|[0-1][0-9]{2}|19[0-9]{2}|[2-9][0-9]{3}|[0-9]{2})\s+",
            r"(?:2[0-3]|[0-1][0-9]):(?:[0-5][0-9])(?::(?:60|[0-5][0-9]))?\s*",
        );
        let rfc1123 = r"\w{3}, \d{2} \w{3} \d{4} \d{2}:\d{2}:\d{2} \w{3}";
        let rfc1036 = r"\w+?, \d{2}-\w{3}-\d{2} \d{2}:\d{2}:\d{2} \w{3}";
        let asctime = r"\w{3} \w{3} +\d+? \d{2}:\d{2}:\d{2} \d{4}";

        let finder = Regex::new(&format!(
            "(?:{rfc2822_notz})|(?:{rfc1123})|(?:{rfc1036})|(?:{asctime})"
        ))
        .expect("valid date pattern");

        Self { finder }
    }

    /// Locate the first date-looking substring in `text`.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.finder.find(text).map(|m| m.as_str())
    }
}

/// Resolves the canonical date of messages within one run.
///
/// Owns a bounded memo of raw header value → parse result. One resolver is
/// used per list run; it is not shared across workers.
pub struct DateResolver<'p> {
    patterns: &'p DatePatterns,
    clock: Clock,
    memo: LruCache<String, Option<NaiveDateTime>>,
}

impl<'p> DateResolver<'p> {
    pub fn new(patterns: &'p DatePatterns, clock: Clock, memo_size: usize) -> Self {
        let capacity = NonZeroUsize::new(memo_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            patterns,
            clock,
            memo: LruCache::new(capacity),
        }
    }

    /// Number of raw values currently memoized.
    pub fn cached_entries(&self) -> usize {
        self.memo.len()
    }

    /// Resolve the date of a message from its headers.
    pub fn resolve(&mut self, headers: &HeaderMap) -> Option<NaiveDateTime> {
        let declared = headers.all("date");
        let fallback: Vec<&str> = FALLBACK_DATE_HEADERS
            .iter()
            .flat_map(|name| headers.all(name))
            .collect();
        self.resolve_values(&declared, &fallback)
    }

    /// Resolve from explicit declared and fallback values.
    pub fn resolve_values(
        &mut self,
        declared: &[&str],
        fallback: &[&str],
    ) -> Option<NaiveDateTime> {
        let options: Vec<NaiveDateTime> = declared
            .iter()
            .filter_map(|raw| self.parse_value(raw))
            .collect();
        debug!(count = options.len(), "Date options from the Date header");

        let mut safe: Vec<NaiveDateTime> = options
            .iter()
            .copied()
            .filter(|date| self.is_safe(date))
            .collect();

        if safe.is_empty() {
            let others: Vec<NaiveDateTime> = fallback
                .iter()
                .filter_map(|raw| self.parse_value(raw))
                .collect();
            if !others.is_empty() {
                debug!(count = others.len(), "Using dates from fallback headers");
                safe = others;
            }
        }

        if safe.is_empty() {
            safe = options
                .iter()
                .filter(|date| is_date_too_old(date))
                .map(|date| self.fix_millennium_date(*date))
                .collect();
            if !safe.is_empty() {
                debug!(count = safe.len(), "Only millennium dates found");
            }
        }

        safe.into_iter().min()
    }

    /// Parse one raw header value, memoized.
    pub fn parse_value(&mut self, raw: &str) -> Option<NaiveDateTime> {
        let key = raw.trim();
        if let Some(cached) = self.memo.get(key) {
            return *cached;
        }
        let parsed = self
            .patterns
            .find(key)
            .and_then(|found| parse_date_text(found, self.clock.year()));
        if parsed.is_none() {
            trace!(value = key, "No date found in header value");
        }
        self.memo.put(key.to_string(), parsed);
        parsed
    }

    /// Parsed, not before 1900 and not past the future cutoff.
    pub fn is_safe(&self, date: &NaiveDateTime) -> bool {
        !is_date_too_old(date) && *date <= self.clock.cutoff()
    }

    /// Correct a date whose year was written as an offset from 1900.
    ///
    /// Adds 1900 to the year only when the corrected year does not pass the
    /// processing year; otherwise the date is returned unchanged.
    pub fn fix_millennium_date(&self, date: NaiveDateTime) -> NaiveDateTime {
        let corrected = date.year() + 1900;
        if corrected <= self.clock.year() {
            if let Some(fixed) = date.with_year(corrected) {
                return fixed;
            }
        }
        debug!(year = date.year(), "Date is not a millennium date");
        date
    }
}

fn is_date_too_old(date: &NaiveDateTime) -> bool {
    date.year() < 1900
}

/// Parse a located date substring through the fallback cascade.
///
/// Order: free-form parser, strict RFC 2822, then on the text before any `(`:
/// `.` → `:` retry, fixed-length prefixes (trailing garbage), and `mail-parser`
/// as a last resort.
pub fn parse_date_text(text: &str, pivot_year: i32) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(date) = parse_free_form(text, pivot_year) {
        return Some(date);
    }

    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.naive_local());
    }

    let text = match text.find('(') {
        Some(pos) => text[..pos].trim(),
        None => text,
    };

    if let Some(date) = parse_free_form(&text.replace('.', ":"), pivot_year) {
        return Some(date);
    }

    for len in PREFIX_LENGTHS {
        if let Some(date) = parse_free_form(char_prefix(text, len).trim(), pivot_year) {
            return Some(date);
        }
    }

    mail_parser_date(text)
}

fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// Attempt to parse a date using `mail-parser`'s built-in parser.
fn mail_parser_date(input: &str) -> Option<NaiveDateTime> {
    use mail_parser::MessageParser;

    // Wrap input in a minimal RFC 5322 message so mail-parser can parse it
    let fake_msg = format!("Date: {input}\n\n");
    let parsed = MessageParser::default().parse(fake_msg.as_bytes())?;
    let dt = parsed.date()?.to_rfc3339();
    DateTime::parse_from_rfc3339(&dt)
        .ok()
        .map(|d| d.naive_local())
}

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Filler words tolerated between date parts.
const SKIP_WORDS: [&str; 3] = ["at", "on", "of"];

#[derive(Default)]
struct Fields {
    month: Option<u32>,
    numbers: Vec<(u32, usize)>,
    ymd: Option<(i32, u32, u32)>,
    time: Option<(u32, u32, u32)>,
    meridian: Option<bool>,
}

/// Free-form date parser.
///
/// Accepts day/month/year in any of the usual mail orders with a month name,
/// ISO `YYYY-MM-DD`, optional `HH:MM[:SS]`, and ignores weekday names,
/// `(comments)`, zone names and numeric offsets. Two-digit years pivot to the
/// century that puts them within 50 years of `pivot_year`; longer years are
/// taken literally. Unknown words make the parse fail.
pub fn parse_free_form(text: &str, pivot_year: i32) -> Option<NaiveDateTime> {
    let text = strip_comments(text);
    let mut fields = Fields::default();

    for token in text
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        read_token(token, &mut fields)?;
    }

    let (year, month, day) = match fields.ymd {
        Some(ymd) => ymd,
        None => {
            let month = fields.month?;
            let ((day, _), (year, year_digits)) = match fields.numbers.as_slice() {
                [a, b] if is_year_like(*a) => (*b, *a),
                [a, b] => (*a, *b),
                _ => return None,
            };
            let year = if year_digits <= 2 {
                pivot_two_digit_year(year, pivot_year)
            } else {
                i32::try_from(year).ok()?
            };
            (year, month, day)
        }
    };

    let (mut hour, minute, second) = fields.time.unwrap_or((0, 0, 0));
    match fields.meridian {
        Some(true) if hour < 12 => hour += 12,
        Some(false) if hour == 12 => hour = 0,
        _ => {}
    }

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

fn read_token(token: &str, fields: &mut Fields) -> Option<()> {
    if let Some(time) = parse_clock(token) {
        if fields.time.replace(time).is_some() {
            return None;
        }
        return Some(());
    }

    if is_numeric_offset(token) {
        return Some(());
    }

    if token.contains(['-', '/']) {
        let parts: Vec<&str> = token.split(['-', '/']).collect();
        if let [y, m, d] = parts.as_slice() {
            if y.len() == 4 && [y, m, d].iter().all(|p| is_digits(p)) {
                let ymd = (y.parse().ok()?, m.parse().ok()?, d.parse().ok()?);
                fields.ymd = Some(ymd);
                return Some(());
            }
        }
        for part in parts.into_iter().filter(|p| !p.is_empty()) {
            read_word_or_number(part, fields)?;
        }
        return Some(());
    }

    read_word_or_number(token, fields)
}

fn read_word_or_number(token: &str, fields: &mut Fields) -> Option<()> {
    if is_digits(token) {
        let value = token.parse().ok()?;
        fields.numbers.push((value, token.len()));
        return Some(());
    }

    if !token.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let lower = token.to_ascii_lowercase();
    if lower.len() >= 3 {
        if WEEKDAYS.iter().any(|day| day.starts_with(&lower)) {
            return Some(());
        }
        if let Some(idx) = MONTHS.iter().position(|m| m.starts_with(&lower)) {
            if fields.month.replace(idx as u32 + 1).is_some() {
                return None;
            }
            return Some(());
        }
    }

    match lower.as_str() {
        "am" | "a" => fields.meridian = Some(false),
        "pm" | "p" => fields.meridian = Some(true),
        w if SKIP_WORDS.contains(&w) => {}
        // Zone names only make sense after the time of day.
        _ if fields.time.is_some()
            && token.len() <= 5
            && token.chars().all(|c| c.is_ascii_uppercase()) => {}
        _ => return None,
    }
    Some(())
}

/// `HH:MM` or `HH:MM:SS`, fractional seconds dropped.
fn parse_clock(token: &str) -> Option<(u32, u32, u32)> {
    let parts: Vec<&str> = token.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    let seconds = parts.get(2).map(|s| s.split('.').next().unwrap_or(""));
    let mut values = [0u32; 3];
    for (slot, part) in values
        .iter_mut()
        .zip(parts[..2].iter().copied().chain(seconds))
    {
        if part.is_empty() || part.len() > 2 || !is_digits(part) {
            return None;
        }
        *slot = part.parse().ok()?;
    }
    let [h, m, s] = values;
    (h < 24 && m < 60 && s < 60).then_some((h, m, s))
}

fn is_numeric_offset(token: &str) -> bool {
    let Some(rest) = token.strip_prefix(['+', '-']) else {
        return false;
    };
    let digits: String = rest.chars().filter(|&c| c != ':').collect();
    (digits.len() == 2 || digits.len() == 4) && is_digits(&digits)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_year_like((value, digits): (u32, usize)) -> bool {
    digits >= 3 || value > 31
}

fn pivot_two_digit_year(two_digit: u32, pivot_year: i32) -> i32 {
    let year = two_digit as i32 + pivot_year / 100 * 100;
    if year >= pivot_year + 50 {
        year - 100
    } else if year < pivot_year - 50 {
        year + 100
    } else {
        year
    }
}

/// Drop `(...)` comments, including nested ones.
fn strip_comments(text: &str) -> String {
    let mut depth = 0usize;
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn clock() -> Clock {
        Clock::fixed(at("2025-12-21 00:00:00"), DEFAULT_FUTURE_GRACE_DAYS)
    }

    #[test]
    fn test_clock_cutoff_includes_grace() {
        assert_eq!(clock().cutoff(), at("2025-12-24 00:00:00"));
        assert_eq!(clock().year(), 2025);
    }

    #[test]
    fn test_clock_huge_grace_saturates() {
        let now = at("2025-12-21 00:00:00");
        assert_eq!(Clock::fixed(now, i64::MAX).cutoff(), NaiveDateTime::MAX);
        assert_eq!(Clock::fixed(now, i64::MIN).cutoff(), NaiveDateTime::MIN);
        assert_eq!(Clock::fixed(now, 400_000_000).cutoff(), NaiveDateTime::MAX);
    }

    #[test]
    fn test_find_rfc2822_in_received() {
        let patterns = DatePatterns::new();
        let found = patterns
            .find("from mx.example.org by lists.example.org; Tue, 17 Jul 2001 13:17:08 +0200")
            .unwrap();
        assert_eq!(found.trim(), "Tue, 17 Jul 2001 13:17:08");
    }

    #[test]
    fn test_find_other_shapes() {
        let patterns = DatePatterns::new();
        assert_eq!(
            patterns.find("Sunday, 06-Nov-94 08:49:37 GMT"),
            Some("Sunday, 06-Nov-94 08:49:37 GMT")
        );
        assert_eq!(
            patterns.find("Sun Nov  6 08:49:37 1994"),
            Some("Sun Nov  6 08:49:37 1994")
        );
        assert_eq!(patterns.find("no date in here"), None);
    }

    #[test]
    fn test_free_form_rfc2822_discards_zone() {
        assert_eq!(
            parse_free_form("Fri, 15 Jun 2012 16:52:52 +0200", 2025),
            Some(at("2012-06-15 16:52:52"))
        );
        assert_eq!(
            parse_free_form("Tue, 17 Jul 2001 13:17:08 GMT (Central European)", 2025),
            Some(at("2001-07-17 13:17:08"))
        );
    }

    #[test]
    fn test_free_form_rfc1036_and_asctime() {
        assert_eq!(
            parse_free_form("Sunday, 06-Nov-94 08:49:37 GMT", 2025),
            Some(at("1994-11-06 08:49:37"))
        );
        assert_eq!(
            parse_free_form("Sun Nov  6 08:49:37 1994", 2025),
            Some(at("1994-11-06 08:49:37"))
        );
    }

    #[test]
    fn test_free_form_iso_and_meridian() {
        assert_eq!(
            parse_free_form("2024-01-04 10:00:00", 2025),
            Some(at("2024-01-04 10:00:00"))
        );
        assert_eq!(
            parse_free_form("4 Jan 2024 10:15 PM", 2025),
            Some(at("2024-01-04 22:15:00"))
        );
    }

    #[test]
    fn test_free_form_rejects_garbage() {
        assert_eq!(parse_free_form("Mon, 3 Jan 2005 18.27.37", 2025), None);
        assert_eq!(parse_free_form("Fri, 15 Jun 2012 16:52:52garbage", 2025), None);
        assert_eq!(parse_free_form("Thu, 04 Foo 2024 10:00:00", 2025), None);
        assert_eq!(parse_free_form("GMT 10:00:00", 2025), None);
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(pivot_two_digit_year(94, 2025), 1994);
        assert_eq!(pivot_two_digit_year(78, 2025), 1978);
        assert_eq!(pivot_two_digit_year(12, 2025), 2012);
    }

    #[test]
    fn test_cascade_dotted_time() {
        assert_eq!(
            parse_date_text("Mon, 3 Jan 2005 18.27.37", 2025),
            Some(at("2005-01-03 18:27:37"))
        );
    }

    #[test]
    fn test_cascade_trailing_garbage_prefixes() {
        assert_eq!(
            parse_date_text("Fri, 15 Jun 2012 16:52:52garbage", 2025),
            Some(at("2012-06-15 16:52:52"))
        );
        assert_eq!(
            parse_date_text("Fri, 5 Jun 2012 16:52:52xx", 2025),
            Some(at("2012-06-05 16:52:52"))
        );
    }

    #[test]
    fn test_millennium_dates() {
        let patterns = DatePatterns::new();
        let resolver = DateResolver::new(&patterns, clock(), 16);
        let cases = [
            ("Mon, 3 Jan 78 18:27:37", "Mon, 3 Jan 1978 18:27:37"),
            ("Mon, 3 Jan 99 18:27:37", "Mon, 3 Jan 99 18:27:37"),
            ("Mon, 3 Jan 100 18:27:37", "Mon, 3 Jan 2000 18:27:37"),
            ("Mon, 3 Jan 0100 18:27:37", "Mon, 3 Jan 2000 18:27:37"),
            ("Mon, 3 Jan 101 18:27:37", "Mon, 3 Jan 2001 18:27:37"),
            ("Mon, 3 Jan 0120 18:27:37", "Mon, 3 Jan 2020 18:27:37"),
        ];
        for (found, expected) in cases {
            let found = parse_free_form(found, 2025).unwrap();
            let expected = parse_free_form(expected, 2025).unwrap();
            assert_eq!(resolver.fix_millennium_date(found), expected);
        }
    }

    #[test]
    fn test_millennium_boundary_is_inclusive() {
        // Correction applies while year + 1900 <= processing year (2025 here).
        let patterns = DatePatterns::new();
        let resolver = DateResolver::new(&patterns, clock(), 16);
        let at_boundary = at("0125-03-01 00:00:00");
        let past_boundary = at("0126-03-01 00:00:00");
        assert_eq!(
            resolver.fix_millennium_date(at_boundary),
            at("2025-03-01 00:00:00")
        );
        assert_eq!(resolver.fix_millennium_date(past_boundary), past_boundary);
    }

    #[test]
    fn test_resolve_picks_earliest_safe_date() {
        let patterns = DatePatterns::new();
        let mut resolver = DateResolver::new(&patterns, clock(), 16);
        let date = resolver.resolve_values(
            &[
                "Tue, 17 Jul 2001 13:17:08 +0200",
                "Mon, 16 Jul 2001 09:00:00 +0200",
            ],
            &[],
        );
        assert_eq!(date, Some(at("2001-07-16 09:00:00")));
    }

    #[test]
    fn test_resolve_future_date_uses_received() {
        let patterns = DatePatterns::new();
        let mut resolver = DateResolver::new(&patterns, clock(), 16);
        let date = resolver.resolve_values(
            &["Wed, 1 Jan 2031 00:00:00 +0000"],
            &[
                "from a by b; Tue, 17 Jul 2001 13:17:08 +0200",
                "from c by d; Tue, 17 Jul 2001 13:17:05 +0200",
            ],
        );
        assert_eq!(date, Some(at("2001-07-17 13:17:05")));
    }

    #[test]
    fn test_resolve_future_date_without_fallback_is_unknown() {
        let patterns = DatePatterns::new();
        let mut resolver = DateResolver::new(&patterns, clock(), 16);
        let date = resolver.resolve_values(&["Wed, 1 Jan 2031 00:00:00 +0000"], &[]);
        assert_eq!(date, None);
    }

    #[test]
    fn test_resolve_grace_window() {
        let patterns = DatePatterns::new();
        let mut resolver = DateResolver::new(&patterns, clock(), 16);
        let date = resolver.resolve_values(&["Tue, 23 Dec 2025 10:00:00 +0000"], &[]);
        assert_eq!(date, Some(at("2025-12-23 10:00:00")));
    }

    #[test]
    fn test_resolve_millennium_stage() {
        let patterns = DatePatterns::new();
        let mut resolver = DateResolver::new(&patterns, clock(), 16);
        let date = resolver.resolve_values(&["Mon, 3 Jan 100 18:27:37"], &[]);
        assert_eq!(date, Some(at("2000-01-03 18:27:37")));
    }

    #[test]
    fn test_resolve_unparseable_is_unknown() {
        let patterns = DatePatterns::new();
        let mut resolver = DateResolver::new(&patterns, clock(), 16);
        assert_eq!(resolver.resolve_values(&["yesterday-ish"], &["nothing"]), None);
    }

    #[test]
    fn test_resolve_from_header_map() {
        let patterns = DatePatterns::new();
        let mut resolver = DateResolver::new(&patterns, clock(), 16);
        let mut headers = HeaderMap::new();
        headers.insert("date", "not a date".into());
        headers.insert(
            "x-received",
            "by 10.0.0.1 with SMTP id x; Fri, 15 Jun 2012 16:52:52 -0700 (PDT)".into(),
        );
        assert_eq!(resolver.resolve(&headers), Some(at("2012-06-15 16:52:52")));
    }

    #[test]
    fn test_memo_is_keyed_by_raw_value() {
        let patterns = DatePatterns::new();
        let mut resolver = DateResolver::new(&patterns, clock(), 16);
        resolver.parse_value("Tue, 17 Jul 2001 13:17:08 +0200");
        resolver.parse_value("  Tue, 17 Jul 2001 13:17:08 +0200 ");
        resolver.parse_value("garbage");
        assert_eq!(resolver.cached_entries(), 2);
    }
}
