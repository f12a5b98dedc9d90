//! Field formatters: pure functions deriving display strings from raw fields.
//!
//! None of these fail: a missing field degrades to an empty string or to the
//! field being left out.

use chrono::NaiveDate;

/// Sentinel for the open end of a date range.
pub const PRESENT: &str = "Present";

/// Separator between contact items on screen and in the PDF tree.
pub const CONTACT_SEPARATOR: &str = " | ";

/// En dash between the two ends of a range.
const RANGE_DASH: &str = " \u{2013} ";

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Formats a date range.
///
/// | start | end | result |
/// |---|---|---|
/// | set | set | `start – end` |
/// | set | unset | `start – Present` |
/// | unset | set | `end` |
/// | unset | unset | `""` |
pub fn format_date_range(start: Option<&str>, end: Option<&str>) -> String {
    match (present(start), present(end)) {
        (Some(start), Some(end)) => format!("{start}{RANGE_DASH}{end}"),
        (Some(start), None) => format!("{start}{RANGE_DASH}{PRESENT}"),
        (None, Some(end)) => end.to_string(),
        (None, None) => String::new(),
    }
}

/// Same presence rules as [`format_date_range`], with each end reformatted
/// by [`format_display_date`].
pub fn format_display_range(start: Option<&str>, end: Option<&str>) -> String {
    let start = present(start).map(format_display_date);
    let end = present(end).map(format_display_date);
    format_date_range(start.as_deref(), end.as_deref())
}

/// `"studyType in area"` when both are set, else whichever is set.
pub fn format_degree_line(study_type: Option<&str>, area: Option<&str>) -> String {
    match (present(study_type), present(area)) {
        (Some(study_type), Some(area)) => format!("{study_type} in {area}"),
        (Some(only), None) | (None, Some(only)) => only.to_string(),
        (None, None) => String::new(),
    }
}

/// Joins the present items with `separator`. Absent items are dropped, so the
/// result never has a leading, trailing or doubled separator.
pub fn format_contact_list<'a, I>(items: I, separator: &str) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    items
        .into_iter()
        .filter_map(present)
        .collect::<Vec<_>>()
        .join(separator)
}

/// Comma-joins the non-blank items (languages, tools, keywords).
pub fn join_inline<S: AsRef<str>>(items: &[S]) -> String {
    format_contact_list(items.iter().map(|s| Some(s.as_ref())), ", ")
}

/// Splits a full name into its first token and the remainder.
pub fn split_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}

/// Reformats a raw year or date as `"Mon YYYY"`.
///
/// Accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, `MM/YYYY` and month-name forms
/// (`May 2020`, `September 2021`). Empty input reads as `"Present"`; anything
/// unrecognized is returned trimmed but otherwise unchanged.
pub fn format_display_date(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return PRESENT.to_string();
    }
    match parse_loose_date(raw) {
        Some(date) => date.format("%b %Y").to_string(),
        None => raw.to_string(),
    }
}

fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        let year = raw.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("01/{raw}"), "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("{raw} 01"), "%B %Y %d"))
        .ok()
}
