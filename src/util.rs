// Utility helpers for decoding, date handling and text formatting.
//
// This module centralizes the "dirty" export handling (Latin-1 bytes,
// day-first dates, free-text wrapping) so the rest of the code can assume
// clean values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use std::cmp::Ordering;
use std::collections::HashSet;

/// Day-first formats tried in order; ISO is the last resort.
const DATE_FORMATS: [&str; 4] = ["%d/%m/%y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// Decode Latin-1 bytes. Every byte maps to the code point of the same value,
/// so this never fails.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Parse a booking date with the day-first convention.
pub fn parse_date_safe(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Sort key for date text: parsed dates chronologically, then anything that
/// does not parse, lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateKey {
    Parsed(NaiveDate),
    Raw(String),
}

impl DateKey {
    pub fn of(s: &str) -> DateKey {
        match parse_date_safe(s) {
            Some(d) => DateKey::Parsed(d),
            None => DateKey::Raw(s.to_string()),
        }
    }
}

pub fn cmp_dates(a: &str, b: &str) -> Ordering {
    DateKey::of(a).cmp(&DateKey::of(b))
}

/// `"14:00 to 15:00"` becomes `"1400-1500"`.
pub fn compact_time_range(time: &str) -> String {
    match time.split_once(" to ") {
        Some((start, end)) => format!("{}-{}", start.replace(':', ""), end.replace(':', "")),
        None => time.replace(':', ""),
    }
}

/// Greedy word wrap at `width` columns. Words longer than the width are split.
pub fn wrap_text(text: &str, width: usize) -> String {
    if width == 0 {
        return text.to_string();
    }
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        if word.is_empty() {
            continue;
        }
        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.extend(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Replace characters a spreadsheet tab name cannot hold and cap it at 31.
pub fn sheet_name(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '-',
            c => c,
        })
        .take(31)
        .collect();
    let cleaned = cleaned.trim_matches('\'').to_string();
    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

/// Sanitised sheet names, made unique the way Excel compares them (case
/// insensitive) by appending `" (2)"`, `" (3)"`, ...
pub fn unique_sheet_names<'a, I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut taken: HashSet<String> = HashSet::new();
    let mut names = Vec::new();
    for name in raw {
        let base = sheet_name(name);
        let mut candidate = base.clone();
        let mut n = 2;
        while taken.contains(&candidate.to_lowercase()) {
            let suffix = format!(" ({n})");
            let keep = 31usize.saturating_sub(suffix.chars().count());
            candidate = format!("{}{suffix}", base.chars().take(keep).collect::<String>());
            n += 1;
        }
        taken.insert(candidate.to_lowercase());
        names.push(candidate);
    }
    names
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console messages
    // (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
