use once_cell::sync::Lazy;
use regex::Regex;

use super::{Day, section_header};
use crate::page::PageSnapshot;

static LAST_UPDATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)last\s+updated\s*:?[^\S\n]*([^\n]*)").expect("Failed to compile last updated regex")
});

static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:mon|tues|wednes|thurs|fri|satur|sun)day,?\s+)?(?:january|february|march|april|may|june|july|august|september|october|november|december)\s+\d{1,2}(?:,?\s+\d{4})?\b|\b\d{1,2}/\d{1,2}/\d{2,4}\b",
    )
    .expect("Failed to compile date regex")
});

/// Text after the page's "Last Updated" label, or the next line when the
/// label stands alone.
pub fn last_updated(page: &PageSnapshot) -> Option<String> {
    let text = page.text.as_str();
    let caps = LAST_UPDATED.captures(text)?;
    let inline = caps[1].trim();
    if !inline.is_empty() {
        return Some(inline.to_string());
    }

    let end = caps.get(0)?.end();
    text[end..]
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// Dates printed on, or directly under, the Today and Next Day headers.
pub fn section_dates(page: &PageSnapshot) -> (Option<String>, Option<String>) {
    let lines: Vec<&str> = page.lines().collect();
    let mut today = None;
    let mut tomorrow = None;

    for (i, line) in lines.iter().enumerate() {
        let Some(day) = section_header(line) else {
            continue;
        };
        let slot = match day {
            Day::Today => &mut today,
            Day::Tomorrow => &mut tomorrow,
        };
        if slot.is_some() {
            continue;
        }
        *slot = std::iter::once(*line)
            .chain(lines.get(i + 1).copied())
            .find_map(|candidate| DATE.find(candidate))
            .map(|m| m.as_str().to_string());
    }

    (today, tomorrow)
}
