use once_cell::sync::Lazy;
use regex::Regex;

use super::Strategy;
use crate::model::{Forecast, Outlook};
use crate::page::PageSnapshot;

// Headers only count at the start of a line; prose mentioning "today" does not.
static TODAY_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[^\S\n]*today\b").expect("Failed to compile today regex")
});

static NEXT_DAY_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^[^\S\n]*(?:next\s+day|tomorrow)\b").expect("Failed to compile next day regex")
});

// Label, then a probability word, then the rest of the first non-blank line
// after it as the time.
static WATER_HEATING_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Residential\s+Interruptible\s+Water\s+Heating\s*:?\s+(Unlikely|Possible|Likely|Scheduled)\b\s+([^\n]+)",
    )
    .expect("Failed to compile water heating row regex")
});

/// Matches the row label inside the text span opened by each day's header.
/// The Today span stops at the first Next Day header after it.
pub struct SectionRegex;

impl SectionRegex {
    fn read_row(span: &str) -> Option<Forecast> {
        let caps = WATER_HEATING_ROW.captures(span)?;
        let time = caps[2].trim();
        if time.is_empty() {
            return None;
        }
        Some(Forecast::new(&caps[1], time))
    }
}

impl Strategy for SectionRegex {
    fn name(&self) -> &'static str {
        "section-regex"
    }

    fn extract(&self, page: &PageSnapshot) -> Outlook {
        let text = page.text.as_str();
        let today_header = TODAY_HEADER.find(text);
        let next_day = NEXT_DAY_HEADER.find_at(text, today_header.map_or(0, |m| m.end()));

        let today = today_header.and_then(|header| {
            let end = next_day.map_or(text.len(), |next| next.start());
            Self::read_row(&text[header.end()..end])
        });
        let tomorrow = next_day.and_then(|header| Self::read_row(&text[header.end()..]));

        Outlook { today, tomorrow }
    }
}
