//! Field extraction from a fetched status page.
//!
//! The page layout is not under our control and has shifted several times, so
//! the interruption outlook is located by a chain of [`Strategy`]
//! implementations. Each day's forecast comes from the first strategy that
//! finds it; later strategies only run while a day is still missing.

mod gauge;
mod line_scan;
mod metadata;
mod section;
mod table;

pub use gauge::{conservation_status, status_for_src};
pub use line_scan::LineScan;
pub use metadata::{last_updated, section_dates};
pub use section::SectionRegex;
pub use table::TableScan;

use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::model::{Forecast, Outlook, PROBABILITY_TOKENS, ScrapeResult};
use crate::page::PageSnapshot;

/// One heuristic for reading the water heating outlook off a page.
pub trait Strategy {
    fn name(&self) -> &'static str;

    fn extract(&self, page: &PageSnapshot) -> Outlook;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Day {
    Today,
    Tomorrow,
}

static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(today|next\s+day|tomorrow)\b").expect("Failed to compile section header regex")
});

static TIME_HINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(:|\d\s*[ap]\.?m\b|\b[ap]m\b|\bundetermined\b)").expect("Failed to compile time regex")
});

/// Which day a line opens a section for, if it is a section header.
pub(crate) fn section_header(line: &str) -> Option<Day> {
    let caps = SECTION_HEADER.captures(line)?;
    if caps[1].eq_ignore_ascii_case("today") {
        Some(Day::Today)
    } else {
        Some(Day::Tomorrow)
    }
}

/// Splits a leading probability word off `cell`, returning the word as it
/// appears on the page and the trimmed remainder.
pub(crate) fn leading_probability(cell: &str) -> Option<(&str, &str)> {
    let cell = cell.trim();
    PROBABILITY_TOKENS.iter().find_map(|token| {
        let head = cell.get(..token.len())?;
        let rest = &cell[token.len()..];
        let at_boundary = rest.chars().next().is_none_or(|c| !c.is_alphanumeric());
        (head.eq_ignore_ascii_case(token) && at_boundary).then(|| (head, rest.trim()))
    })
}

pub(crate) fn looks_like_time(cell: &str) -> bool {
    TIME_HINT.is_match(cell)
}

/// Reads a cell holding `"<Probability> <Time>"`.
pub(crate) fn split_combined(cell: &str) -> Option<Forecast> {
    let (probability, time) = leading_probability(cell)?;
    if time.is_empty() {
        return None;
    }
    Some(Forecast::new(probability, time))
}

pub struct Extractor {
    strategies: Vec<Box<dyn Strategy + Send + Sync>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor::with_strategies(vec![
            Box::new(SectionRegex),
            Box::new(LineScan::default()),
            Box::new(TableScan),
        ])
    }
}

impl Extractor {
    pub fn with_strategies(strategies: Vec<Box<dyn Strategy + Send + Sync>>) -> Self {
        Extractor { strategies }
    }

    pub fn outlook(&self, page: &PageSnapshot) -> Outlook {
        let mut merged = Outlook::default();

        for strategy in &self.strategies {
            if merged.is_complete() {
                break;
            }
            let found = strategy.extract(page);
            if found.is_empty() {
                debug!(strategy = strategy.name(), "Strategy found nothing");
                continue;
            }
            debug!(
                strategy = strategy.name(),
                today = found.today.is_some(),
                tomorrow = found.tomorrow.is_some(),
                "Strategy matched"
            );
            if merged.today.is_none() {
                merged.today = found.today;
            }
            if merged.tomorrow.is_none() {
                merged.tomorrow = found.tomorrow;
            }
        }

        merged
    }

    /// Fills a fresh [`ScrapeResult`] from `page`. Misses keep their sentinel.
    pub fn extract(&self, page: &PageSnapshot, refreshed_at: DateTime<Local>) -> ScrapeResult {
        let mut result = ScrapeResult::new(refreshed_at);

        result.apply_outlook(self.outlook(page));

        if let Some(updated) = last_updated(page) {
            result.last_updated = updated;
        }
        let (today_date, tomorrow_date) = section_dates(page);
        if let Some(date) = today_date {
            result.today_date = date;
        }
        if let Some(date) = tomorrow_date {
            result.tomorrow_date = date;
        }
        if let Some(status) = conservation_status(&page.images) {
            result.conservation_status = status.to_string();
        }

        result
    }
}
