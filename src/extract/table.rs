use super::{Strategy, leading_probability, split_combined};
use crate::model::{Forecast, Outlook};
use crate::page::PageSnapshot;

/// Finds table rows mentioning interruptible water heating and reads fixed
/// cell offsets. Handles three layouts:
///
/// - one row `label | today prob | today time | next prob | next time`
/// - one row `label | "prob time" | "prob time"`
/// - one row per day `label | prob | time`, today's table first
pub struct TableScan;

fn is_water_heating_row(row: &[String]) -> bool {
    let text = row.join(" ").to_lowercase();
    text.contains("interruptible") && text.contains("water")
}

fn pair(probability: &str, time: &str) -> Option<Forecast> {
    let (probability, time) = (probability.trim(), time.trim());
    if probability.is_empty() || time.is_empty() {
        return None;
    }
    Some(Forecast::new(probability, time))
}

fn is_bare_probability(cell: &str) -> bool {
    matches!(leading_probability(cell), Some((_, rest)) if rest.is_empty())
}

fn read_row(row: &[String]) -> (Option<Forecast>, Option<Forecast>) {
    let values = row.get(1..).unwrap_or_default();
    match values {
        [today_prob, today_time, next_prob, next_time, ..] => {
            (pair(today_prob, today_time), pair(next_prob, next_time))
        }
        [first, second] if !is_bare_probability(first) && split_combined(first).is_some() => {
            (split_combined(first), split_combined(second))
        }
        [probability, time, ..] => (pair(probability, time), None),
        [single] => (split_combined(single), None),
        [] => (None, None),
    }
}

impl Strategy for TableScan {
    fn name(&self) -> &'static str {
        "table-scan"
    }

    fn extract(&self, page: &PageSnapshot) -> Outlook {
        let mut rows = page.rows.iter().filter(|row| is_water_heating_row(row));
        let mut outlook = Outlook::default();

        if let Some(first) = rows.next() {
            let (today, tomorrow) = read_row(first);
            outlook.today = today;
            outlook.tomorrow = tomorrow;
        }
        if outlook.tomorrow.is_none() {
            if let Some(second) = rows.next() {
                outlook.tomorrow = read_row(second).0;
            }
        }

        outlook
    }
}
