use super::{Day, Strategy, leading_probability, looks_like_time, section_header};
use crate::model::{Forecast, Outlook, WATER_HEATING_LABEL};
use crate::page::PageSnapshot;

/// Walks the page line by line, remembering the last section header seen.
/// On the row label line it reads the rest of that line plus a few lines
/// below it for a probability word and a time.
pub struct LineScan {
    lookahead: usize,
}

impl Default for LineScan {
    fn default() -> Self {
        LineScan { lookahead: 4 }
    }
}

impl LineScan {
    pub fn with_lookahead(lookahead: usize) -> Self {
        LineScan { lookahead }
    }

    fn read_window<'a>(&self, after_label: &'a str, following: &[&'a str]) -> Option<Forecast> {
        let mut probability = None;
        let mut time = None;

        let window = std::iter::once(after_label).chain(following.iter().take(self.lookahead).copied());
        for cell in window {
            let mut cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            // A section header means the window ran into the next day.
            if section_header(cell).is_some() {
                break;
            }
            if probability.is_none() {
                if let Some((word, rest)) = leading_probability(cell) {
                    probability = Some(word);
                    cell = rest;
                }
            }
            if time.is_none() && !cell.is_empty() && looks_like_time(cell) {
                time = Some(cell);
            }
            if probability.is_some() && time.is_some() {
                break;
            }
        }

        Some(Forecast::new(probability?, time?))
    }
}

impl Strategy for LineScan {
    fn name(&self) -> &'static str {
        "line-scan"
    }

    fn extract(&self, page: &PageSnapshot) -> Outlook {
        let lines: Vec<&str> = page.lines().collect();
        let label = WATER_HEATING_LABEL.to_ascii_lowercase();
        let mut section = None;
        let mut outlook = Outlook::default();

        for (i, line) in lines.iter().enumerate() {
            if let Some(day) = section_header(line) {
                section = Some(day);
            }
            let Some(day) = section else {
                continue;
            };

            let lower = line.to_ascii_lowercase();
            let Some(pos) = lower.find(&label) else {
                continue;
            };
            // "Water Heating: Likely 5:00 PM"
            let after_label = line[pos + label.len()..]
                .trim_start_matches(|c: char| c == ':' || c.is_whitespace());

            let slot = match day {
                Day::Today => &mut outlook.today,
                Day::Tomorrow => &mut outlook.tomorrow,
            };
            if slot.is_none() {
                *slot = self.read_window(after_label, &lines[i + 1..]);
            }
        }

        outlook
    }
}
