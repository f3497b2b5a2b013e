use chrono::{DateTime, Local};

pub const UNKNOWN: &str = "Unknown";
pub const NOT_AVAILABLE: &str = "N/A";
pub const ERROR: &str = "Error";

/// Probability vocabulary used by the status page.
pub const PROBABILITY_TOKENS: [&str; 4] = ["Unlikely", "Possible", "Likely", "Scheduled"];

/// Row label of the water heating program on the status page.
pub const WATER_HEATING_LABEL: &str = "Residential Interruptible Water Heating";

/// Interruption outlook for a single day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Forecast {
    pub probability: String,
    pub time: String,
}

impl Forecast {
    pub fn new(probability: impl Into<String>, time: impl Into<String>) -> Self {
        Forecast {
            probability: probability.into(),
            time: time.into(),
        }
    }
}

/// What one extraction strategy found. Either day may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outlook {
    pub today: Option<Forecast>,
    pub tomorrow: Option<Forecast>,
}

impl Outlook {
    pub fn is_empty(&self) -> bool {
        self.today.is_none() && self.tomorrow.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.today.is_some() && self.tomorrow.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Ok,
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Ok => "ok",
            RunStatus::Error => "error",
        }
    }
}

/// Everything one run scraped. Fields hold a sentinel until extraction
/// overwrites them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeResult {
    pub today_probability: String,
    pub today_time: String,
    pub tomorrow_probability: String,
    pub tomorrow_time: String,
    pub conservation_status: String,
    pub last_updated: String,
    pub today_date: String,
    pub tomorrow_date: String,
    pub refreshed_at: String,
    pub status: RunStatus,
    pub error: Option<String>,
}

impl ScrapeResult {
    pub fn new(refreshed_at: DateTime<Local>) -> Self {
        ScrapeResult {
            today_probability: UNKNOWN.to_string(),
            today_time: UNKNOWN.to_string(),
            tomorrow_probability: UNKNOWN.to_string(),
            tomorrow_time: UNKNOWN.to_string(),
            conservation_status: UNKNOWN.to_string(),
            last_updated: NOT_AVAILABLE.to_string(),
            today_date: NOT_AVAILABLE.to_string(),
            tomorrow_date: NOT_AVAILABLE.to_string(),
            refreshed_at: format_refreshed_at(refreshed_at),
            status: RunStatus::Ok,
            error: None,
        }
    }

    /// Result for a run whose page could not be fetched. Every data slot
    /// carries the error marker so the dashboard shows the failure.
    pub fn from_error(refreshed_at: DateTime<Local>, message: impl Into<String>) -> Self {
        ScrapeResult {
            today_probability: ERROR.to_string(),
            today_time: ERROR.to_string(),
            tomorrow_probability: ERROR.to_string(),
            tomorrow_time: ERROR.to_string(),
            conservation_status: ERROR.to_string(),
            last_updated: ERROR.to_string(),
            today_date: NOT_AVAILABLE.to_string(),
            tomorrow_date: NOT_AVAILABLE.to_string(),
            refreshed_at: format_refreshed_at(refreshed_at),
            status: RunStatus::Error,
            error: Some(message.into()),
        }
    }

    pub fn apply_outlook(&mut self, outlook: Outlook) {
        if let Some(today) = outlook.today {
            self.today_probability = today.probability;
            self.today_time = today.time;
        }
        if let Some(tomorrow) = outlook.tomorrow {
            self.tomorrow_probability = tomorrow.probability;
            self.tomorrow_time = tomorrow.time;
        }
    }
}

fn format_refreshed_at(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d %I:%M %p").to_string()
}
