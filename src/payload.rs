use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;
use crate::model::ScrapeResult;

/// Largest body the dashboard accepts for a custom plugin.
pub const MAX_PAYLOAD_BYTES: usize = 2048;

pub const MAX_FIELD_CHARS: usize = 160;

const MIN_FIELD_CHARS: usize = 16;

/// Keys present in every payload, sentinel or not.
pub const CORE_KEYS: [&str; 8] = [
    "today_probability",
    "today_time",
    "tomorrow_probability",
    "tomorrow_time",
    "conservation_status",
    "last_updated",
    "refreshed_at",
    "status",
];

/// Optional keys, least important first.
const OPTIONAL_DROP_ORDER: [&str; 3] = ["error", "tomorrow_date", "today_date"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub merge_variables: BTreeMap<String, String>,
}

impl Payload {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn encoded_len(&self) -> usize {
        serde_json::to_vec(self).map_or(usize::MAX, |body| body.len())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.merge_variables.get(key).map(String::as_str)
    }
}

/// Maps a result onto the webhook body, keeping it under
/// [`MAX_PAYLOAD_BYTES`]. Optional keys are dropped first; if the core keys
/// alone are still too large every value is cut down until they fit.
pub fn build(result: &ScrapeResult) -> Payload {
    let mut payload = assemble(result, MAX_FIELD_CHARS);

    for key in OPTIONAL_DROP_ORDER {
        if payload.encoded_len() <= MAX_PAYLOAD_BYTES {
            break;
        }
        payload.merge_variables.remove(key);
    }

    let mut cap = MAX_FIELD_CHARS;
    while payload.encoded_len() > MAX_PAYLOAD_BYTES && cap > MIN_FIELD_CHARS {
        cap = (cap / 2).max(MIN_FIELD_CHARS);
        for value in payload.merge_variables.values_mut() {
            *value = truncate(value, cap);
        }
    }

    payload
}

fn assemble(result: &ScrapeResult, cap: usize) -> Payload {
    let mut fields: Vec<(&str, &str)> = vec![
        ("today_probability", result.today_probability.as_str()),
        ("today_time", result.today_time.as_str()),
        ("tomorrow_probability", result.tomorrow_probability.as_str()),
        ("tomorrow_time", result.tomorrow_time.as_str()),
        ("conservation_status", result.conservation_status.as_str()),
        ("last_updated", result.last_updated.as_str()),
        ("refreshed_at", result.refreshed_at.as_str()),
        ("status", result.status.as_str()),
        ("today_date", result.today_date.as_str()),
        ("tomorrow_date", result.tomorrow_date.as_str()),
    ];
    if let Some(error) = &result.error {
        fields.push(("error", error.as_str()));
    }

    let merge_variables = fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), truncate(value, cap)))
        .collect();

    Payload { merge_variables }
}

fn truncate(value: &str, cap: usize) -> String {
    if value.chars().count() <= cap {
        return value.to_string();
    }
    let mut out: String = value.chars().take(cap.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
