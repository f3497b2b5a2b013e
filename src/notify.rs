use reqwest::{Client, Url};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use crate::error::Result;
use crate::payload::Payload;

/// How the webhook post went. None of these stop the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent { status: u16 },
    Rejected { status: u16 },
    Failed(String),
    Skipped,
}

pub struct Notifier {
    client: Client,
    webhook_url: String,
}

impl Notifier {
    pub fn new(client: Client, webhook_url: impl Into<String>) -> Self {
        Notifier {
            client,
            webhook_url: webhook_url.into(),
        }
    }

    pub async fn send(&self, payload: &Payload) -> Delivery {
        let target = redact_url(&self.webhook_url);
        info!(webhook = %target, "Posting payload");

        let response = match self.client.post(&self.webhook_url).json(payload).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(webhook = %target, error = %e, "Webhook request failed");
                return Delivery::Failed(e.to_string());
            }
        };

        let status = response.status();
        if status.is_success() {
            info!(status = status.as_u16(), "Webhook accepted payload");
            return Delivery::Sent { status: status.as_u16() };
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), body = %body, "Webhook rejected payload");
        Delivery::Rejected { status: status.as_u16() }
    }
}

/// Appends `data=<json>` to a CI step-output file.
pub fn write_step_output(path: &Path, payload: &Payload) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "data={}", payload.to_json()?)?;
    Ok(())
}

/// Webhook URLs embed the plugin secret in the path; keep only scheme and host.
pub fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => format!("{}://{}/***", parsed.scheme(), host),
            None => "***".to_string(),
        },
        Err(_) => "***".to_string(),
    }
}
