use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::extract::{Extractor, conservation_status};
use crate::fetch::{Fetcher, build_client};
use crate::model::ScrapeResult;
use crate::notify::{Delivery, Notifier, write_step_output};
use crate::page::PageSnapshot;
use crate::payload::{self, Payload};

/// Outcome of one run, for the caller to print and log.
#[derive(Debug)]
pub struct RunReport {
    pub result: ScrapeResult,
    pub payload: Payload,
    pub delivery: Delivery,
}

/// Fetch, extract, build and deliver once.
///
/// Only configuration problems are returned as errors. Fetch failures become
/// an error-shaped payload and webhook failures are reported in
/// [`RunReport::delivery`].
pub async fn run(config: &Config) -> Result<RunReport> {
    if config.webhook_url.is_none() && config.require_webhook {
        return Err(AppError::ConfigError(
            "TRMNL_WEBHOOK_URL is not set".to_string(),
        ));
    }

    let client = build_client(config.fetch_timeout, &config.user_agent)?;
    let fetcher = Fetcher::from_config(config, client.clone())?;

    let start = std::time::Instant::now();
    let result = scrape(config, &fetcher, Local::now()).await;
    info!(
        status = result.status.as_str(),
        today = %result.today_probability,
        tomorrow = %result.tomorrow_probability,
        elapsed = ?start.elapsed(),
        "Scrape finished"
    );

    let payload = payload::build(&result);
    debug!(bytes = payload.encoded_len(), "Payload built");

    if let Some(path) = &config.step_output {
        match write_step_output(path, &payload) {
            Ok(()) => info!(path = %path.display(), "Wrote step output"),
            Err(e) => warn!(path = %path.display(), error = %e, "Failed to write step output"),
        }
    }

    let delivery = match &config.webhook_url {
        Some(url) => Notifier::new(client, url.as_str()).send(&payload).await,
        None => {
            info!("TRMNL_WEBHOOK_URL not set, skipping webhook");
            Delivery::Skipped
        }
    };

    Ok(RunReport {
        result,
        payload,
        delivery,
    })
}

/// Fetches the configured pages and extracts a result. Never fails: a status
/// page that cannot be fetched yields [`ScrapeResult::from_error`].
pub async fn scrape(config: &Config, fetcher: &Fetcher, refreshed_at: DateTime<Local>) -> ScrapeResult {
    let html = match fetcher.fetch(&config.status_url).await {
        Ok(html) => html,
        Err(e) => {
            error!(url = %config.status_url, error = %e, "Failed to fetch status page");
            return ScrapeResult::from_error(refreshed_at, e.to_string());
        }
    };

    let page = PageSnapshot::from_html(&html);
    let mut result = Extractor::default().extract(&page, refreshed_at);

    if let Some(gauge_url) = &config.gauge_url {
        match fetcher.fetch(gauge_url).await {
            Ok(html) => {
                let gauge_page = PageSnapshot::from_html(&html);
                match conservation_status(&gauge_page.images) {
                    Some(status) => result.conservation_status = status.to_string(),
                    None => debug!(url = %gauge_url, "No gauge image on gauge page"),
                }
            }
            Err(e) => warn!(url = %gauge_url, error = %e, "Failed to fetch gauge page"),
        }
    }

    result
}
