use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{Config, FetchMode};
use crate::error::{AppError, Result};

/// Builds the HTTP client shared by page fetches and the webhook post.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5).min(timeout))
        .user_agent(user_agent)
        .build()
        .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        HttpFetcher { client }
    }

    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let html = response.text().await?;
        Ok(html)
    }
}

/// Page retrieval back end, chosen once per run from the config.
pub enum Fetcher {
    Http(HttpFetcher),
    #[cfg(feature = "browser")]
    Browser(crate::browser::BrowserFetcher),
}

impl Fetcher {
    pub fn from_config(config: &Config, client: Client) -> Result<Self> {
        match config.fetch_mode {
            FetchMode::Http => Ok(Fetcher::Http(HttpFetcher::new(client))),
            #[cfg(feature = "browser")]
            FetchMode::Browser => Ok(Fetcher::Browser(crate::browser::BrowserFetcher::new(
                config.fetch_timeout,
                config.render_wait,
                &config.user_agent,
            ))),
            #[cfg(not(feature = "browser"))]
            FetchMode::Browser => Err(AppError::ConfigError(
                "Browser fetching is not compiled in".to_string(),
            )),
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        info!(url, "Fetching page");
        let start = std::time::Instant::now();

        let html = match self {
            Fetcher::Http(http) => http.fetch_html(url).await?,
            #[cfg(feature = "browser")]
            Fetcher::Browser(browser) => browser.fetch_html(url).await?,
        };

        debug!(url, bytes = html.len(), elapsed = ?start.elapsed(), "Page fetched");
        Ok(html)
    }
}
