//! Headless Chromium back end for pages that render client-side.

use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

// How long the CDP handler gets to drain after the browser closes.
const HANDLER_GRACE: Duration = Duration::from_secs(5);

pub struct BrowserFetcher {
    timeout: Duration,
    render_wait: Duration,
    user_agent: String,
}

impl BrowserFetcher {
    pub fn new(timeout: Duration, render_wait: Duration, user_agent: &str) -> Self {
        BrowserFetcher {
            timeout,
            render_wait,
            user_agent: user_agent.to_string(),
        }
    }

    /// Loads `url` in a fresh browser, waits for rendering to settle and
    /// returns the resulting DOM. The browser is closed whether or not the
    /// page loaded.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        let config = BrowserConfig::builder()
            .request_timeout(self.timeout)
            .arg(format!("--user-agent={}", self.user_agent))
            .build()
            .map_err(AppError::BrowserError)?;

        let (mut browser, mut handler) = Browser::launch(config).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let rendered = self.render(&browser, url).await;

        let closed = match browser.close().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Failed to close browser cleanly");
                false
            }
        };
        stop_handler(handler_task, closed, HANDLER_GRACE).await;

        rendered
    }

    async fn render(&self, browser: &Browser, url: &str) -> Result<String> {
        let navigation = async {
            let page = browser.new_page(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, AppError>(page)
        };
        let page = tokio::time::timeout(self.timeout, navigation)
            .await
            .map_err(|_| {
                AppError::BrowserError(format!(
                    "Navigation to {} timed out after {:?}",
                    url, self.timeout
                ))
            })??;

        debug!(url, wait = ?self.render_wait, "Waiting for client-side rendering");
        tokio::time::sleep(self.render_wait).await;

        let html = page.content().await?;
        Ok(html)
    }
}

/// Waits up to `grace` for the handler task to finish, aborting it when the
/// browser did not close or the wait runs out. Returns whether the task
/// finished on its own.
async fn stop_handler(mut task: JoinHandle<()>, closed: bool, grace: Duration) -> bool {
    if !closed {
        task.abort();
        return false;
    }
    match tokio::time::timeout(grace, &mut task).await {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!(error = %e, "Browser handler task ended abnormally");
            false
        }
        Err(_) => {
            warn!(?grace, "Browser handler did not stop, aborting it");
            task.abort();
            false
        }
    }
}
