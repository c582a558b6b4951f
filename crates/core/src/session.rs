//! Owns the browser process for exactly one run.
//!
//! A session is created per compression request, never shared, and torn down
//! on every exit path. The deadline taken at launch is the cap for the whole
//! run; every later wait draws from it.

use std::time::{Duration, Instant};

use chromiumoxide::browser::HeadlessMode;
use chromiumoxide::cdp::browser_protocol::network;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::site;

// Fixed geometry the site flow is tuned against.
const WINDOW_WIDTH: u32 = 1920;
const WINDOW_HEIGHT: u32 = 600;

/// Knobs exposed to the CLI. Everything else about the browser is fixed.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Run the browser without a visible window.
    pub headless: bool,
    /// Wall-clock cap for the whole run, launch to finalized artifact.
    pub timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            headless: true,
            timeout: Duration::from_secs(crate::DEFAULT_SESSION_TIMEOUT_SECS),
        }
    }
}

/// Single wall-clock cap shared by every wait in a run.
///
/// There are no per-step timeouts. A step that stalls spends budget the
/// later steps no longer have, and whichever wait is pending when the cap
/// is reached reports the expiry.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        let now = Instant::now();
        let at = match now.checked_add(budget) {
            Some(at) => at,
            // Beyond what the clock can represent; pin far enough out to
            // never fire.
            None => now + Duration::from_secs(60 * 60 * 24 * 365),
        };
        Self { at }
    }

    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    pub fn expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Error naming whatever the caller was waiting on when time ran out.
    pub fn expiry(&self, pending: impl Into<String>) -> Error {
        Error::DeadlineExpired {
            pending: pending.into(),
        }
    }
}

/// A live browser with one page, ready for the interaction script.
pub struct Session {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    deadline: Deadline,
}

impl Session {
    /// Launches the browser and prepares its single page.
    ///
    /// The user agent override is applied before any navigation so the site
    /// never sees the automation default. Launch failures unwind whatever
    /// was already running.
    pub async fn launch(options: SessionOptions) -> Result<Self> {
        let deadline = Deadline::after(options.timeout);

        let mut builder = BrowserConfig::builder()
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            .arg("--disable-gpu");
        if options.headless {
            builder = builder.headless_mode(HeadlessMode::New);
        } else {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(Error::Launch)?;

        debug!(target: "pdfpress", headless = options.headless, "launching browser");
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Launch(e.to_string()))?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = match Self::prepare_page(&browser).await {
            Ok(page) => page,
            Err(err) => {
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                return Err(err);
            }
        };

        Ok(Self {
            browser,
            page,
            handler_task,
            deadline,
        })
    }

    async fn prepare_page(browser: &Browser) -> Result<Page> {
        let page = browser.new_page("about:blank").await?;
        let override_ua = network::SetUserAgentOverrideParams::builder()
            .user_agent(site::USER_AGENT)
            .build()
            .map_err(Error::Command)?;
        page.execute(override_ua).await?;
        Ok(page)
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn deadline(&self) -> Deadline {
        self.deadline
    }

    /// Best-effort teardown; runs on success, error and timeout alike.
    pub async fn shutdown(mut self) {
        debug!(target: "pdfpress", "closing browser session");
        if let Err(err) = self.browser.close().await {
            warn!(target: "pdfpress", error = %err, "browser did not close cleanly");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}
