//! The interaction plan and the loop that drives it.
//!
//! Steps are data: a name, an optional wait, an optional action. One driver
//! loop executes them in order against whatever implements the page driver
//! seam, so the whole flow runs in tests without a browser.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::config::CompressionLevel;
use crate::error::{Error, Result};
use crate::page::PageDriver;
use crate::session::Deadline;
use crate::site::SiteContract;

/// How often a pending wait re-probes the page.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// What must hold for a wait to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// The selector matches something in the DOM. The file input stays
    /// hidden behind the dropzone forever, so presence is its readiness;
    /// visibility would never come.
    Present,
    /// The matched element has a non-empty box.
    Visible,
    /// The matched element exists and is not disabled.
    Enabled,
}

impl Readiness {
    /// Boolean probe evaluated in the page. The selector is JSON-escaped so
    /// attribute quotes survive the trip.
    pub(crate) fn predicate_js(self, selector: &str) -> String {
        let sel = serde_json::to_string(selector).unwrap_or_default();
        match self {
            Readiness::Present => {
                format!("(function() {{ return document.querySelector({sel}) !== null; }})()")
            }
            Readiness::Visible => format!(
                "(function() {{ const el = document.querySelector({sel}); if (!el) return false; const r = el.getBoundingClientRect(); return r.width > 0 && r.height > 0; }})()"
            ),
            Readiness::Enabled => format!(
                "(function() {{ const el = document.querySelector({sel}); return el !== null && !el.disabled; }})()"
            ),
        }
    }
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Readiness::Present => "present",
            Readiness::Visible => "visible",
            Readiness::Enabled => "enabled",
        })
    }
}

/// One wait inside a step.
#[derive(Debug, Clone)]
pub struct Wait {
    pub selector: String,
    pub readiness: Readiness,
}

/// One effect inside a step.
#[derive(Debug, Clone)]
pub enum Action {
    Navigate { url: String },
    Upload { selector: String, file: PathBuf },
    Click { selector: String },
}

/// A named unit of the plan: wait for readiness, then act. Either part can
/// be absent. The name is what timeout and failure errors report.
#[derive(Debug, Clone)]
pub struct Step {
    pub name: &'static str,
    pub wait: Option<Wait>,
    pub action: Option<Action>,
}

impl Step {
    pub fn act(name: &'static str, action: Action) -> Self {
        Self {
            name,
            wait: None,
            action: Some(action),
        }
    }

    pub fn wait(name: &'static str, selector: impl Into<String>, readiness: Readiness) -> Self {
        Self {
            name,
            wait: Some(Wait {
                selector: selector.into(),
                readiness,
            }),
            action: None,
        }
    }

    pub fn wait_then(
        name: &'static str,
        selector: impl Into<String>,
        readiness: Readiness,
        action: Action,
    ) -> Self {
        Self {
            name,
            wait: Some(Wait {
                selector: selector.into(),
                readiness,
            }),
            action: Some(action),
        }
    }
}

/// The full interaction against the compression tool, in execution order.
///
/// Ordering contract: upload strictly before level selection (the site only
/// reveals the panel after an accepted upload), level selection before
/// submit, submit before anything download-related.
pub fn compression_plan(
    site: &SiteContract,
    level: CompressionLevel,
    input: &Path,
) -> Vec<Step> {
    vec![
        Step::act(
            "navigate",
            Action::Navigate {
                url: site.url.clone(),
            },
        ),
        Step::wait("page chrome", &site.page_ready, Readiness::Visible),
        Step::wait_then(
            "upload",
            &site.file_input,
            Readiness::Present,
            Action::Upload {
                selector: site.file_input.clone(),
                file: input.to_path_buf(),
            },
        ),
        Step::wait_then(
            "choose level",
            &site.level_panel,
            Readiness::Visible,
            Action::Click {
                selector: site.level_option(level),
            },
        ),
        Step::wait_then(
            "submit",
            &site.submit,
            Readiness::Enabled,
            Action::Click {
                selector: site.submit.clone(),
            },
        ),
        Step::wait("download ready", &site.download, Readiness::Visible),
        Step::wait_then(
            "trigger download",
            &site.download,
            Readiness::Enabled,
            Action::Click {
                selector: site.download.clone(),
            },
        ),
    ]
}

/// Runs the plan in order. Each wait re-probes until ready or the shared
/// deadline expires; the first failed wait or action aborts the run with the
/// step name attached.
pub async fn run_plan<P: PageDriver + ?Sized>(
    page: &P,
    plan: &[Step],
    deadline: Deadline,
) -> Result<()> {
    for step in plan {
        if let Some(wait) = &step.wait {
            debug!(
                target: "pdfpress",
                step = step.name,
                selector = %wait.selector,
                readiness = %wait.readiness,
                "waiting"
            );
            wait_until_ready(page, step.name, wait, deadline).await?;
        }
        if let Some(action) = &step.action {
            apply(page, action)
                .await
                .map_err(|e| Error::in_step(step.name, e))?;
        }
        info!(target: "pdfpress", step = step.name, "step done");
    }
    Ok(())
}

async fn wait_until_ready<P: PageDriver + ?Sized>(
    page: &P,
    step: &'static str,
    wait: &Wait,
    deadline: Deadline,
) -> Result<()> {
    loop {
        match page.probe(&wait.selector, wait.readiness).await {
            Ok(true) => return Ok(()),
            Ok(false) => {}
            Err(e) => return Err(Error::in_step(step, e)),
        }
        if deadline.expired() {
            return Err(deadline.expiry(format!(
                "step '{}' ({} {})",
                step, wait.readiness, wait.selector
            )));
        }
        tokio::time::sleep(POLL_INTERVAL.min(deadline.remaining())).await;
    }
}

async fn apply<P: PageDriver + ?Sized>(page: &P, action: &Action) -> Result<()> {
    match action {
        Action::Navigate { url } => {
            info!(target: "pdfpress", url = %url, "navigating");
            page.navigate(url).await
        }
        Action::Upload { selector, file } => {
            info!(target: "pdfpress", file = %file.display(), "handing the file to the upload input");
            page.upload(selector, file).await
        }
        Action::Click { selector } => {
            debug!(target: "pdfpress", selector = %selector, "clicking");
            page.click(selector).await
        }
    }
}
