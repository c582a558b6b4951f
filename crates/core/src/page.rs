//! The page driver seam and its live implementation.

use std::path::Path;

use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::dom;
use tracing::trace;

use crate::error::{Error, Result};
use crate::script::Readiness;

/// The DOM surface the interaction script runs against.
///
/// `probe` is a single readiness poll; looping and deadlines belong to the
/// driver loop. Everything here is selector-addressed so implementations can
/// answer from scripted state instead of a browser.
#[async_trait]
pub trait PageDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;
    async fn probe(&self, selector: &str, readiness: Readiness) -> Result<bool>;
    async fn upload(&self, selector: &str, file: &Path) -> Result<()>;
    async fn click(&self, selector: &str) -> Result<()>;
}

/// Driver over a live chromiumoxide page.
pub struct CdpPage {
    page: Page,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl PageDriver for CdpPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn probe(&self, selector: &str, readiness: Readiness) -> Result<bool> {
        let ready = self
            .page
            .evaluate(readiness.predicate_js(selector))
            .await?
            .into_value::<bool>()
            .unwrap_or(false);
        trace!(target: "pdfpress", selector = %selector, readiness = %readiness, ready, "probe");
        Ok(ready)
    }

    /// Hands the local path to the file input over the devtools protocol.
    /// The input never sees a click, so this works while it sits hidden
    /// behind the dropzone; the browser fires the change event itself.
    async fn upload(&self, selector: &str, file: &Path) -> Result<()> {
        let input = self.page.find_element(selector).await?;
        let files = dom::SetFileInputFilesParams::builder()
            .files(vec![file.to_string_lossy().into_owned()])
            .backend_node_id(input.backend_node_id)
            .build()
            .map_err(Error::Command)?;
        self.page.execute(files).await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        self.page.find_element(selector).await?.click().await?;
        Ok(())
    }
}
