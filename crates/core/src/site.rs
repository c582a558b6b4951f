//! The contract with the third-party site: one URL and a selector per
//! purpose. The automation never hardcodes markup anywhere else, so when the
//! site ships new markup this table is the whole blast radius.

use crate::config::CompressionLevel;

/// Pinned desktop user agent; the site can serve a different flow to
/// unrecognized agents, and a fixed string keeps runs comparable.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Where the automation points and what it touches, keyed by purpose.
#[derive(Debug, Clone)]
pub struct SiteContract {
    /// Compression tool entry page.
    pub url: String,
    /// Marker that the page chrome has finished rendering.
    pub page_ready: String,
    /// File input behind the upload dropzone. The site renders it hidden, so
    /// it is waited on for presence, never visibility.
    pub file_input: String,
    /// Level panel the site reveals once an upload is accepted.
    pub level_panel: String,
    /// Primary control that starts compression.
    pub submit: String,
    /// Control that starts the result download.
    pub download: String,
}

impl SiteContract {
    /// Selector table for Adobe's online compressor as currently served.
    pub fn adobe() -> Self {
        Self {
            url: "https://www.adobe.com/acrobat/online/compress-pdf.html".into(),
            page_ready: "body > footer".into(),
            file_input: r#"input[accept=".pdf"]"#.into(),
            level_panel: r#"div[aria-label="Select compression level:"]"#.into(),
            // Note the inconsistent data-test attributes; they are the site's.
            submit: r#"button[data-test-id="ls-footer-primary-compress-button"]"#.into(),
            download: r#"button[data-testid="lifecycle-complete-5-download-button"]"#.into(),
        }
    }

    /// Option for one compression level inside the level panel.
    pub fn level_option(&self, level: CompressionLevel) -> String {
        format!(r#"{} input[value="{}"]"#, self.level_panel, level.as_str())
    }
}

impl Default for SiteContract {
    fn default() -> Self {
        Self::adobe()
    }
}
