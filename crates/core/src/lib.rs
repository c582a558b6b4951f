// pdfpress: drives Adobe's online PDF compressor through a Chrome DevTools
// Protocol session.
//
// The flow is upload, pick a compression level, submit, then catch the
// asynchronous download and move it to the caller's output path. The browser
// itself is consumed through chromiumoxide; everything here is sequencing,
// readiness polling and download bookkeeping on top of it.

pub mod artifact;
pub mod compress;
pub mod config;
pub mod download;
pub mod error;
pub mod page;
pub mod script;
pub mod scripted;
pub mod session;
pub mod site;

/// Default cap on the whole run, launch to finalized artifact.
///
/// One shared deadline instead of per-step timeouts: a slow step spends
/// budget the later steps no longer have.
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 60;

pub use compress::run;
pub use config::{CompressionLevel, CompressionRequest};
pub use error::{Error, Result};
pub use session::{Deadline, Session, SessionOptions};
pub use site::SiteContract;
