use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure taxonomy for a compression run.
///
/// The first error aborts the run. There is no retry at this layer; callers
/// recover by starting a fresh session.
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected before any browser work happens.
    #[error("invalid compression level '{0}' (expected high, medium or low)")]
    InvalidLevel(String),

    #[error("failed to launch browser session: {0}")]
    Launch(String),

    /// A devtools command could not be built from its parameters.
    #[error("browser command rejected: {0}")]
    Command(String),

    /// A devtools command failed outside any named step.
    #[error(transparent)]
    Cdp(#[from] chromiumoxide::error::CdpError),

    /// A step's wait or action failed; the step name locates it in the plan.
    #[error("step '{step}' failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// The session deadline expired while a wait was still pending.
    #[error("session deadline expired while waiting for {pending}")]
    DeadlineExpired { pending: String },

    /// The download completion signal can no longer fire.
    #[error("download signal closed before a completion was observed")]
    SignalClosed,

    #[error("downloaded artifact '{guid}' not found in {}", .dir.display())]
    ArtifactMissing { guid: String, dir: PathBuf },

    #[error("could not move downloaded artifact to {}: {source}", .dest.display())]
    Finalize {
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wraps an error with the plan step it occurred in.
    pub(crate) fn in_step(step: &'static str, source: Error) -> Error {
        Error::Step {
            step,
            source: Box::new(source),
        }
    }
}
