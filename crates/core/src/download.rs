//! Catches the asynchronous download that the final click sets off.
//!
//! Completion arrives as a devtools event carrying the GUID the browser
//! names the file with, on its own event stream, at its own pace. The
//! watcher funnels exactly one completion into a one-shot signal; arming
//! happens before the interaction script runs a single step, so a download
//! that finishes instantly still lands in the slot.

use std::path::Path;

use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::browser::{
    DownloadProgressState, EventDownloadProgress, EventDownloadWillBegin,
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use futures_util::StreamExt;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::session::Deadline;

/// Creates the write-once/read-once pair the watcher and the orchestrator
/// share. Single-writer, single-reader; the first write wins and the first
/// read consumes.
pub fn signal() -> (DownloadSlot, DownloadSignal) {
    let (tx, rx) = oneshot::channel();
    (DownloadSlot { tx: Some(tx) }, DownloadSignal { rx: Some(rx) })
}

/// Write side. Holds one GUID at most.
pub struct DownloadSlot {
    tx: Option<oneshot::Sender<String>>,
}

impl DownloadSlot {
    /// Fills the slot. Returns false when it was already spent; the extra
    /// completion is the caller's to log and ignore.
    pub fn complete(&mut self, guid: String) -> bool {
        match self.tx.take() {
            Some(tx) => {
                let _ = tx.send(guid);
                true
            }
            None => false,
        }
    }
}

/// Read side. Consumed by the first read; later reads report closed instead
/// of blocking.
pub struct DownloadSignal {
    rx: Option<oneshot::Receiver<String>>,
}

impl DownloadSignal {
    /// Waits for the completed download's GUID, bounded by the deadline.
    ///
    /// A dropped-without-writing slot surfaces as closed, not as a hang;
    /// that is the whole point of the one-shot shape.
    pub async fn completed(&mut self, deadline: Deadline) -> Result<String> {
        let Some(rx) = self.rx.take() else {
            return Err(Error::SignalClosed);
        };
        match tokio::time::timeout(deadline.remaining(), rx).await {
            Ok(Ok(guid)) => Ok(guid),
            Ok(Err(_)) => Err(Error::SignalClosed),
            Err(_) => Err(deadline.expiry("download completion")),
        }
    }
}

/// Filters the browser's download events into the signal.
pub struct DownloadWatcher {
    task: JoinHandle<()>,
}

impl DownloadWatcher {
    /// Arms download handling on the page and starts watching.
    ///
    /// Ordering contract: call before any step of the interaction script.
    /// Arming tells the browser to materialize downloads GUID-named in
    /// `download_dir` and to emit progress events; subscribing before any
    /// click closes the window where a fast download could complete
    /// unobserved.
    pub async fn arm(page: &Page, download_dir: &Path) -> Result<(Self, DownloadSignal)> {
        let behavior = SetDownloadBehaviorParams::builder()
            .behavior(SetDownloadBehaviorBehavior::AllowAndName)
            .download_path(download_dir.to_string_lossy())
            .events_enabled(true)
            .build()
            .map_err(Error::Command)?;
        page.execute(behavior).await?;

        let mut progress = page.event_listener::<EventDownloadProgress>().await?;
        let mut begins = page.event_listener::<EventDownloadWillBegin>().await?;
        debug!(target: "pdfpress", dir = %download_dir.display(), "download handling armed");

        let (mut slot, signal) = signal();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    ev = progress.next() => match ev {
                        Some(ev) => on_progress(
                            &mut slot,
                            &ev.guid,
                            &ev.state,
                            ev.received_bytes,
                            ev.total_bytes,
                        ),
                        None => break,
                    },
                    ev = begins.next() => match ev {
                        Some(ev) => debug!(
                            target: "pdfpress",
                            guid = %ev.guid,
                            url = %ev.url,
                            suggested = %ev.suggested_filename,
                            "download starting"
                        ),
                        None => break,
                    },
                }
            }
        });

        Ok((Self { task }, signal))
    }
}

impl Drop for DownloadWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// One progress event's effect on the slot. Split out of the watcher task so
/// the state filter runs in tests without a browser.
fn on_progress(
    slot: &mut DownloadSlot,
    guid: &str,
    state: &DownloadProgressState,
    received: f64,
    total: f64,
) {
    match state {
        DownloadProgressState::Completed => {
            if slot.complete(guid.to_string()) {
                debug!(target: "pdfpress", guid = %guid, "download completed");
            } else {
                // One download per run; anything extra is noise.
                warn!(target: "pdfpress", guid = %guid, "ignoring extra download completion");
            }
        }
        DownloadProgressState::InProgress => {
            debug!(target: "pdfpress", guid = %guid, received, total, "download progress");
        }
        DownloadProgressState::Canceled => {
            // The run will hit the deadline at the signal.
            warn!(target: "pdfpress", guid = %guid, "browser canceled the download");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn delivers_the_guid_exactly_once() {
        let (mut slot, mut signal) = signal();
        assert!(slot.complete("abc123".into()));

        let deadline = Deadline::after(Duration::from_secs(5));
        assert_eq!(signal.completed(deadline).await.unwrap(), "abc123");

        // Consumed; a second read reports closed instead of blocking.
        assert!(matches!(
            signal.completed(deadline).await,
            Err(Error::SignalClosed)
        ));
    }

    #[tokio::test]
    async fn duplicate_completion_is_rejected() {
        let (mut slot, mut signal) = signal();
        assert!(slot.complete("abc123".into()));
        assert!(!slot.complete("def456".into()));

        let deadline = Deadline::after(Duration::from_secs(5));
        assert_eq!(signal.completed(deadline).await.unwrap(), "abc123");
    }

    #[tokio::test]
    async fn dropped_slot_reports_closed() {
        let (slot, mut signal) = signal();
        drop(slot);

        let deadline = Deadline::after(Duration::from_secs(5));
        assert!(matches!(
            signal.completed(deadline).await,
            Err(Error::SignalClosed)
        ));
    }

    #[tokio::test]
    async fn unwritten_signal_times_out_instead_of_hanging() {
        let (_slot, mut signal) = signal();

        let deadline = Deadline::after(Duration::from_millis(50));
        match signal.completed(deadline).await {
            Err(Error::DeadlineExpired { pending }) => {
                assert!(pending.contains("download completion"))
            }
            other => panic!("expected a deadline expiry, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn completion_written_before_the_read_is_not_lost() {
        let (mut slot, mut signal) = signal();
        slot.complete("early".into());

        // Even a zero budget reads an already-filled slot.
        let deadline = Deadline::after(Duration::ZERO);
        assert_eq!(signal.completed(deadline).await.unwrap(), "early");
    }

    #[tokio::test]
    async fn only_completed_fills_the_slot() {
        let (mut slot, mut signal) = signal();
        on_progress(&mut slot, "g1", &DownloadProgressState::InProgress, 10.0, 100.0);
        on_progress(&mut slot, "g1", &DownloadProgressState::Canceled, 10.0, 100.0);

        // Still unfilled; the zero-budget read expires instead of yielding a guid.
        let deadline = Deadline::after(Duration::ZERO);
        assert!(matches!(
            signal.completed(deadline).await,
            Err(Error::DeadlineExpired { .. })
        ));
    }

    #[tokio::test]
    async fn extra_completed_events_are_ignored() {
        let (mut slot, mut signal) = signal();
        on_progress(&mut slot, "g1", &DownloadProgressState::Completed, 100.0, 100.0);
        on_progress(&mut slot, "g2", &DownloadProgressState::Completed, 100.0, 100.0);

        let deadline = Deadline::after(Duration::from_secs(5));
        assert_eq!(signal.completed(deadline).await.unwrap(), "g1");
    }
}
