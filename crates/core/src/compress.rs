//! Wires one compression run together: session, armed watcher, interaction
//! script, download signal, artifact.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::artifact;
use crate::config::CompressionRequest;
use crate::download::{DownloadSignal, DownloadWatcher};
use crate::error::Result;
use crate::page::{CdpPage, PageDriver};
use crate::script::{self, Step};
use crate::session::{Deadline, Session, SessionOptions};
use crate::site::SiteContract;

/// Compresses one PDF through the site and returns the output path.
///
/// The browser is torn down on every exit path; an error or an expired
/// deadline never leaves a process behind. Downloads land in the current
/// working directory before the finalizer moves them, matching where the
/// browser was told to materialize them.
pub async fn run(request: &CompressionRequest, options: SessionOptions) -> Result<PathBuf> {
    if request.estimate {
        warn!(target: "pdfpress", "estimate mode is reserved and has no effect; compressing normally");
    }

    let workdir = std::env::current_dir()?;
    let site = SiteContract::adobe();
    let plan = script::compression_plan(&site, request.level, &request.input);

    info!(
        target: "pdfpress",
        input = %request.input.display(),
        level = %request.level,
        out = %request.out_file.display(),
        "starting compression run"
    );

    let session = Session::launch(options).await?;
    let deadline = session.deadline();

    // Armed before the first step runs: a download that completes while the
    // trigger click is still being processed must already have a listener.
    let result = match DownloadWatcher::arm(session.page(), &workdir).await {
        Ok((_watcher, mut signal)) => {
            let page = CdpPage::new(session.page().clone());
            drive(
                &page,
                &plan,
                &mut signal,
                deadline,
                &workdir,
                &request.out_file,
            )
            .await
        }
        Err(err) => Err(err),
    };

    session.shutdown().await;
    result
}

/// Everything between a ready session and a finalized artifact.
///
/// Takes the page behind the driver seam and an already-armed signal, so
/// the whole sequence runs without a browser. The signal wait is the one
/// suspension point that is not a DOM wait, and it shares the same deadline.
pub async fn drive<P: PageDriver + ?Sized>(
    page: &P,
    plan: &[Step],
    signal: &mut DownloadSignal,
    deadline: Deadline,
    download_dir: &Path,
    out_file: &Path,
) -> Result<PathBuf> {
    script::run_plan(page, plan, deadline).await?;

    info!(target: "pdfpress", "waiting for the download to complete");
    let guid = signal.completed(deadline).await?;

    artifact::place(download_dir, &guid, out_file)
}
