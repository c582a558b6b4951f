//! Full post-launch flow against the scripted page driver: plan execution,
//! download signal, artifact placement. No browser involved.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use pdfpress::compress::drive;
use pdfpress::download;
use pdfpress::error::Error;
use pdfpress::script::compression_plan;
use pdfpress::scripted::{Answer, Op, ScriptedPage};
use pdfpress::session::Deadline;
use pdfpress::{CompressionLevel, SiteContract};

fn input() -> PathBuf {
    PathBuf::from("/tmp/invoice.pdf")
}

#[tokio::test]
async fn compresses_and_places_the_artifact() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("abc123"), b"%PDF-1.7 compressed").unwrap();

    let site = SiteContract::adobe();
    let page = ScriptedPage::new()
        .answer(&site.level_panel, Answer::ReadyAfter(2))
        .answer(&site.submit, Answer::ReadyAfter(1))
        .answer(&site.download, Answer::ReadyAfter(1));
    let plan = compression_plan(&site, CompressionLevel::Medium, &input());

    // The watcher is armed before any step runs; a download completing
    // while the trigger click is still in flight is already caught.
    let (mut slot, mut signal) = download::signal();
    assert!(slot.complete("abc123".into()));

    let out = dir.path().join("result.pdf");
    let deadline = Deadline::after(Duration::from_secs(10));
    let placed = drive(&page, &plan, &mut signal, deadline, dir.path(), &out)
        .await
        .unwrap();

    assert_eq!(placed, out);
    assert_eq!(fs::read(&out).unwrap(), b"%PDF-1.7 compressed");
    assert!(!dir.path().join("abc123").exists());

    assert_eq!(
        page.take_ops().await,
        vec![
            Op::Navigate(site.url.clone()),
            Op::Upload {
                selector: site.file_input.clone(),
                file: input(),
            },
            Op::Click(site.level_option(CompressionLevel::Medium)),
            Op::Click(site.submit.clone()),
            Op::Click(site.download.clone()),
        ]
    );
}

#[tokio::test]
async fn download_completing_mid_plan_is_caught() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("late456"), b"%PDF-1.7").unwrap();

    let site = SiteContract::adobe();
    // Enough pending polls on the download control for the completion to
    // arrive while the plan is still running.
    let page = ScriptedPage::new().answer(&site.download, Answer::ReadyAfter(4));
    let plan = compression_plan(&site, CompressionLevel::High, &input());

    let (mut slot, mut signal) = download::signal();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(150)).await;
        slot.complete("late456".into());
    });

    let out = dir.path().join("out.pdf");
    let deadline = Deadline::after(Duration::from_secs(10));
    drive(&page, &plan, &mut signal, deadline, dir.path(), &out)
        .await
        .unwrap();

    assert!(out.exists());
}

#[tokio::test]
async fn stalled_submit_times_out_and_stops_the_plan() {
    let dir = tempfile::tempdir().unwrap();

    let site = SiteContract::adobe();
    let page = ScriptedPage::new().answer(&site.submit, Answer::Never);
    let plan = compression_plan(&site, CompressionLevel::High, &input());

    let (_slot, mut signal) = download::signal();
    let out = dir.path().join("out.pdf");
    let deadline = Deadline::after(Duration::from_millis(300));

    let err = drive(&page, &plan, &mut signal, deadline, dir.path(), &out)
        .await
        .unwrap_err();
    match err {
        Error::DeadlineExpired { pending } => {
            assert!(pending.contains("step 'submit'"), "pending: {pending}")
        }
        other => panic!("expected a deadline expiry, got {other:?}"),
    }

    // The run stopped at the stalled wait: no submit click, no download
    // click, nothing finalized.
    let ops = page.take_ops().await;
    assert_eq!(
        ops.last(),
        Some(&Op::Click(site.level_option(CompressionLevel::High)))
    );
    assert!(!ops.contains(&Op::Click(site.submit.clone())));
    assert!(!out.exists());
}

#[tokio::test]
async fn dead_watcher_surfaces_as_closed_signal_not_a_hang() {
    let dir = tempfile::tempdir().unwrap();

    let site = SiteContract::adobe();
    let page = ScriptedPage::new();
    let plan = compression_plan(&site, CompressionLevel::Low, &input());

    let (slot, mut signal) = download::signal();
    drop(slot);

    let out = dir.path().join("out.pdf");
    let deadline = Deadline::after(Duration::from_secs(10));
    let err = drive(&page, &plan, &mut signal, deadline, dir.path(), &out)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SignalClosed));
}

#[tokio::test]
async fn reported_guid_must_exist_on_disk() {
    let dir = tempfile::tempdir().unwrap();

    let site = SiteContract::adobe();
    let page = ScriptedPage::new();
    let plan = compression_plan(&site, CompressionLevel::High, &input());

    let (mut slot, mut signal) = download::signal();
    slot.complete("ghost-guid".into());

    let out = dir.path().join("out.pdf");
    let deadline = Deadline::after(Duration::from_secs(10));
    let err = drive(&page, &plan, &mut signal, deadline, dir.path(), &out)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ArtifactMissing { ref guid, .. } if guid == "ghost-guid"));
}
