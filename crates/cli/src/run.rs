use std::fs;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use pdfpress::{CompressionLevel, CompressionRequest, SessionOptions};

use crate::cli::Cli;

/// Validates the invocation and hands the request to the automation core.
///
/// Everything that can be rejected without a browser is rejected here: the
/// compression level and the input file. The input path is canonicalized
/// because the browser process resolves it, not this one.
pub async fn execute(cli: Cli) -> Result<()> {
    let level: CompressionLevel = cli.compression.parse()?;

    let input = fs::canonicalize(&cli.input)
        .with_context(|| format!("cannot read input file {}", cli.input.display()))?;
    if !fs::metadata(&input)?.is_file() {
        bail!("input {} is not a file", input.display());
    }
    // The browser opens the file mid-run; reject an unreadable one up front.
    fs::File::open(&input)
        .with_context(|| format!("cannot read input file {}", input.display()))?;

    let request =
        CompressionRequest::new(input, level, cli.out_file.clone()).with_estimate(cli.estimate);
    let options = SessionOptions {
        headless: !cli.disable_headless,
        timeout: Duration::from_secs(cli.timeout),
    };

    let out = pdfpress::run(&request, options).await?;
    println!("wrote {}", out.display());
    Ok(())
}
