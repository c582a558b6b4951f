use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pdfpress")]
#[command(about = "Compress a PDF using Adobe's online compressor tool")]
#[command(version)]
pub struct Cli {
    /// PDF to compress
    pub input: PathBuf,

    /// Compression level: high, medium or low
    #[arg(long, default_value = "high", value_name = "LEVEL")]
    pub compression: String,

    /// Where to write the compressed PDF
    #[arg(
        short = 'o',
        long,
        alias = "outFile",
        default_value = "out.pdf",
        value_name = "PATH"
    )]
    pub out_file: PathBuf,

    /// Report the estimated size saving (reserved, currently has no effect)
    #[arg(long)]
    pub estimate: bool,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Run the browser with a visible window
    #[arg(long, alias = "disableHeadless")]
    pub disable_headless: bool,

    /// Abort the whole run after this many seconds
    #[arg(long, default_value_t = pdfpress::DEFAULT_SESSION_TIMEOUT_SECS, value_name = "SECS")]
    pub timeout: u64,
}
