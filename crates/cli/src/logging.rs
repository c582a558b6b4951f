use tracing_subscriber::EnvFilter;

/// warn by default, info at `-v`, debug from `-vv`. `RUST_LOG` wins when
/// set. Logs go to stderr; stdout carries only the final confirmation.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pdfpress={level},pdfpress_cli={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
