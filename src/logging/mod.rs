use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "portal_lists=warn",
        1 => "portal_lists=info",
        2 => "portal_lists=debug",
        _ => "portal_lists=trace",
    }
}

/// Install the stderr subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging(verbosity: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
