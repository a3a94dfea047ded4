use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the `tracing` subscriber for the dashboard binary.
///
/// Verbosity comes from `RUST_LOG` (default `info`). Output goes to stderr
/// so it never interleaves with the dashboard printed on stdout.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    info!("Dashboard logging ready");
}
