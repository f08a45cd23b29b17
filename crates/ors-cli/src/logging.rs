// Tracing setup. RUST_LOG wins over the --verbose flag.
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init_tracing(verbose: bool) {
    let level = if verbose { "ors_admin=debug,ors_cli=debug" } else { "warn" };
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
