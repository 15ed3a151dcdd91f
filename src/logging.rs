//! Process-wide logging setup.
//!
//! Diagnostics go to standard error through `tracing`; the level comes from
//! `RUST_LOG` when set, otherwise `info` (or `debug` with `--verbose`).

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(false);
        init(true);
        tracing::info!("logging initialized twice without panicking");
    }
}
