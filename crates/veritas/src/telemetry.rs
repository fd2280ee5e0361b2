//! Log output for binaries embedding Veritas.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info,veritas_sync=debug";

/// Installs a `tracing` subscriber that writes to stderr.
///
/// Honors `RUST_LOG`. Does nothing if a global subscriber is already set,
/// so it is safe to call from tests and from several entry points.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_twice_does_not_panic() {
        init_tracing();
        init_tracing();
        tracing::info!("subscriber installed");
    }
}
