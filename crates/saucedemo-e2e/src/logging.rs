//! Log subscriber setup for test binaries.

use tracing_subscriber::{fmt, EnvFilter};

/// Filter applied when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "saucedemo_e2e=info";

/// Install a fmt subscriber filtered by `RUST_LOG` (default
/// [`DEFAULT_FILTER`]) that writes through the test harness capture.
///
/// Safe to call from every test: only the first call installs anything.
/// Returns whether this call installed the subscriber.
pub fn init() -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        let _ = init();
        assert!(!init());
        tracing::info!("subscriber installed");
    }
}
