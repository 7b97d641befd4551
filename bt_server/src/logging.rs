//! Logger initialization.

use env_logger::Env;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Initialize `env_logger` from `RUST_LOG`, falling back to `info`.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .format_target(false)
        .try_init();
}
