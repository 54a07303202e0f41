//! Log output for the hosts.
//!
//! Library code only emits `tracing` events. Native hosts call [`init`] once
//! to print them to stderr, filtered by `RUST_LOG` (default `warn`). In the
//! browser no subscriber is installed and events are dropped.

/// Install the default subscriber. Safe to call more than once; only the
/// first call has an effect.
pub fn init() {
    init_with(None);
}

/// Like [`init`], but `level` replaces the default directive.
pub fn init_with(level: Option<tracing::Level>) {
    #[cfg(not(target_arch = "wasm32"))]
    {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let env_filter = EnvFilter::builder()
            .with_default_directive(level.unwrap_or(tracing::Level::WARN).into())
            .from_env_lossy();

        let stderr = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(env_filter);

        if tracing_subscriber::registry().with(stderr).try_init().is_ok() {
            tracing::debug!(platform = ?crate::core::platform::Platform::current(), "logging ready");
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        let _ = level;
    }
}
