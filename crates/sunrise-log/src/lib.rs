//! Structured logging for the sunrise scene.
//!
//! Console output with uptime timestamps and module paths, filtered by
//! `RUST_LOG` or, failing that, the configured log level.

use sunrise_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info,eframe=warn,egui_glow=warn";

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.debug.log_level`. Calling this
/// twice is harmless: the second installation attempt is ignored.
///
/// ```no_run
/// use sunrise_config::Config;
/// use sunrise_log::init_logging;
///
/// init_logging(Some(&Config::default()));
/// ```
pub fn init_logging(config: Option<&Config>) {
    let filter_str = filter_for(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    // try_init: tests and embedders may already own the global subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}

/// Filter string derived from the config, falling back to [`DEFAULT_FILTER`].
pub fn filter_for(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.is_empty() => config.debug.log_level.clone(),
        _ => DEFAULT_FILTER.to_string(),
    }
}
