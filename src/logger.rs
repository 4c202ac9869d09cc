pub use tracing::{debug, error, info, warn, trace, instrument};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt::{self, format::FmtSpan}};

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level is `info`, or `debug`
/// when `verbose` is set. At debug level span close events are logged too,
/// which gives per-file decode/encode timings.
pub fn init(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "info" })
    });

    let span_events = if env_filter.to_string().contains("debug") {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .with_span_events(span_events);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
