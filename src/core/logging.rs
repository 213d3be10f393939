//! Subscriber setup for the bot binary.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::config::{LogFormat, MonitoringConfig};

/// Full filter directives, e.g. `CROWDKEYS_LOG=crowdkeys::tactile=debug,info`.
pub const LOG_ENV_VAR: &str = "CROWDKEYS_LOG";

/// Transport crates that are chatty at debug level.
const QUIET_DIRECTIVES: &[&str] = &[
    "tungstenite=warn",
    "tokio_tungstenite=warn",
    "hyper=warn",
    "reqwest=warn",
    "warp=info",
];

/// `CROWDKEYS_LOG` when set and valid, otherwise the configured level with
/// the transport crates held down.
pub fn build_filter(log_level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV_VAR) {
        return filter;
    }

    QUIET_DIRECTIVES
        .iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(EnvFilter::new(log_level), |filter, directive| filter.add_directive(directive))
}

pub fn init_logging(monitoring: &MonitoringConfig) -> Result<(), TryInitError> {
    let filter = build_filter(&monitoring.log_level);

    match monitoring.log_format {
        LogFormat::Full => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()?,
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_target(false))
            .try_init()?,
    }

    tracing::info!(
        "Logging initialized (level: {}, format: {:?})",
        monitoring.log_level,
        monitoring.log_format
    );
    Ok(())
}
