//! Installs a `tracing` subscriber driven off [`GeneralSettings`],
//! generalizing `lambda_runtime_api_client::tracing::init_default_subscriber`'s
//! env-var-only setup into one that also takes configuration directly.

use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use crate::config::GeneralSettings;

/// Install the process-wide log subscriber. `RUST_LOG`, if set, still
/// takes precedence over `general.log_level` for fine-grained filtering.
pub fn init(general: &GeneralSettings) {
    let level: LevelFilter = general.log_level.parse().unwrap_or(LevelFilter::INFO);
    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    let subscriber = tracing_subscriber::fmt().with_target(false).with_env_filter(filter);

    if general.log_format.eq_ignore_ascii_case("json") {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
