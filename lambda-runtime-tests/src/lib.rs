//! Shared helpers for the end-to-end tests in `tests/`: a short-timeout
//! [`lambda_runtime::Config`] pointed at a `httpmock` server standing in
//! for the Runtime API.

use lambda_runtime::Config;

/// Build a `Config` pointed at `server_address` with a short request
/// timeout, suitable for driving `lambda_runtime::run` against a mock.
pub fn test_config(server_address: &str) -> Config {
    let mut config = Config::default();
    config.runtime.api_endpoint = server_address.to_string();
    config.runtime.request_timeout = std::time::Duration::from_millis(200);
    config
}
