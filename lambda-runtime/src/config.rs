//! Environment-driven configuration, read once at process start and
//! treated as read-only thereafter.

use std::{env, time::Duration};

/// The `runtime.*` options: where the Runtime API lives and how long a
/// single HTTP exchange with it may take.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    /// `host:port` of the Runtime API, from `AWS_LAMBDA_RUNTIME_API`.
    pub api_endpoint: String,
    /// Per-HTTP-call timeout. 300s in production; tests typically use
    /// something on the order of 100ms.
    pub request_timeout: Duration,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            api_endpoint: String::new(),
            request_timeout: lambda_runtime_api_client::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// The `lifecycle.*` options: when the Running loop should stop.
#[derive(Debug, Clone, Default)]
pub struct LifecycleSettings {
    /// Testing knob: stop after this many successfully reported
    /// invocations. `None` means unlimited, as in production.
    pub max_times: Option<u64>,
}

/// The `general.*` options.
#[derive(Debug, Clone)]
pub struct GeneralSettings {
    /// Minimum `tracing` level to emit, e.g. `"info"`.
    pub log_level: String,
    /// `"json"` for structured logs, anything else for the default
    /// human-readable formatter.
    pub log_format: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "INFO".to_string(),
            log_format: String::new(),
        }
    }
}

/// The function identity and environment values surfaced to the handler
/// through [`crate::Context`], sourced from `AWS_LAMBDA_FUNCTION_*` and
/// `AWS_LAMBDA_LOG_*`.
#[derive(Debug, Clone, Default)]
pub struct FunctionEnv {
    /// Opaque handler identifier from `_HANDLER`.
    pub handler: Option<String>,
    /// `AWS_LAMBDA_FUNCTION_NAME`.
    pub function_name: Option<String>,
    /// `AWS_LAMBDA_FUNCTION_VERSION`.
    pub function_version: Option<String>,
    /// `AWS_LAMBDA_FUNCTION_MEMORY_SIZE`, parsed as an integer.
    pub memory_limit_in_mb: Option<i32>,
    /// `AWS_LAMBDA_LOG_GROUP_NAME`.
    pub log_group_name: Option<String>,
    /// `AWS_LAMBDA_LOG_STREAM_NAME`.
    pub log_stream_name: Option<String>,
}

/// A frozen configuration value established once at process start.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Runtime API connection and timeout settings.
    pub runtime: RuntimeSettings,
    /// Running-loop stop conditions.
    pub lifecycle: LifecycleSettings,
    /// Logging settings.
    pub general: GeneralSettings,
    /// Function identity surfaced to the handler.
    pub function: FunctionEnv,
}

impl Config {
    /// Read configuration from the process environment, the way a
    /// deployed function does.
    pub fn from_env() -> Result<Self, env::VarError> {
        let api_endpoint = env::var("AWS_LAMBDA_RUNTIME_API")?;
        Ok(Self {
            runtime: RuntimeSettings {
                api_endpoint,
                ..RuntimeSettings::default()
            },
            lifecycle: LifecycleSettings::default(),
            general: GeneralSettings {
                log_level: env::var("AWS_LAMBDA_LOG_LEVEL").unwrap_or_else(|_| "INFO".to_string()),
                log_format: env::var("AWS_LAMBDA_LOG_FORMAT").unwrap_or_default(),
            },
            function: FunctionEnv {
                handler: env::var("_HANDLER").ok(),
                function_name: env::var("AWS_LAMBDA_FUNCTION_NAME").ok(),
                function_version: env::var("AWS_LAMBDA_FUNCTION_VERSION").ok(),
                memory_limit_in_mb: env::var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE").ok().and_then(|v| v.parse().ok()),
                log_group_name: env::var("AWS_LAMBDA_LOG_GROUP_NAME").ok(),
                log_stream_name: env::var("AWS_LAMBDA_LOG_STREAM_NAME").ok(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_general_settings_use_info_level() {
        assert_eq!("INFO", GeneralSettings::default().log_level);
    }

    #[test]
    fn default_lifecycle_settings_are_unlimited() {
        assert_eq!(None, LifecycleSettings::default().max_times);
    }
}
