//! The top-level state machine: initialize, then loop the Runner until a
//! stop signal is observed or an unrecoverable error occurs.

use std::{
    fmt,
    future::Future,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::{client::RuntimeClient, config::Config, error::RuntimeError, handler::Handler, runner};

/// A boolean set by an external signal listener, observed cooperatively
/// at Running-loop iteration boundaries. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// A fresh, unset flag.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Request a graceful stop. Takes effect at the next iteration
    /// boundary; an in-flight invocation is always reported first.
    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The lifecycle's fatal outcome: either the handler factory failed
/// during initialization, or a non-transient runtime error ended the
/// Running loop.
#[derive(Debug)]
pub enum LifecycleError<E> {
    /// The factory supplied to [`run`] failed; the handler was never
    /// constructed.
    Initialization(E),
    /// A report or request-work call failed with a non-transient error
    /// during the Running loop.
    Runtime(RuntimeError),
}

impl<E: fmt::Display> fmt::Display for LifecycleError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::Initialization(err) => write!(f, "{err}"),
            LifecycleError::Runtime(err) => write!(f, "{err}"),
        }
    }
}

impl<E: fmt::Display + fmt::Debug> std::error::Error for LifecycleError<E> {}

/// Drive the Lifecycle state machine to completion.
///
/// `factory` is called exactly once to construct the handler. On
/// success the Running loop begins; on failure, `report_init_error` is
/// sent best-effort (a failure to report it is logged and swallowed —
/// the factory's own error is still what's returned) and `run` returns
/// that error without ever entering the Running loop.
///
/// Returns the number of successfully reported invocations on a clean
/// stop, or the fatal error otherwise.
pub async fn run<F, Fut, H, E>(client: RuntimeClient, config: Config, stop_flag: StopFlag, factory: F) -> Result<u64, LifecycleError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<H, E>>,
    H: Handler,
    E: fmt::Display,
{
    let mut handler = match factory().await {
        Ok(handler) => handler,
        Err(err) => {
            let message = err.to_string();
            if let Err(report_err) = client.report_init_error(message).await {
                tracing::error!(error = %report_err, "failed to report initialization error");
            }
            return Err(LifecycleError::Initialization(err));
        }
    };

    let mut count: u64 = 0;
    loop {
        if stop_flag.is_set() {
            tracing::info!(count, "stop flag observed, shutting down");
            return Ok(count);
        }
        if let Some(max) = config.lifecycle.max_times {
            if count >= max {
                tracing::info!(count, "reached max_times, shutting down");
                return Ok(count);
            }
        }

        match runner::run_once(&client, &mut handler, &config).await {
            Ok(()) => {
                count += 1;
            }
            Err(RuntimeError::UpstreamError(reason)) => {
                tracing::warn!(reason = %reason, "transient runtime API error, continuing");
            }
            Err(other) => {
                tracing::error!(error = %other, count, "non-transient runtime error, shutting down");
                return Err(LifecycleError::Runtime(other));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_flag_starts_unset() {
        assert!(!StopFlag::new().is_set());
    }

    #[test]
    fn stop_flag_set_is_observed_through_clones() {
        let flag = StopFlag::new();
        let clone = flag.clone();
        clone.set();
        assert!(flag.is_set());
    }

    #[test]
    fn lifecycle_error_display_delegates_to_the_inner_error() {
        let err: LifecycleError<String> = LifecycleError::Initialization("cant_init".to_string());
        assert_eq!("cant_init", err.to_string());

        let err: LifecycleError<String> = LifecycleError::Runtime(RuntimeError::NoBody);
        assert_eq!("response had no body", err.to_string());
    }
}
