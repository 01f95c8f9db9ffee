#![deny(clippy::all, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]
#![warn(missing_docs, nonstandard_style, rust_2018_idioms)]

//! Lifecycle and dispatch core for a custom Lambda-style runtime.
//!
//! A process built on this crate polls the Runtime API for the next
//! invocation, hands its payload to a user-supplied [`Handler`], and
//! reports the handler's response or failure back, repeating until
//! signalled to stop or until an unrecoverable error occurs.
//!
//! ```no_run
//! use lambda_runtime::{Config, Handler, StopFlag};
//!
//! struct Echo;
//!
//! impl Handler for Echo {
//!     type Error = std::convert::Infallible;
//!
//!     async fn handle(
//!         &mut self,
//!         payload: bytes::Bytes,
//!         _context: lambda_runtime::Context,
//!     ) -> Result<Option<bytes::Bytes>, Self::Error> {
//!         Ok(Some(payload))
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), lambda_runtime::Error> {
//!     let config = Config::from_env()?;
//!     lambda_runtime::run(config, StopFlag::new(), || async { Ok::<_, std::convert::Infallible>(Echo) }).await?;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod context;
mod error;
mod handler;
mod invocation;
mod lifecycle;
#[cfg(feature = "tracing")]
mod logging;
mod runner;

pub use client::RuntimeClient;
pub use config::{Config, FunctionEnv, GeneralSettings, LifecycleSettings, RuntimeSettings};
pub use context::{ClientApplication, ClientContext, CognitoIdentity, Context};
pub use error::{ErrorResponse, ErrorType, RuntimeError};
pub use handler::Handler;
pub use invocation::Invocation;
pub use lifecycle::{LifecycleError, StopFlag};
#[cfg(feature = "tracing")]
pub use logging::init as init_logging;

/// A convenience alias for a handler's own fallible setup, via `?`.
/// The core itself never needs to hold a `dyn Error` since
/// [`RuntimeError`] and [`LifecycleError`] are concrete enums.
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Construct the Transport and Runtime clients from `config` and drive
/// the [`lifecycle::run`] state machine with `factory` to completion.
///
/// This is the process entry point a deployed function's `main` calls.
/// It owns nothing beyond what one process-lifetime run needs: a stop
/// flag must be wired to a signal listener separately (see the
/// `graceful-shutdown` feature) if the process should support a clean
/// exit before the platform kills it.
pub async fn run<F, Fut, H, E>(config: Config, stop_flag: StopFlag, factory: F) -> Result<u64, LifecycleError<E>>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<H, E>>,
    H: Handler,
    E: std::fmt::Display,
{
    let transport = lambda_runtime_api_client::Client::builder()
        .with_endpoint(
            config
                .runtime
                .api_endpoint
                .parse()
                .expect("AWS_LAMBDA_RUNTIME_API must be a valid authority"),
        )
        .with_request_timeout(config.runtime.request_timeout)
        .build()
        .expect("failed to build the Runtime API transport client");
    let client = RuntimeClient::new(transport);

    lifecycle::run(client, config, stop_flag, factory).await
}

/// Wires the configured stop signal into a [`StopFlag`] without the core
/// itself ever touching signal-trapping APIs, matching the scoping of
/// "signal trapping plumbing" as an external collaborator.
#[cfg(feature = "graceful-shutdown")]
pub mod shutdown {
    use super::StopFlag;

    /// Spawn a task that sets `stop_flag` the first time `signal_kind`
    /// is received (SIGTERM by default for a production deployment).
    pub async fn watch(signal_kind: tokio::signal::unix::SignalKind, stop_flag: StopFlag) {
        let mut signal = match tokio::signal::unix::signal(signal_kind) {
            Ok(signal) => signal,
            Err(err) => {
                tracing::error!(error = %err, "failed to install signal handler");
                return;
            }
        };
        signal.recv().await;
        tracing::info!("stop signal received, beginning graceful shutdown");
        stop_flag.set();
    }
}
