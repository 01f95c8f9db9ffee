//! The Runner: executes one invocation end to end. Stateless across
//! invocations aside from the shared [`RuntimeClient`].

use bytes::Bytes;
use futures_util::FutureExt;

use crate::{client::RuntimeClient, config::Config, context::Context, error::RuntimeError, handler::Handler};

/// Obtain work, invoke the handler, report the outcome.
///
/// A failure of the report call propagates out as a [`RuntimeError`]; a
/// failure *reported by the handler* is not itself an error here — it
/// was successfully reported, and that's success as far as the Runner
/// is concerned.
pub async fn run_once<H>(client: &RuntimeClient, handler: &mut H, env_config: &Config) -> Result<(), RuntimeError>
where
    H: Handler,
{
    let (invocation, payload) = client.request_work().await?;
    let request_id = invocation.request_id.clone();

    tracing::info!(
        request_id = %request_id,
        invoked_function_arn = %invocation.invoked_function_arn,
        "invocation received"
    );

    let context = Context::new(&invocation, env_config.clone());

    match invoke(handler, payload, context).await {
        Ok(response) => {
            client.report_success(&request_id, response).await?;
            tracing::info!(request_id = %request_id, outcome = "success", "invocation reported");
        }
        Err(message) => {
            client.report_failure(&request_id, message).await?;
            tracing::info!(request_id = %request_id, outcome = "handler_error", "invocation reported");
        }
    }

    Ok(())
}

/// Runs the handler, containing a panic instead of letting it take the
/// process down with it. A caught panic is reported the same way an
/// ordinary handler error would be.
async fn invoke<H>(handler: &mut H, payload: Bytes, context: Context) -> Result<Option<Bytes>, String>
where
    H: Handler,
{
    match std::panic::AssertUnwindSafe(handler.handle(payload, context)).catch_unwind().await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(err)) => Err(err.to_string()),
        Err(panic) => Err(panic_message(panic)),
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
