//! The Runtime Client: knows the four Runtime API endpoints and wraps
//! the Transport Client into the logical operations the rest of the
//! runtime deals in.

use bytes::Bytes;
use http::StatusCode;
use lambda_runtime_api_client::{Client as TransportClient, Response, TransportError};

use crate::{
    error::{ErrorResponse, ErrorType, RuntimeError},
    invocation::{self, Invocation},
};

const NEXT_INVOCATION_PATH: &str = "/2018-06-01/runtime/invocation/next";
const INIT_ERROR_PATH: &str = "/2018-06-01/runtime/init/error";

/// Wraps a [`TransportClient`] with the four Runtime API operations this
/// runtime needs.
pub struct RuntimeClient {
    transport: TransportClient,
}

impl RuntimeClient {
    /// Build a client over an already-configured transport.
    pub fn new(transport: TransportClient) -> Self {
        Self { transport }
    }

    /// `GET /runtime/invocation/next`, parsed into an [`Invocation`] and
    /// its payload.
    pub async fn request_work(&self) -> Result<(Invocation, Bytes), RuntimeError> {
        let response = self.transport.get(NEXT_INVOCATION_PATH).await.map_err(classify_transport_error)?;
        invocation::parse(response)
    }

    /// `POST /runtime/invocation/<request_id>/response` with the
    /// handler's response bytes, if any.
    pub async fn report_success(&self, request_id: &str, body: Option<Bytes>) -> Result<(), RuntimeError> {
        let path = format!("/2018-06-01/runtime/invocation/{request_id}/response");
        let response = self
            .transport
            .post(&path, body.unwrap_or_default())
            .await
            .map_err(classify_transport_error)?;
        expect_accepted(response)
    }

    /// `POST /runtime/invocation/<request_id>/error` reporting a handler
    /// failure.
    pub async fn report_failure(&self, request_id: &str, error_message: String) -> Result<(), RuntimeError> {
        let path = format!("/2018-06-01/runtime/invocation/{request_id}/error");
        self.report_error(&path, ErrorType::FunctionError, error_message).await
    }

    /// `POST /runtime/init/error` reporting a failure to construct the
    /// handler.
    pub async fn report_init_error(&self, error_message: String) -> Result<(), RuntimeError> {
        self.report_error(INIT_ERROR_PATH, ErrorType::InitializationError, error_message).await
    }

    async fn report_error(&self, path: &str, error_type: ErrorType, error_message: String) -> Result<(), RuntimeError> {
        let body = ErrorResponse::new(error_type, error_message).to_json();
        let response = self.transport.post(path, body).await.map_err(classify_transport_error)?;
        expect_accepted(response)
    }
}

fn expect_accepted(response: Response) -> Result<(), RuntimeError> {
    if response.status == StatusCode::ACCEPTED {
        Ok(())
    } else {
        Err(RuntimeError::BadStatusCode(response.status.as_u16()))
    }
}

/// Every transport failure surfaces as an `upstream_error`: the two
/// named reasons get their documented strings, anything else keeps its
/// own message. There's no separate "raw I/O" runtime error kind —
/// Lifecycle treats all `upstream_error`s as transient alike.
fn classify_transport_error(err: TransportError) -> RuntimeError {
    match err {
        TransportError::Timeout => RuntimeError::UpstreamError("timeout".to_string()),
        TransportError::ConnectionReset => RuntimeError::UpstreamError("connectionResetByPeer".to_string()),
        TransportError::Io(err) => RuntimeError::UpstreamError(err.to_string()),
    }
}
