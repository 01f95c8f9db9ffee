//! Validates the response to a "next invocation" call and constructs the
//! [`Invocation`] value plus its payload.

use bytes::Bytes;
use http::StatusCode;
use lambda_runtime_api_client::Response;

use crate::error::RuntimeError;

pub(crate) const REQUEST_ID_HEADER: &str = "Lambda-Runtime-Aws-Request-Id";
pub(crate) const DEADLINE_HEADER: &str = "Lambda-Runtime-Deadline-Ms";
pub(crate) const FUNCTION_ARN_HEADER: &str = "Lambda-Runtime-Invoked-Function-Arn";
pub(crate) const TRACE_ID_HEADER: &str = "Lambda-Runtime-Trace-Id";
pub(crate) const CLIENT_CONTEXT_HEADER: &str = "Lambda-Runtime-Client-Context";
pub(crate) const COGNITO_IDENTITY_HEADER: &str = "Lambda-Runtime-Cognito-Identity";

/// One unit of work handed out by the Runtime API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Identifies this invocation; echoed in the report URL.
    pub request_id: String,
    /// Absolute wall-clock deadline, milliseconds since the Unix epoch.
    pub deadline_millis_since_epoch: i64,
    /// ARN of the function being invoked.
    pub invoked_function_arn: String,
    /// X-Ray trace id for this invocation.
    pub trace_id: String,
    /// Mobile SDK client context, as a raw (unparsed) JSON string.
    pub client_context: Option<String>,
    /// Amazon Cognito identity, as a raw (unparsed) JSON string.
    pub cognito_identity: Option<String>,
}

/// Validate a `request_work` response and split it into an [`Invocation`]
/// and its payload bytes.
///
/// Order matters: status is checked before the body is examined, and the
/// body before headers, matching the order the Runtime API's own
/// contract violations are most cheaply detected in.
pub fn parse(response: Response) -> Result<(Invocation, Bytes), RuntimeError> {
    if response.status != StatusCode::OK {
        return Err(RuntimeError::BadStatusCode(response.status.as_u16()));
    }

    if response.body.is_none() {
        return Err(RuntimeError::NoBody);
    }

    let request_id = required_header(&response, REQUEST_ID_HEADER)?;
    let deadline_raw = required_header(&response, DEADLINE_HEADER)?;
    let invoked_function_arn = required_header(&response, FUNCTION_ARN_HEADER)?;
    let trace_id = required_header(&response, TRACE_ID_HEADER)?;

    // A malformed deadline is reported under the same error as a missing
    // one: a known conflation carried over from the source this adapter
    // is modeled on.
    let deadline_millis_since_epoch: i64 = deadline_raw
        .parse()
        .map_err(|_| RuntimeError::InvocationMissingHeader(DEADLINE_HEADER.to_string()))?;

    let client_context = optional_header(&response, CLIENT_CONTEXT_HEADER);
    let cognito_identity = optional_header(&response, COGNITO_IDENTITY_HEADER);

    let body = response.body.expect("checked for Some above");

    Ok((
        Invocation {
            request_id,
            deadline_millis_since_epoch,
            invoked_function_arn,
            trace_id,
            client_context,
            cognito_identity,
        },
        body,
    ))
}

fn required_header(response: &Response, name: &str) -> Result<String, RuntimeError> {
    response
        .header_str(name)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| RuntimeError::InvocationMissingHeader(name.to_string()))
}

fn optional_header(response: &Response, name: &str) -> Option<String> {
    response.header_str(name).filter(|v| !v.is_empty()).map(str::to_string)
}
