//! The runtime's own error taxonomy, and the wire format used to report
//! a failure back to the Runtime API.

use std::fmt;

/// Every way the lifecycle/dispatch core can fail.
///
/// Equality is by variant and content; `JsonEncode`'s inner value is an
/// already-stringified message, so two `JsonEncode` errors compare equal
/// when their messages match, independent of the underlying error type
/// that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A Runtime API call returned a status code other than the one
    /// expected for that operation.
    BadStatusCode(u16),
    /// A transport-level failure, reported upstream. `timeout` and
    /// `connectionResetByPeer` are the two reasons with documented
    /// behavior; any other transport failure surfaces its own message.
    UpstreamError(String),
    /// A required invocation header was missing, empty, or malformed.
    InvocationMissingHeader(String),
    /// The Runtime API responded to `request_work` with no body at all.
    NoBody,
    /// An `ErrorResponse` could not be encoded to JSON.
    JsonEncode(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::BadStatusCode(status) => write!(f, "unexpected status code {status}"),
            RuntimeError::UpstreamError(reason) => write!(f, "upstream error: {reason}"),
            RuntimeError::InvocationMissingHeader(name) => write!(f, "missing or invalid header: {name}"),
            RuntimeError::NoBody => write!(f, "response had no body"),
            RuntimeError::JsonEncode(message) => write!(f, "failed to encode JSON: {message}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

/// The two error types the Runtime API distinguishes: one for a handler
/// failure and one for a failure to initialize the handler at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// The handler ran and failed.
    FunctionError,
    /// The handler could not be constructed.
    InitializationError,
}

impl ErrorType {
    fn as_str(self) -> &'static str {
        match self {
            ErrorType::FunctionError => "FunctionError",
            ErrorType::InitializationError => "InitializationError",
        }
    }
}

/// The JSON body reported to `.../error` and `.../init/error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Which of the two error kinds this is.
    pub error_type: ErrorType,
    /// A free-form description of the failure.
    pub error_message: String,
}

impl ErrorResponse {
    /// Create a new response.
    pub fn new(error_type: ErrorType, error_message: impl Into<String>) -> Self {
        Self {
            error_type,
            error_message: error_message.into(),
        }
    }

    /// Render the exact wire bytes: `{ "errorType": "...", "errorMessage": "..." }`.
    ///
    /// Hand-rolled rather than delegated to a general-purpose JSON
    /// encoder so the escape table is guaranteed byte-for-byte
    /// independent of that encoder's own escaping choices.
    pub fn to_json(&self) -> String {
        let mut out = String::with_capacity(32 + self.error_message.len());
        out.push_str("{ \"errorType\": \"");
        out.push_str(self.error_type.as_str());
        out.push_str("\", \"errorMessage\": \"");
        escape_json_string(&self.error_message, &mut out);
        out.push_str("\" }");
        out
    }
}

fn escape_json_string(input: &str, out: &mut String) {
    for c in input.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                use std::fmt::Write as _;
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            c => out.push(c),
        }
    }
}
