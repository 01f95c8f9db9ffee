//! The byte-buffer handler contract: user code receives a payload and a
//! [`Context`] and produces either an optional response or an error.
//!
//! Typed, serde-driven bindings are a layer above this one and out of
//! scope here; a handler here deals only in raw bytes.

use bytes::Bytes;

use crate::context::Context;

/// User code invoked once per invocation.
///
/// The contract is exactly one completion per call: either success with
/// an optional response body, or failure with an error whose `Display`
/// becomes the reported `errorMessage`.
pub trait Handler {
    /// The error type this handler's invocations may fail with.
    type Error: std::fmt::Display;

    /// Handle one invocation.
    fn handle(
        &mut self,
        payload: Bytes,
        context: Context,
    ) -> impl std::future::Future<Output = Result<Option<Bytes>, Self::Error>> + Send;
}
