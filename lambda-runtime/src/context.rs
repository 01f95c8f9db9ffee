//! The per-invocation value handed to the handler, combining the
//! [`Invocation`](crate::Invocation)'s fields with process-wide [`Config`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{config::Config, invocation::Invocation};

/// Mobile SDK application identity, part of [`ClientContext`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientApplication {
    /// The mobile app installation id.
    pub installation_id: String,
    /// The app title.
    pub app_title: String,
    /// The app version name.
    pub app_version_name: String,
    /// The app version code.
    pub app_version_code: String,
    /// The app package name.
    pub app_package_name: String,
}

/// Client context sent by the AWS Mobile SDK, present only for
/// invocations originating from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientContext {
    /// The client application that made the request.
    #[serde(default)]
    pub client: ClientApplication,
    /// Custom values set by the client application.
    #[serde(default)]
    pub custom: HashMap<String, String>,
    /// Environment values set by the Mobile SDK.
    #[serde(default)]
    pub environment: HashMap<String, String>,
}

/// Amazon Cognito identity of the caller, present only for invocations
/// made through an identity pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CognitoIdentity {
    /// The unique identity id for the Cognito credentials making the call.
    pub identity_id: String,
    /// The identity pool id the caller authenticated with.
    pub identity_pool_id: String,
}

/// The value a handler receives alongside its payload.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Context {
    /// Identifies this invocation.
    pub request_id: String,
    /// Absolute wall-clock deadline, milliseconds since the Unix epoch.
    /// Exposed for the handler's own budget tracking; the core itself
    /// does not enforce it.
    pub deadline_millis_since_epoch: i64,
    /// ARN of the function being invoked.
    pub invoked_function_arn: String,
    /// X-Ray trace id.
    pub xray_trace_id: String,
    /// Parsed mobile client context, if the Runtime API sent one and it
    /// parsed as valid JSON.
    pub client_context: Option<ClientContext>,
    /// Parsed Cognito identity, under the same conditions.
    pub identity: Option<CognitoIdentity>,
    /// Process-wide configuration, including function identity and
    /// logging settings from the environment.
    pub env_config: Config,
}

impl Context {
    /// Build a `Context` for one invocation from its parsed headers and
    /// the process-wide configuration.
    ///
    /// A `client_context` or `cognito_identity` header that isn't valid
    /// JSON is treated as absent rather than as a parser failure: the
    /// Invocation Parser's contract only requires these two headers to
    /// be present-or-absent, not well-formed.
    pub fn new(invocation: &Invocation, env_config: Config) -> Self {
        let client_context = invocation
            .client_context
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok());
        let identity = invocation
            .cognito_identity
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok());

        Context {
            request_id: invocation.request_id.clone(),
            deadline_millis_since_epoch: invocation.deadline_millis_since_epoch,
            invoked_function_arn: invocation.invoked_function_arn.clone(),
            xray_trace_id: invocation.trace_id.clone(),
            client_context,
            identity,
            env_config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation() -> Invocation {
        Invocation {
            request_id: "001".to_string(),
            deadline_millis_since_epoch: 1_700_000_000_000,
            invoked_function_arn: "arn:aws:lambda:us-east-1:123:function:fn".to_string(),
            trace_id: "Root=1-abc".to_string(),
            client_context: None,
            cognito_identity: None,
        }
    }

    #[test]
    fn carries_invocation_fields_through() {
        let context = Context::new(&invocation(), Config::default());
        assert_eq!("001", context.request_id);
        assert_eq!(1_700_000_000_000, context.deadline_millis_since_epoch);
    }

    #[test]
    fn parses_well_formed_client_context() {
        let mut invocation = invocation();
        invocation.client_context = Some(
            r#"{"client":{"installation_id":"i","app_title":"t","app_version_name":"v","app_version_code":"1","app_package_name":"p"},"custom":{},"environment":{}}"#
                .to_string(),
        );
        let context = Context::new(&invocation, Config::default());
        assert_eq!("i", context.client_context.unwrap().client.installation_id);
    }

    #[test]
    fn malformed_client_context_is_treated_as_absent() {
        let mut invocation = invocation();
        invocation.client_context = Some("not json".to_string());
        let context = Context::new(&invocation, Config::default());
        assert!(context.client_context.is_none());
    }
}
