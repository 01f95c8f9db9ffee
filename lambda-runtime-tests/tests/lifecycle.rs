//! End-to-end scenarios driving the Lifecycle against a mock Runtime API.

use std::time::Duration;

use bytes::Bytes;
use httpmock::prelude::*;
use lambda_runtime::{Context, Handler, LifecycleError, RuntimeError, StopFlag};
use lambda_runtime_tests::test_config;

const ARN: &str = "arn:aws:lambda:us-east-1:123456789012:function:test";
const TRACE_ID: &str = "Root=1-5f1a2b3c-abcdef";

struct Echo;

impl Handler for Echo {
    type Error = std::convert::Infallible;

    async fn handle(&mut self, payload: Bytes, _context: Context) -> Result<Option<Bytes>, Self::Error> {
        Ok(Some(payload))
    }
}

struct Boom;

impl std::fmt::Display for Boom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "boom")
    }
}

struct FailsEveryInvocation;

impl Handler for FailsEveryInvocation {
    type Error = Boom;

    async fn handle(&mut self, _payload: Bytes, _context: Context) -> Result<Option<Bytes>, Self::Error> {
        Err(Boom)
    }
}

#[tokio::test]
async fn echo_invocation_reports_success_and_counts_one() {
    let server = MockServer::start();

    let next_mock = server.mock(|when, then| {
        when.method(GET).path("/2018-06-01/runtime/invocation/next");
        then.status(200)
            .header("lambda-runtime-aws-request-id", "001")
            .header("lambda-runtime-deadline-ms", "1700000000000")
            .header("lambda-runtime-invoked-function-arn", ARN)
            .header("lambda-runtime-trace-id", TRACE_ID)
            .body("hello");
    });
    let response_mock = server.mock(|when, then| {
        when.method(POST).path("/2018-06-01/runtime/invocation/001/response").body("hello");
        then.status(202);
    });

    let mut config = test_config(&server.base_url());
    config.lifecycle.max_times = Some(1);

    let count = lambda_runtime::run(config, StopFlag::new(), || async { Ok::<_, std::convert::Infallible>(Echo) })
        .await
        .unwrap();

    assert_eq!(1, count);
    next_mock.assert_async().await;
    response_mock.assert_async().await;
}

#[tokio::test]
async fn handler_failure_is_reported_not_raised_and_still_counts() {
    let server = MockServer::start();

    let next_mock = server.mock(|when, then| {
        when.method(GET).path("/2018-06-01/runtime/invocation/next");
        then.status(200)
            .header("lambda-runtime-aws-request-id", "002")
            .header("lambda-runtime-deadline-ms", "1700000000000")
            .header("lambda-runtime-invoked-function-arn", ARN)
            .header("lambda-runtime-trace-id", TRACE_ID)
            .body("hello");
    });
    let error_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/2018-06-01/runtime/invocation/002/error")
            .body(r#"{ "errorType": "FunctionError", "errorMessage": "boom" }"#);
        then.status(202);
    });

    let mut config = test_config(&server.base_url());
    config.lifecycle.max_times = Some(1);

    let count = lambda_runtime::run(config, StopFlag::new(), || async {
        Ok::<_, std::convert::Infallible>(FailsEveryInvocation)
    })
    .await
    .unwrap();

    assert_eq!(1, count);
    next_mock.assert_async().await;
    error_mock.assert_async().await;
}

#[tokio::test]
async fn initialization_failure_is_reported_and_returned_as_the_fatal_error() {
    let server = MockServer::start();

    let init_error_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/2018-06-01/runtime/init/error")
            .body(r#"{ "errorType": "InitializationError", "errorMessage": "cant_init" }"#);
        then.status(202);
    });

    let config = test_config(&server.base_url());

    let result = lambda_runtime::run(config, StopFlag::new(), || async { Err::<Echo, _>("cant_init".to_string()) }).await;

    match result {
        Err(LifecycleError::Initialization(message)) => assert_eq!("cant_init", message),
        other => panic!("expected an initialization error, got {other:?}"),
    }
    init_error_mock.assert_async().await;
}

#[tokio::test]
async fn missing_required_header_terminates_the_lifecycle() {
    let server = MockServer::start();

    let next_mock = server.mock(|when, then| {
        when.method(GET).path("/2018-06-01/runtime/invocation/next");
        then.status(200)
            .header("lambda-runtime-deadline-ms", "1700000000000")
            .header("lambda-runtime-invoked-function-arn", ARN)
            .header("lambda-runtime-trace-id", TRACE_ID)
            .body("hello");
    });

    let config = test_config(&server.base_url());

    let result = lambda_runtime::run(config, StopFlag::new(), || async { Ok::<_, std::convert::Infallible>(Echo) }).await;

    match result {
        Err(LifecycleError::Runtime(err)) => {
            assert_eq!(RuntimeError::InvocationMissingHeader("Lambda-Runtime-Aws-Request-Id".to_string()), err);
        }
        other => panic!("expected a runtime error, got {other:?}"),
    }
    next_mock.assert_async().await;
}

#[tokio::test]
async fn stop_flag_set_mid_iteration_prevents_the_next_poll() {
    let server = MockServer::start();

    let next_mock = server.mock(|when, then| {
        when.method(GET).path("/2018-06-01/runtime/invocation/next");
        then.status(200)
            .header("lambda-runtime-aws-request-id", "004")
            .header("lambda-runtime-deadline-ms", "1700000000000")
            .header("lambda-runtime-invoked-function-arn", ARN)
            .header("lambda-runtime-trace-id", TRACE_ID)
            .body("hello");
    });
    let response_mock = server.mock(|when, then| {
        when.method(POST).path("/2018-06-01/runtime/invocation/004/response").body("hello");
        then.status(202);
    });

    struct StopAfterOne {
        stop_flag: StopFlag,
    }

    impl Handler for StopAfterOne {
        type Error = std::convert::Infallible;

        async fn handle(&mut self, payload: Bytes, _context: Context) -> Result<Option<Bytes>, Self::Error> {
            self.stop_flag.set();
            Ok(Some(payload))
        }
    }

    let stop_flag = StopFlag::new();
    let handler_stop_flag = stop_flag.clone();
    let config = test_config(&server.base_url());

    let count = lambda_runtime::run(config, stop_flag, || async move {
        Ok::<_, std::convert::Infallible>(StopAfterOne { stop_flag: handler_stop_flag })
    })
    .await
    .unwrap();

    assert_eq!(1, count);
    next_mock.assert_hits_async(1).await;
    response_mock.assert_async().await;
}

#[tokio::test]
async fn transport_timeout_is_transient_then_the_next_poll_recovers() {
    let server = MockServer::start();

    let slow_mock = server.mock(|when, then| {
        when.method(GET).path("/2018-06-01/runtime/invocation/next");
        then.status(200).delay(Duration::from_millis(500)).body("too slow");
    });

    let mut config = test_config(&server.base_url());
    config.runtime.request_timeout = Duration::from_millis(50);

    let transport = lambda_runtime_api_client::Client::builder()
        .with_endpoint(config.runtime.api_endpoint.parse().unwrap())
        .with_request_timeout(config.runtime.request_timeout)
        .build()
        .unwrap();
    let client = lambda_runtime::RuntimeClient::new(transport);

    let err = client.request_work().await.unwrap_err();
    assert_eq!(RuntimeError::UpstreamError("timeout".to_string()), err);
    slow_mock.assert_async().await;
    slow_mock.delete();

    let next_mock = server.mock(|when, then| {
        when.method(GET).path("/2018-06-01/runtime/invocation/next");
        then.status(200)
            .header("lambda-runtime-aws-request-id", "003")
            .header("lambda-runtime-deadline-ms", "1700000000000")
            .header("lambda-runtime-invoked-function-arn", ARN)
            .header("lambda-runtime-trace-id", TRACE_ID)
            .body("hello");
    });
    let response_mock = server.mock(|when, then| {
        when.method(POST).path("/2018-06-01/runtime/invocation/003/response").body("hello");
        then.status(202);
    });

    config.runtime.request_timeout = Duration::from_millis(500);
    config.lifecycle.max_times = Some(1);

    let count = lambda_runtime::run(config, StopFlag::new(), || async { Ok::<_, std::convert::Infallible>(Echo) })
        .await
        .unwrap();

    assert_eq!(1, count);
    next_mock.assert_async().await;
    response_mock.assert_async().await;
}
