//! Integration tests for the submit/poll/fetch job protocol

use quarry_client::{ClientError, JobId, PollPolicy, ServiceClient};
use quarry_core::diagnostics::parse_diagnostics;
use quarry_core::dto::SourceFile;
use quarry_core::dto::compile::CompileRequest;
use quarry_core::dto::verify::VerifyRequest;
use serde_json::{Value, json};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, method, path},
};

const INTERVAL: Duration = Duration::from_millis(50);

/// Client polling every `INTERVAL`
fn fast_client(server: &MockServer) -> ServiceClient {
    ServiceClient::new(server.uri())
        .with_poll_policy(PollPolicy::default().with_interval(INTERVAL))
}

/// Answer `times` status polls of `job_id` with `body`, ahead of any fallback
async fn mount_status_times(server: &MockServer, job_id: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/process_status/{}", job_id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .up_to_n_times(times)
        .with_priority(1)
        .expect(times)
        .mount(server)
        .await;
}

/// Answer every remaining status poll of `job_id` with `body`
async fn mount_status(server: &MockServer, job_id: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/process_status/{}", job_id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_result(server: &MockServer, prefix: &str, job_id: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/{}", prefix, job_id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

async fn status_polls(server: &MockServer, job_id: &str) -> usize {
    let expected = format!("/process_status/{}", job_id);
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == expected)
        .count()
}

#[tokio::test]
async fn test_completed_on_first_poll() {
    let server = MockServer::start().await;
    let interval = Duration::from_millis(500);
    let client = ServiceClient::new(server.uri())
        .with_poll_policy(PollPolicy::default().with_interval(interval));

    mount_status_times(&server, "job1", "Completed", 1).await;
    mount_result(&server, "compile-result", "job1", r#"{"artifacts":[]}"#, 1).await;

    let started = Instant::now();
    let payload = client
        .await_result(&JobId::from("job1"), "compile-result")
        .await
        .unwrap();

    assert!(started.elapsed() < interval);
    assert_eq!(payload.text(), r#"{"artifacts":[]}"#);
    assert_eq!(status_polls(&server, "job1").await, 1);
}

#[tokio::test]
async fn test_submit_then_poll_until_completed() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    Mock::given(method("POST"))
        .and(path("/compile-async"))
        .and(body_json(json!({"files": []})))
        .respond_with(ResponseTemplate::new(200).set_body_string("abc123"))
        .expect(1)
        .mount(&server)
        .await;
    mount_status_times(&server, "abc123", "R", 2).await;
    mount_status(&server, "abc123", "Completed").await;
    mount_result(&server, "compile-result", "abc123", r#"{"ok":true}"#, 1).await;

    let job_id = client
        .submit_job("compile-async", Some(&json!({"files": []})))
        .await
        .unwrap();
    assert_eq!(job_id.as_str(), "abc123");

    let started = Instant::now();
    let payload = client.await_result(&job_id, "compile-result").await.unwrap();

    assert!(started.elapsed() >= INTERVAL * 2);
    assert_eq!(payload.json::<Value>().unwrap(), json!({"ok": true}));
    assert_eq!(status_polls(&server, "abc123").await, 3);
}

#[tokio::test]
async fn test_polls_once_more_than_in_progress_answers() {
    let server = MockServer::start().await;
    let client = fast_client(&server);
    let in_progress = 4;

    mount_status_times(&server, "job4", "InProgress", in_progress).await;
    mount_status(&server, "job4", "Completed: done").await;
    mount_result(&server, "verify-result", "job4", "{}", 1).await;

    let started = Instant::now();
    client
        .await_result(&JobId::from("job4"), "verify-result")
        .await
        .unwrap();

    assert!(started.elapsed() >= INTERVAL * in_progress as u32);
    assert_eq!(status_polls(&server, "job4").await, in_progress as usize + 1);
}

#[tokio::test]
async fn test_errored_job_is_not_fetched() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    mount_status_times(&server, "job5", "Running", 1).await;
    mount_status(&server, "job5", "Errored: missing semicolon").await;
    mount_result(&server, "compile-result", "job5", "{}", 0).await;

    let err = client
        .await_result(&JobId::from("job5"), "compile-result")
        .await
        .unwrap_err();

    match err {
        ClientError::JobFailed { job_id, message } => {
            assert_eq!(job_id, "job5");
            assert!(message.contains("missing semicolon"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(status_polls(&server, "job5").await, 2);
}

#[tokio::test]
async fn test_error_on_first_poll_rejects_immediately() {
    let server = MockServer::start().await;
    let interval = Duration::from_millis(500);
    let client = ServiceClient::new(server.uri())
        .with_poll_policy(PollPolicy::default().with_interval(interval));

    Mock::given(method("POST"))
        .and(path("/verify-async"))
        .respond_with(ResponseTemplate::new(200).set_body_string("xyz"))
        .mount(&server)
        .await;
    mount_status_times(&server, "xyz", "Error: bad input", 1).await;
    mount_result(&server, "verify-result", "xyz", "{}", 0).await;

    let job_id = client
        .submit_job("verify-async", Some(&json!({})))
        .await
        .unwrap();

    let started = Instant::now();
    let err = client
        .await_result(&job_id, "verify-result")
        .await
        .unwrap_err();

    assert!(started.elapsed() < interval);
    assert!(err.is_job_failure());
    assert!(err.to_string().contains("bad input"));
}

#[tokio::test]
async fn test_failed_poll_stops_the_loop() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    Mock::given(method("GET"))
        .and(path("/process_status/job6"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_result(&server, "compile-result", "job6", "{}", 0).await;

    let err = client
        .await_result(&JobId::from("job6"), "compile-result")
        .await
        .unwrap_err();

    match err {
        ClientError::Poll {
            job_id,
            status,
            status_text,
        } => {
            assert_eq!(job_id, "job6");
            assert_eq!(status, 500);
            assert_eq!(status_text, "Internal Server Error");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    tokio::time::sleep(INTERVAL * 2).await;
    assert_eq!(status_polls(&server, "job6").await, 1);
}

#[tokio::test]
async fn test_concurrent_jobs_are_independent() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    mount_status_times(&server, "slow", "R", 3).await;
    mount_status(&server, "slow", "Completed").await;
    mount_status(&server, "fast", "Completed").await;
    mount_result(&server, "compile-result", "slow", r#"{"job":"slow"}"#, 1).await;
    mount_result(&server, "compile-result", "fast", r#"{"job":"fast"}"#, 1).await;

    let slow_id = JobId::from("slow");
    let fast_id = JobId::from("fast");
    let (slow, fast) = tokio::join!(
        client.await_result(&slow_id, "compile-result"),
        client.await_result(&fast_id, "compile-result"),
    );

    assert_eq!(slow.unwrap().json::<Value>().unwrap()["job"], "slow");
    assert_eq!(fast.unwrap().json::<Value>().unwrap()["job"], "fast");
    assert_eq!(status_polls(&server, "slow").await, 4);
    assert_eq!(status_polls(&server, "fast").await, 1);
}

#[tokio::test]
async fn test_cancellation_stops_polling() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    mount_status(&server, "forever", "R").await;
    mount_result(&server, "compile-result", "forever", "{}", 0).await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(INTERVAL * 3 + INTERVAL / 2).await;
        trigger.cancel();
    });

    let err = client
        .await_result_with_cancel(&JobId::from("forever"), "compile-result", &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Cancelled { ref job_id } if job_id == "forever"));

    let polls = status_polls(&server, "forever").await;
    assert!(polls >= 1);

    tokio::time::sleep(INTERVAL * 3).await;
    assert_eq!(status_polls(&server, "forever").await, polls);
}

#[tokio::test]
async fn test_already_cancelled_token_sends_nothing() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    mount_status(&server, "never", "Completed").await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = client
        .await_result_with_cancel(&JobId::from("never"), "compile-result", &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled { .. }));
    assert_eq!(status_polls(&server, "never").await, 0);
}

#[tokio::test]
async fn test_max_wait_bounds_the_loop() {
    let server = MockServer::start().await;
    let client = ServiceClient::new(server.uri()).with_poll_policy(
        PollPolicy::default()
            .with_interval(INTERVAL)
            .with_max_wait(Some(INTERVAL * 3)),
    );

    mount_status(&server, "stuck", "R").await;

    let started = Instant::now();
    let err = client
        .await_result(&JobId::from("stuck"), "compile-result")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::TimedOut { .. }));
    assert!(started.elapsed() >= INTERVAL * 3);
    assert!(started.elapsed() < INTERVAL * 20);
}

#[tokio::test]
async fn test_max_polls_bounds_the_loop() {
    let server = MockServer::start().await;
    let client = ServiceClient::new(server.uri()).with_poll_policy(
        PollPolicy::default()
            .with_interval(Duration::from_millis(10))
            .with_max_polls(Some(3)),
    );

    mount_status(&server, "stuck", "R").await;

    let err = client
        .await_result(&JobId::from("stuck"), "compile-result")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::TooManyPolls { polls: 3, .. }));
    assert_eq!(status_polls(&server, "stuck").await, 3);
}

#[tokio::test]
async fn test_submission_without_payload_uses_get() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    Mock::given(method("GET"))
        .and(path("/clean-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_string("job-get"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/clean-cache"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let job_id = client.submit_job("clean-cache", None).await.unwrap();

    assert_eq!(job_id.as_str(), "job-get");
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn test_submission_ignores_http_status() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    Mock::given(method("POST"))
        .and(path("/compile-async"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let job_id = client
        .submit_job("compile-async", Some(&json!({})))
        .await
        .unwrap();

    assert_eq!(job_id.as_str(), "oops");
}

#[tokio::test]
async fn test_unreachable_service_is_a_transport_error() {
    // Bind a port and release it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ServiceClient::new(format!("http://{}", addr));
    let err = client.submit_job("compile-async", None).await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn test_failed_result_fetch_is_an_api_error() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    mount_status(&server, "gone", "Completed").await;
    Mock::given(method("GET"))
        .and(path("/compile-result/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such job"))
        .mount(&server)
        .await;

    let err = client
        .await_result(&JobId::from("gone"), "compile-result")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 404, ref message } if message == "no such job"));
}

#[tokio::test]
async fn test_job_ids_are_sent_as_single_segments() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    for (raw, encoded) in [("a#b", "a%23b"), ("x/y", "x%2Fy"), ("/x/", "%2Fx%2F")] {
        mount_status_times(&server, encoded, "R", 1).await;
        mount_status(&server, encoded, "Completed").await;
        mount_result(&server, "compile-result", encoded, raw, 1).await;

        let payload = client
            .await_result(&JobId::from(raw), "compile-result")
            .await
            .unwrap();

        assert_eq!(payload.text(), raw);
        assert_eq!(payload.job_id().as_str(), raw);
        assert_eq!(status_polls(&server, encoded).await, 2);
    }

    for truncated in ["a", "x", "x/y"] {
        assert_eq!(status_polls(&server, truncated).await, 0);
    }
}

#[tokio::test]
async fn test_compile_returns_artifacts() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    let req = CompileRequest {
        version: Some("0.5.1".to_string()),
        files: vec![SourceFile::new("src/lib.rs", "// counter")],
    };

    Mock::given(method("POST"))
        .and(path("/compile-async"))
        .and(body_json(&req))
        .respond_with(ResponseTemplate::new(200).set_body_string("c1"))
        .expect(1)
        .mount(&server)
        .await;
    mount_status_times(&server, "c1", "Running", 1).await;
    mount_status(&server, "c1", "Completed").await;
    mount_result(
        &server,
        "compile-result",
        "c1",
        r#"{"status":"Success","artifacts":[{"name":"counter.wasm","content":"AGFzbQ==","type":"wasm"}]}"#,
        1,
    )
    .await;

    let result = client.compile(&req, &CancellationToken::new()).await.unwrap();

    assert_eq!(result.artifacts.len(), 1);
    assert_eq!(result.artifact("counter.wasm").unwrap().artifact_type, "wasm");
}

#[tokio::test]
async fn test_compile_failure_carries_compiler_output() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    Mock::given(method("POST"))
        .and(path("/compile-async"))
        .respond_with(ResponseTemplate::new(200).set_body_string("c2"))
        .mount(&server)
        .await;
    mount_status(
        &server,
        "c2",
        "Error\nerror[E0425]: cannot find value `x`\n --> src/lib.rs:3:5\n",
    )
    .await;
    mount_result(&server, "compile-result", "c2", "{}", 0).await;

    let req = CompileRequest {
        version: None,
        files: vec![SourceFile::new("src/lib.rs", "x")],
    };
    let err = client
        .compile(&req, &CancellationToken::new())
        .await
        .unwrap_err();

    let ClientError::JobFailed { message, .. } = err else {
        panic!("expected a job failure");
    };
    let diagnostics = parse_diagnostics(&message);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].line, Some(3));
}

#[tokio::test]
async fn test_verify_returns_outcome() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    Mock::given(method("POST"))
        .and(path("/verify-async"))
        .respond_with(ResponseTemplate::new(200).set_body_string("v1"))
        .expect(1)
        .mount(&server)
        .await;
    mount_status(&server, "v1", "Completed").await;
    mount_result(
        &server,
        "verify-result",
        "v1",
        r#"{"status":"Success","message":"bytecode matches"}"#,
        1,
    )
    .await;

    let req = VerifyRequest {
        address: "0x1234".to_string(),
        network: "devnet".to_string(),
        contract_name: None,
        version: None,
        files: vec![],
    };
    let result = client.verify(&req, &CancellationToken::new()).await.unwrap();

    assert!(result.is_verified());
    assert_eq!(result.message, "bytecode matches");
}

#[tokio::test]
async fn test_service_metadata() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    Mock::given(method("GET"))
        .and(path("/allowed_versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["0.5.0", "0.5.1"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/service_version"))
        .respond_with(ResponseTemplate::new(200).set_body_string("1.4.2\n"))
        .mount(&server)
        .await;

    assert_eq!(
        client.allowed_versions().await.unwrap(),
        vec!["0.5.0".to_string(), "0.5.1".to_string()]
    );
    assert_eq!(client.service_version().await.unwrap(), "1.4.2");
}
