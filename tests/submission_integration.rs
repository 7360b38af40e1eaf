//! Integration tests for the submission engine against a mock report service.
//!
//! Each test drives the real [`ReportClient`] over HTTP, so request shape,
//! response classification and the prune-and-resubmit loop are verified
//! together.

use std::num::NonZeroUsize;
use std::time::Duration;

use reporter_core::CandidateUrls;
use reporter_core::submit::{
    BatchFailure, BatchStatus, ErrorClass, FinalResult, ReportClient, ReportClientConfig,
    SubmissionEngine, SubmitConfig, WholesaleReason,
};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const EMAIL: &str = "abuse@example.org";

fn client_for(server: &MockServer) -> ReportClient {
    let endpoint = format!("{}/api/v3/report/urls", server.uri());
    let config = ReportClientConfig::with_endpoint(&endpoint, EMAIL).expect("valid endpoint");
    ReportClient::new(config).expect("client builds")
}

fn urls(items: &[&str]) -> CandidateUrls {
    items.iter().map(|u| (*u).to_string()).collect()
}

fn request_body(items: &[&str]) -> Value {
    json!({
        "email": EMAIL,
        "reason": "HMG",
        "urls": items.iter().map(|u| json!({ "url": u })).collect::<Vec<_>>(),
    })
}

/// Responds with a tracking id derived from the batch size.
struct IdPerBatchSize;

impl Respond for IdPerBatchSize {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = request.body_json().expect("request body is JSON");
        let n = body["urls"].as_array().map_or(0, Vec::len);
        ResponseTemplate::new(200).set_body_json(json!({ "uuid": format!("id-{n}") }))
    }
}

#[tokio::test]
async fn test_format_error_is_pruned_and_batch_resubmitted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v3/report/urls"))
        .and(header("content-type", "application/json"))
        .and(body_json(request_body(&[
            "http://a.com",
            "http://bad",
            "http://c.com",
        ])))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "details": [
                { "input": "http://bad", "message": "Does not match url format" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v3/report/urls"))
        .and(body_json(request_body(&["http://a.com", "http://c.com"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uuid": "abc123" })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = SubmissionEngine::new(client_for(&server), SubmitConfig::default());
    let report = engine
        .submit_all(&urls(&["http://a.com", "http://bad", "http://c.com"]))
        .await
        .expect("no contract violation");

    let FinalResult::Accepted(accepted) = report.final_result() else {
        panic!("expected an accepted batch");
    };
    assert_eq!(accepted.len(), 1);
    assert_eq!(accepted[0].tracking_id.as_str(), "abc123");
    assert_eq!(accepted[0].urls, ["http://a.com", "http://c.com"]);

    let pruned: Vec<_> = report.pruned().map(|p| p.url.as_str()).collect();
    assert_eq!(pruned, ["http://bad"]);
    assert_eq!(report.attempts(), 2);
}

#[tokio::test]
async fn test_duplicate_only_rejection_fails_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "details": [
                { "input": "http://x.com", "message": "Duplicate submission" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = SubmissionEngine::new(client_for(&server), SubmitConfig::default());
    let report = engine
        .submit_all(&urls(&["http://x.com"]))
        .await
        .expect("no contract violation");

    assert_eq!(report.final_result(), FinalResult::NothingAccepted);
    assert_eq!(report.final_result().display_ids(), "0000");
    assert_eq!(report.unsubmitted(), ["http://x.com"]);

    let batch = &report.batches[0];
    assert!(matches!(
        batch.status,
        BatchStatus::Failed {
            failure: BatchFailure::NotConverging { .. },
            ..
        }
    ));
    assert_eq!(batch.diagnostics[0].class, ErrorClass::Duplicate);
}

#[tokio::test]
async fn test_oversized_input_is_split_into_independent_batches() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(IdPerBatchSize)
        .expect(2)
        .mount(&server)
        .await;

    let candidates: CandidateUrls = (0..1500)
        .map(|i| format!("http://host{i}.example/"))
        .collect();
    let engine = SubmissionEngine::new(client_for(&server), SubmitConfig::default());
    let report = engine
        .submit_all(&candidates)
        .await
        .expect("no contract violation");

    assert_eq!(report.final_result().display_ids(), "id-1000 id-500");

    let requests = server.received_requests().await.expect("recording enabled");
    let sizes: Vec<usize> = requests
        .iter()
        .map(|r| {
            let body: Value = r.body_json().expect("JSON body");
            body["urls"].as_array().map_or(0, Vec::len)
        })
        .collect();
    assert_eq!(sizes, [1000, 500]);
}

#[tokio::test]
async fn test_concurrent_batches_keep_batch_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(IdPerBatchSize)
        .expect(3)
        .mount(&server)
        .await;

    let candidates: CandidateUrls = (0..5).map(|i| format!("http://h{i}.example/")).collect();
    let config = SubmitConfig {
        max_batch_size: NonZeroUsize::new(2).expect("non-zero"),
        batch_concurrency: NonZeroUsize::new(3).expect("non-zero"),
    };
    let report = SubmissionEngine::new(client_for(&server), config)
        .submit_all(&candidates)
        .await
        .expect("no contract violation");

    let batch_urls: Vec<_> = report.accepted().map(|b| b.urls.to_vec()).collect();
    assert_eq!(
        batch_urls,
        [
            vec!["http://h0.example/", "http://h1.example/"],
            vec!["http://h2.example/", "http://h3.example/"],
            vec!["http://h4.example/"],
        ]
    );
}

#[tokio::test]
async fn test_empty_candidate_set_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let engine = SubmissionEngine::new(client_for(&server), SubmitConfig::default());
    let report = engine
        .submit_all(&CandidateUrls::new())
        .await
        .expect("no contract violation");

    assert!(report.batches.is_empty());
    assert_eq!(report.final_result(), FinalResult::NothingAccepted);
}

#[tokio::test]
async fn test_rate_limit_is_wholesale_rejection_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "120"))
        .expect(1)
        .mount(&server)
        .await;

    let engine = SubmissionEngine::new(client_for(&server), SubmitConfig::default());
    let report = engine
        .submit_all(&urls(&["http://a.com", "http://b.com"]))
        .await
        .expect("no contract violation");

    let batch = &report.batches[0];
    assert_eq!(batch.attempts, 1);
    assert!(batch.pruned.is_empty());
    assert_eq!(
        batch.status,
        BatchStatus::Failed {
            failure: BatchFailure::Wholesale(WholesaleReason::RateLimited {
                retry_after: Some("120".to_string())
            }),
            unsubmitted: vec!["http://a.com".to_string(), "http://b.com".to_string()],
        }
    );
}

#[tokio::test]
async fn test_server_error_is_wholesale_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let engine = SubmissionEngine::new(client_for(&server), SubmitConfig::default());
    let report = engine
        .submit_all(&urls(&["http://a.com"]))
        .await
        .expect("no contract violation");

    assert!(matches!(
        report.batches[0].status,
        BatchStatus::Failed {
            failure: BatchFailure::Wholesale(WholesaleReason::ServerError { status: 503 }),
            ..
        }
    ));
}

#[tokio::test]
async fn test_accepted_response_with_sentinel_uuid_is_not_accepted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "uuid": "0000" })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = SubmissionEngine::new(client_for(&server), SubmitConfig::default());
    let report = engine
        .submit_all(&urls(&["http://a.com"]))
        .await
        .expect("no contract violation");

    assert_eq!(report.final_result(), FinalResult::NothingAccepted);
    assert!(matches!(
        report.batches[0].status,
        BatchStatus::Failed {
            failure: BatchFailure::Wholesale(WholesaleReason::MalformedResponse { .. }),
            ..
        }
    ));
}

#[tokio::test]
async fn test_slow_service_times_out_as_wholesale_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "uuid": "late" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let endpoint = format!("{}/api/v3/report/urls", server.uri());
    let mut config = ReportClientConfig::with_endpoint(&endpoint, EMAIL).expect("valid endpoint");
    config.read_timeout = Duration::from_millis(200);
    let client = ReportClient::new(config).expect("client builds");

    let report = SubmissionEngine::new(client, SubmitConfig::default())
        .submit_all(&urls(&["http://a.com"]))
        .await
        .expect("no contract violation");

    assert!(matches!(
        report.batches[0].status,
        BatchStatus::Failed {
            failure: BatchFailure::Wholesale(WholesaleReason::Timeout),
            ..
        }
    ));
}

#[tokio::test]
async fn test_all_malformed_batch_is_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "details": [
                { "input": "http://bad1", "message": "Does not match url format" },
                { "input": "http://bad2", "message": "Does not match url format" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = SubmissionEngine::new(client_for(&server), SubmitConfig::default());
    let report = engine
        .submit_all(&urls(&["http://bad1", "http://bad2"]))
        .await
        .expect("no contract violation");

    assert!(matches!(
        report.batches[0].status,
        BatchStatus::Failed {
            failure: BatchFailure::Exhausted,
            ..
        }
    ));
    assert_eq!(report.pruned().count(), 2);
    assert!(report.unsubmitted().is_empty());
}
