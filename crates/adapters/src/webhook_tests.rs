// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn request(url: String, method: &str) -> WebhookRequest {
    WebhookRequest {
        method: method.to_string(),
        url,
        headers: BTreeMap::from([("X-Watch".to_string(), "cpu-high".to_string())]),
        body: r#"{"avg_cpu":92}"#.to_string(),
    }
}

#[tokio::test]
async fn http_adapter_sends_body_and_headers() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/hook")
        .match_header("x-watch", "cpu-high")
        .match_header("content-type", "application/json")
        .match_body(r#"{"avg_cpu":92}"#)
        .with_status(204)
        .create_async()
        .await;

    let adapter = HttpWebhookAdapter::new(Duration::from_secs(5)).unwrap();
    let status = adapter.send(request(format!("{}/hook", server.url()), "post")).await.unwrap();

    assert_eq!(status, 204);
    mock.assert_async().await;
}

#[tokio::test]
async fn http_adapter_reports_error_status() {
    let mut server = mockito::Server::new_async().await;
    let _m = server.mock("PUT", "/hook").with_status(500).create_async().await;

    let adapter = HttpWebhookAdapter::new(Duration::from_secs(5)).unwrap();
    let err = adapter.send(request(format!("{}/hook", server.url()), "PUT")).await.unwrap_err();

    assert!(matches!(err, WebhookError::Status(500)));
}

#[tokio::test]
async fn http_adapter_rejects_bad_method() {
    let adapter = HttpWebhookAdapter::new(Duration::from_secs(5)).unwrap();
    let err = adapter.send(request("http://127.0.0.1:9/hook".into(), "NOT A METHOD")).await.unwrap_err();
    assert!(matches!(err, WebhookError::InvalidRequest(_)));
}

#[tokio::test]
async fn fake_records_and_fails_on_non_2xx() {
    let fake = FakeWebhookAdapter::new();
    fake.respond_with(502);

    let err = fake.send(request("http://hooks.local".into(), "POST")).await.unwrap_err();

    assert!(matches!(err, WebhookError::Status(502)));
    assert_eq!(fake.calls().len(), 1);
}
