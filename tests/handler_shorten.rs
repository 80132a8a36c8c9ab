mod common;

use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderValue, StatusCode, header};
use axum::routing::get;
use axum_test::TestServer;
use serde_json::json;
use shortener::api::dto::shorten::{BatchResponseItem, ShortenResponse};
use shortener::utils::codec::short_code;
use tower_http::compression::CompressionLayer;
use tower_http::compression::predicate::SizeAbove;

/// Gzip-encodes `text` by serving it through the compression layer.
async fn gzip(text: &'static str) -> Bytes {
    let app = Router::new()
        .route("/", get(move || async move { text }))
        .layer(CompressionLayer::new().compress_when(SizeAbove::new(0)));
    let server = TestServer::new(app).unwrap();

    let response = server
        .get("/")
        .add_header(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"))
        .await;
    assert_eq!(
        response.header(header::CONTENT_ENCODING),
        HeaderValue::from_static("gzip")
    );

    response.as_bytes().clone()
}

#[tokio::test]
async fn test_shorten_text_created() {
    let server = common::create_test_server();

    let response = server.post("/").text("yandex.com").await;

    response.assert_status(StatusCode::CREATED);
    response.assert_text("http://localhost:8080/1389853602");
}

#[tokio::test]
async fn test_shorten_text_existing_is_conflict() {
    let server = common::create_test_server();

    server
        .post("/")
        .text("ya.ru")
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.post("/").text("ya.ru").await;

    response.assert_status(StatusCode::CONFLICT);
    response.assert_text("http://localhost:8080/3201241320");
}

#[tokio::test]
async fn test_shorten_text_empty_body() {
    let server = common::create_test_server();

    let response = server.post("/").text("   ").await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_shorten_text_hashes_raw_body() {
    let server = common::create_test_server();

    let response = server.post("/").text("yandex.com\n").await;

    response.assert_status(StatusCode::CREATED);
    response.assert_text(format!(
        "http://localhost:8080/{}",
        short_code("yandex.com\n")
    ));
    assert_ne!(short_code("yandex.com\n"), "1389853602");
}

#[tokio::test]
async fn test_shorten_text_gzip_body() {
    let server = common::create_test_server();
    let body = gzip("yandex.com").await;

    let response = server
        .post("/")
        .add_header(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"))
        .bytes(body)
        .await;

    response.assert_status(StatusCode::CREATED);
    response.assert_text("http://localhost:8080/1389853602");
}

#[tokio::test]
async fn test_shorten_json_created() {
    let server = common::create_test_server();

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "stackoverflow.com" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(
        response.json::<ShortenResponse>(),
        ShortenResponse {
            result: "http://localhost:8080/2177322106".to_string()
        }
    );
}

#[tokio::test]
async fn test_shorten_json_existing_is_conflict() {
    let server = common::create_test_server();

    server
        .post("/api/shorten")
        .json(&json!({ "url": "go.dev" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "go.dev" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<ShortenResponse>().result,
        "http://localhost:8080/294555335"
    );
}

#[tokio::test]
async fn test_shorten_json_empty_url() {
    let server = common::create_test_server();

    let response = server
        .post("/api/shorten")
        .json(&json!({ "url": "" }))
        .await;

    response.assert_status_bad_request();
    let body = response.json::<serde_json::Value>();
    assert_eq!(body["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_shorten_batch_keeps_order() {
    let server = common::create_test_server();

    let response = server
        .post("/api/shorten/batch")
        .json(&json!([
            { "correlation_id": "first", "original_url": "stackoverflow.com" },
            { "correlation_id": "second", "original_url": "go.dev" }
        ]))
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(
        response.json::<Vec<BatchResponseItem>>(),
        vec![
            BatchResponseItem {
                correlation_id: "first".to_string(),
                short_url: "http://localhost:8080/2177322106".to_string(),
            },
            BatchResponseItem {
                correlation_id: "second".to_string(),
                short_url: "http://localhost:8080/294555335".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_shorten_batch_empty() {
    let server = common::create_test_server();

    let response = server.post("/api/shorten/batch").json(&json!([])).await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_shorten_batch_with_known_url_is_conflict() {
    let server = common::create_test_server();

    server.post("/").text("ya.ru").await;

    let response = server
        .post("/api/shorten/batch")
        .json(&json!([{ "correlation_id": "1", "original_url": "ya.ru" }]))
        .await;

    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_identity_cookie_is_issued() {
    let server = common::create_test_server();

    let response = server.post("/").text("yandex.com").await;

    let cookie = response.cookie("token");
    let (id, signature) = cookie.value().split_once('.').unwrap();
    assert!(id.parse::<i64>().is_ok());
    assert_eq!(signature.len(), 64);

    let set_cookie = response.header(header::SET_COOKIE);
    assert!(set_cookie.to_str().unwrap().contains("Max-Age=1200"));
}

#[tokio::test]
async fn test_identity_cookie_is_reissued_unchanged() {
    let server = common::create_test_server();
    let value = common::identity_cookie(77);

    let response = server
        .post("/")
        .add_header(
            header::COOKIE,
            HeaderValue::from_str(&format!("token={value}")).unwrap(),
        )
        .text("yandex.com")
        .await;

    assert_eq!(response.cookie("token").value(), value);
}

#[tokio::test]
async fn test_tampered_cookie_is_replaced() {
    let server = common::create_test_server();
    let value = common::identity_cookie(77).replacen("77", "78", 1);

    let response = server
        .post("/")
        .add_header(
            header::COOKIE,
            HeaderValue::from_str(&format!("token={value}")).unwrap(),
        )
        .text("yandex.com")
        .await;

    assert_ne!(response.cookie("token").value(), value);
}
