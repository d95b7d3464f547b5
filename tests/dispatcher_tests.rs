//! Integration tests for the signed and public request primitives
//!
//! Every test talks to a local fake upstream, never to the exchange.

mod common;

use chrono::Utc;
use serde_json::json;

use common::{FakeUpstream, API_KEY, API_SECRET};
use indodax_mcp::indodax::requests::{GetInfo, Trade};
use indodax_mcp::indodax::{sign_request, verify_signature, ClientConfig, Credentials, IndodaxClient};
use indodax_mcp::{IndodaxError, Payload, PublicEndpoint};

const BALANCE: &str = r#"{"success":1,"return":{"balance":{"idr":1000000}}}"#;

// =============================================================================
// Signed dispatcher
// =============================================================================

#[tokio::test]
async fn test_private_post_signs_transmitted_body() {
    let upstream = FakeUpstream::start(200, BALANCE).await;
    let client = upstream.client();

    let result = client
        .private_post(Payload::new("getInfo").with("nonce", "1"))
        .await
        .unwrap();
    assert_eq!(result, serde_json::from_str::<serde_json::Value>(BALANCE).unwrap());

    let requests = upstream.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];

    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/tapi");
    assert_eq!(req.body, "method=getInfo&nonce=1");
    assert_eq!(req.header("Key"), Some(API_KEY));
    assert_eq!(
        req.header("Content-Type"),
        Some("application/x-www-form-urlencoded")
    );

    let sign = req.header("Sign").unwrap();
    assert!(verify_signature(&req.body, API_SECRET, sign));
    assert_eq!(
        sign,
        "84adc5876bacba72760d9ba3302afc1c5558e224afc6f89d7dd182bd1c03a53f\
         fa08558b1bbb7562efeddb91c49318269d50589bcd729c2fa82ef1f3584cb9e0"
    );
}

#[tokio::test]
async fn test_private_post_injects_timestamp() {
    let upstream = FakeUpstream::start(200, BALANCE).await;
    let client = upstream.client();

    let before = Utc::now().timestamp_millis();
    client.call(&GetInfo::default()).await.unwrap();
    let after = Utc::now().timestamp_millis();

    let req = &upstream.requests()[0];
    let fields: Vec<(String, String)> = serde_urlencoded::from_str(&req.body).unwrap();

    let stamps: Vec<&(String, String)> = fields.iter().filter(|(k, _)| k == "timestamp").collect();
    assert_eq!(stamps.len(), 1);
    assert!(fields.iter().all(|(k, _)| k != "nonce"));

    let stamp: i64 = stamps[0].1.parse().unwrap();
    assert!(stamp >= before && stamp <= after);
    assert_eq!(req.header("Sign").unwrap(), sign_request(&req.body, API_SECRET));
}

#[tokio::test]
async fn test_typed_call_with_nonce() {
    let upstream = FakeUpstream::start(200, r#"{"success":1,"return":{"order_id":1}}"#).await;
    let client = upstream.client();

    client
        .call_with_nonce(&Trade::buy("btc_idr", 650_000_000.0, 50_000.0), 42)
        .await
        .unwrap();

    let req = &upstream.requests()[0];
    assert_eq!(
        req.body,
        "method=trade&pair=btc_idr&type=buy&price=650000000&idr=50000&nonce=42"
    );
    assert_eq!(
        req.header("Sign"),
        Some(
            "71bd863e62632a3daba8754969d05a3a3099a1a15bd9e27ed9dafa5a79f2bce8\
             4aa671c3a7ddfa5c8d1c0bb180881c46e696287c5bcf68953a0fec379d3a2318"
        )
    );
}

#[tokio::test]
async fn test_private_post_http_500_is_an_error() {
    let upstream = FakeUpstream::start(500, r#"{"error":"boom"}"#).await;
    let client = upstream.client();

    let err = client.call(&GetInfo::default()).await.unwrap_err();
    match err {
        IndodaxError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_exchange_error_is_passed_through() {
    let body = r#"{"success":0,"error":"Invalid credentials. API not found or session has expired.","error_code":"invalid_credentials"}"#;
    let upstream = FakeUpstream::start(200, body).await;
    let client = upstream.client();

    let result = client.call(&GetInfo::default()).await.unwrap();
    assert_eq!(result["success"], 0);
    assert_eq!(result["error_code"], "invalid_credentials");
}

#[tokio::test]
async fn test_non_json_body_is_a_decode_error() {
    let upstream = FakeUpstream::start(200, "<html>maintenance</html>").await;
    let client = upstream.client();

    let err = client.call(&GetInfo::default()).await.unwrap_err();
    assert!(matches!(err, IndodaxError::Decode(_)));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_connection_refused_is_a_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::default()
        .with_private_url(format!("http://{}/tapi", addr))
        .with_public_url(format!("http://{}/api", addr));
    let client = IndodaxClient::with_config(Credentials::new("k", "s"), config).unwrap();

    let err = client.call(&GetInfo::default()).await.unwrap_err();
    assert!(matches!(err, IndodaxError::Network(_)));
}

// =============================================================================
// Public fetcher
// =============================================================================

#[tokio::test]
async fn test_ticker_paths() {
    let upstream = FakeUpstream::start(200, r#"{"ticker":{"last":"1"}}"#).await;
    let client = upstream.client();

    client.public(&PublicEndpoint::ticker(None)).await.unwrap();
    client
        .public(&PublicEndpoint::ticker(Some("btc_idr")))
        .await
        .unwrap();

    let paths: Vec<String> = upstream.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(paths, vec!["/api/ticker", "/api/ticker/btc_idr"]);
}

#[tokio::test]
async fn test_pair_id_cannot_escape_its_segment() {
    let upstream = FakeUpstream::start(200, r#"{"ticker":{}}"#).await;
    let client = upstream.client();

    client
        .public(&PublicEndpoint::ticker(Some("btc_idr?x=1")))
        .await
        .unwrap();
    client
        .public(&PublicEndpoint::trades(Some("../tapi")))
        .await
        .unwrap();

    let paths: Vec<String> = upstream.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec!["/api/ticker/btc_idr%3Fx=1", "/api/trades/..%2Ftapi"]
    );
}

#[tokio::test]
async fn test_public_get_is_unsigned() {
    let upstream = FakeUpstream::start(200, r#"{"server_time":1700000000000}"#).await;
    let client = upstream.client();

    let result = client.public(&PublicEndpoint::ServerTime).await.unwrap();
    assert_eq!(result, json!({"server_time": 1700000000000u64}));

    let req = &upstream.requests()[0];
    assert_eq!(req.method, "GET");
    assert_eq!(req.path, "/api/server_time");
    assert!(req.header("Key").is_none());
    assert!(req.header("Sign").is_none());
    assert!(req.body.is_empty());
}

#[tokio::test]
async fn test_public_array_response() {
    let upstream = FakeUpstream::start(200, r#"[{"id":"btcidr"},{"id":"ethidr"}]"#).await;
    let client = upstream.client();

    let result = client.public(&PublicEndpoint::Pairs).await.unwrap();
    assert_eq!(result.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_public_404_is_an_error() {
    let upstream = FakeUpstream::start(404, r#"{"error":"not found"}"#).await;
    let client = upstream.client();

    let err = client
        .public(&PublicEndpoint::trades(Some("nope_idr")))
        .await
        .unwrap_err();
    assert!(matches!(err, IndodaxError::Status { .. }));
}
