//! Contract tests for HttpVerificationGateway against a mocked trust authority.
//!
//! | Authority behaviour | Test |
//! |---------------------|------|
//! | 200 success | `verify_success_*` |
//! | 200 declined | `verify_declined_*` |
//! | non-2xx | `verify_http_error_*` |
//! | slow | `verify_timeout_*` |
//! | unreachable | `verify_unreachable_*` |
//! | garbage | `verify_malformed_*` |

use std::time::Duration;

use edusign_core::ErrorCode;
use edusign_verify::{HttpVerificationGateway, SignatureVerifier, VerifyConfig};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway(mock_server: &MockServer, timeout_secs: u64) -> HttpVerificationGateway {
    let config = VerifyConfig::for_url(&format!("{}/api/v1/verify", mock_server.uri()))
        .unwrap()
        .with_timeout_secs(timeout_secs);
    HttpVerificationGateway::new(config).unwrap()
}

// ── 200 success ──────────────────────────────────────────────────────

#[tokio::test]
async fn verify_success_posts_cms_and_data_and_returns_signer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/verify"))
        .and(body_json(serde_json::json!({"cms": "Q01T", "data": "REFUQQ=="})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "iin": "850101300123",
            "certificate_info": {
                "serialNumber": "59e4a35b6ac19e486926349d07eba7572059e0d8",
                "signAlg": "ECGOST3410-2015-512"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let signer = gateway(&mock_server, 5).verify("Q01T", "REFUQQ==").await.unwrap();
    assert_eq!(signer.signer_iin.as_str(), "850101300123");
    assert_eq!(signer.certificate_info["signAlg"], "ECGOST3410-2015-512");
}

#[tokio::test]
async fn verify_success_sends_bearer_token_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/verify"))
        .and(header("authorization", "Bearer pki-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "iin": "850101300123"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = VerifyConfig::for_url(&format!("{}/api/v1/verify", mock_server.uri()))
        .unwrap()
        .with_api_key("pki-key");
    let gw = HttpVerificationGateway::new(config).unwrap();
    assert!(gw.verify("c", "d").await.is_ok());
}

#[tokio::test]
async fn verify_success_without_signer_iin_is_unexpected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "iin": "not-an-iin"
        })))
        .mount(&mock_server)
        .await;

    let err = gateway(&mock_server, 5).verify("c", "d").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnexpectedError);
}

// ── 200 declined ─────────────────────────────────────────────────────

#[tokio::test]
async fn verify_declined_passes_through_authority_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "error": "Сертификат отозван",
            "error_code": "VERIFICATION_FAILED"
        })))
        .mount(&mock_server)
        .await;

    let err = gateway(&mock_server, 5).verify("c", "d").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::VerificationFailed);
    assert_eq!(err.to_string(), "Сертификат отозван");
}

#[tokio::test]
async fn verify_declined_without_code_defaults_to_verification_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "error": "OCSP: REVOKED"
        })))
        .mount(&mock_server)
        .await;

    let err = gateway(&mock_server, 5).verify("c", "d").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::VerificationFailed);
}

// ── non-2xx ──────────────────────────────────────────────────────────

#[tokio::test]
async fn verify_http_error_uses_detail_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "detail": {"error": "Invalid CMS structure"}
        })))
        .mount(&mock_server)
        .await;

    let err = gateway(&mock_server, 5).verify("c", "d").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::VerificationFailed);
    assert_eq!(err.to_string(), "Invalid CMS structure");
}

#[tokio::test]
async fn verify_http_error_without_detail_echoes_status_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let err = gateway(&mock_server, 5).verify("c", "d").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::VerificationFailed);
    assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
}

// ── timeout / unreachable / malformed ────────────────────────────────

#[tokio::test]
async fn verify_timeout_maps_to_timeout_code() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"success": true, "iin": "850101300123"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let err = gateway(&mock_server, 1).verify("c", "d").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::Timeout);
}

#[tokio::test]
async fn verify_unreachable_maps_to_connection_error() {
    // Bind then drop to obtain a port with no listener.
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = VerifyConfig::for_url(&format!("http://127.0.0.1:{port}/verify"))
        .unwrap()
        .with_timeout_secs(2);
    let gw = HttpVerificationGateway::new(config).unwrap();

    let err = gw.verify("c", "d").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ConnectionError);
}

#[tokio::test]
async fn verify_malformed_body_is_unexpected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let err = gateway(&mock_server, 5).verify("c", "d").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnexpectedError);
}
