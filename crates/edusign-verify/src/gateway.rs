//! HTTP implementation of [`SignatureVerifier`].
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST   | `{verify_url}` | Verify `{cms, data}` |
//!
//! ## Outcome Classification
//!
//! | Authority answer | Result |
//! |------------------|--------|
//! | 2xx, `success: true`, valid `iin` | `Ok(VerifiedSigner)` |
//! | 2xx, `success: true`, missing/invalid `iin` | `UNEXPECTED_ERROR` |
//! | 2xx, `success: false` | reported `error_code` or `VERIFICATION_FAILED` |
//! | non-2xx | `VERIFICATION_FAILED` with `detail.error` or `HTTP {status}: {body}` |
//! | elapsed timeout | `TIMEOUT` |
//! | connect failure | `CONNECTION_ERROR` |
//! | anything else | `UNEXPECTED_ERROR` |

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use edusign_core::{ErrorCode, Iin};

use crate::config::VerifyConfig;
use crate::error::VerificationError;
use crate::types::{ErrorEnvelope, VerificationOutcome, VerifiedSigner, VerifyRequest};
use crate::SignatureVerifier;

/// Maximum characters of a non-2xx body echoed in the error message.
const MAX_ECHOED_BODY: usize = 500;

/// Client for the trust authority's verify endpoint.
#[derive(Debug, Clone)]
pub struct HttpVerificationGateway {
    http: reqwest::Client,
    config: VerifyConfig,
}

impl HttpVerificationGateway {
    /// Build a gateway from configuration.
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::Unexpected` if the HTTP client cannot be
    /// constructed (invalid API key header value, TLS backend failure).
    pub fn new(config: VerifyConfig) -> Result<Self, VerificationError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(key) = &config.api_key {
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", key.as_str()))
                .map_err(|e| VerificationError::Unexpected {
                    reason: format!("invalid API key header: {e}"),
                })?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| VerificationError::Unexpected {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { http, config })
    }

    /// The configuration this gateway was built with.
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    fn classify_transport(&self, err: reqwest::Error) -> VerificationError {
        if err.is_timeout() {
            VerificationError::Timeout {
                elapsed_secs: self.config.timeout_secs,
            }
        } else if err.is_connect() {
            VerificationError::Connection {
                reason: err.to_string(),
            }
        } else {
            VerificationError::Unexpected {
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl SignatureVerifier for HttpVerificationGateway {
    async fn verify(
        &self,
        cms_signature: &str,
        signed_data: &str,
    ) -> Result<VerifiedSigner, VerificationError> {
        let endpoint = self.config.verify_url.as_str();
        let body = VerifyRequest {
            cms: cms_signature,
            data: signed_data,
        };

        tracing::debug!(endpoint, "submitting signature to trust authority");

        let resp = self
            .http
            .post(self.config.verify_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.map_err(|e| self.classify_transport(e))?;
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .ok()
                .and_then(|env| env.message())
                .unwrap_or_else(|| {
                    let echoed: String = text.chars().take(MAX_ECHOED_BODY).collect();
                    format!("HTTP {}: {}", status.as_u16(), echoed)
                });
            tracing::warn!(endpoint, status = status.as_u16(), "trust authority returned error status");
            return Err(VerificationError::rejected(message));
        }

        let outcome: VerificationOutcome = resp.json().await.map_err(|e| {
            if e.is_timeout() {
                self.classify_transport(e)
            } else {
                VerificationError::Unexpected {
                    reason: format!("malformed response from {endpoint}: {e}"),
                }
            }
        })?;

        interpret(outcome)
    }

    fn adapter_name(&self) -> &str {
        "http-trust-authority"
    }
}

/// Map a decoded 2xx body to the verification result.
fn interpret(outcome: VerificationOutcome) -> Result<VerifiedSigner, VerificationError> {
    if !outcome.success {
        let code = outcome
            .error_code
            .as_deref()
            .and_then(ErrorCode::from_name)
            .filter(ErrorCode::is_verification_failure)
            .unwrap_or(ErrorCode::VerificationFailed);
        let message = outcome
            .error
            .unwrap_or_else(|| "Подпись не прошла проверку".to_string());
        return Err(VerificationError::Rejected { code, message });
    }

    let raw_iin = outcome.iin.unwrap_or_default();
    let signer_iin = Iin::new(raw_iin.trim()).map_err(|e| VerificationError::Unexpected {
        reason: format!("authority confirmed signature without a usable signer IIN: {e}"),
    })?;

    Ok(VerifiedSigner {
        signer_iin,
        certificate_info: outcome.certificate_info.unwrap_or(serde_json::Value::Null),
        verified_at: Utc::now(),
    })
}
