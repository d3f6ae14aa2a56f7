//! # Authentication
//!
//! Bearer token middleware with two roles.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {role}:{iin}:{secret}   role is `parent` or `admin`
//! Bearer {secret}                treated as admin without an IIN
//! ```
//!
//! The IIN in a parent token is the caller's known identity; signing
//! cross-checks it against the verified signer. When `AUTH_TOKEN` is unset,
//! every request runs as admin without an IIN.

use axum::extract::Request;
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use edusign_core::Iin;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::error::{AppError, ErrorBody};

// ── Role ────────────────────────────────────────────────────────────────────

/// Caller roles, ordered by privilege.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A parent signing their own contracts.
    Parent,
    /// School staff; may import contract views.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parent => "parent",
            Self::Admin => "admin",
        }
    }
}

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// Identity of the authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub role: Role,
    /// Known IIN of the caller, if any.
    pub iin: Option<Iin>,
}

impl CallerIdentity {
    pub fn admin() -> Self {
        Self {
            role: Role::Admin,
            iin: None,
        }
    }

    pub fn has_role(&self, minimum: Role) -> bool {
        self.role >= minimum
    }
}

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

/// 403 unless the caller has at least `minimum`.
pub fn require_role(caller: &CallerIdentity, minimum: Role) -> Result<(), AppError> {
    if caller.has_role(minimum) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "role '{}' required, caller has '{}'",
            minimum.as_str(),
            caller.role.as_str()
        )))
    }
}

// ── Secrets ─────────────────────────────────────────────────────────────────

/// Bearer secret, zeroized on drop and redacted in `Debug`.
#[derive(Clone)]
pub struct SecretToken(Zeroizing<String>);

impl SecretToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for SecretToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretToken([REDACTED])")
    }
}

/// Auth configuration injected into request extensions.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub token: Option<SecretToken>,
}

// ── Token Validation ────────────────────────────────────────────────────────

/// Reasons a bearer token is refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,

    #[error("authorization header must use Bearer scheme")]
    NotBearer,

    #[error("invalid bearer token")]
    InvalidToken,

    #[error("invalid token format, expected {{role}}:{{iin}}:{{secret}} or {{secret}}")]
    Malformed,

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("invalid iin in token")]
    InvalidIin,

    #[error("parent token requires an iin")]
    MissingIin,
}

fn constant_time_token_eq(provided: &str, expected: &str) -> bool {
    let provided = provided.as_bytes();
    let expected = expected.as_bytes();
    if provided.len() != expected.len() {
        let _ = expected.ct_eq(expected);
        return false;
    }
    provided.ct_eq(expected).into()
}

/// Parse `{role}:{iin}:{secret}` or a bare `{secret}`.
pub fn parse_bearer_token(
    provided: &str,
    expected: &SecretToken,
) -> Result<CallerIdentity, AuthError> {
    let parts: Vec<&str> = provided.splitn(3, ':').collect();

    match parts.as_slice() {
        [secret] => {
            if constant_time_token_eq(secret, expected.expose()) {
                Ok(CallerIdentity::admin())
            } else {
                Err(AuthError::InvalidToken)
            }
        }
        [role, iin, secret] => {
            if !constant_time_token_eq(secret, expected.expose()) {
                return Err(AuthError::InvalidToken);
            }
            let role = match *role {
                "parent" => Role::Parent,
                "admin" => Role::Admin,
                other => return Err(AuthError::UnknownRole(other.to_string())),
            };
            let iin = if iin.is_empty() {
                None
            } else {
                Some(Iin::new(*iin).map_err(|_| AuthError::InvalidIin)?)
            };
            if role == Role::Parent && iin.is_none() {
                return Err(AuthError::MissingIin);
            }
            Ok(CallerIdentity { role, iin })
        }
        _ => Err(AuthError::Malformed),
    }
}

fn authenticate(request: &Request, expected: &SecretToken) -> Result<CallerIdentity, AuthError> {
    let value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingHeader)?;
    let provided = value.strip_prefix("Bearer ").ok_or(AuthError::NotBearer)?;
    parse_bearer_token(provided, expected)
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Validate the bearer token and inject a [`CallerIdentity`].
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let expected = request
        .extensions()
        .get::<AuthConfig>()
        .and_then(|c| c.token.clone());

    let identity = match expected {
        Some(expected) => match authenticate(&request, &expected) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(reason = %e, "authentication failed");
                return unauthorized_response(&e.to_string());
            }
        },
        None => CallerIdentity::admin(),
    };

    request.extensions_mut().insert(identity);
    next.run(request).await
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody::new(message, "UNAUTHORIZED")),
    )
        .into_response()
}
