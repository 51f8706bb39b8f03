//! Request identity extraction.
//!
//! Authentication itself lives outside the ticket API: a signed JWT supplies
//! the acting user. This module validates the bearer token and inserts a
//! [`RequestIdentity`] extension for handlers to consume.

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Extension,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims the ticket API relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the acting user's id.
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Role names for authorization.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The authenticated identity behind a request.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

impl RequestIdentity {
    /// Whether the identity carries the given role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Verification key configuration shared through request extensions.
#[derive(Clone)]
pub struct IdentityConfig {
    decoding_key: DecodingKey,
}

impl IdentityConfig {
    /// Build from an HMAC secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret),
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, message.to_string()).into_response()
}

/// Axum middleware validating the bearer token and attaching
/// [`RequestIdentity`] to the request.
pub async fn identity_middleware(
    Extension(config): Extension<IdentityConfig>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("Invalid Authorization header format"))?;

    if token.trim().is_empty() {
        return Err(unauthorized("Empty bearer token"));
    }

    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<JwtClaims>(token, &config.decoding_key, &validation)
        .map_err(|_| unauthorized("Invalid or expired token"))?;

    let user_id = Uuid::parse_str(&data.claims.sub)
        .map_err(|_| unauthorized("Token subject is not a valid user id"))?;

    request.extensions_mut().insert(RequestIdentity {
        user_id,
        roles: data.claims.roles,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_role() {
        let identity = RequestIdentity {
            user_id: Uuid::new_v4(),
            roles: vec!["admin".to_string(), "approver".to_string()],
        };
        assert!(identity.has_role("admin"));
        assert!(!identity.has_role("auditor"));
    }

    #[test]
    fn test_claims_roles_default_empty() {
        let claims: JwtClaims =
            serde_json::from_str(r#"{"sub":"abc","exp":1,"iat":0}"#).unwrap();
        assert!(claims.roles.is_empty());
    }
}
