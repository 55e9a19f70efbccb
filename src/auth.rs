//! Bearer-token authentication collaborator.
//!
//! The service never handles credentials itself; it only verifies HS256
//! tokens whose claims carry the caller's username and role id, and gates
//! admin-only routes on the administrator role.

use std::future::{ready, Ready};

use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const ADMIN_ROLE_ID: i32 = 1;

const TOKEN_EXPIRY_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub role: i32,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

/// Keys derived from the shared secret, stored in app data.
pub struct AuthKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for the given identity. Used by operational tooling and
    /// tests; login itself lives in an external service.
    pub fn issue(&self, username: &str, role: i32) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = Claims {
            username: username.to_string(),
            role,
            exp: (now + chrono::Duration::hours(TOKEN_EXPIRY_HOURS)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
    }

    fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data =
            jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

/// Authenticated caller identity, extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct Identity {
    pub username: String,
    pub role: i32,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE_ID
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Unauthorized(
                "Administrator role required".to_string(),
            ))
        }
    }
}

fn identity_from_request(req: &HttpRequest) -> Result<Identity, AppError> {
    let keys = req
        .app_data::<web::Data<AuthKeys>>()
        .ok_or_else(|| AppError::Internal("Auth keys not configured".to_string()))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization format".to_string()))?;

    let claims = keys.verify(token).map_err(|e| {
        log::debug!("token rejected: {e}");
        AppError::Unauthorized("Invalid or expired token".to_string())
    })?;

    Ok(Identity {
        username: claims.username,
        role: claims.role,
    })
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
        ready(identity_from_request(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::test::TestRequest;

    fn keys() -> AuthKeys {
        AuthKeys::new("test-secret")
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = keys();
        let token = keys.issue("alice", 2).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, 2);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = AuthKeys::new("other-secret").issue("alice", 1).unwrap();
        assert!(keys().verify(&token).is_err());
    }

    #[test]
    fn admin_gate() {
        let admin = Identity {
            username: "root".to_string(),
            role: ADMIN_ROLE_ID,
        };
        let client = Identity {
            username: "alice".to_string(),
            role: 2,
        };
        assert!(admin.require_admin().is_ok());
        assert!(matches!(
            client.require_admin(),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[actix_web::test]
    async fn extractor_accepts_bearer_token() {
        let keys = web::Data::new(keys());
        let token = keys.issue("alice", 2).unwrap();
        let req = TestRequest::default()
            .app_data(keys)
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_http_request();

        let identity = Identity::from_request(&req, &mut Payload::None)
            .await
            .unwrap();
        assert_eq!(identity.username, "alice");
        assert!(!identity.is_admin());
    }

    #[actix_web::test]
    async fn extractor_rejects_missing_header() {
        let req = TestRequest::default()
            .app_data(web::Data::new(keys()))
            .to_http_request();

        let err = Identity::from_request(&req, &mut Payload::None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
