//! auth.rs
//! Bearer-token session checks for the conversion endpoints.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sheetxml_core::audit::{AuditEvent, AuditStatus};
use sheetxml_core::constants::SYSTEM_USER;
use sheetxml_core::session::SessionValidator;
use tracing::debug;

use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// HS256 tokens with `exp`, plus an optional ceiling on age measured from `iat`.
pub struct JwtSessionValidator {
    key: DecodingKey,
    validation: Validation,
    max_age_secs: Option<i64>,
}

impl JwtSessionValidator {
    pub fn new(secret: &str, max_age_minutes: Option<u64>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            max_age_secs: max_age_minutes.map(|m| (m as i64).saturating_mul(60)),
        }
    }

    /// Claims of a live token; `None` when invalid, expired, or too old.
    pub fn claims(&self, token: &str) -> Option<SessionClaims> {
        let data = match decode::<SessionClaims>(token, &self.key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                debug!(error = %e, "session token rejected");
                return None;
            }
        };
        if let (Some(max_age), Some(iat)) = (self.max_age_secs, data.claims.iat) {
            if Utc::now().timestamp() - iat > max_age {
                debug!(sub = %data.claims.sub, "session exceeded maximum age");
                return None;
            }
        }
        Some(data.claims)
    }
}

impl SessionValidator for JwtSessionValidator {
    fn is_expired(&self, token: &str) -> bool {
        self.claims(token).is_none()
    }

    fn subject(&self, token: &str) -> Option<String> {
        self.claims(token).map(|c| c.sub)
    }
}

/// Audit identity attached to each request by `require_session`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser(pub String);

fn bearer_token(request: &Request) -> Option<&str> {
    let value = request.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme.eq_ignore_ascii_case("bearer").then(|| token.trim()).filter(|t| !t.is_empty())
}

/// Rejects requests without a live session when sessions are configured.
pub async fn require_session(State(state): State<AppState>, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let user = match &state.sessions {
        None => SYSTEM_USER.to_string(),
        Some(validator) => {
            let live = bearer_token(&request).filter(|t| !validator.is_expired(t));
            match live {
                Some(token) => validator.subject(token).unwrap_or_else(|| SYSTEM_USER.to_string()),
                None => {
                    state.audit.log(
                        AuditEvent::authentication("anonymous", "session_check")
                            .with_status(AuditStatus::Failure)
                            .with_detail("path", request.uri().path()),
                    );
                    return Err(ApiError::unauthorized());
                }
            }
        }
    };
    request.extensions_mut().insert(SessionUser(user));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, iat_offset: i64, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = SessionClaims { sub: "alice".into(), exp: now + exp_offset, iat: Some(now + iat_offset) };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn test_live_token_yields_subject() {
        let v = JwtSessionValidator::new("k", Some(5));
        let t = token("k", 0, 300);
        assert!(!v.is_expired(&t));
        assert_eq!(v.subject(&t).as_deref(), Some("alice"));
    }

    #[test]
    fn test_expired_wrong_key_and_garbage_are_rejected() {
        let v = JwtSessionValidator::new("k", None);
        assert!(v.is_expired(&token("k", -600, -10)));
        assert!(v.is_expired(&token("other", 0, 300)));
        assert!(v.is_expired("not.a.jwt"));
    }

    #[test]
    fn test_max_age_from_issued_at() {
        let v = JwtSessionValidator::new("k", Some(5));
        assert!(v.is_expired(&token("k", -600, 3600)));
        assert!(!JwtSessionValidator::new("k", None).is_expired(&token("k", -600, 3600)));
    }
}
