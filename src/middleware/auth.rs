use crate::error::Error;
use crate::utils::token::{decode_token, Claims};
use crate::AppState;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// A caller that presented a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn id(&self) -> Uuid {
        self.0.sub
    }
}

/// Identity on endpoints where signing in is optional. A missing, malformed
/// or expired token is treated as anonymous rather than rejected.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<Uuid>);

enum BearerError {
    Missing,
    BadHeader,
    UnsupportedScheme,
}

fn bearer_token(parts: &Parts) -> Result<&str, BearerError> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(BearerError::Missing)?;
    let value = header.to_str().map_err(|_| BearerError::BadHeader)?;
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(BearerError::UnsupportedScheme)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).map_err(|e| {
            Error::Unauthorized(
                match e {
                    BearerError::Missing => "missing_authorization",
                    BearerError::BadHeader => "bad_authorization",
                    BearerError::UnsupportedScheme => "unsupported_scheme",
                }
                .to_string(),
            )
        })?;
        let claims = decode_token(token, &state.config.jwt_secret)
            .map_err(|_| Error::Unauthorized("invalid_token".to_string()))?;
        Ok(AuthUser(claims))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = bearer_token(parts)
            .ok()
            .and_then(|token| decode_token(token, &state.config.jwt_secret).ok())
            .map(|claims| claims.sub);
        Ok(MaybeUser(user_id))
    }
}
