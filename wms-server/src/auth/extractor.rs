//! Principal extractors
//!
//! A `Bearer` JWT takes precedence over a session token header, so a staff
//! member's browser that also carries a stale customer token acts as staff.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use super::jwt::{self, JwtError};
use super::{Principal, SESSION_TOKEN_HEADER, SessionToken};
use crate::state::AppState;

fn session_token(parts: &Parts) -> Option<SessionToken> {
    parts
        .headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| SessionToken(t.to_string()))
}

impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(principal.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let principal = match auth_header {
            Some(header) => {
                let token = jwt::extract_from_header(header)
                    .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;
                match jwt::validate_token(token, &state.jwt_secret) {
                    Ok(staff) => Principal::Staff(staff),
                    Err(e) => {
                        tracing::warn!(error = %e, uri = %parts.uri, "Staff token rejected");
                        return Err(match e {
                            JwtError::ExpiredToken => AppError::token_expired(),
                            _ => AppError::invalid_token("Invalid token"),
                        });
                    }
                }
            }
            None => match session_token(parts) {
                Some(token) => Principal::Customer(token),
                None => return Err(AppError::not_authenticated()),
            },
        };

        parts.extensions.insert(principal.clone());
        Ok(principal)
    }
}

/// Session token if the caller sent one; used by the claim endpoint where
/// a first-time customer has none yet.
#[derive(Debug, Clone)]
pub struct OptionalSessionToken(pub Option<SessionToken>);

impl<S: Send + Sync> FromRequestParts<S> for OptionalSessionToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_token(parts)))
    }
}
