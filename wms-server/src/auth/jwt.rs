//! Staff JWT tokens
//!
//! HS256, 24 hour expiry. Tokens are stateless: logging out is the client
//! discarding its token.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shared::models::{Staff, StaffRole};
use thiserror::Error;

use super::StaffContext;

const JWT_EXPIRY_HOURS: i64 = 24;

/// JWT claims for staff authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffClaims {
    /// Staff ID
    pub sub: String,
    pub restaurant_id: i64,
    /// `manager` or `waitstaff`
    pub role: String,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has expired")]
    ExpiredToken,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

/// Create a token for a staff member
pub fn create_token(staff: &Staff, secret: &str) -> Result<String, JwtError> {
    let now = chrono::Utc::now();
    let claims = StaffClaims {
        sub: staff.id.to_string(),
        restaurant_id: staff.restaurant_id,
        role: staff.role.as_db().to_string(),
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::GenerationFailed(e.to_string()))
}

/// Verify signature and expiry, returning the staff context the token carries
pub fn validate_token(token: &str, secret: &str) -> Result<StaffContext, JwtError> {
    let data = jsonwebtoken::decode::<StaffClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
        _ => JwtError::InvalidToken(e.to_string()),
    })?;

    let claims = data.claims;
    let staff_id = claims
        .sub
        .parse()
        .map_err(|_| JwtError::InvalidToken(format!("bad subject {}", claims.sub)))?;
    let role = StaffRole::from_db(&claims.role)
        .ok_or_else(|| JwtError::InvalidToken(format!("unknown role {}", claims.role)))?;

    Ok(StaffContext {
        staff_id,
        restaurant_id: claims.restaurant_id,
        role,
    })
}

/// The token part of a `Bearer <token>` header value
pub fn extract_from_header(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(role: StaffRole) -> Staff {
        Staff {
            id: 7,
            restaurant_id: 3,
            email: "s@example.com".to_string(),
            role,
            created_at: 0,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let token = create_token(&staff(StaffRole::Waitstaff), "secret").unwrap();
        let ctx = validate_token(&token, "secret").unwrap();
        assert_eq!(ctx.staff_id, 7);
        assert_eq!(ctx.restaurant_id, 3);
        assert_eq!(ctx.role, StaffRole::Waitstaff);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(&staff(StaffRole::Manager), "secret").unwrap();
        assert!(matches!(
            validate_token(&token, "other"),
            Err(JwtError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let past = (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize;
        let claims = StaffClaims {
            sub: "1".to_string(),
            restaurant_id: 1,
            role: "manager".to_string(),
            exp: past,
            iat: past - 60,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(matches!(
            validate_token(&token, "secret"),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(extract_from_header("Basic abc"), None);
        assert_eq!(extract_from_header("Bearer "), None);
    }
}
