/// Bearer tokens
///
/// The user directory takes the caller's id and platform role from an HS256
/// token and from nowhere else. Login lives in another service; this module
/// mints tokens only for that service (which shares the secret) and for
/// tests.
///
/// ```
/// use plannex_shared::auth::jwt::{create_token, validate_token, Claims};
/// use plannex_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let id = Uuid::new_v4();
///
/// let token = create_token(&Claims::new(id, UserRole::Admin), secret)?;
/// assert_eq!(validate_token(&token, secret)?.sub, id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::errors::{Error as JwtLibError, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// `iss` of every token this platform accepts
pub const ISSUER: &str = "plannex";

/// Lifetime of [`Claims::new`]
pub const DEFAULT_TTL_HOURS: i64 = 24;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token could not be signed: {0}")]
    CreateError(String),

    #[error("Token rejected: {0}")]
    ValidationError(String),

    #[error("Token has expired")]
    Expired,

    #[error("Token was not issued by this platform")]
    InvalidIssuer,
}

impl From<JwtLibError> for JwtError {
    fn from(err: JwtLibError) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
            _ => JwtError::ValidationError(err.to_string()),
        }
    }
}

/// Registered claims plus the caller's platform role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,

    /// Role when the token was minted; a later role change takes effect on
    /// the next token
    pub role: UserRole,
}

impl Claims {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self::with_expiration(user_id, role, Duration::hours(DEFAULT_TTL_HOURS))
    }

    /// A negative `expires_in` yields claims that are already expired
    pub fn with_expiration(user_id: Uuid, role: UserRole, expires_in: Duration) -> Self {
        let issued = Utc::now().timestamp();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: issued,
            nbf: issued,
            exp: issued + expires_in.num_seconds(),
            role,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

fn validation() -> Validation {
    let mut rules = Validation::new(ALGORITHM);
    rules.set_issuer(&[ISSUER]);
    rules.validate_nbf = true;
    rules
}

pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(ALGORITHM),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Checks signature, `exp`, `nbf` and `iss`
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn mint(claims: &Claims) -> String {
        create_token(claims, SECRET).unwrap()
    }

    #[test]
    fn test_round_trip_keeps_identity() {
        let id = Uuid::new_v4();
        let claims = validate_token(&mint(&Claims::new(id, UserRole::Vendor)), SECRET).unwrap();

        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, UserRole::Vendor);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, DEFAULT_TTL_HOURS * 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_wrong_secret() {
        let token = mint(&Claims::new(Uuid::new_v4(), UserRole::Admin));

        assert!(matches!(
            validate_token(&token, "another-secret-key-at-least-32-bytes"),
            Err(JwtError::ValidationError(_))
        ));
    }

    #[test]
    fn test_expired() {
        let claims =
            Claims::with_expiration(Uuid::new_v4(), UserRole::Admin, Duration::hours(-1));
        assert!(claims.is_expired());

        assert!(matches!(
            validate_token(&mint(&claims), SECRET),
            Err(JwtError::Expired)
        ));
    }

    #[test]
    fn test_foreign_issuer() {
        let mut claims = Claims::new(Uuid::new_v4(), UserRole::Admin);
        claims.iss = "someone-else".to_string();

        assert!(matches!(
            validate_token(&mint(&claims), SECRET),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_garbage() {
        assert!(matches!(
            validate_token("not.a.token", SECRET),
            Err(JwtError::ValidationError(_))
        ));
    }
}
