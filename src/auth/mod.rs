use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims: the acting user id plus issued-at/expiry timestamps.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, expiry_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            exp: (now + Duration::hours(expiry_hours)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token generation failed: {0}")]
    Generation(#[from] jsonwebtoken::errors::Error),
    #[error("invalid token")]
    Invalid,
}

/// Sign a time-limited token for the given user.
pub fn issue_token(user_id: Uuid, secret: &str, expiry_hours: i64) -> Result<String, TokenError> {
    let claims = Claims::new(user_id, expiry_hours);
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))?;
    Ok(token)
}

/// Validate signature and expiry, returning the encoded user id.
///
/// Malformed, expired, and mis-signed tokens all collapse into
/// `TokenError::Invalid`; callers treat that as an authentication failure.
pub fn verify_token(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| TokenError::Invalid)?;
    Ok(data.claims.sub)
}

/// Hash a password on the blocking pool; bcrypt is CPU-bound.
pub async fn hash_password(password: String) -> Result<String, crate::error::ApiError> {
    let hash =
        tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST)).await??;
    Ok(hash)
}

/// Compare a candidate password against a stored hash on the blocking pool.
pub async fn verify_password(
    password: String,
    hash: String,
) -> Result<bool, crate::error::ApiError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}
