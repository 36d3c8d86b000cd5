use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use shared_models::auth::{TokenClaims, User};

type HmacSha256 = Hmac<Sha256>;

/// Session tokens are valid for seven days from issuance.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    Expired,
}

/// Issue a signed session token for a user.
pub fn issue(user: &User, secret: &str) -> String {
    issue_at(user, secret, Utc::now())
}

/// Clock-injected variant of [`issue`]; the expiry boundary tests depend on
/// a deterministic issuance instant.
pub fn issue_at(user: &User, secret: &str, now: DateTime<Utc>) -> String {
    let header = json!({
        "alg": "HS256",
        "typ": "JWT"
    });

    let exp = now + Duration::days(TOKEN_TTL_DAYS);
    let claims = json!({
        "sub": user.id,
        "email": user.email,
        "name": user.name,
        "iat": now.timestamp(),
        "exp": exp.timestamp()
    });

    let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
    let claims_b64 = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signing_input = format!("{}.{}", header_b64, claims_b64);

    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{}.{}", signing_input, signature)
}

/// Verify signature and expiry; no store access, no side effects.
pub fn verify(token: &str, secret: &str) -> Result<TokenClaims, TokenError> {
    verify_at(token, secret, Utc::now())
}

pub fn verify_at(
    token: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<TokenClaims, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(TokenError::Malformed);
    }

    let signature = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|_| TokenError::Malformed)?;

    let signing_input = format!("{}.{}", parts[0], parts[1]);
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(signing_input.as_bytes());

    if mac.verify_slice(&signature).is_err() {
        debug!("token signature verification failed");
        return Err(TokenError::InvalidSignature);
    }

    let claims_bytes = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| TokenError::Malformed)?;
    let claims: TokenClaims =
        serde_json::from_slice(&claims_bytes).map_err(|_| TokenError::Malformed)?;

    if claims.exp < now.timestamp() {
        debug!("token expired at {} (now: {})", claims.exp, now.timestamp());
        return Err(TokenError::Expired);
    }

    Ok(claims)
}
