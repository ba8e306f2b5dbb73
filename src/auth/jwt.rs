/// JWT Token Codec and Verifier
///
/// Issues signed tokens and validates presented ones. Verification checks,
/// in order: signature, expiry, token type, revocation status. The order is
/// load-bearing: a token can be simultaneously expired, of the wrong type,
/// and revoked, and callers rely on which error wins.

use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, TokenType};
use crate::auth::revocation::RevocationList;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

/// Issue a signed token for a user.
///
/// `ttl_override` replaces the configured default lifetime (short for
/// access, long for refresh). A fresh `jti` is generated on every call.
///
/// # Errors
/// Returns `AuthError::TokenCreation` if the signing step fails.
pub fn issue_token(
    user_id: &Uuid,
    token_type: TokenType,
    ttl_override: Option<Duration>,
    config: &JwtSettings,
) -> Result<String, AppError> {
    let ttl = ttl_override.unwrap_or_else(|| {
        Duration::seconds(match token_type {
            TokenType::Access => config.access_token_expiry,
            TokenType::Refresh => config.refresh_token_expiry,
        })
    });

    let claims = Claims::new(*user_id, token_type, ttl);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("Token signing failed: {}", e);
        AppError::Auth(AuthError::TokenCreation)
    })
}

/// Validate a presented token and return its claims.
///
/// Check order: signature, expiry, type, revocation.
///
/// # Errors
/// - `AuthError::InvalidToken` - unparseable or bad signature
/// - `AuthError::TokenExpired` - signature valid but past `exp`
/// - `AuthError::InvalidTokenType` - `type` claim != `expected`
/// - `AuthError::TokenRevoked` - `jti` found on the revocation list
pub async fn verify_token(
    token: &str,
    expected: TokenType,
    config: &JwtSettings,
    revocations: &RevocationList,
) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is exact; the default 60s leeway would let freshly expired
    // tokens through.
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::Auth(AuthError::TokenExpired)
        }
        _ => {
            tracing::warn!("JWT validation error: {}", e);
            AppError::Auth(AuthError::InvalidToken)
        }
    })?;

    if claims.token_type != expected {
        return Err(AppError::Auth(AuthError::InvalidTokenType));
    }

    if claims.jti.is_empty() {
        return Err(AppError::Auth(AuthError::InvalidPayload));
    }

    if revocations.is_revoked(&claims.jti).await? {
        return Err(AppError::Auth(AuthError::TokenRevoked));
    }

    Ok(claims)
}
