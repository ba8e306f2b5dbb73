/// Authentication Routes
///
/// User registration, login, token refresh, logout (revocation), and
/// current user information.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{
    hash_password, issue_token, verify_password, verify_token, Claims, RevocationList, TokenType,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError, ErrorContext, ValidationError};
use crate::middleware::bearer_token;
use crate::models::User;
use crate::repository::UserRepository;
use crate::validators::{is_valid_email, is_valid_name, is_valid_username};

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// User login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Token refresh request
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Authentication response with access and refresh tokens
#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// User information response
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
            is_active: user.is_active,
            is_verified: user.is_verified,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

fn token_pair(user_id: &uuid::Uuid, jwt_config: &JwtSettings) -> Result<AuthResponse, AppError> {
    let access_token = issue_token(user_id, TokenType::Access, None, jwt_config)?;
    let refresh_token = issue_token(user_id, TokenType::Refresh, None, jwt_config)?;

    Ok(AuthResponse {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
        expires_in: jwt_config.access_token_expiry,
    })
}

/// POST /auth/register
///
/// Register a new user. Returns the created user representation.
///
/// # Validation
/// - Email must be valid format and not already registered
/// - Username must be 3-50 chars, alphanumeric plus `_ . -`, unique
/// - Password must be 8+ chars with digit, lowercase, uppercase, special
/// - confirm_password must match password
///
/// # Errors
/// - 400: Validation errors
/// - 409: Email or username already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let first_name = is_valid_name("first_name", &form.first_name)?;
    let last_name = is_valid_name("last_name", &form.last_name)?;
    let email = is_valid_email(&form.email)?;
    let username = is_valid_username(&form.username)?;

    if form.password != form.confirm_password {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "confirm_password does not match password".to_string(),
        )));
    }

    let password_hash = hash_password(&form.password)?;

    let user = User::new(first_name, last_name, email, username, password_hash);
    users.insert(&user).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// POST /auth/login
///
/// Authenticate with username and password. Returns an access token and a
/// refresh token.
///
/// # Errors
/// - 401: Unknown username or wrong password (same message for both, to
///   prevent user enumeration)
/// - 403: Account is inactive
pub async fn login(
    form: web::Json<LoginRequest>,
    users: web::Data<dyn UserRepository>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let user = users
        .find_by_username(&form.username)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    if !verify_password(&form.password, &user.password_hash)? {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    if !user.is_active {
        return Err(AppError::Auth(AuthError::AccountInactive));
    }

    let response = token_pair(&user.id, jwt_config.get_ref())?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User logged in successfully"
    );

    Ok(HttpResponse::Ok().json(response))
}

/// POST /auth/refresh
///
/// Exchange a valid refresh token for a new token pair. The presented
/// refresh token is revoked (token rotation), so it cannot be replayed.
///
/// # Errors
/// - 401: Invalid, expired, wrong-type, or revoked refresh token
/// - 403: Associated account is inactive
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    users: web::Data<dyn UserRepository>,
    jwt_config: web::Data<JwtSettings>,
    revocations: web::Data<RevocationList>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let claims = verify_token(
        &form.refresh_token,
        TokenType::Refresh,
        jwt_config.get_ref(),
        revocations.get_ref(),
    )
    .await?;
    let user_id = claims.user_id()?;

    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidToken))?;
    if !user.is_active {
        return Err(AppError::Auth(AuthError::AccountInactive));
    }

    // Rotation: the old refresh token is dead from here on.
    revocations.revoke(&claims.jti, claims.exp).await?;

    let response = token_pair(&user.id, jwt_config.get_ref())?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "Token refreshed successfully"
    );

    Ok(HttpResponse::Ok().json(response))
}

/// POST /auth/logout
///
/// Revoke the bearer token presented in the Authorization header. Clients
/// send their refresh token here; access tokens are accepted as well, as
/// either class can be retired early.
///
/// The revocation entry carries the token's remaining lifetime, so the
/// blacklist never outlives the token itself.
///
/// # Errors
/// - 400: Token decoded but carries no usable identifier
/// - 401: Missing, invalid, or expired token
pub async fn logout(
    req: HttpRequest,
    jwt_config: web::Data<JwtSettings>,
    revocations: web::Data<RevocationList>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_logout");

    let token = bearer_token(
        req.headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok()),
    )
    .ok_or(AppError::Auth(AuthError::MissingToken))?;

    // Try the refresh class first; fall back to access on a pure type
    // mismatch so both can be logged out.
    let claims = match verify_token(
        &token,
        TokenType::Refresh,
        jwt_config.get_ref(),
        revocations.get_ref(),
    )
    .await
    {
        Ok(claims) => claims,
        Err(AppError::Auth(AuthError::InvalidTokenType)) => {
            verify_token(
                &token,
                TokenType::Access,
                jwt_config.get_ref(),
                revocations.get_ref(),
            )
            .await?
        }
        Err(e) => return Err(e),
    };

    if claims.jti.is_empty() {
        return Err(AppError::Auth(AuthError::InvalidPayload));
    }

    revocations.revoke(&claims.jti, claims.exp).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %claims.sub,
        token_type = %claims.token_type,
        "User logged out; token revoked"
    );

    Ok(HttpResponse::NoContent().finish())
}

/// GET /auth/me
///
/// Current authenticated user's information. Requires a valid access token;
/// claims are injected by the JWT middleware.
///
/// # Errors
/// - 401: Missing or invalid token (handled by middleware)
/// - 404: User no longer exists
pub async fn get_current_user(
    claims: web::ReqData<Claims>,
    users: web::Data<dyn UserRepository>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| {
            AppError::Database(crate::error::DatabaseError::NotFound(
                "User not found".to_string(),
            ))
        })?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}
