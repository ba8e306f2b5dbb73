/// Unified Error Handling Module
///
/// Central error types for the service:
/// 1. Domain-specific error enums (validation, database, cache, auth, calculation)
/// 2. A unified `AppError` used for control flow throughout the application
/// 3. HTTP response mapping via actix-web's `ResponseError`
/// 4. Structured error logging with request context

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Validation errors for input data
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(msg) => write!(f, "{}", msg),
        }
    }
}

impl StdError for ValidationError {}

/// Database operation errors
#[derive(Debug)]
pub enum DatabaseError {
    UniqueConstraintViolation(String),
    NotFound(String),
    ConnectionPool(String),
    UnexpectedError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueConstraintViolation(msg) => {
                write!(f, "Duplicate entry: {}", msg)
            }
            DatabaseError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DatabaseError::ConnectionPool(msg) => write!(f, "Database connection error: {}", msg),
            DatabaseError::UnexpectedError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Errors from the revocation list store
#[derive(Debug)]
pub enum CacheError {
    Connection(String),
    Command(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Connection(msg) => write!(f, "Store connection error: {}", msg),
            CacheError::Command(msg) => write!(f, "Store command error: {}", msg),
        }
    }
}

impl StdError for CacheError {}

/// Authentication and token lifecycle errors
///
/// `InvalidToken`, `TokenExpired`, `InvalidTokenType` and `TokenRevoked` are
/// produced by the token verifier in exactly that precedence order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    InvalidToken,
    TokenExpired,
    InvalidTokenType,
    TokenRevoked,
    TokenCreation,
    InvalidPayload,
    MissingToken,
    AccountInactive,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::InvalidToken => write!(f, "Could not validate credentials"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::InvalidTokenType => write!(f, "Invalid token type"),
            AuthError::TokenRevoked => write!(f, "Token has been revoked"),
            AuthError::TokenCreation => write!(f, "Could not create token"),
            AuthError::InvalidPayload => write!(f, "Invalid token payload"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::AccountInactive => write!(f, "Account is inactive"),
        }
    }
}

impl StdError for AuthError {}

/// Calculation domain errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalculationError {
    UnsupportedOperation(String),
    NotEnoughInputs(usize),
    PowerArity(usize),
    DivisionByZero,
    NonFiniteResult,
}

impl CalculationError {
    /// Structural errors are rejected at the schema level (422); the rest are
    /// arithmetic failures against otherwise well-formed data (400).
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            CalculationError::UnsupportedOperation(_)
                | CalculationError::NotEnoughInputs(_)
                | CalculationError::PowerArity(_)
        )
    }
}

impl fmt::Display for CalculationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalculationError::UnsupportedOperation(name) => {
                write!(f, "Unsupported calculation type: {}", name)
            }
            CalculationError::NotEnoughInputs(got) => {
                write!(f, "At least two inputs are required (got {})", got)
            }
            CalculationError::PowerArity(got) => {
                write!(f, "Power requires exactly two inputs (got {})", got)
            }
            CalculationError::DivisionByZero => write!(f, "Division by zero"),
            CalculationError::NonFiniteResult => write!(f, "Result is not a finite number"),
        }
    }
}

impl StdError for CalculationError {}

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Database(DatabaseError),
    Cache(CacheError),
    Auth(AuthError),
    Calculation(CalculationError),
    Unprocessable(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Cache(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Calculation(e) => write!(f, "{}", e),
            AppError::Unprocessable(msg) => write!(f, "{}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::Cache(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<CalculationError> for AppError {
    fn from(err: CalculationError) -> Self {
        AppError::Calculation(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            AppError::Database(DatabaseError::UniqueConstraintViolation(
                "Email or username already registered".to_string(),
            ))
        } else if error_msg.contains("no rows") {
            AppError::Database(DatabaseError::NotFound("Record not found".to_string()))
        } else if error_msg.contains("pool") || error_msg.contains("connect") {
            AppError::Database(DatabaseError::ConnectionPool(error_msg))
        } else {
            AppError::Database(DatabaseError::UnexpectedError(error_msg))
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for log correlation
    pub error_id: String,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    /// HTTP status code
    pub status: u16,
    /// Timestamp when the error occurred
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AppError {
    /// Map the error to a status, client code, and surfaced message.
    ///
    /// Validation, auth, and calculation errors surface their own message;
    /// database, cache, and internal errors are masked.
    fn response_parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string()),

            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) => {
                    (StatusCode::CONFLICT, "DUPLICATE_ENTRY", e.to_string())
                }
                DatabaseError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND", e.to_string()),
                DatabaseError::ConnectionPool(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "SERVICE_UNAVAILABLE",
                    "Database service temporarily unavailable".to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error occurred".to_string(),
                ),
            },

            AppError::Cache(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "CACHE_ERROR",
                "Revocation store temporarily unavailable".to_string(),
            ),

            AppError::Auth(e) => {
                let (status, code) = match e {
                    AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
                    AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "TOKEN_INVALID"),
                    AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
                    AuthError::InvalidTokenType => (StatusCode::UNAUTHORIZED, "TOKEN_TYPE"),
                    AuthError::TokenRevoked => (StatusCode::UNAUTHORIZED, "TOKEN_REVOKED"),
                    AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
                    AuthError::InvalidPayload => (StatusCode::BAD_REQUEST, "TOKEN_PAYLOAD"),
                    AuthError::AccountInactive => (StatusCode::FORBIDDEN, "ACCOUNT_INACTIVE"),
                    AuthError::TokenCreation => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "TOKEN_CREATION")
                    }
                };
                (status, code, e.to_string())
            }

            AppError::Calculation(e) => {
                (StatusCode::BAD_REQUEST, "CALCULATION_ERROR", e.to_string())
            }

            AppError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "SCHEMA_VALIDATION",
                msg.clone(),
            ),

            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error".to_string(),
            ),
        }
    }

    fn log(&self, error_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Validation error");
            }
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                tracing::warn!(error_id = error_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Database(DatabaseError::NotFound(_)) => {
                tracing::debug!(error_id = error_id, error = %self, "Record not found");
            }
            AppError::Database(e) => {
                tracing::error!(error_id = error_id, error = %e, "Database error");
            }
            AppError::Cache(e) => {
                tracing::error!(error_id = error_id, error = %e, "Revocation store error");
            }
            AppError::Auth(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Authentication error");
            }
            AppError::Calculation(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Calculation error");
            }
            AppError::Unprocessable(msg) => {
                tracing::warn!(error_id = error_id, error = %msg, "Schema validation error");
            }
            AppError::Internal(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        let (status, code, message) = self.response_parts();
        let body = ErrorResponse::new(error_id, message, code.to_string(), status.as_u16());

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        self.response_parts().0
    }
}

/// Request context for log correlation in route handlers
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            operation: operation.into(),
        }
    }
}
