/// HTTP middleware
///
/// JWT authentication for protected routes.

mod jwt_middleware;

pub use jwt_middleware::{bearer_token, JwtMiddleware};
