/// Authentication module
///
/// Token codec and verifier, revocation list management, and password
/// hashing.

mod claims;
mod jwt;
mod password;
mod revocation;

pub use claims::Claims;
pub use claims::TokenType;
pub use jwt::issue_token;
pub use jwt::verify_token;
pub use password::hash_password;
pub use password::verify_password;
pub use revocation::RevocationList;
