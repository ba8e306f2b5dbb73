/// Persistence layer
///
/// Repository traits keep the route handlers independent of the storage
/// backend: Postgres in production, in-memory implementations in tests and
/// local development.

mod memory;
mod postgres;

pub use memory::{InMemoryCalculationRepository, InMemoryUserRepository};
pub use postgres::{PgCalculationRepository, PgUserRepository};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Calculation, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user. Fails with a duplicate-entry error if the email
    /// or username is already taken.
    async fn insert(&self, user: &User) -> Result<(), AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait CalculationRepository: Send + Sync {
    async fn insert(&self, calculation: &Calculation) -> Result<(), AppError>;

    /// All calculations owned by `user_id`, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Calculation>, AppError>;

    /// Fetch a calculation only if it belongs to `user_id`.
    async fn find(&self, id: Uuid, user_id: Uuid) -> Result<Option<Calculation>, AppError>;

    /// Replace operation and inputs; bumps `updated_at`.
    async fn update(&self, calculation: &Calculation) -> Result<(), AppError>;

    /// Delete a calculation; returns whether a row was removed.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError>;
}
