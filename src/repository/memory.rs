/// In-memory repositories
///
/// Back the HTTP surface in tests and local development. Uniqueness
/// constraints mirror the Postgres schema so duplicate registrations fail
/// the same way.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError};
use crate::models::{Calculation, User};
use crate::repository::{CalculationRepository, UserRepository};

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let taken = users
            .values()
            .any(|u| u.email == user.email || u.username == user.username);
        if taken {
            return Err(AppError::Database(DatabaseError::UniqueConstraintViolation(
                "Email or username already registered".to_string(),
            )));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryCalculationRepository {
    calculations: RwLock<HashMap<Uuid, Calculation>>,
}

impl InMemoryCalculationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CalculationRepository for InMemoryCalculationRepository {
    async fn insert(&self, calculation: &Calculation) -> Result<(), AppError> {
        let mut calculations = self.calculations.write().await;
        calculations.insert(calculation.id, calculation.clone());
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Calculation>, AppError> {
        let calculations = self.calculations.read().await;
        let mut owned: Vec<Calculation> = calculations
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> Result<Option<Calculation>, AppError> {
        let calculations = self.calculations.read().await;
        Ok(calculations
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn update(&self, calculation: &Calculation) -> Result<(), AppError> {
        let mut calculations = self.calculations.write().await;
        let mut updated = calculation.clone();
        updated.updated_at = Utc::now();
        calculations.insert(updated.id, updated);
        Ok(())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let mut calculations = self.calculations.write().await;
        match calculations.get(&id) {
            Some(c) if c.user_id == user_id => {
                calculations.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
