/// Persistent entities: users and calculations.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::calculation::{evaluate, Operation};
use crate::error::CalculationError;

/// A registered account
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        username: String,
        password_hash: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            email,
            username,
            password_hash,
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A stored calculation owned by a user.
///
/// Only (operation, inputs) are persisted; the result is recomputed on read.
#[derive(Debug, Clone)]
pub struct Calculation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub operation: Operation,
    pub inputs: Vec<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Calculation {
    pub fn new(user_id: Uuid, operation: Operation, inputs: Vec<f64>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            operation,
            inputs,
            created_at: now,
            updated_at: now,
        }
    }

    /// Derive the result from the stored operation and inputs.
    pub fn result(&self) -> Result<f64, CalculationError> {
        evaluate(self.operation, &self.inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new(
            "John".to_string(),
            "Doe".to_string(),
            "john@example.com".to_string(),
            "johndoe".to_string(),
            "$2b$12$hash".to_string(),
        );
        assert!(user.is_active);
        assert!(!user.is_verified);
    }

    #[test]
    fn test_calculation_result_is_derived() {
        let mut calc = Calculation::new(Uuid::new_v4(), Operation::Addition, vec![1.0, 2.0]);
        assert_eq!(calc.result().unwrap(), 3.0);

        calc.operation = Operation::Multiplication;
        calc.inputs = vec![2.0, 3.0, 4.0];
        assert_eq!(calc.result().unwrap(), 24.0);
    }
}
