/// Postgres repositories
///
/// Production implementations over sqlx. The `calculations.inputs` column
/// is a `double precision[]`; `operation` is stored as text in wire format.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::calculation::Operation;
use crate::error::{AppError, DatabaseError};
use crate::models::{Calculation, User};
use crate::repository::{CalculationRepository, UserRepository};

type UserRow = (
    Uuid,
    String,
    String,
    String,
    String,
    String,
    bool,
    bool,
    DateTime<Utc>,
    DateTime<Utc>,
);

type CalculationRow = (Uuid, Uuid, String, Vec<f64>, DateTime<Utc>, DateTime<Utc>);

fn user_from_row(row: UserRow) -> User {
    User {
        id: row.0,
        first_name: row.1,
        last_name: row.2,
        email: row.3,
        username: row.4,
        password_hash: row.5,
        is_active: row.6,
        is_verified: row.7,
        created_at: row.8,
        updated_at: row.9,
    }
}

fn calculation_from_row(row: CalculationRow) -> Result<Calculation, AppError> {
    let operation: Operation = row.2.parse().map_err(|_| {
        AppError::Database(DatabaseError::UnexpectedError(format!(
            "Unknown operation '{}' stored for calculation {}",
            row.2, row.0
        )))
    })?;

    Ok(Calculation {
        id: row.0,
        user_id: row.1,
        operation,
        inputs: row.3,
        created_at: row.4,
        updated_at: row.5,
    })
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, first_name, last_name, email, username, password_hash,
                 is_active, is_verified, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .bind(user.is_verified)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, email, username, password_hash,
                   is_active, is_verified, created_at, updated_at
            FROM users WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(user_from_row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, first_name, last_name, email, username, password_hash,
                   is_active, is_verified, created_at, updated_at
            FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(user_from_row))
    }
}

pub struct PgCalculationRepository {
    pool: PgPool,
}

impl PgCalculationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CalculationRepository for PgCalculationRepository {
    async fn insert(&self, calculation: &Calculation) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO calculations
                (id, user_id, operation, inputs, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(calculation.id)
        .bind(calculation.user_id)
        .bind(calculation.operation.as_str())
        .bind(&calculation.inputs)
        .bind(calculation.created_at)
        .bind(calculation.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Calculation>, AppError> {
        let rows = sqlx::query_as::<_, CalculationRow>(
            r#"
            SELECT id, user_id, operation, inputs, created_at, updated_at
            FROM calculations WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(calculation_from_row).collect()
    }

    async fn find(&self, id: Uuid, user_id: Uuid) -> Result<Option<Calculation>, AppError> {
        let row = sqlx::query_as::<_, CalculationRow>(
            r#"
            SELECT id, user_id, operation, inputs, created_at, updated_at
            FROM calculations WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(calculation_from_row).transpose()
    }

    async fn update(&self, calculation: &Calculation) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE calculations
            SET operation = $1, inputs = $2, updated_at = $3
            WHERE id = $4 AND user_id = $5
            "#,
        )
        .bind(calculation.operation.as_str())
        .bind(&calculation.inputs)
        .bind(Utc::now())
        .bind(calculation.id)
        .bind(calculation.user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM calculations WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
