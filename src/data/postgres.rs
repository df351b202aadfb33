//! PostgreSQL implementation of `UserRepository`.
//!
//! Every operation is a single statement against the `enduser` table:
//!
//! ```sql
//! CREATE TABLE enduser (
//!     id       SERIAL PRIMARY KEY,
//!     email    TEXT NOT NULL UNIQUE,
//!     password TEXT NOT NULL
//! );
//! ```

use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{EndUser, NewEndUser};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument, warn};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn insert_user(&self, user: NewEndUser) -> Result<EndUser> {
        // Omitting the id lets the SERIAL default assign one
        let inserted = match user.id {
            Some(id) => {
                sqlx::query_as::<_, EndUser>(
                    r#"
                    INSERT INTO enduser (id, email, password)
                    VALUES ($1, $2, $3)
                    RETURNING id, email, password
                    "#,
                )
                .bind(id)
                .bind(&user.email)
                .bind(&user.password)
                .fetch_one(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, EndUser>(
                    r#"
                    INSERT INTO enduser (email, password)
                    VALUES ($1, $2)
                    RETURNING id, email, password
                    "#,
                )
                .bind(&user.email)
                .bind(&user.password)
                .fetch_one(&self.pool)
                .await
            }
        };

        match inserted {
            Ok(row) => {
                debug!(user_id = row.id, "User row inserted");
                Ok(row)
            }
            Err(err) if is_unique_violation(&err) => {
                warn!(error = %err, "Insert rejected by unique constraint");
                Err(DomainError::UserAlreadyExists.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<EndUser>> {
        let user = sqlx::query_as::<_, EndUser>(
            "SELECT id, email, password FROM enduser WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self, password))]
    async fn update_password(&self, email: &str, password: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE enduser SET password = $1 WHERE email = $2")
            .bind(password)
            .bind(email)
            .execute(&self.pool)
            .await?;
        debug!(rows = result.rows_affected(), "Password update applied");
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, email: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM enduser WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;
        debug!(rows = result.rows_affected(), "Delete applied");
        Ok(result.rows_affected() > 0)
    }
}
