use crate::domain::user::{EndUser, NewEndUser};
use anyhow::Result;
use async_trait::async_trait;

/// Single-statement operations on the `enduser` table.
///
/// `insert_user` reports a taken email as `DomainError::UserAlreadyExists`.
/// `update_password` and `delete_user` return whether a row matched.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, user: NewEndUser) -> Result<EndUser>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<EndUser>>;
    async fn update_password(&self, email: &str, password: &str) -> Result<bool>;
    async fn delete_user(&self, email: &str) -> Result<bool>;
}
