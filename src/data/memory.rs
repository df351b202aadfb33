use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{EndUser, NewEndUser};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

struct Table {
    rows: HashMap<String, EndUser>,
    next_id: i32,
}

/// `UserRepository` backed by a map keyed on email. Ids and emails are both
/// unique, mirroring the primary key and `UNIQUE` constraint of the table.
#[derive(Clone)]
pub struct InMemoryUserRepository {
    storage: Arc<RwLock<Table>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(Table {
                rows: HashMap::new(),
                next_id: 1,
            })),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn insert_user(&self, user: NewEndUser) -> Result<EndUser> {
        trace!("Acquiring write lock for user storage");
        let mut table = self.storage.write().await;

        // Email is the UNIQUE column
        if table.rows.contains_key(&user.email) {
            debug!(email = %user.email, "Email already taken");
            return Err(DomainError::UserAlreadyExists.into());
        }

        let id = match user.id {
            Some(id) => {
                if table.rows.values().any(|row| row.id == id) {
                    debug!(user_id = id, "Id already taken");
                    return Err(DomainError::UserAlreadyExists.into());
                }
                id
            }
            None => {
                // Like a SERIAL column: the counter advances even when the
                // value collides with an explicit id, and the insert fails.
                let id = table.next_id;
                table.next_id += 1;
                if table.rows.values().any(|row| row.id == id) {
                    debug!(user_id = id, "Assigned id already taken");
                    return Err(DomainError::UserAlreadyExists.into());
                }
                id
            }
        };

        let row = EndUser {
            id,
            email: user.email,
            password: user.password,
        };
        table.rows.insert(row.email.clone(), row.clone());
        debug!(user_id = row.id, email = %row.email, "User saved to memory storage");
        Ok(row)
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<EndUser>> {
        trace!("Acquiring read lock for user storage");
        let table = self.storage.read().await;
        let user = table.rows.get(email).cloned();
        match &user {
            Some(u) => debug!(user_id = u.id, email = %u.email, "User found in storage"),
            None => trace!(email = email, "User not found in storage"),
        }
        Ok(user)
    }

    #[instrument(skip(self, password))]
    async fn update_password(&self, email: &str, password: &str) -> Result<bool> {
        trace!("Acquiring write lock for user storage");
        let mut table = self.storage.write().await;
        match table.rows.get_mut(email) {
            Some(row) => {
                row.password = password.to_string();
                debug!(user_id = row.id, "Password updated in storage");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, email: &str) -> Result<bool> {
        trace!("Acquiring write lock for user storage");
        let mut table = self.storage.write().await;
        let removed = table.rows.remove(email).is_some();
        debug!(removed, "Delete applied to storage");
        Ok(removed)
    }
}
