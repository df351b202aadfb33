use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{EndUser, NewEndUser};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Store failures are not surfaced by cause: a failed insert reads as a taken
/// email, any other failed statement reads as a missing row.
pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, req), fields(email = %req.email))]
    pub async fn create_user(&self, req: NewEndUser) -> Result<EndUser> {
        if req.email.trim().is_empty() {
            return Err(DomainError::InvalidData("email is empty".to_string()).into());
        }
        self.repository.insert_user(req).await.map_err(|e| {
            // Duplicates arrive as a DomainError; anything else is logged and folded in
            if e.downcast_ref::<DomainError>().is_none() {
                error!(error = %e, "Insert failed");
            }
            DomainError::UserAlreadyExists.into()
        })
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, email: &str) -> Result<EndUser> {
        self.find(email)
            .await
            .ok_or_else(|| DomainError::UserNotFound.into())
    }

    #[instrument(skip(self))]
    pub async fn user_exists(&self, email: &str) -> bool {
        self.find(email).await.is_some()
    }

    async fn find(&self, email: &str) -> Option<EndUser> {
        match self.repository.find_user_by_email(email).await {
            Ok(user) => user,
            Err(e) => {
                error!(error = %e, "Lookup failed");
                None
            }
        }
    }

    #[instrument(skip(self, password))]
    pub async fn update_password(&self, email: &str, password: &str) -> Result<()> {
        let updated = self
            .repository
            .update_password(email, password)
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Password update failed");
                false
            });
        if !updated {
            debug!("No row matched for password update");
            return Err(DomainError::UserNotFound.into());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, email: &str) -> Result<()> {
        let deleted = self.repository.delete_user(email).await.unwrap_or_else(|e| {
            error!(error = %e, "Delete failed");
            false
        });
        if !deleted {
            debug!("No row matched for delete");
            return Err(DomainError::UserNotFound.into());
        }
        Ok(())
    }
}
