use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("user not found")]
    UserNotFound,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("Invalid data given: {0}")]
    InvalidData(String),
}
