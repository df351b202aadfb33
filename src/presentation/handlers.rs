use crate::application::service::UserService;
use crate::domain::error::DomainError;
use crate::domain::user::{NewEndUser, UpdatePassword};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub const USER_NOT_FOUND_MSG: &str = "user not found";
pub const USER_ALREADY_EXISTS_MSG: &str = "user already exists";
pub const BAD_REQUEST_MSG: &str = "Invalid data given";

pub struct AppState {
    pub service: UserService,
}

/// Fixed response shape for every non-data response. `success` is the string
/// `"true"` or `"false"`, not a JSON boolean.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Envelope {
    pub success: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn success() -> Self {
        Self {
            success: "true".to_string(),
            error: None,
        }
    }

    pub fn failure(message: &str) -> Self {
        Self {
            success: "false".to_string(),
            error: Some(message.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid data given: {0}")]
    InvalidData(String),
    #[error("User not found")]
    UserNotFound,
    #[error("User already exists")]
    UserAlreadyExists,
}

impl ApiError {
    fn public_message(&self) -> &'static str {
        match self {
            ApiError::InvalidData(_) => BAD_REQUEST_MSG,
            ApiError::UserNotFound => USER_NOT_FOUND_MSG,
            ApiError::UserAlreadyExists => USER_ALREADY_EXISTS_MSG,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidData(_) => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::UserAlreadyExists => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        // Client-facing body is one of the fixed envelopes; detail stays in the log
        warn!(error = %self, status = %status, "Request rejected");
        HttpResponse::build(status).json(Envelope::failure(self.public_message()))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::UserNotFound) => ApiError::UserNotFound,
            Some(DomainError::UserAlreadyExists) => ApiError::UserAlreadyExists,
            Some(DomainError::InvalidData(msg)) => ApiError::InvalidData(msg.clone()),
            // The service classifies store failures; anything else reads as absence
            None => {
                error!(error = %err, "Unclassified error");
                ApiError::UserNotFound
            }
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn create_user(
    state: web::Data<AppState>,
    req: web::Json<NewEndUser>,
) -> Result<HttpResponse, ApiError> {
    info!("Creating user");
    let user = state.service.create_user(req.into_inner()).await?;
    info!(user_id = user.id, "User created");
    Ok(HttpResponse::Ok().json(Envelope::success()))
}

#[instrument(skip(state), fields(email = %*path))]
pub async fn get_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let email = path.into_inner();
    let user = state.service.get_user(&email).await?;
    info!(user_id = user.id, "User retrieved");
    Ok(HttpResponse::Ok().json(user))
}

/// A malformed body only yields 400 for an existing user; an unknown email is
/// reported as 404 first.
#[instrument(skip(state, body), fields(email = %*path))]
pub async fn update_password(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: Result<web::Json<UpdatePassword>, actix_web::Error>,
) -> Result<HttpResponse, ApiError> {
    let email = path.into_inner();
    let update = match body {
        Ok(update) => update.into_inner(),
        Err(err) => {
            // Unknown email wins over a malformed body
            if !state.service.user_exists(&email).await {
                return Err(ApiError::UserNotFound);
            }
            return Err(ApiError::InvalidData(err.to_string()));
        }
    };
    state
        .service
        .update_password(&email, &update.password)
        .await?;
    info!("Password updated");
    Ok(HttpResponse::Ok().json(Envelope::success()))
}

#[instrument(skip(state), fields(email = %*path))]
pub async fn delete_user(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let email = path.into_inner();
    state.service.delete_user(&email).await?;
    info!("User deleted");
    Ok(HttpResponse::Ok().json(Envelope::success()))
}
