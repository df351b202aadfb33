use crate::presentation::handlers::{
    ApiError, create_user, delete_user, get_user, health_check, update_password,
};
use actix_web::web;
use tracing::debug;

/// Registers the enduser routes and the JSON body policy: bodies are accepted
/// without a JSON `Content-Type`, and decode failures render the 400 envelope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| {
            debug!(error = %err, "Rejecting request body");
            ApiError::InvalidData(err.to_string()).into()
        });

    cfg.app_data(json_config)
        .route("/health", web::get().to(health_check))
        .route("/enduser", web::post().to(create_user))
        .route("/enduser/{email}", web::get().to(get_user))
        .route("/enduser/{email}", web::put().to(update_password))
        .route("/enduser/{email}", web::delete().to(delete_user));
}
