use serde::{Deserialize, Serialize};

/// A stored `enduser` row. The password is kept and returned in plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct EndUser {
    pub id: i32,
    pub email: String,
    pub password: String,
}

/// Body of a create request. A missing `id` is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEndUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    pub email: String,
    pub password: String,
}

/// Body of an update request. Any field besides `password` is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePassword {
    pub password: String,
}
