use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A `user_details` profile row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Profile joined with its optional credential row, for the user directory.
#[derive(Debug, Clone, FromRow)]
pub struct UserWithAuthRow {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub auth_id: Option<Uuid>,
    pub username: Option<String>,
}
