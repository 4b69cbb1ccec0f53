use chrono::Utc;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{UserRecord, UserWithAuthRow};

/// Input for signup: one profile row plus one credential row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub role: Option<String>,
    pub username: String,
    pub password_hash: String,
}

/// Credential lookup result for login.
#[derive(Debug, Clone, FromRow)]
pub struct CredentialRow {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert profile and credentials in one transaction; a failure on either
    /// row leaves nothing behind.
    pub async fn create_user(&self, user: NewUser) -> Result<UserRecord, DatabaseError> {
        let user_id = Uuid::new_v4();
        let auth_id = Uuid::new_v4();
        let created_at = Utc::now();
        let role = user.role.unwrap_or_else(|| "both".to_string());

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO user_details (user_id, full_name, email, phone, country, role, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user_id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.country)
        .bind(&role)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO auth_users (auth_id, user_id, username, password_hash, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(auth_id)
        .bind(user_id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(UserRecord {
            user_id,
            full_name: user.full_name,
            email: user.email,
            phone: user.phone,
            country: user.country,
            role,
            created_at,
        })
    }

    pub async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRow>, DatabaseError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT u.user_id, u.full_name, u.email, a.username, a.password_hash
             FROM auth_users a
             JOIN user_details u ON u.user_id = a.user_id
             WHERE a.username = $1
             LIMIT 1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// User directory, newest first, with the credential row when one exists.
    pub async fn list_users(&self) -> Result<Vec<UserWithAuthRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserWithAuthRow>(
            "SELECT u.user_id, u.full_name, u.email, u.phone, u.country, u.role, u.created_at,
                    a.auth_id, a.username
             FROM user_details u
             LEFT JOIN auth_users a ON a.user_id = u.user_id
             ORDER BY u.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
