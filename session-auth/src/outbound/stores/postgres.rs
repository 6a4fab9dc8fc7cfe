use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::auth::errors::StoreError;
use crate::domain::auth::models::AuthUser;
use crate::domain::auth::models::UserId;
use crate::domain::auth::ports::UserStore;

/// Columns a uid lookup may target.
///
/// Configured field names are interpolated into SQL as identifiers, so they
/// are restricted to this allow-list.
const UID_COLUMNS: &[&str] = &["email", "username"];

const USER_COLUMNS: &str = "id, username, email, password_hash, remember_me_token, created_at";

/// User store backed by PostgreSQL.
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled users-table migrations to the connected database.
    ///
    /// # Errors
    /// * `Database` - A migration failed to apply
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

fn row_to_user(row: &PgRow) -> Result<AuthUser, sqlx::Error> {
    Ok(AuthUser {
        id: UserId(row.try_get("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        remember_me_token: row.try_get("remember_me_token")?,
        created_at: row.try_get("created_at")?,
    })
}

fn database_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<AuthUser>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref()
            .map(row_to_user)
            .transpose()
            .map_err(database_error)
    }

    async fn find_by_field(
        &self,
        field: &str,
        value: &str,
    ) -> Result<Option<AuthUser>, StoreError> {
        if !UID_COLUMNS.contains(&field) {
            return Err(StoreError::UnknownColumn(field.to_string()));
        }

        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {field} = $1"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref()
            .map(row_to_user)
            .transpose()
            .map_err(database_error)
    }

    async fn find_by_remember_me_token(
        &self,
        id: &UserId,
        token: &str,
    ) -> Result<Option<AuthUser>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND remember_me_token = $2"
        ))
        .bind(id.0)
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref()
            .map(row_to_user)
            .transpose()
            .map_err(database_error)
    }

    async fn update_remember_me_token(
        &self,
        id: &UserId,
        token: Option<String>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET remember_me_token = $2 WHERE id = $1")
            .bind(id.0)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(())
    }
}
