use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use pantry_core::{NewUser, User, UserId, UserPatch};
use pantry_store::{StoreError, UserStore};

use crate::config::PostgresConfig;
use crate::pool::map_query_error;

/// PostgreSQL-backed implementation of [`UserStore`].
///
/// Email uniqueness is enforced by a `UNIQUE` constraint; violations surface
/// as [`StoreError::Conflict`].
pub struct PostgresUserStore {
    pool: PgPool,
    table: String,
}

impl PostgresUserStore {
    /// Create a store over an existing, migrated pool.
    pub fn from_pool(pool: PgPool, config: &PostgresConfig) -> Self {
        Self {
            pool,
            table: config.users_table(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    fullname: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            fullname: row.fullname,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

const COLUMNS: &str = "id, fullname, email, password_hash, created_at";

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        let user = User::from_new(user, UserId::new_v4(), Utc::now());
        let sql = format!(
            "INSERT INTO {} ({COLUMNS}) VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}",
            self.table
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user.id.as_uuid())
            .bind(&user.fullname)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.into())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", self.table);

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE email = $1", self.table);

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.map(Into::into))
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<Option<User>, StoreError> {
        let sql = format!(
            "UPDATE {} SET
                fullname = COALESCE($2, fullname),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash)
            WHERE id = $1
            RETURNING {COLUMNS}",
            self.table
        );

        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_uuid())
            .bind(patch.fullname.as_deref())
            .bind(patch.email.as_deref())
            .bind(patch.password_hash.as_deref())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_query_error)?;

        Ok(row.map(Into::into))
    }
}
