use sqlx::PgPool;

use crate::config::PostgresConfig;

/// Create the items and users tables and their indexes if they do not exist.
///
/// # Errors
///
/// Returns a [`sqlx::Error`] if any DDL statement fails.
pub async fn run_migrations(pool: &PgPool, config: &PostgresConfig) -> Result<(), sqlx::Error> {
    let items = config.items_table();
    let users = config.users_table();
    let prefix = &config.table_prefix;

    let create_items = format!(
        "CREATE TABLE IF NOT EXISTS {items} (
            id          UUID PRIMARY KEY,
            name        TEXT NOT NULL,
            category    TEXT NOT NULL,
            expiry_date TIMESTAMPTZ NOT NULL,
            notes       TEXT NOT NULL DEFAULT '',
            added_by    UUID NOT NULL,
            created_at  TIMESTAMPTZ NOT NULL
        )"
    );

    let create_users = format!(
        "CREATE TABLE IF NOT EXISTS {users} (
            id            UUID PRIMARY KEY,
            fullname      TEXT NOT NULL,
            email         TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at    TIMESTAMPTZ NOT NULL
        )"
    );

    // Owner lookups drive the dashboard and every statistics query.
    let create_owner_index = format!(
        "CREATE INDEX IF NOT EXISTS idx_{prefix}items_owner ON {items} (added_by, created_at)"
    );

    for stmt in [&create_items, &create_users, &create_owner_index] {
        sqlx::query(stmt).execute(pool).await?;
    }

    Ok(())
}
