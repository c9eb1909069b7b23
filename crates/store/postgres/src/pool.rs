use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};

use pantry_store::StoreError;

use crate::config::PostgresConfig;
use crate::migrations;

/// Build `PgConnectOptions` from a [`PostgresConfig`], applying SSL settings
/// when configured.
pub(crate) fn build_connect_options(
    config: &PostgresConfig,
) -> Result<PgConnectOptions, StoreError> {
    let mut options: PgConnectOptions = config
        .url
        .parse()
        .map_err(|e: sqlx::Error| StoreError::Connection(e.to_string()))?;

    if let Some(ref mode) = config.ssl_mode {
        let ssl_mode = match mode.as_str() {
            "disable" => PgSslMode::Disable,
            "prefer" => PgSslMode::Prefer,
            "require" => PgSslMode::Require,
            "verify-ca" => PgSslMode::VerifyCa,
            "verify-full" => PgSslMode::VerifyFull,
            other => {
                return Err(StoreError::Connection(format!("unknown ssl_mode: {other}")));
            }
        };
        options = options.ssl_mode(ssl_mode);
    }

    if let Some(ref path) = config.ssl_root_cert {
        options = options.ssl_root_cert(path);
    }

    Ok(options)
}

/// Connect to `PostgreSQL` and run migrations.
///
/// The returned pool is shared by [`PostgresItemStore`](crate::PostgresItemStore)
/// and [`PostgresUserStore`](crate::PostgresUserStore).
///
/// # Errors
///
/// Returns [`StoreError::Connection`] if pool creation fails, or
/// [`StoreError::Backend`] if migrations fail.
pub async fn connect(config: &PostgresConfig) -> Result<PgPool, StoreError> {
    let options = build_connect_options(config)?;
    let pool = PgPoolOptions::new()
        .max_connections(config.pool_size)
        .connect_with(options)
        .await
        .map_err(|e| StoreError::Connection(e.to_string()))?;

    migrations::run_migrations(&pool, config)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

    tracing::info!(
        pool_size = config.pool_size,
        prefix = %config.table_prefix,
        "connected to postgres"
    );
    Ok(pool)
}

/// Map a query failure, turning unique violations into [`StoreError::Conflict`].
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn map_query_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_owned())
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Connection(err.to_string())
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Serialization(err.to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}
