//! PostgreSQL client with connection pooling and migrations.

mod custom_hooks;
mod migrate;
mod pg_client;
mod pg_config;

use deadpool::managed::{Object, Pool};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;

pub use self::migrate::run_pending_migrations;
pub use self::pg_client::{PgClient, PgConn, PgPoolStatus};
pub use self::pg_config::PgConfig;

/// Connection pool used throughout the crate.
pub type ConnectionPool = Pool<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// A connection checked out of the pool.
pub type PooledConnection = Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Masks the password in a database URL for safe logging.
pub(crate) fn mask_url(url: &str) -> String {
    let start = url.find("://").map_or(0, |pos| pos + 3);
    if let Some(at_pos) = url[start..].find('@').map(|pos| start + pos)
        && let Some(colon_pos) = url[start..at_pos].find(':').map(|pos| start + pos)
    {
        let mut masked = url.to_string();
        masked.replace_range(colon_pos + 1..at_pos, "***");
        return masked;
    }

    url.to_string()
}
