//! Connection pool for the concurrent read path.
//!
//! Every pooled connection gets the same PRAGMAs as [`super::connection::connect_sqlite`].

use anyhow::Context;
use diesel::SqliteConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};

use super::connection::{apply_pragmas, sqlite_path};

/// Pool of tuned SQLite connections.
pub type SqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// A connection checked out of a [`SqlitePool`].
pub type PooledSqlite = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Debug, Clone, Copy)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        apply_pragmas(conn).map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds a pool of at most `max_size` connections to `database_url`.
pub fn build_pool(database_url: &str, max_size: u32) -> anyhow::Result<SqlitePool> {
    let manager = ConnectionManager::<SqliteConnection>::new(sqlite_path(database_url));
    Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)
        .with_context(|| format!("build sqlite pool for {database_url}"))
}
