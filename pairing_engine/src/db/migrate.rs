//! Embedded schema migrations.

use anyhow::anyhow;
use diesel::{Connection, SqliteConnection, connection::SimpleConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

use super::connection::sqlite_path;

/// Embedded Diesel migrations bundled with this crate.
///
/// These are applied by [`run_sqlite`] to bring the database schema up to date.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Runs pending Diesel migrations on a SQLite database at the given URL or path.
///
/// This sets the SQLite journal mode to WAL and applies all embedded migrations, returning an error on failure.
pub fn run_sqlite(url: &str) -> anyhow::Result<()> {
    let mut conn = SqliteConnection::establish(sqlite_path(url))?;
    conn.batch_execute("PRAGMA journal_mode=WAL;")?;
    run_on(&mut conn)
}

/// Applies pending migrations on an already open connection.
pub fn run_on(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!(e))?;
    Ok(())
}

/// Runs pending migrations for the given database URL.
///
/// Accepts `sqlite:` / `sqlite://` URLs and bare file paths. Server URLs
/// (`postgres://`, `mysql://`) are rejected: the schema relies on SQLite
/// `GLOB` checks.
pub fn run_all(database_url: &str) -> anyhow::Result<()> {
    if database_url.starts_with("postgres://")
        || database_url.starts_with("postgresql://")
        || database_url.starts_with("mysql://")
    {
        anyhow::bail!("Unsupported DATABASE_URL: {database_url}");
    }
    run_sqlite(database_url)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn migrations_apply_on_temp_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let path = temp.path().to_string_lossy().to_string();

        crate::db::migrate::run_sqlite(&path).expect("migration run");

        let mut conn = SqliteConnection::establish(&path).unwrap();

        conn.batch_execute("INSERT INTO engine_kv (k,v) VALUES ('hello', 'world')").unwrap();
    }

    #[test]
    fn server_urls_are_rejected() {
        let err = run_all("postgres://localhost/pairing").unwrap_err();
        assert!(err.to_string().contains("Unsupported DATABASE_URL"));
    }
}
