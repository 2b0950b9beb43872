//! SQLite connection helpers.
//!
//! Provides [`connect_sqlite`] that opens a connection and applies the
//! connection-wide PRAGMAs the engine relies on: WAL journaling (readers keep
//! working while a sync writes), `foreign_keys=ON` (occurrence cascades), and a
//! 5000ms `busy_timeout`.
//!
//! Example:
//! ```no_run
//! use pairing_engine::db::connection::connect_sqlite;
//!
//! let path = std::env::temp_dir().join("pairing_example.db");
//! let _conn = connect_sqlite(path.to_str().unwrap()).expect("open sqlite");
//! ```

use anyhow::Context;
use diesel::{Connection, SqliteConnection, connection::SimpleConnection};

pub(crate) const PRAGMAS: &str =
    "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;";

/// Strips an optional `sqlite://` or `sqlite:` scheme so both URLs and bare
/// paths are accepted.
pub fn sqlite_path(database_url: &str) -> &str {
    database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url)
}

/// Apply the engine PRAGMAs to an open connection.
pub fn apply_pragmas(conn: &mut SqliteConnection) -> diesel::QueryResult<()> {
    conn.batch_execute(PRAGMAS)
}

/// Open a SQLite connection and apply connection-wide PRAGMAs.
pub fn connect_sqlite(database_url: &str) -> anyhow::Result<SqliteConnection> {
    let path = sqlite_path(database_url);
    let mut conn = SqliteConnection::establish(path)
        .with_context(|| format!("open sqlite database {path}"))?;
    apply_pragmas(&mut conn).context("apply sqlite pragmas")?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_prefixes_are_stripped() {
        assert_eq!(sqlite_path("sqlite://data/pairing.db"), "data/pairing.db");
        assert_eq!(sqlite_path("sqlite:pairing.db"), "pairing.db");
        assert_eq!(sqlite_path("/tmp/x.db"), "/tmp/x.db");
        assert_eq!(sqlite_path(":memory:"), ":memory:");
    }
}
