//! Small key/value bookkeeping table (`engine_kv`).
//!
//! Currently holds the completion time of each sync pass.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use tracing::warn;

use crate::schema::engine_kv;

/// Completion time of the last FlavorDB pass.
pub const LAST_SYNC_FLAVORDB: &str = "last_sync.flavordb";
/// Completion time of the last FooDB foods pass.
pub const LAST_SYNC_FOODB_FOODS: &str = "last_sync.foodb_foods";
/// Completion time of the last FooDB content pass.
pub const LAST_SYNC_FOODB_CONTENT: &str = "last_sync.foodb_content";

/// Inserts or replaces `key`.
pub fn put(conn: &mut SqliteConnection, key: &str, value: &str) -> QueryResult<()> {
    diesel::insert_into(engine_kv::table)
        .values((engine_kv::k.eq(key), engine_kv::v.eq(value)))
        .on_conflict(engine_kv::k)
        .do_update()
        .set(engine_kv::v.eq(value))
        .execute(conn)?;
    Ok(())
}

/// Value stored under `key`, if any.
pub fn get(conn: &mut SqliteConnection, key: &str) -> QueryResult<Option<String>> {
    engine_kv::table
        .find(key)
        .select(engine_kv::v)
        .first(conn)
        .optional()
}

/// Stores `at` under `key` as RFC 3339 (milliseconds, `Z`).
pub fn record_sync(conn: &mut SqliteConnection, key: &str, at: DateTime<Utc>) -> QueryResult<()> {
    put(conn, key, &at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Parsed timestamp under `key`. An unparsable value is logged and treated
/// as missing.
pub fn last_sync(conn: &mut SqliteConnection, key: &str) -> QueryResult<Option<DateTime<Utc>>> {
    Ok(get(conn, key)?.and_then(|raw| match DateTime::parse_from_rfc3339(&raw) {
        Ok(at) => Some(at.with_timezone(&Utc)),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "ignoring malformed sync timestamp");
            None
        }
    }))
}
