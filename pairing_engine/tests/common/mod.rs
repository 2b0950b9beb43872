#![allow(dead_code)]

use std::path::PathBuf;

use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Text};
use pairing_engine::db::{connection, migrate};
use pairing_engine::reconcile::repo;
use tempfile::TempDir;

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}
#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}
#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer, column_name = "timeout")]
    busy_timeout: i32,
}
#[derive(QueryableByName)]
struct Cnt {
    #[diesel(sql_type = BigInt)]
    cnt: i64,
}

pub struct TestDb {
    _dir: TempDir,    // keep alive for the life of the test
    pub path: String, // <tmpdir>/test.db
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_all(&path).expect("migrations");

    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal");

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(conn).unwrap();
    assert_eq!(fk.foreign_keys, 1);

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

/// Row count of `table`.
pub fn count(conn: &mut SqliteConnection, table: &str) -> i64 {
    let c: Cnt = sql_query(format!("SELECT COUNT(*) AS cnt FROM {table};"))
        .get_result(conn)
        .unwrap();
    c.cnt
}

/// True when `PRAGMA foreign_key_check` reports nothing.
pub fn fk_check_empty(conn: &mut SqliteConnection) -> bool {
    #[derive(QueryableByName)]
    struct Violation {
        #[diesel(sql_type = Text)]
        #[allow(dead_code)]
        table: String,
    }
    let rows: Vec<Violation> = sql_query("PRAGMA foreign_key_check;").load(conn).unwrap();
    rows.is_empty()
}

/// Inserts a bare ingredient with the given names, in priority order.
pub fn seed_ingredient(conn: &mut SqliteConnection, category: &str, names: &[&str]) -> i32 {
    let id: i32 = diesel::insert_into(pairing_engine::schema::ingredient::table)
        .values(pairing_engine::schema::ingredient::category.eq(category))
        .returning(pairing_engine::schema::ingredient::id)
        .get_result(conn)
        .unwrap();
    for (priority, label) in names.iter().enumerate() {
        repo::upsert_name(conn, id, label, priority as i32).unwrap();
    }
    id
}

/// Inserts a PubChem-only molecule.
pub fn seed_molecule(conn: &mut SqliteConnection, pubchem_id: i64) -> i32 {
    diesel::insert_into(pairing_engine::schema::molecule::table)
        .values(pairing_engine::schema::molecule::pubchem_id.eq(pubchem_id))
        .returning(pairing_engine::schema::molecule::id)
        .get_result(conn)
        .unwrap()
}

/// Writes an occurrence with explicit evidence.
pub fn seed_occurrence(
    conn: &mut SqliteConnection,
    ingredient_id: i32,
    molecule_id: i32,
    flavordb_found: bool,
    sum: f64,
    count: i32,
) {
    use pairing_engine::models::NewOccurrence;
    diesel::insert_into(pairing_engine::schema::occurrence::table)
        .values(&NewOccurrence {
            ingredient_id,
            molecule_id,
            flavordb_found,
            foodb_content_sum: sum,
            foodb_content_sample_count: count,
        })
        .execute(conn)
        .unwrap();
}
