mod common;
use common::{assert_sqlite_pragmas, count, fk_check_empty, seed_ingredient, seed_molecule, setup_db};

use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error};
use diesel::sql_query;
use diesel::sql_types::BigInt;
use pairing_engine::db::{connection::connect_sqlite, migrate, pool::build_pool};

#[derive(QueryableByName)]
struct TblCnt {
    #[diesel(sql_type = BigInt)]
    cnt: i64,
}

fn is_check_violation(e: &Error) -> bool {
    matches!(
        e,
        Error::DatabaseError(DatabaseErrorKind::CheckViolation, _)
            | Error::DatabaseError(DatabaseErrorKind::Unknown, _)
    )
}

#[test]
fn migrations_apply_and_pragmas_are_set() {
    let (db, mut conn) = setup_db();
    assert_sqlite_pragmas(&mut conn);

    let tbls: TblCnt = sql_query(
        "SELECT COUNT(*) AS cnt
            FROM sqlite_master
            WHERE type='table'
            AND name IN ('ingredient','ingredient_name','molecule','occurrence','engine_kv');",
    )
    .get_result(&mut conn)
    .unwrap();
    assert_eq!(tbls.cnt, 5, "expected five tables to be present");

    // Re-running is a no-op.
    migrate::run_all(&db.path).expect("second run");
}

#[test]
fn pooled_connections_get_pragmas_too() {
    let (db, _conn) = setup_db();
    let pool = build_pool(&db.path, 2).expect("pool");
    let mut a = pool.get().unwrap();
    assert_sqlite_pragmas(&mut a);

    let mut second = connect_sqlite(&format!("sqlite://{}", db.path)).expect("url form");
    assert_sqlite_pragmas(&mut second);
}

#[test]
fn identifier_formats_are_checked() {
    let (_db, mut conn) = setup_db();

    let bad_food = sql_query("INSERT INTO ingredient (foodb_id) VALUES ('FOOD123');").execute(&mut conn);
    assert!(is_check_violation(&bad_food.unwrap_err()));

    let bad_compound = sql_query("INSERT INTO molecule (foodb_id) VALUES ('FDB12');").execute(&mut conn);
    assert!(is_check_violation(&bad_compound.unwrap_err()));

    let neither = sql_query("INSERT INTO molecule (pubchem_id, foodb_id) VALUES (NULL, NULL);")
        .execute(&mut conn);
    assert!(is_check_violation(&neither.unwrap_err()));

    sql_query("INSERT INTO ingredient (foodb_id) VALUES ('FOOD00001');")
        .execute(&mut conn)
        .unwrap();
    sql_query("INSERT INTO molecule (foodb_id) VALUES ('FDB000001');")
        .execute(&mut conn)
        .unwrap();
}

#[test]
fn identifiers_are_unique_when_present() {
    let (_db, mut conn) = setup_db();

    // Many NULLs are fine.
    seed_ingredient(&mut conn, "fruit", &[]);
    seed_ingredient(&mut conn, "fruit", &[]);

    sql_query("INSERT INTO ingredient (flavordb_id) VALUES (7);")
        .execute(&mut conn)
        .unwrap();
    let dup = sql_query("INSERT INTO ingredient (flavordb_id) VALUES (7);").execute(&mut conn);
    assert!(matches!(
        dup,
        Err(Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
    ));

    seed_molecule(&mut conn, 440917);
    let dup = sql_query("INSERT INTO molecule (pubchem_id) VALUES (440917);").execute(&mut conn);
    assert!(matches!(
        dup,
        Err(Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _))
    ));
}

#[test]
fn deleting_an_ingredient_cascades() {
    let (_db, mut conn) = setup_db();
    let ing = seed_ingredient(&mut conn, "fruit", &["Apple", "Apples"]);
    let mol = seed_molecule(&mut conn, 1);
    common::seed_occurrence(&mut conn, ing, mol, true, 0.0, 0);

    sql_query(format!("DELETE FROM ingredient WHERE id = {ing};"))
        .execute(&mut conn)
        .unwrap();

    assert_eq!(count(&mut conn, "ingredient_name"), 0);
    assert_eq!(count(&mut conn, "occurrence"), 0);
    assert_eq!(count(&mut conn, "molecule"), 1);
    assert!(fk_check_empty(&mut conn));
}
