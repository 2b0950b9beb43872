mod common;
use common::{seed_ingredient, seed_molecule, seed_occurrence, setup_db};

use diesel::SqliteConnection;
use pairing_engine::ranker::{PairingResult, RankingLimits, Selection, suggest_pairings};

struct World {
    a: i32,
    b: i32,
    c: i32,
    d: i32,
    e: i32,
    f: i32,
    nameless: i32,
    no_evidence: i32,
}

/// A, B, C, D share molecule M (10, 20, 5, 10). A also has X (30), B has
/// Y (40), D has Z (7). E has only Y, F only Z.
fn build_world(conn: &mut SqliteConnection) -> World {
    let m = seed_molecule(conn, 1);
    let x = seed_molecule(conn, 2);
    let y = seed_molecule(conn, 3);
    let z = seed_molecule(conn, 4);

    let a = seed_ingredient(conn, "fruit", &["Apple"]);
    let b = seed_ingredient(conn, "fruit", &["Banana"]);
    let c = seed_ingredient(conn, "fruit", &["Cherry"]);
    let d = seed_ingredient(conn, "fruit", &["Date", "Dates"]);
    let e = seed_ingredient(conn, "fruit", &["Elderberry"]);
    let f = seed_ingredient(conn, "fruit", &["Fig"]);
    let nameless = seed_ingredient(conn, "fruit", &[]);
    let no_evidence = seed_ingredient(conn, "fruit", &["Guava"]);

    seed_occurrence(conn, a, m, false, 10.0, 1);
    seed_occurrence(conn, a, x, false, 30.0, 1);
    seed_occurrence(conn, b, m, false, 40.0, 2);
    seed_occurrence(conn, b, y, false, 40.0, 1);
    seed_occurrence(conn, c, m, false, 5.0, 1);
    seed_occurrence(conn, d, m, false, 10.0, 1);
    seed_occurrence(conn, d, z, false, 7.0, 1);
    seed_occurrence(conn, e, y, false, 40.0, 1);
    seed_occurrence(conn, f, z, false, 7.0, 1);
    seed_occurrence(conn, nameless, m, false, 1.0, 1);
    seed_occurrence(conn, no_evidence, m, false, 0.0, 0);

    World {
        a,
        b,
        c,
        d,
        e,
        f,
        nameless,
        no_evidence,
    }
}

fn ids(list: &[pairing_engine::ranker::Suggestion]) -> Vec<i32> {
    list.iter().map(|s| s.ingredient_id).collect()
}

fn run(conn: &mut SqliteConnection, selected: &[i32]) -> PairingResult {
    let selection = Selection::new(selected.iter().map(|id| i64::from(*id))).unwrap();
    suggest_pairings(conn, &selection, &RankingLimits::default()).unwrap()
}

#[test]
fn shared_molecule_scenario() {
    let (_db, mut conn) = setup_db();
    let w = build_world(&mut conn);

    let result = run(&mut conn, &[w.a, w.b, w.a]);
    assert_eq!(result.selection, vec![w.a, w.b]);

    // Shared = {M}: (10 + 20) / (10 + 30 + 20 + 40).
    assert_eq!(result.match_score, 30.0);

    // Weights: M = 30, X = 30, Y = 40, so M/max = 0.75 and Y/max = 1.
    assert_eq!(ids(&result.matching), vec![w.e, w.c, w.d, w.f]);
    assert_eq!(ids(&result.contrasting), vec![w.f, w.c, w.d, w.e]);

    let d = result.matching.iter().find(|s| s.ingredient_id == w.d).unwrap();
    assert_eq!(d.weighted_score, 0.75);
    assert_eq!(d.display_name, "Date");
    assert_eq!(result.matching[0].weighted_score, 1.0);
    assert_eq!(result.contrasting[0].weighted_score, 0.0);

    for s in result.matching.iter().chain(result.contrasting.iter()) {
        assert_ne!(s.ingredient_id, w.a);
        assert_ne!(s.ingredient_id, w.b);
        assert_ne!(s.ingredient_id, w.nameless);
        assert_ne!(s.ingredient_id, w.no_evidence);
    }
}

#[test]
fn single_ingredient_matches_itself_fully() {
    let (_db, mut conn) = setup_db();
    let w = build_world(&mut conn);
    let result = run(&mut conn, &[w.c]);
    assert_eq!(result.match_score, 100.0);
}

#[test]
fn zero_total_score_is_not_an_error() {
    let (_db, mut conn) = setup_db();
    let w = build_world(&mut conn);

    let result = run(&mut conn, &[w.no_evidence]);
    assert_eq!(result.match_score, 0.0);
    assert!(result.matching.iter().all(|s| s.weighted_score == 0.0));

    // Unknown ids behave like ingredients without evidence.
    let result = run(&mut conn, &[999]);
    assert_eq!(result.match_score, 0.0);
}

#[test]
fn lists_are_capped_separately() {
    let (_db, mut conn) = setup_db();
    let w = build_world(&mut conn);
    let selection = Selection::new([i64::from(w.a)]).unwrap();
    let limits = RankingLimits {
        matching: 2,
        contrasting: 1,
    };
    let result = suggest_pairings(&mut conn, &selection, &limits).unwrap();
    assert_eq!(result.matching.len(), 2);
    assert_eq!(result.contrasting.len(), 1);
}
