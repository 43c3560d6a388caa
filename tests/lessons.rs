//! The lessons as the CLI runs them.

use primer::lessons::{arrays, enums, floats, functions, orm, sync, user};
use primer::{MockExecutor, Model};

#[test]
fn test_sync_lesson_prints_both_lines_in_any_order() {
    let mut seen_orders = std::collections::HashSet::new();
    for _ in 0..50 {
        let lines = sync::run().unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines.contains(&"hello"));
        assert!(lines.contains(&"end..."));
        seen_orders.insert(lines);
    }
    assert!(!seen_orders.is_empty());
}

#[test]
fn test_wait_group_shared_across_coroutines() {
    let wg = sync::WaitGroup::new();
    wg.add(4);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let wg = wg.clone();
            may::go!(move || wg.done())
        })
        .collect();
    wg.wait();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Ok(()));
    }
    assert_eq!(wg.count(), 0);
}

#[test]
fn test_closure_lessons() {
    let mut first = functions::accumulator();
    let mut second = functions::accumulator();
    assert_eq!(first(10), 10);
    assert_eq!(first(20), 30);
    assert_eq!(second(5), 5);
    assert_eq!(first(30), 60);
}

#[test]
fn test_value_and_reference_arrays() {
    let original = [11, 22, 33];
    arrays::mutate_copy(original);
    assert_eq!(original[0], 11);

    let mut shared = original;
    arrays::mutate_in_place(&mut shared);
    assert_eq!(shared[0], 100);
    assert_eq!(original[0], 11);
}

#[test]
fn test_enum_round_trip_by_index() {
    let names: Vec<String> = enums::Weekday::iter().map(|d| d.to_string()).collect();
    assert_eq!(names.first().map(String::as_str), Some("Sunday"));
    assert_eq!(names.last().map(String::as_str), Some("Saturday"));
    assert_eq!(enums::D, 1 << 10);
}

#[test]
fn test_float_lesson_runs() {
    let lines = floats::run().unwrap();
    assert!(lines.iter().any(|l| l == "1129.6 * 100 = 112960"));
    assert!(lines.iter().any(|l| l == "2 / 3 = 0.6666666666666667"));
}

#[test]
fn test_orm_dry_run_issues_one_statement_per_query() {
    let db = MockExecutor::new();

    orm::select_field(&db).unwrap();
    orm::sub_query(&db).unwrap();
    orm::from_sub_query(&db).unwrap();
    orm::where_group(&db).unwrap();
    orm::multi_column_in(&db).unwrap();
    orm::named_parameter(&db).unwrap();
    orm::result_to_map(&db).unwrap();
    orm::first_or_init(&db).unwrap();

    // 1 + 2 + 2 + 1 + 1 + 2 + 2 + 8
    assert_eq!(db.statements().len(), 19);
    assert!(db.debug_sql().iter().all(|sql| sql.starts_with("SELECT")));
}

#[test]
fn test_first_or_init_never_writes() {
    let db = MockExecutor::new();

    let cases = orm::first_or_init(&db).unwrap();

    assert_eq!(cases.len(), 8);
    assert!(cases.iter().all(|c| c.user.id == 0));
    assert!(db
        .debug_sql()
        .iter()
        .all(|sql| !sql.starts_with("INSERT") && !sql.starts_with("UPDATE")));
}

#[test]
fn test_first_or_create_inserts_when_missing() {
    let db = MockExecutor::new();

    orm::first_or_create(&db).unwrap();

    // Nothing is found on an empty mock, so both lookups insert.
    let sql = db.debug_sql();
    assert_eq!(sql.first().map(String::as_str), Some("BEGIN"));
    assert!(sql[2].starts_with(r#"INSERT INTO "User""#));
    assert!(sql[4].starts_with(r#"INSERT INTO "User""#));
    assert_eq!(sql.last().map(String::as_str), Some("ROLLBACK"));
}

#[test]
fn test_seed_rows_cover_the_lesson_lookups() {
    let names: Vec<String> = user::seed_users().into_iter().map(|u| u.name).collect();
    assert!(names.contains(&"w1".to_string()));
    assert!(!names.contains(&"w7".to_string()));
    assert_eq!(user::User::TABLE, "User");
}
