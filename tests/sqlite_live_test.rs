mod helpers;

use std::rc::Rc;
use std::sync::{Arc, Mutex};

use helpers::{tags, test_db};
use memlive::live::{LiveQuery, QueryKey, QueryStatus};
use memlive::memory::feedback::record_feedback;
use memlive::memory::queries;
use memlive::memory::store::{
    add_tag, create_memory, delete_memory, list_memories, remove_tag, set_archived, set_pinned,
};
use memlive::memory::types::{Feedback, Memory, MemoryCategory, Rating};
use memlive::query::Scalar;

fn memories(live: &LiveQuery<impl memlive::query::AccessPoint>) -> Vec<Memory> {
    live.data()
        .iter()
        .map(|row| Memory::from_row(row).unwrap())
        .collect()
}

#[test]
fn panel_follows_mutations_through_revision_dep() {
    let conn = test_db();
    let mut revision = 0i64;
    let panel = |rev: i64| queries::active_memories(50, 0).dep(rev);

    let mut live = LiveQuery::bind(&conn, panel(revision));
    assert!(live.data().is_empty());
    assert!(live.error().is_none());

    create_memory(&conn, "Prefers tea over coffee", 0.6, &tags(&["preference"]), None).unwrap();

    // Same key: the panel does not re-run on its own
    assert!(!live.rebind(panel(revision)));
    assert!(live.data().is_empty());

    revision += 1;
    assert!(live.rebind(panel(revision)));
    let shown = memories(&live);
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].content, "Prefers tea over coffee");
    assert_eq!(shown[0].category(), Some(MemoryCategory::Preference));
}

#[test]
fn listing_order_pinned_then_importance() {
    let conn = test_db();
    let low = create_memory(&conn, "low", 0.1, &[], None).unwrap();
    let high = create_memory(&conn, "high", 0.9, &[], None).unwrap();
    let pinned = create_memory(&conn, "pinned", 0.2, &[], None).unwrap();
    set_pinned(&conn, &pinned.id, true).unwrap();

    let live = LiveQuery::bind(&conn, queries::active_memories(50, 0));
    let ids: Vec<String> = memories(&live).into_iter().map(|m| m.id).collect();
    assert_eq!(ids, [pinned.id, high.id, low.id]);
}

#[test]
fn archived_and_deleted_are_filtered() {
    let conn = test_db();
    let keep = create_memory(&conn, "keep", 0.5, &[], None).unwrap();
    let archived = create_memory(&conn, "archived", 0.5, &[], None).unwrap();
    let deleted = create_memory(&conn, "deleted", 0.5, &[], None).unwrap();
    set_archived(&conn, &archived.id, true).unwrap();
    delete_memory(&conn, &deleted.id, Some("duplicate")).unwrap();

    let active = LiveQuery::bind(&conn, queries::active_memories(50, 0));
    let ids: Vec<String> = memories(&active).into_iter().map(|m| m.id).collect();
    assert_eq!(ids, [keep.id]);

    let archive = LiveQuery::bind(&conn, queries::archived_memories(50));
    let ids: Vec<String> = memories(&archive).into_iter().map(|m| m.id).collect();
    assert_eq!(ids, [archived.id]);
}

#[test]
fn limit_is_a_bound_parameter() {
    let conn = test_db();
    for i in 0..5 {
        create_memory(&conn, &format!("memory {i}"), 0.5, &[], None).unwrap();
    }

    let mut live = LiveQuery::bind(&conn, queries::active_memories(2, 0));
    assert_eq!(live.data().len(), 2);

    assert!(live.rebind(queries::active_memories(10, 0)));
    assert_eq!(live.data().len(), 5);
}

#[test]
fn search_by_text_and_category() {
    let conn = test_db();
    create_memory(&conn, "Drinks green tea every morning", 0.5, &tags(&["user_preference"]), None)
        .unwrap();
    create_memory(&conn, "Tea shop is on Main Street", 0.5, &tags(&["fact"]), None).unwrap();
    create_memory(&conn, "Works as a nurse", 0.5, &tags(&["background"]), None).unwrap();

    let mut live = LiveQuery::bind(&conn, queries::search_memories("tea", None, 20));
    assert_eq!(live.data().len(), 2, "LIKE is case-insensitive for ASCII");

    live.rebind(queries::search_memories("tea", Some(MemoryCategory::Preference), 20));
    let found = memories(&live);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].content, "Drinks green tea every morning");

    live.rebind(queries::search_memories("tea", Some(MemoryCategory::Context), 20));
    assert!(live.data().is_empty());
    assert!(live.error().is_none());
}

#[test]
fn search_treats_wildcards_literally() {
    let conn = test_db();
    create_memory(&conn, "Gets 100% of the bonus", 0.5, &[], None).unwrap();
    create_memory(&conn, "Gets 1000 points", 0.5, &[], None).unwrap();

    let live = LiveQuery::bind(&conn, queries::search_memories("100%", None, 20));
    assert_eq!(live.data().len(), 1);
}

#[test]
fn feedback_panel_shows_latest_rating() {
    let conn = test_db();
    let mut revision = 0i64;
    let panel = |rev: i64| queries::feedback_for_message("msg_42").dep(rev);

    let mut live = LiveQuery::bind(&conn, panel(revision));
    assert!(live.data().is_empty());

    record_feedback(&conn, "msg_42", Rating::Up, "").unwrap();
    revision += 1;
    live.rebind(panel(revision));
    let fb = Feedback::from_row(&live.data()[0]).unwrap();
    assert_eq!(fb.rating, Rating::Up);

    record_feedback(&conn, "msg_42", Rating::Down, "hallucinated a date").unwrap();
    live.refetch();
    let fb = Feedback::from_row(&live.data()[0]).unwrap();
    assert_eq!(fb.rating, Rating::Down);
    assert_eq!(fb.note, "hallucinated a date");
}

#[test]
fn bad_sql_is_published_then_recovers() {
    let conn = test_db();
    let mut live = LiveQuery::bind(&conn, QueryKey::new("SELECT * FROM no_such_table"));
    assert_eq!(live.status(), QueryStatus::Failed);
    let message = live.error().unwrap().message();
    assert!(message.contains("no_such_table"), "got: {message}");

    conn.execute_batch("CREATE TABLE no_such_table (x INTEGER); INSERT INTO no_such_table VALUES (7);")
        .unwrap();
    live.refetch();
    assert_eq!(live.status(), QueryStatus::Ready);
    assert_eq!(live.data()[0].get("x"), Some(&Scalar::Integer(7)));
}

#[test]
fn first_row_producing_statement_wins() {
    let conn = test_db();
    let live = LiveQuery::bind(
        &conn,
        QueryKey::new("SELECT 'first' AS which; SELECT 'second' AS which;"),
    );
    assert_eq!(live.data().len(), 1);
    assert_eq!(live.data()[0].get("which"), Some(&Scalar::from("first")));
}

#[test]
fn shared_connection_access_points() {
    let shared = Arc::new(Mutex::new(test_db()));
    let live = LiveQuery::bind(Arc::clone(&shared), QueryKey::new("SELECT ?1 AS v").param(true));
    assert_eq!(live.data()[0].get("v"), Some(&Scalar::Integer(1)));

    let owned = Rc::new(test_db());
    let live = LiveQuery::bind(owned, QueryKey::new("SELECT ?1 AS v").param(Scalar::Null));
    assert_eq!(live.data()[0].get("v"), Some(&Scalar::Null));
}

#[test]
fn pages_walk_the_active_list() {
    let conn = test_db();
    for i in 0..5 {
        create_memory(&conn, &format!("memory {i}"), 0.1 * f64::from(i), &[], None).unwrap();
    }

    let mut live = LiveQuery::bind(&conn, queries::active_memories(2, 0));
    let page: Vec<String> = memories(&live).into_iter().map(|m| m.content).collect();
    assert_eq!(page, ["memory 4", "memory 3"]);

    assert!(live.rebind(queries::active_memories(2, 2)));
    let page: Vec<String> = memories(&live).into_iter().map(|m| m.content).collect();
    assert_eq!(page, ["memory 2", "memory 1"]);

    let count = LiveQuery::bind(&conn, queries::active_memory_count());
    assert_eq!(count.data()[0].get("total"), Some(&Scalar::Integer(5)));

    let listed = list_memories(&conn, 2, 4).unwrap();
    assert_eq!(listed.total, 5);
    assert_eq!(listed.memories.len(), 1);
}

#[test]
fn tag_panel_matches_any_tag() {
    let conn = test_db();
    let tea =
        create_memory(&conn, "Likes tea", 0.7, &tags(&["drinks", "preference"]), None).unwrap();
    let dog = create_memory(&conn, "Has a dog", 0.5, &tags(&["pets"]), None).unwrap();
    create_memory(&conn, "Lives in Oslo", 0.3, &tags(&["fact"]), None).unwrap();

    let wanted = |list: &[&str]| queries::memories_by_tags(&tags(list), 20);
    let mut live = LiveQuery::bind(&conn, wanted(&["drinks", "pets"]));
    let ids: Vec<String> = memories(&live).into_iter().map(|m| m.id).collect();
    assert_eq!(ids, [tea.id.clone(), dog.id.clone()]);

    assert!(live.rebind(wanted(&["nothing"])));
    assert!(live.data().is_empty());
    assert!(live.error().is_none());

    // Tag edits show up on the next run
    add_tag(&conn, &dog.id, "drinks").unwrap();
    remove_tag(&conn, &tea.id, "drinks").unwrap();
    live.rebind(wanted(&["drinks"]));
    let ids: Vec<String> = memories(&live).into_iter().map(|m| m.id).collect();
    assert_eq!(ids, [dog.id]);
}

#[test]
fn repeated_column_names_collapse_to_the_last_value() {
    let conn = test_db();
    let live = LiveQuery::bind(&conn, QueryKey::new("SELECT 1 AS id, 'x' AS name, 2 AS id"));
    let row = &live.data()[0];

    assert_eq!(row.columns(), ["id", "name"]);
    assert_eq!(row.get("id"), Some(&Scalar::Integer(2)));
    assert_eq!(row.to_json(), serde_json::json!({"id": 2, "name": "x"}));
    assert_eq!(serde_json::to_string(row).unwrap(), r#"{"id":2,"name":"x"}"#);
}
