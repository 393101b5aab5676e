use daylog_core::db::open_db_in_memory;
use daylog_core::{
    DesiredItem, LogRepository, LogService, LogServiceError, SqliteLogRepository,
};
use uuid::Uuid;

#[test]
fn save_creates_day_lazily_and_is_idempotent() {
    let mut conn = open_db_in_memory().unwrap();
    let items = vec![DesiredItem::new("write report"), DesiredItem::new("review")];

    let (first_ids, second_ids) = {
        let mut repo = SqliteLogRepository::new(&mut conn);
        let first = repo.reconcile_day("2024-05-01", &items).unwrap();
        let stored = repo.day_items("2024-05-01").unwrap();
        let replay: Vec<DesiredItem> = stored
            .iter()
            .map(|item| DesiredItem {
                item_id: Some(item.item_id),
                title: item.title.clone(),
                content: item.content.clone(),
                tags: item.tags.clone(),
                is_done: item.is_done,
                origin_id: item.origin_id,
                parent_id: item.parent_id,
                relation_type: item.relation_type,
            })
            .collect();
        let second = repo.reconcile_day("2024-05-01", &replay).unwrap();
        (first, second)
    };

    assert_eq!(first_ids, second_ids);

    let day_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM days WHERE log_date = '2024-05-01';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(day_count, 1);

    let item_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM log_items;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(item_count, 2);
}

#[test]
fn save_assigns_dense_sort_order_from_input_position() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteLogRepository::new(&mut conn);

    let items = vec![
        DesiredItem::new("third"),
        DesiredItem::new("first"),
        DesiredItem::new("second"),
    ];
    repo.reconcile_day("2024-05-01", &items).unwrap();

    let stored = repo.day_items("2024-05-01").unwrap();
    let titles: Vec<&str> = stored.iter().map(|item| item.title.as_str()).collect();
    assert_eq!(titles, vec!["third", "first", "second"]);
    let orders: Vec<i64> = stored.iter().map(|item| item.sort_order).collect();
    assert_eq!(orders, vec![0, 1, 2]);
}

#[test]
fn resave_with_same_id_updates_in_place() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteLogRepository::new(&mut conn);

    let item_id = Uuid::new_v4();
    let original = DesiredItem::new("X").with_id(item_id);
    repo.reconcile_day("2024-05-01", &[original]).unwrap();

    let mut edited = DesiredItem::new("Y").with_id(item_id);
    edited.is_done = true;
    edited.tags = "work".to_string();
    repo.reconcile_day("2024-05-01", &[edited]).unwrap();

    let stored = repo.day_items("2024-05-01").unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].item_id, item_id);
    assert_eq!(stored[0].title, "Y");
    assert_eq!(stored[0].tags, "work");
    assert!(stored[0].is_done);
}

#[test]
fn orphaned_items_are_deleted_and_other_dates_untouched() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteLogRepository::new(&mut conn);

    let keep = Uuid::new_v4();
    let dropped = Uuid::new_v4();
    let other = Uuid::new_v4();

    repo.reconcile_day(
        "2024-05-01",
        &[
            DesiredItem::new("A").with_id(dropped),
            DesiredItem::new("B").with_id(keep),
        ],
    )
    .unwrap();
    repo.reconcile_day("2024-05-02", &[DesiredItem::new("other day").with_id(other)])
        .unwrap();

    repo.reconcile_day("2024-05-01", &[DesiredItem::new("B").with_id(keep)])
        .unwrap();

    let day_one = repo.day_items("2024-05-01").unwrap();
    assert_eq!(day_one.len(), 1);
    assert_eq!(day_one[0].item_id, keep);

    let day_two = repo.day_items("2024-05-02").unwrap();
    assert_eq!(day_two.len(), 1);
    assert_eq!(day_two[0].item_id, other);
}

#[test]
fn items_without_id_get_fresh_distinct_identifiers() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteLogRepository::new(&mut conn);

    let existing = Uuid::new_v4();
    let assigned = repo
        .reconcile_day(
            "2024-05-01",
            &[
                DesiredItem::new("known").with_id(existing),
                DesiredItem::new("new one"),
                DesiredItem::new("new two"),
            ],
        )
        .unwrap();

    assert_eq!(assigned.len(), 3);
    assert_eq!(assigned[0], existing);
    assert_ne!(assigned[1], assigned[2]);
    assert!(assigned[1] != existing && assigned[2] != existing);

    let stored = repo.day_items("2024-05-01").unwrap();
    let stored_ids: Vec<_> = stored.iter().map(|item| item.item_id).collect();
    assert_eq!(stored_ids, assigned);
}

#[test]
fn failed_save_rolls_back_and_leaves_prior_state_intact() {
    let mut conn = open_db_in_memory().unwrap();
    let keep = Uuid::new_v4();
    let doomed = Uuid::new_v4();

    {
        let mut repo = SqliteLogRepository::new(&mut conn);
        repo.reconcile_day(
            "2024-05-01",
            &[
                DesiredItem::new("A").with_id(doomed),
                DesiredItem::new("B").with_id(keep),
            ],
        )
        .unwrap();
    }

    // Force a persistence failure mid-save: the orphan delete aborts, so
    // the whole transaction must roll back.
    conn.execute_batch(
        "CREATE TRIGGER block_item_delete BEFORE DELETE ON log_items
         BEGIN SELECT RAISE(ABORT, 'delete blocked'); END;",
    )
    .unwrap();

    {
        let mut repo = SqliteLogRepository::new(&mut conn);
        repo.reconcile_day("2024-05-01", &[DesiredItem::new("B").with_id(keep)])
            .expect_err("blocked delete must fail the whole save");
    }

    conn.execute_batch("DROP TRIGGER block_item_delete;").unwrap();

    let repo = SqliteLogRepository::new(&mut conn);
    let stored = repo.day_items("2024-05-01").unwrap();
    assert_eq!(stored.len(), 2, "both items must survive the failed save");
    assert_eq!(stored[0].item_id, doomed);
    assert_eq!(stored[0].title, "A");
    assert_eq!(stored[1].item_id, keep);
    assert_eq!(stored[1].title, "B");
}

#[test]
fn unknown_date_reads_back_as_empty_list() {
    let mut conn = open_db_in_memory().unwrap();
    let repo = SqliteLogRepository::new(&mut conn);
    assert!(repo.day_items("2030-01-01").unwrap().is_empty());
}

#[test]
fn all_days_lists_newest_first_with_items_in_position_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut repo = SqliteLogRepository::new(&mut conn);

    repo.reconcile_day(
        "2024-05-01",
        &[DesiredItem::new("early a"), DesiredItem::new("early b")],
    )
    .unwrap();
    repo.reconcile_day("2024-05-03", &[DesiredItem::new("late")])
        .unwrap();

    let days = repo.all_days().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0].date, "2024-05-03");
    assert_eq!(days[1].date, "2024-05-01");
    assert_eq!(days[1].items[0].title, "early a");
    assert_eq!(days[1].items[1].title, "early b");
}

#[test]
fn title_history_counts_distinct_days() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = LogService::new(SqliteLogRepository::new(&mut conn));

    let mut tagged = DesiredItem::new("refactor");
    tagged.tags = "rust,infra".to_string();
    tagged.content = "day one".to_string();
    service.save_day("2024-05-01", &[tagged]).unwrap();

    let mut later = DesiredItem::new("refactor");
    later.content = "day two".to_string();
    service.save_day("2024-05-02", &[later]).unwrap();
    service
        .save_day("2024-05-03", &[DesiredItem::new("unrelated")])
        .unwrap();

    let history = service.title_history("refactor", None).unwrap();
    assert_eq!(history.total_days, 2);
    assert_eq!(history.entries[0].date, "2024-05-01");
    assert_eq!(history.entries[1].date, "2024-05-02");

    let filtered = service.title_history("refactor", Some("infra")).unwrap();
    assert_eq!(filtered.total_days, 1);
    assert_eq!(filtered.entries[0].content, "day one");
}

#[test]
fn service_rejects_malformed_dates_without_writing() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let repo = SqliteLogRepository::new(&mut conn);
        let mut service = LogService::new(repo);
        let err = service
            .save_day("05/01/2024", &[DesiredItem::new("x")])
            .expect_err("malformed date must be rejected");
        assert!(matches!(err, LogServiceError::InvalidDate(_)));
    }

    let day_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM days;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(day_count, 0);
}
