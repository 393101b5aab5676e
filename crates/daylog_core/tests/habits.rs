use daylog_core::db::open_db_in_memory;
use daylog_core::{
    HabitPatch, HabitService, HabitServiceError, SqliteHabitRepository, DEFAULT_HABIT_COLOR,
};

#[test]
fn create_habit_applies_default_color_and_group() {
    let mut conn = open_db_in_memory().unwrap();
    let service = HabitService::new(SqliteHabitRepository::new(&mut conn));

    let id = service.create_habit("drink water", None, None).unwrap();
    let habits = service.habits_for_date("2024-05-01").unwrap();

    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].id, id);
    assert_eq!(habits[0].color, DEFAULT_HABIT_COLOR);
    assert_eq!(habits[0].group_id, 0);
    assert_eq!(habits[0].status, None);
}

#[test]
fn toggle_twice_keeps_exactly_one_row_with_latest_status() {
    let mut conn = open_db_in_memory().unwrap();
    let habit_id = {
        let service = HabitService::new(SqliteHabitRepository::new(&mut conn));
        let habit_id = service.create_habit("stretch", None, None).unwrap();
        service.toggle_habit("2024-05-01", habit_id, 1).unwrap();
        service.toggle_habit("2024-05-01", habit_id, 0).unwrap();
        habit_id
    };

    let row_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM habit_logs WHERE log_date = '2024-05-01' AND habit_id = ?1;",
            [habit_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(row_count, 1);

    let service = HabitService::new(SqliteHabitRepository::new(&mut conn));
    let habits = service.habits_for_date("2024-05-01").unwrap();
    assert_eq!(habits[0].status, Some(0));
}

#[test]
fn toggle_unknown_habit_fails_with_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let service = HabitService::new(SqliteHabitRepository::new(&mut conn));
    let err = service
        .toggle_habit("2024-05-01", 42, 1)
        .expect_err("unknown habit must fail");
    assert!(matches!(err, HabitServiceError::HabitNotFound(42)));
}

#[test]
fn mark_all_done_skips_archived_definitions() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = HabitService::new(SqliteHabitRepository::new(&mut conn));

    let active = service.create_habit("run", None, None).unwrap();
    let archived = service.create_habit("old habit", None, None).unwrap();
    service
        .update_habit(
            archived,
            HabitPatch {
                is_archived: Some(true),
                ..HabitPatch::default()
            },
        )
        .unwrap();

    let touched = service.mark_all_done("2024-05-01").unwrap();
    assert_eq!(touched, 1);

    let habits = service.habits_for_date("2024-05-01").unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].id, active);
    assert_eq!(habits[0].status, Some(1));
}

#[test]
fn update_habit_touches_only_provided_fields() {
    let mut conn = open_db_in_memory().unwrap();
    let service = HabitService::new(SqliteHabitRepository::new(&mut conn));
    let id = service
        .create_habit("read", Some("#FF0000"), Some(3))
        .unwrap();

    service
        .update_habit(
            id,
            HabitPatch {
                title: Some("read books".to_string()),
                ..HabitPatch::default()
            },
        )
        .unwrap();

    let habits = service.habits_for_date("2024-05-01").unwrap();
    assert_eq!(habits[0].title, "read books");
    assert_eq!(habits[0].color, "#FF0000");
    assert_eq!(habits[0].group_id, 3);

    let err = service
        .update_habit(
            999,
            HabitPatch {
                title: Some("ghost".to_string()),
                ..HabitPatch::default()
            },
        )
        .expect_err("unknown habit must fail");
    assert!(matches!(err, HabitServiceError::HabitNotFound(999)));
}

#[test]
fn delete_habit_removes_definition_and_check_ins() {
    let mut conn = open_db_in_memory().unwrap();
    let habit_id = {
        let mut service = HabitService::new(SqliteHabitRepository::new(&mut conn));
        let habit_id = service.create_habit("meditate", None, None).unwrap();
        service.toggle_habit("2024-05-01", habit_id, 1).unwrap();
        service.toggle_habit("2024-05-02", habit_id, 1).unwrap();
        service.delete_habit(habit_id).unwrap();
        habit_id
    };

    let log_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM habit_logs WHERE habit_id = ?1;",
            [habit_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(log_count, 0);

    let definition_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM habit_definitions WHERE id = ?1;",
            [habit_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(definition_count, 0);
}

#[test]
fn groups_list_in_sort_order_and_support_partial_update() {
    let mut conn = open_db_in_memory().unwrap();
    let service = HabitService::new(SqliteHabitRepository::new(&mut conn));

    let first = service.create_group("Morning").unwrap();
    let second = service.create_group("Evening").unwrap();
    service.update_group(second, None, Some(-1)).unwrap();

    let groups = service.list_groups().unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].id, second);
    assert_eq!(groups[0].name, "Evening");
    assert_eq!(groups[1].id, first);

    service.update_group(first, Some("Dawn"), None).unwrap();
    let groups = service.list_groups().unwrap();
    assert_eq!(groups[1].name, "Dawn");
}

#[test]
fn update_of_unknown_group_names_the_group_in_the_error() {
    let mut conn = open_db_in_memory().unwrap();
    let service = HabitService::new(SqliteHabitRepository::new(&mut conn));

    let err = service
        .update_group(77, Some("Ghost"), None)
        .expect_err("unknown group must fail");
    assert!(matches!(err, HabitServiceError::GroupNotFound(77)));
    assert_eq!(err.to_string(), "habit group not found: 77");
}

#[test]
fn blank_titles_are_rejected() {
    let mut conn = open_db_in_memory().unwrap();
    let service = HabitService::new(SqliteHabitRepository::new(&mut conn));

    assert!(matches!(
        service.create_habit("   ", None, None),
        Err(HabitServiceError::EmptyTitle)
    ));
    assert!(matches!(
        service.create_group(""),
        Err(HabitServiceError::EmptyTitle)
    ));
}
