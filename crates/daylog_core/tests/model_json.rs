use daylog_core::{DesiredItem, RelationType, TaskItem};
use uuid::Uuid;

#[test]
fn task_item_serializes_with_client_field_names() {
    let item = TaskItem {
        item_id: Uuid::new_v4(),
        title: "ship".to_string(),
        content: String::new(),
        tags: "work".to_string(),
        is_done: true,
        sort_order: 0,
        origin_id: None,
        parent_id: None,
        relation_type: Some(RelationType::Evolve),
    };

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["isDone"], serde_json::json!(true));
    assert_eq!(json["relation_type"], serde_json::json!("evolve"));
    assert!(json.get("is_done").is_none());
}

#[test]
fn desired_item_deserializes_with_optional_lineage_fields() {
    let item: DesiredItem = serde_json::from_str(
        r#"{"title": "new task", "isDone": false}"#,
    )
    .unwrap();

    assert_eq!(item.item_id, None);
    assert_eq!(item.title, "new task");
    assert_eq!(item.content, "");
    assert_eq!(item.origin_id, None);
    assert_eq!(item.relation_type, None);
}

#[test]
fn relation_type_rejects_unknown_tokens() {
    assert_eq!(RelationType::parse("inherit"), Some(RelationType::Inherit));
    assert_eq!(RelationType::parse("root"), None);
    assert_eq!(RelationType::parse(""), None);
}
