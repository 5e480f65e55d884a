use super::open_db;
use crate::db::*;
use crate::types::TemplateId;

#[tokio::test]
async fn test_insert_and_get_template() {
    let (db, _file) = open_db().await;

    let id = db
        .insert_template(&NewResponseTemplate {
            name: "gateway".to_string(),
            mapping_rules: Some(r#"{"answer":"data.text","tokens":"meta.tokens"}"#.to_string()),
        })
        .await
        .unwrap();

    let stored = db.get_template(id).await.unwrap().unwrap();
    assert_eq!(stored.name, "gateway");
    assert_eq!(
        stored.mapping_rules.as_deref(),
        Some(r#"{"answer":"data.text","tokens":"meta.tokens"}"#)
    );

    db.close().await;
}

#[tokio::test]
async fn test_malformed_rules_are_stored_verbatim() {
    let (db, _file) = open_db().await;

    let id = db
        .insert_template(&NewResponseTemplate {
            name: "broken".to_string(),
            mapping_rules: Some("{not json".to_string()),
        })
        .await
        .unwrap();
    let none = db
        .insert_template(&NewResponseTemplate {
            name: "empty".to_string(),
            mapping_rules: None,
        })
        .await
        .unwrap();

    assert_eq!(
        db.get_template(id).await.unwrap().unwrap().mapping_rules.as_deref(),
        Some("{not json")
    );
    assert!(db.get_template(none).await.unwrap().unwrap().mapping_rules.is_none());
    assert_eq!(db.list_templates().await.unwrap().len(), 2);
    assert!(db.get_template(TemplateId(99)).await.unwrap().is_none());

    db.close().await;
}
