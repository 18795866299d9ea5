use pretty_assertions::assert_eq;
use quarry::{Record, Value};
use serde_json::json;
use tests::{
    goradd::{node, Person, Project, ProjectStatusType},
    DbTest,
};

async fn load_project(t: &mut DbTest) -> Project {
    let project = node::project();

    t.driver.push_rows(vec![vec![
        Value::I64(1),
        Value::from("ACME Website Redesign"),
        Value::I32(3),
        Value::I64(7),
        Value::from("Karen"),
    ]]);

    Project::query()
        .select([
            project.name(),
            project.status_type_id(),
            project.manager().first_name(),
        ])
        .load(&t.db, &mut t.cx)
        .await
        .unwrap()
        .remove(0)
}

#[tokio::test]
async fn project_marshals_names_and_nested_manager() {
    let mut t = DbTest::mysql();
    let project = load_project(&mut t).await;

    let encoded = project.to_json(t.db.schema()).unwrap();
    let text = serde_json::to_string(&encoded).unwrap();

    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(map["name"], "ACME Website Redesign");
    assert_eq!(map["statusType"], "Completed");
    assert_eq!(map["manager"]["firstName"], "Karen");
    assert!(!map.contains_key("statusTypeId"));
}

#[tokio::test]
async fn unmarshalled_project_keeps_its_state() {
    let mut t = DbTest::postgresql();
    let loaded = load_project(&mut t).await;
    let schema = t.db.schema().clone();

    let encoded = loaded.to_json(&schema).unwrap();
    let decoded = Project::from_json(&encoded, &schema).unwrap();

    assert_eq!(decoded.id().unwrap(), 1);
    assert_eq!(decoded.name().unwrap(), "ACME Website Redesign");
    assert_eq!(decoded.status_type().unwrap(), ProjectStatusType::Completed);
    assert_eq!(decoded.manager().unwrap().first_name().unwrap(), "Karen");
    assert!(decoded.row().is_saved());
}

#[tokio::test]
async fn decoded_changes_are_saved_as_an_update() {
    let mut t = DbTest::mysql();
    let schema = t.db.schema().clone();

    let mut person = Person::from_json(
        &json!({ "id": 3, "lastName": "Jones", "nickname": "Sam" }),
        &schema,
    )
    .unwrap();
    assert_eq!(person.last_name().unwrap(), "Jones");

    person.save(&t.db, &mut t.cx).await.unwrap();

    let (sql, params) = t.log().statement(0);
    assert_eq!(sql, "UPDATE `person` SET `last_name` = ? WHERE `id` = ?;");
    assert_eq!(params, [Value::from("Jones"), Value::I64(3)]);
}

#[test]
fn unknown_enumeration_name_is_rejected() {
    let schema = tests::goradd::schema();

    let err = Project::from_json(&json!({ "statusType": "Abandoned" }), &schema).unwrap_err();
    assert!(err.is_type_conversion());

    let project = Project::from_json(&json!({ "statusType": "planned" }), &schema).unwrap();
    assert_eq!(project.status_type().unwrap(), ProjectStatusType::Planned);
}
