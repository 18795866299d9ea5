use pretty_assertions::assert_eq;
use quarry::{Record, Value};
use tests::{
    goradd::{self, Person, Project},
    DbTest, LoggingDriver,
};

async fn load_person(t: &mut DbTest) -> Person {
    t.driver.push_rows(vec![vec![
        Value::I64(1),
        Value::from("John"),
        Value::from("Doe"),
    ]]);
    let person = Person::query()
        .get(&t.db, &mut t.cx, 1_i64)
        .await
        .unwrap()
        .unwrap();
    t.log().clear();
    person
}

#[tokio::test]
async fn delete_removes_association_rows_first() {
    let mut t = DbTest::mysql();
    let mut person = load_person(&mut t).await;

    person.delete(&t.db, &mut t.cx).await.unwrap();

    assert_eq!(
        t.log().sql(),
        [
            "DELETE FROM `person_persontype_assn` WHERE `person_id` = ?;",
            "DELETE FROM `team_member_project_assn` WHERE `team_member_id` = ?;",
            "DELETE FROM `person` WHERE `id` = ?;",
        ]
    );

    // The record no longer exists.
    assert!(person.pk().is_none());
    assert!(!person.row().is_saved());
    assert!(person.first_name().is_err());
}

#[tokio::test]
async fn deleting_an_unsaved_record_fails() {
    let mut t = DbTest::mysql();

    let err = Person::new().delete(&t.db, &mut t.cx).await.unwrap_err();
    assert!(err.is_record_not_found());
    assert!(t.log().is_empty());
}

#[tokio::test]
async fn delete_actions_are_emulated_without_foreign_keys() {
    let mut t = DbTest::new(LoggingDriver::mysql(), goradd::schema_without_fk());
    let mut person = load_person(&mut t).await;

    // Two association deletes and the login update run before the
    // addresses are looked up.
    for _ in 0..3 {
        t.driver.push_count(1);
    }
    t.driver
        .push_rows(vec![vec![Value::I64(10)], vec![Value::I64(11)]]);

    person.delete(&t.db, &mut t.cx).await.unwrap();

    let log = t.log();
    assert_eq!(
        log.sql(),
        [
            "DELETE FROM `person_persontype_assn` WHERE `person_id` = ?;",
            "DELETE FROM `team_member_project_assn` WHERE `team_member_id` = ?;",
            "UPDATE `login` SET `person_id` = NULL WHERE `person_id` = ?;",
            "SELECT `id` FROM `address` WHERE `person_id` = ?;",
            "DELETE FROM `address` WHERE `id` = ?;",
            "DELETE FROM `address` WHERE `id` = ?;",
            "UPDATE `project` SET `manager_id` = NULL WHERE `manager_id` = ?;",
            "DELETE FROM `person` WHERE `id` = ?;",
        ]
    );
    assert_eq!(log.statement(5).1, [Value::I64(11)]);
}

#[tokio::test]
async fn restricting_dependents_block_the_delete() {
    let mut t = DbTest::new(LoggingDriver::mysql(), goradd::schema_without_fk());

    t.driver.push_rows(vec![vec![
        Value::I64(1),
        Value::I64(1),
        Value::I64(3),
        Value::Null,
        Value::from("ACME Website Redesign"),
        Value::Null,
        Value::Null,
        Value::Null,
        Value::Null,
        Value::Null,
    ]]);
    let mut project = Project::query()
        .get(&t.db, &mut t.cx, 1_i64)
        .await
        .unwrap()
        .unwrap();

    t.driver
        .push_rows(vec![vec![Value::I64(1)], vec![Value::I64(2)]]);

    let err = project.delete(&t.db, &mut t.cx).await.unwrap_err();
    assert!(err.is_integrity());

    // Nothing was changed.
    assert_eq!(
        t.log().sql()[1..],
        ["SELECT `id` FROM `milestone` WHERE `project_id` = ?;"]
    );
    assert_eq!(project.name().unwrap(), "ACME Website Redesign");
}

#[tokio::test]
async fn restrict_passes_when_nothing_depends() {
    let mut t = DbTest::new(LoggingDriver::postgresql(), goradd::schema_without_fk());

    t.driver.push_rows(vec![vec![
        Value::I64(4),
        Value::I64(4),
        Value::I64(4),
        Value::I64(7),
        Value::from("Blueline Project"),
        Value::Null,
        Value::Null,
        Value::Null,
        Value::Null,
        Value::Null,
    ]]);
    let mut project = Project::query()
        .get(&t.db, &mut t.cx, 4_i64)
        .await
        .unwrap()
        .unwrap();

    project.delete(&t.db, &mut t.cx).await.unwrap();

    assert_eq!(
        t.log().sql()[1..],
        [
            r#"SELECT "id" FROM "milestone" WHERE "project_id" = $1;"#,
            r#"DELETE FROM "team_member_project_assn" WHERE "project_id" = $1;"#,
            r#"DELETE FROM "project" WHERE "id" = $1;"#,
        ]
    );
}
