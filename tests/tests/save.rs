use pretty_assertions::assert_eq;
use quarry::{Record, Value};
use tests::{
    goradd::{node, Address, Person, Project, ProjectStatusType},
    DbTest,
};

fn address(street: &str, city: &str) -> Address {
    let mut address = Address::new();
    address.set_street(street);
    address.set_city(city);
    address
}

/// Loads person 1 with the two addresses 10 and 11.
async fn person_with_addresses(t: &mut DbTest) -> Person {
    let people = node::person();
    t.driver.push_rows(vec![
        vec![
            Value::I64(1),
            Value::from("John"),
            Value::I64(10),
            Value::from("1 Love Drive"),
            Value::I64(1),
        ],
        vec![
            Value::I64(1),
            Value::from("John"),
            Value::I64(11),
            Value::from("2 Doves and a Pine Cone Dr."),
            Value::I64(1),
        ],
    ]);

    let mut people = Person::query()
        .select([
            people.first_name(),
            people.addresses().street(),
            people.addresses().person_id(),
        ])
        .load(&t.db, &mut t.cx)
        .await
        .unwrap();
    t.log().clear();
    people.remove(0)
}

#[tokio::test]
async fn insert_person_with_addresses() {
    let mut t = DbTest::mysql();

    let mut person = Person::new();
    person.set_first_name("Martin");
    person.set_last_name("Luther");
    person.set_addresses(vec![
        address("My Street", "Eisleben"),
        address("All Saints Church", "Wittenburg"),
    ]);

    person.save(&t.db, &mut t.cx).await.unwrap();

    assert_eq!(person.id().unwrap(), 1);
    let addresses = person.addresses();
    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0].id().unwrap(), 2);
    assert_eq!(addresses[0].street().unwrap(), "My Street");
    assert_eq!(addresses[1].id().unwrap(), 3);
    assert_eq!(addresses[1].person_id().unwrap(), 1);

    let log = t.log();
    assert_eq!(
        log.sql(),
        [
            "INSERT INTO `person` (`first_name`, `last_name`) VALUES (?, ?);",
            "INSERT INTO `address` (`street`, `city`, `person_id`) VALUES (?, ?, ?);",
            "INSERT INTO `address` (`street`, `city`, `person_id`) VALUES (?, ?, ?);",
        ]
    );
    assert_eq!(
        log.statement(2).1,
        [
            Value::from("All Saints Church"),
            Value::from("Wittenburg"),
            Value::I64(1)
        ]
    );
}

#[tokio::test]
async fn insert_returns_key_on_postgresql() {
    let mut t = DbTest::postgresql();
    t.driver.set_next_id(42);

    let mut person = Person::new();
    person.set_first_name("Ada");
    person.set_last_name("Lovelace");
    person.save(&t.db, &mut t.cx).await.unwrap();

    assert_eq!(person.id().unwrap(), 42);
    assert_eq!(
        t.log().sql(),
        [r#"INSERT INTO "person" ("first_name", "last_name") VALUES ($1, $2) RETURNING "id";"#]
    );
}

#[tokio::test]
async fn clean_record_saves_nothing() {
    let mut t = DbTest::mysql();

    let mut person = Person::new();
    person.set_first_name("Ada");
    person.set_last_name("Lovelace");
    person.save(&t.db, &mut t.cx).await.unwrap();
    assert_eq!(t.log().len(), 1);

    person.save(&t.db, &mut t.cx).await.unwrap();
    assert_eq!(t.log().len(), 1);
}

#[tokio::test]
async fn update_sends_dirty_columns_only() {
    let mut t = DbTest::mysql();
    t.driver.push_rows(vec![vec![
        Value::I64(5),
        Value::from("Jacob"),
        Value::from("Pratt"),
    ]]);

    let mut person = Person::query()
        .get(&t.db, &mut t.cx, 5_i64)
        .await
        .unwrap()
        .unwrap();
    person.set_last_name("Smith");
    person.save(&t.db, &mut t.cx).await.unwrap();

    let (sql, params) = t.log().statement(1);
    assert_eq!(sql, "UPDATE `person` SET `last_name` = ? WHERE `id` = ?;");
    assert_eq!(params, [Value::from("Smith"), Value::I64(5)]);
    assert!(!person.row().is_dirty("last_name"));
}

#[tokio::test]
async fn changing_a_saved_key_is_rejected() {
    let mut t = DbTest::mysql();
    t.driver.push_rows(vec![vec![
        Value::I64(5),
        Value::from("Jacob"),
        Value::from("Pratt"),
    ]]);

    let mut person = Person::query()
        .get(&t.db, &mut t.cx, 5_i64)
        .await
        .unwrap()
        .unwrap();
    person.row_mut().set("id", 6_i64);

    let err = person.save(&t.db, &mut t.cx).await.unwrap_err();
    assert!(err.is_invalid_statement());
    assert_eq!(t.log().len(), 1);
}

#[tokio::test]
async fn removed_cascade_child_is_deleted() {
    let mut t = DbTest::mysql();
    let mut person = person_with_addresses(&mut t).await;

    person
        .row_mut()
        .collection_mut("addresses")
        .unwrap()
        .remove(&Value::I64(10));
    person.save(&t.db, &mut t.cx).await.unwrap();

    let log = t.log();
    assert_eq!(log.sql(), ["DELETE FROM `address` WHERE `id` = ?;"]);
    assert_eq!(log.statement(0).1, [Value::I64(10)]);

    // Saved state is the new baseline.
    person.save(&t.db, &mut t.cx).await.unwrap();
    assert_eq!(t.log().len(), 1);
}

#[tokio::test]
async fn new_member_is_linked_to_parent() {
    let mut t = DbTest::mysql();
    t.driver.set_next_id(20);
    let mut person = person_with_addresses(&mut t).await;

    person
        .row_mut()
        .collection_mut("addresses")
        .unwrap()
        .push(address("3 Elm St.", "Springfield").into_row());
    person.save(&t.db, &mut t.cx).await.unwrap();

    let log = t.log();
    assert_eq!(
        log.sql(),
        ["INSERT INTO `address` (`street`, `city`, `person_id`) VALUES (?, ?, ?);"]
    );
    assert_eq!(person.addresses()[2].id().unwrap(), 20);
}

#[tokio::test]
async fn removed_set_null_child_is_detached() {
    let mut t = DbTest::mysql();
    let people = node::person();

    t.driver.push_rows(vec![vec![
        Value::I64(7),
        Value::from("Karen"),
        Value::I64(3),
        Value::from("State College HR System"),
    ]]);
    let mut person = Person::query()
        .select([people.first_name(), people.projects_as_manager().name()])
        .load(&t.db, &mut t.cx)
        .await
        .unwrap()
        .remove(0);

    person
        .row_mut()
        .collection_mut("projects_as_manager")
        .unwrap()
        .remove(&Value::I64(3));
    person.save(&t.db, &mut t.cx).await.unwrap();

    let (sql, params) = t.log().statement(1);
    assert_eq!(sql, "UPDATE `project` SET `manager_id` = NULL WHERE `id` = ?;");
    assert_eq!(params, [Value::I64(3)]);
}

#[tokio::test]
async fn removed_restrict_child_is_an_integrity_error() {
    let mut t = DbTest::mysql();
    let project = node::project();

    t.driver.push_rows(vec![vec![
        Value::I64(1),
        Value::from("ACME Website Redesign"),
        Value::I64(1),
        Value::from("Milestone A"),
    ]]);
    let mut project = Project::query()
        .select([project.name(), project.milestones().name()])
        .load(&t.db, &mut t.cx)
        .await
        .unwrap()
        .remove(0);
    assert_eq!(project.milestones()[0].name().unwrap(), "Milestone A");

    project
        .row_mut()
        .collection_mut("milestones")
        .unwrap()
        .remove(&Value::I64(1));

    let err = project.save(&t.db, &mut t.cx).await.unwrap_err();
    assert!(err.is_integrity());
    assert_eq!(t.log().len(), 1);
}

#[tokio::test]
async fn many_many_members_are_associated() {
    let mut t = DbTest::mysql();
    t.driver.set_next_id(9);
    t.driver.push_rows(vec![
        vec![Value::I64(1), Value::from("John"), Value::from("Doe")],
        vec![Value::I64(2), Value::from("Kendall"), Value::from("Public")],
    ]);
    let people = Person::query().load(&t.db, &mut t.cx).await.unwrap();

    let mut project = Project::new();
    project.set_name("Blueline Project");
    project.set_num(5);
    project.set_status_type(ProjectStatusType::Planned);
    project.set_team_members(people);
    project.save(&t.db, &mut t.cx).await.unwrap();

    let log = t.log();
    assert_eq!(
        log.sql()[1..],
        [
            "INSERT INTO `project` (`name`, `num`, `status_type_id`) VALUES (?, ?, ?);",
            "DELETE FROM `team_member_project_assn` WHERE `project_id` = ?;",
            "INSERT INTO `team_member_project_assn` (`project_id`, `team_member_id`) VALUES (?, ?);",
            "INSERT INTO `team_member_project_assn` (`project_id`, `team_member_id`) VALUES (?, ?);",
        ]
    );
    assert_eq!(log.statement(4).1, [Value::I64(9), Value::I64(2)]);
    assert_eq!(project.id().unwrap(), 9);
}

#[tokio::test]
async fn unsaved_many_many_members_are_inserted_first() {
    let mut t = DbTest::postgresql();
    t.driver.push_rows(vec![vec![
        Value::I64(1),
        Value::from("John"),
        Value::from("Doe"),
    ]]);
    let mut person = Person::query()
        .get(&t.db, &mut t.cx, 1_i64)
        .await
        .unwrap()
        .unwrap();

    let mut project = Project::new();
    project.set_name("Website Redesign");
    project.set_num(6);
    project.set_status_type(ProjectStatusType::Open);
    t.driver.set_next_id(12);

    person.set_projects(vec![project]);
    person.save(&t.db, &mut t.cx).await.unwrap();

    let sql = t.log().sql();
    assert!(sql[1].starts_with(r#"INSERT INTO "project""#), "{}", sql[1]);
    assert_eq!(
        sql[2],
        r#"DELETE FROM "team_member_project_assn" WHERE "team_member_id" = $1;"#
    );
    assert_eq!(person.projects()[0].id().unwrap(), 12);
}

#[tokio::test]
async fn clearing_a_reference_nulls_the_key() {
    let mut t = DbTest::mysql();
    let project = node::project();

    t.driver.push_rows(vec![vec![
        Value::I64(2),
        Value::from("Blueline Project"),
        Value::I64(7),
    ]]);
    let mut project = Project::query()
        .select([project.name(), project.manager_id()])
        .load(&t.db, &mut t.cx)
        .await
        .unwrap()
        .remove(0);

    project.set_manager(None);
    project.save(&t.db, &mut t.cx).await.unwrap();

    assert_eq!(
        t.log().sql()[1],
        "UPDATE `project` SET `manager_id` = NULL WHERE `id` = ?;"
    );
}

#[tokio::test]
async fn new_reference_is_saved_before_the_row() {
    let mut t = DbTest::mysql();
    let project = node::project();

    t.driver.push_rows(vec![vec![
        Value::I64(2),
        Value::from("Blueline Project"),
        Value::Null,
    ]]);
    let mut project = Project::query()
        .select([project.name(), project.manager_id()])
        .load(&t.db, &mut t.cx)
        .await
        .unwrap()
        .remove(0);

    let mut manager = Person::new();
    manager.set_first_name("Wendy");
    manager.set_last_name("Smith");
    t.driver.set_next_id(8);

    project.set_manager(Some(manager));
    project.save(&t.db, &mut t.cx).await.unwrap();

    let log = t.log();
    assert_eq!(
        log.sql()[1..],
        [
            "INSERT INTO `person` (`first_name`, `last_name`) VALUES (?, ?);",
            "UPDATE `project` SET `manager_id` = ? WHERE `id` = ?;",
        ]
    );
    assert_eq!(log.statement(2).1, [Value::I64(8), Value::I64(2)]);
    assert_eq!(project.manager().unwrap().id().unwrap(), 8);
}
