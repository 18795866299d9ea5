use pretty_assertions::assert_eq;
use quarry::{
    schema::{
        ColumnDescription, ColumnType, DescribeOptions, Description, Dialect,
        ForeignKeyDescription, IndexDescription, TableDescription,
    },
    TypeTableEnum, Value,
};
use tests::{goradd::PersonType, DbTest};

fn column(name: &str, native_type: &str) -> ColumnDescription {
    ColumnDescription {
        name: name.into(),
        native_type: native_type.into(),
        ..Default::default()
    }
}

fn primary_key(columns: &[&str]) -> IndexDescription {
    IndexDescription {
        name: "PRIMARY".into(),
        unique: true,
        primary_key: true,
        columns: columns.iter().map(|c| c.to_string()).collect(),
    }
}

fn foreign_key(column: &str, table: &str) -> ForeignKeyDescription {
    ForeignKeyDescription {
        column: column.into(),
        referenced_table: table.into(),
        referenced_column: "id".into(),
        on_update: "NO ACTION".into(),
        on_delete: "CASCADE".into(),
    }
}

fn description() -> Description {
    Description {
        tables: vec![
            TableDescription {
                name: "person".into(),
                columns: vec![
                    ColumnDescription {
                        auto_increment: true,
                        ..column("id", "int(10) unsigned")
                    },
                    column("first_name", "varchar(50)"),
                    column("last_name", "varchar(50)"),
                ],
                indexes: vec![primary_key(&["id"])],
                supports_fk: true,
                ..Default::default()
            },
            TableDescription {
                name: "person_type".into(),
                columns: vec![column("id", "int(10) unsigned"), column("name", "varchar(50)")],
                indexes: vec![primary_key(&["id"])],
                supports_fk: true,
                ..Default::default()
            },
            TableDescription {
                name: "person_persontype_assn".into(),
                columns: vec![
                    column("person_id", "int(10) unsigned"),
                    column("person_type_id", "int(10) unsigned"),
                ],
                indexes: vec![primary_key(&["person_id", "person_type_id"])],
                foreign_keys: vec![
                    foreign_key("person_id", "person"),
                    foreign_key("person_type_id", "person_type"),
                ],
                supports_fk: true,
                ..Default::default()
            },
        ],
    }
}

#[tokio::test]
async fn describe_reads_catalogue_and_enumerations() {
    let mut t = DbTest::mysql();
    t.driver.set_description(description());
    t.driver.push_rows(vec![
        vec![Value::I32(1), Value::from("Contractor")],
        vec![Value::I32(2), Value::from("Manager")],
        vec![Value::I32(3), Value::from("Inactive")],
    ]);

    let schema = t
        .db
        .describe(&mut t.cx, &DescribeOptions::new(Dialect::Mysql))
        .await
        .unwrap();

    assert_eq!(
        t.log().sql(),
        ["SELECT `id`, `name` FROM `person_type` ORDER BY `id`;"]
    );

    let id = schema.column("person", "id").unwrap();
    assert_eq!(id.ty, ColumnType::Unsigned);
    assert!(id.primary_key && id.auto_id);
    assert_eq!(
        schema.column("person", "last_name").unwrap().max_length,
        Some(50)
    );

    assert!(schema.is_type_table("person_type"));
    let types = schema.type_table("person_type").unwrap();
    assert_eq!(types.name_of(2), Some("Manager"));
    assert_eq!(types.id_of("inactive"), Some(3));

    let edges: Vec<String> = schema
        .edges("person")
        .unwrap()
        .iter()
        .map(|edge| edge.name().to_string())
        .collect();
    assert_eq!(edges, ["person_types"]);
}

#[tokio::test]
async fn describe_without_a_catalogue_fails() {
    let mut t = DbTest::postgresql();

    let err = t
        .db
        .describe(&mut t.cx, &DescribeOptions::new(Dialect::Postgresql))
        .await
        .unwrap_err();
    assert!(err.is_invalid_schema());
}

#[tokio::test]
async fn type_tables_are_reloaded_into_a_new_handle() {
    let mut t = DbTest::mysql();
    t.driver.push_rows(vec![
        vec![Value::I32(1), Value::from("Contractor")],
        vec![Value::I32(2), Value::from("Manager")],
        vec![Value::I32(3), Value::from("Inactive")],
        vec![Value::I32(4), Value::from("Company Car")],
    ]);
    t.driver.push_rows(vec![vec![
        Value::I32(1),
        Value::from("Open"),
        Value::from("The project is currently active"),
        Value::Bool(true),
    ]]);

    let db = t.db.load_type_tables(&mut t.cx).await.unwrap();

    assert_eq!(
        t.log().sql(),
        [
            "SELECT `id`, `name` FROM `person_type` ORDER BY `id`;",
            "SELECT `id`, `name`, `description`, `is_active` FROM `project_status_type` ORDER BY `id`;",
        ]
    );

    let people = db.schema().type_table(PersonType::TABLE).unwrap();
    assert_eq!(people.rows.len(), 4);
    assert_eq!(people.name_of(4), Some("Company Car"));

    let status = db.schema().type_table("project_status_type").unwrap();
    assert_eq!(status.rows.len(), 1);
    assert_eq!(status.rows[0].fields["is_active"], Value::Bool(true));

    // The original handle keeps its rows.
    assert_eq!(
        t.db.schema().type_table("project_status_type").unwrap().rows.len(),
        4
    );
}
