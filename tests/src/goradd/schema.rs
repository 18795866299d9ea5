use super::{PersonType, ProjectStatusType};
use quarry::TypeTableEnum;
use quarry_core::schema::{
    Association, AssociationSide, Column, ColumnType, FkAction, Options, Schema, Table,
};

fn pk() -> Column {
    Column::new("id", ColumnType::Int64).primary_key().auto_id()
}

fn type_pk() -> Column {
    Column::new("id", ColumnType::Int).primary_key()
}

fn string(name: &str) -> Column {
    Column::new(name, ColumnType::String)
}

/// Foreign key column whose reverse edge has the given name.
fn reference(name: &str, table: &str, on_delete: FkAction, reverse: &str) -> Column {
    let mut column = Column::new(name, ColumnType::Int64).references(table, "id", on_delete);
    column.options = Options::parse(&format!("reverse={reverse}"));
    column
}

fn side(table: &str, column: &str, plural: &str) -> AssociationSide {
    AssociationSide {
        plural: Some(plural.to_string()),
        ..AssociationSide::new(table, column)
    }
}

/// Schema of the sample database, with its enumeration rows.
pub fn schema() -> Schema {
    let mut schema = Schema::new();

    let tables = vec![
        Table::new("person")
            .with_column(pk())
            .with_column(string("first_name"))
            .with_column(string("last_name")),
        Table::new("person_type")
            .type_table()
            .with_column(type_pk())
            .with_column(string("name").unique()),
        Table::new("login")
            .with_column(pk())
            .with_column(reference("person_id", "person", FkAction::SetNull, "login").nullable().unique())
            .with_column(string("username").unique())
            .with_column(string("password").nullable())
            .with_column(Column::new("is_enabled", ColumnType::Bool).default_value(true)),
        Table::new("address")
            .with_column(pk())
            .with_column(reference("person_id", "person", FkAction::Cascade, "addresses"))
            .with_column(string("street"))
            .with_column(string("city").nullable()),
        Table::new("project_status_type")
            .type_table()
            .with_column(type_pk())
            .with_column(string("name").unique())
            .with_column(string("description").nullable())
            .with_column(Column::new("is_active", ColumnType::Bool)),
        Table::new("project")
            .with_column(pk())
            .with_column(Column::new("num", ColumnType::Int))
            .with_column(
                Column::new("status_type_id", ColumnType::Int).references(
                    "project_status_type",
                    "id",
                    FkAction::Restrict,
                ),
            )
            .with_column(
                reference("manager_id", "person", FkAction::SetNull, "projects_as_manager").nullable(),
            )
            .with_column(string("name"))
            .with_column(string("description").nullable())
            .with_column(Column::new("start_date", ColumnType::Time).nullable())
            .with_column(Column::new("end_date", ColumnType::Time).nullable())
            .with_column(string("budget").nullable())
            .with_column(string("spent").nullable()),
        Table::new("milestone")
            .with_column(pk())
            .with_column(reference("project_id", "project", FkAction::Restrict, "milestones"))
            .with_column(string("name")),
        Table::new("person_persontype_assn")
            .association()
            .with_column(
                Column::new("person_id", ColumnType::Int64)
                    .primary_key()
                    .references("person", "id", FkAction::Cascade),
            )
            .with_column(
                Column::new("person_type_id", ColumnType::Int)
                    .primary_key()
                    .references("person_type", "id", FkAction::Cascade),
            ),
        Table::new("team_member_project_assn")
            .association()
            .with_column(
                Column::new("team_member_id", ColumnType::Int64)
                    .primary_key()
                    .references("person", "id", FkAction::Cascade),
            )
            .with_column(
                Column::new("project_id", ColumnType::Int64)
                    .primary_key()
                    .references("project", "id", FkAction::Cascade),
            ),
    ];

    for table in tables {
        schema.add_table(table);
    }

    schema.associations.push(Association {
        table: "person_persontype_assn".into(),
        a: side("person", "person_id", "people"),
        b: side("person_type", "person_type_id", "person_types"),
    });
    schema.associations.push(Association {
        table: "team_member_project_assn".into(),
        a: side("person", "team_member_id", "team_members"),
        b: side("project", "project_id", "projects"),
    });

    schema
        .type_tables
        .insert(PersonType::TABLE.into(), PersonType::type_table());
    schema
        .type_tables
        .insert(ProjectStatusType::TABLE.into(), ProjectStatusType::type_table());

    schema
}

/// The sample schema on an engine without foreign key enforcement.
pub fn schema_without_fk() -> Schema {
    let mut schema = schema();
    for table in schema.tables.values_mut() {
        table.supports_fk = false;
    }
    schema
}
