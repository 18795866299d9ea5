use indexmap::IndexMap;
use mysql_async::{prelude::Queryable, Conn};
use quarry_core::{
    schema::describe::{
        ColumnDescription, Description, ForeignKeyDescription, IndexDescription, TableDescription,
    },
    Error, Result,
};
use tracing::debug;

const TABLES: &str = "SELECT TABLE_NAME, TABLE_COMMENT, ENGINE \
    FROM information_schema.TABLES \
    WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE' \
    ORDER BY TABLE_NAME";

const COLUMNS: &str = "SELECT TABLE_NAME, COLUMN_NAME, COLUMN_TYPE, CHARACTER_MAXIMUM_LENGTH, \
    IS_NULLABLE, COLUMN_DEFAULT, EXTRA, COLUMN_COMMENT \
    FROM information_schema.COLUMNS \
    WHERE TABLE_SCHEMA = DATABASE() \
    ORDER BY TABLE_NAME, ORDINAL_POSITION";

const INDEXES: &str = "SELECT TABLE_NAME, INDEX_NAME, NON_UNIQUE, COLUMN_NAME \
    FROM information_schema.STATISTICS \
    WHERE TABLE_SCHEMA = DATABASE() \
    ORDER BY TABLE_NAME, INDEX_NAME, SEQ_IN_INDEX";

const FOREIGN_KEYS: &str = "SELECT k.TABLE_NAME, k.COLUMN_NAME, k.REFERENCED_TABLE_NAME, \
    k.REFERENCED_COLUMN_NAME, r.UPDATE_RULE, r.DELETE_RULE \
    FROM information_schema.KEY_COLUMN_USAGE k \
    JOIN information_schema.REFERENTIAL_CONSTRAINTS r \
    ON r.CONSTRAINT_SCHEMA = k.CONSTRAINT_SCHEMA AND r.CONSTRAINT_NAME = k.CONSTRAINT_NAME \
    WHERE k.TABLE_SCHEMA = DATABASE() AND k.REFERENCED_TABLE_NAME IS NOT NULL \
    ORDER BY k.TABLE_NAME, k.ORDINAL_POSITION";

type ColumnRow = (
    String,
    String,
    String,
    Option<u64>,
    String,
    Option<String>,
    String,
    String,
);

/// Reads the current database from `information_schema`.
pub(crate) async fn describe(conn: &mut Conn) -> Result<Description> {
    let mut tables: IndexMap<String, TableDescription> = IndexMap::new();

    let rows: Vec<(String, Option<String>, Option<String>)> =
        conn.query(TABLES).await.map_err(Error::driver_operation_failed)?;
    for (name, comment, engine) in rows {
        tables.insert(
            name.clone(),
            TableDescription {
                name,
                comment: comment.unwrap_or_default(),
                supports_fk: engine.is_some_and(|engine| engine.eq_ignore_ascii_case("InnoDB")),
                ..TableDescription::default()
            },
        );
    }

    let rows: Vec<ColumnRow> = conn.query(COLUMNS).await.map_err(Error::driver_operation_failed)?;
    for (table, name, native_type, max_length, nullable, default, extra, comment) in rows {
        let Some(table) = tables.get_mut(&table) else {
            continue;
        };
        table.columns.push(ColumnDescription {
            name,
            native_type,
            max_length,
            nullable: nullable == "YES",
            default,
            auto_increment: extra.contains("auto_increment"),
            comment,
        });
    }

    let rows: Vec<(String, String, i64, String)> =
        conn.query(INDEXES).await.map_err(Error::driver_operation_failed)?;
    for (table, name, non_unique, column) in rows {
        let Some(table) = tables.get_mut(&table) else {
            continue;
        };
        match table.indexes.iter_mut().find(|index| index.name == name) {
            Some(index) => index.columns.push(column),
            None => table.indexes.push(IndexDescription {
                primary_key: name == "PRIMARY",
                unique: non_unique == 0,
                name,
                columns: vec![column],
            }),
        }
    }

    let rows: Vec<(String, String, String, String, String, String)> =
        conn.query(FOREIGN_KEYS).await.map_err(Error::driver_operation_failed)?;
    for (table, column, referenced_table, referenced_column, on_update, on_delete) in rows {
        let Some(table) = tables.get_mut(&table) else {
            continue;
        };
        table.foreign_keys.push(ForeignKeyDescription {
            column,
            referenced_table,
            referenced_column,
            on_update,
            on_delete,
        });
    }

    debug!(tables = tables.len(), "described mysql database");

    Ok(Description {
        tables: tables.into_values().collect(),
    })
}
