use indexmap::IndexMap;
use quarry_core::{
    schema::describe::{
        ColumnDescription, Description, ForeignKeyDescription, IndexDescription, TableDescription,
    },
    Error, Result,
};
use tokio_postgres::Client;
use tracing::debug;

const TABLES: &str = "SELECT c.relname::text, COALESCE(obj_description(c.oid, 'pg_class'), '')::text \
    FROM pg_catalog.pg_class c \
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
    WHERE c.relkind = 'r' AND n.nspname = current_schema() \
    ORDER BY c.relname";

const COLUMNS: &str = "SELECT c.table_name::text, c.column_name::text, c.data_type::text, \
    c.character_maximum_length::bigint, c.is_nullable::text, c.column_default::text, \
    c.is_identity::text, COALESCE(col_description(cls.oid, c.ordinal_position::int), '')::text \
    FROM information_schema.columns c \
    JOIN pg_catalog.pg_class cls ON cls.relname = c.table_name \
    JOIN pg_catalog.pg_namespace n ON n.oid = cls.relnamespace AND n.nspname = c.table_schema \
    WHERE c.table_schema = current_schema() \
    ORDER BY c.table_name, c.ordinal_position";

const INDEXES: &str = "SELECT t.relname::text, i.relname::text, ix.indisunique, ix.indisprimary, a.attname::text \
    FROM pg_catalog.pg_index ix \
    JOIN pg_catalog.pg_class t ON t.oid = ix.indrelid \
    JOIN pg_catalog.pg_class i ON i.oid = ix.indexrelid \
    JOIN pg_catalog.pg_namespace n ON n.oid = t.relnamespace \
    JOIN LATERAL unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord) ON true \
    JOIN pg_catalog.pg_attribute a ON a.attrelid = t.oid AND a.attnum = k.attnum \
    WHERE n.nspname = current_schema() \
    ORDER BY t.relname, i.relname, k.ord";

const FOREIGN_KEYS: &str = "SELECT kcu.table_name::text, kcu.column_name::text, \
    ccu.table_name::text, ccu.column_name::text, rc.update_rule::text, rc.delete_rule::text \
    FROM information_schema.referential_constraints rc \
    JOIN information_schema.key_column_usage kcu \
    ON kcu.constraint_schema = rc.constraint_schema AND kcu.constraint_name = rc.constraint_name \
    JOIN information_schema.constraint_column_usage ccu \
    ON ccu.constraint_schema = rc.unique_constraint_schema \
    AND ccu.constraint_name = rc.unique_constraint_name \
    WHERE kcu.table_schema = current_schema() \
    ORDER BY kcu.table_name, kcu.ordinal_position";

/// Reads the current schema from the system catalogues.
pub(crate) async fn describe(client: &Client) -> Result<Description> {
    let mut tables: IndexMap<String, TableDescription> = IndexMap::new();

    for row in client.query(TABLES, &[]).await.map_err(Error::driver_operation_failed)? {
        let name: String = row.try_get(0).map_err(Error::driver_operation_failed)?;
        let comment: String = row.try_get(1).map_err(Error::driver_operation_failed)?;
        tables.insert(
            name.clone(),
            TableDescription {
                name,
                comment,
                supports_fk: true,
                ..TableDescription::default()
            },
        );
    }

    for row in client.query(COLUMNS, &[]).await.map_err(Error::driver_operation_failed)? {
        let table: String = row.try_get(0).map_err(Error::driver_operation_failed)?;
        let Some(table) = tables.get_mut(&table) else {
            continue;
        };

        let max_length: Option<i64> = row.try_get(3).map_err(Error::driver_operation_failed)?;
        let nullable: String = row.try_get(4).map_err(Error::driver_operation_failed)?;
        let default: Option<String> = row.try_get(5).map_err(Error::driver_operation_failed)?;
        let identity: String = row.try_get(6).map_err(Error::driver_operation_failed)?;

        let auto_increment = identity == "YES"
            || default
                .as_deref()
                .is_some_and(|default| default.starts_with("nextval("));

        table.columns.push(ColumnDescription {
            name: row.try_get(1).map_err(Error::driver_operation_failed)?,
            native_type: row.try_get(2).map_err(Error::driver_operation_failed)?,
            max_length: max_length.and_then(|len| u64::try_from(len).ok()),
            nullable: nullable == "YES",
            default,
            auto_increment,
            comment: row.try_get(7).map_err(Error::driver_operation_failed)?,
        });
    }

    for row in client.query(INDEXES, &[]).await.map_err(Error::driver_operation_failed)? {
        let table: String = row.try_get(0).map_err(Error::driver_operation_failed)?;
        let Some(table) = tables.get_mut(&table) else {
            continue;
        };

        let name: String = row.try_get(1).map_err(Error::driver_operation_failed)?;
        let column: String = row.try_get(4).map_err(Error::driver_operation_failed)?;

        match table.indexes.iter_mut().find(|index| index.name == name) {
            Some(index) => index.columns.push(column),
            None => table.indexes.push(IndexDescription {
                name,
                unique: row.try_get(2).map_err(Error::driver_operation_failed)?,
                primary_key: row.try_get(3).map_err(Error::driver_operation_failed)?,
                columns: vec![column],
            }),
        }
    }

    for row in client
        .query(FOREIGN_KEYS, &[])
        .await
        .map_err(Error::driver_operation_failed)?
    {
        let table: String = row.try_get(0).map_err(Error::driver_operation_failed)?;
        let Some(table) = tables.get_mut(&table) else {
            continue;
        };
        table.foreign_keys.push(ForeignKeyDescription {
            column: row.try_get(1).map_err(Error::driver_operation_failed)?,
            referenced_table: row.try_get(2).map_err(Error::driver_operation_failed)?,
            referenced_column: row.try_get(3).map_err(Error::driver_operation_failed)?,
            on_update: row.try_get(4).map_err(Error::driver_operation_failed)?,
            on_delete: row.try_get(5).map_err(Error::driver_operation_failed)?,
        });
    }

    debug!(tables = tables.len(), "described postgresql database");

    Ok(Description {
        tables: tables.into_values().collect(),
    })
}
