//! Raw catalogue description of a database, and its mapping into a
//! [`Schema`].
//!
//! Drivers fill a [`Description`] from their system catalogues; everything
//! dialect-neutral about turning it into the schema model lives here.

use super::{
    Association, AssociationSide, Column, ColumnType, FkAction, ForeignKey, Index, Options,
    Schema, SubType, Table,
};
use crate::{stmt::Value, Result};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    Mysql,
    Postgresql,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Description {
    pub tables: Vec<TableDescription>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableDescription {
    pub name: String,
    pub comment: String,
    pub columns: Vec<ColumnDescription>,
    pub indexes: Vec<IndexDescription>,
    pub foreign_keys: Vec<ForeignKeyDescription>,
    pub supports_fk: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnDescription {
    pub name: String,

    /// Full native type, e.g. `int(10) unsigned` or `character varying`
    pub native_type: String,
    pub max_length: Option<u64>,
    pub nullable: bool,
    pub default: Option<String>,
    pub auto_increment: bool,
    pub comment: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub unique: bool,
    pub primary_key: bool,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForeignKeyDescription {
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub on_update: String,
    pub on_delete: String,
}

#[derive(Debug, Clone)]
pub struct DescribeOptions {
    pub dialect: Dialect,
    pub enum_suffixes: Vec<String>,
    pub assn_suffix: String,
}

impl DescribeOptions {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            enum_suffixes: vec!["_enum".into(), "_type".into()],
            assn_suffix: "_assn".into(),
        }
    }
}

/// Maps a native column type to its semantic type. Returns `None` for types
/// the mapping table does not know.
pub fn map_native_type(dialect: Dialect, native: &str) -> Option<(ColumnType, SubType)> {
    let native = native.trim().to_ascii_lowercase();
    let base = native.split(['(', ' ']).next().unwrap_or_default();
    let unsigned = native.contains("unsigned");

    let ty = match dialect {
        Dialect::Mysql => match base {
            "tinyint" if native.starts_with("tinyint(1)") => ColumnType::Bool,
            "bit" if native == "bit(1)" => ColumnType::Bool,
            "tinyint" | "smallint" | "mediumint" | "int" | "integer" | "year" => {
                if unsigned {
                    ColumnType::Unsigned
                } else {
                    ColumnType::Int
                }
            }
            "bigint" => {
                if unsigned {
                    ColumnType::Unsigned64
                } else {
                    ColumnType::Int64
                }
            }
            "float" => ColumnType::Float32,
            "double" | "real" => ColumnType::Float64,
            "decimal" | "numeric" => ColumnType::String,
            "char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum"
            | "set" | "json" => ColumnType::String,
            "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" | "bit" => {
                ColumnType::Bytes
            }
            "datetime" | "timestamp" => return Some((ColumnType::Time, SubType::Timestamp)),
            "date" => return Some((ColumnType::Time, SubType::Date)),
            "time" => return Some((ColumnType::Time, SubType::Time)),
            _ => return None,
        },
        Dialect::Postgresql => match native.as_str() {
            "boolean" => ColumnType::Bool,
            "smallint" | "integer" => ColumnType::Int,
            "bigint" => ColumnType::Int64,
            "real" => ColumnType::Float32,
            "double precision" => ColumnType::Float64,
            "numeric" | "decimal" | "money" => ColumnType::String,
            "character varying" | "character" | "text" | "uuid" | "json" | "jsonb" => {
                ColumnType::String
            }
            "bytea" => ColumnType::Bytes,
            "timestamp with time zone" | "timestamp without time zone" => {
                return Some((ColumnType::Time, SubType::Timestamp))
            }
            "date" => return Some((ColumnType::Time, SubType::Date)),
            "time with time zone" | "time without time zone" => {
                return Some((ColumnType::Time, SubType::Time))
            }
            _ => return None,
        },
    };

    Some((ty, SubType::None))
}

/// Parses a length out of `varchar(50)`.
fn native_length(native: &str) -> Option<u64> {
    let start = native.find('(')?;
    let end = native[start..].find(')')? + start;
    native[start + 1..end].split(',').next()?.trim().parse().ok()
}

fn parse_default(raw: &str, ty: ColumnType) -> Option<Value> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("null")
        || raw.to_ascii_uppercase().starts_with("CURRENT_")
        || raw.starts_with("nextval(")
        || raw.ends_with("()")
    {
        return None;
    }

    // PostgreSQL reports `'text'::character varying`
    let raw = raw.split("::").next().unwrap_or(raw);
    let raw = raw
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(raw);

    let value = match raw {
        "true" | "TRUE" => Value::Bool(true),
        "false" | "FALSE" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    };
    value.coerce(ty).ok()
}

impl Schema {
    /// Builds the schema model from a catalogue description.
    ///
    /// Tables ending with an enumeration suffix become type tables; tables
    /// ending with the association suffix become many-many associations when
    /// well formed. Malformed tables are skipped with a warning, and foreign
    /// keys into skipped tables are dropped.
    pub fn from_description(desc: &Description, options: &DescribeOptions) -> Result<Schema> {
        let mut schema = Schema::new();

        for table_desc in &desc.tables {
            let table = describe_table(table_desc, options);

            if table.primary_keys().next().is_none() {
                warn!(table = %table.name, "skipping table without a primary key");
                continue;
            }

            if table.name.ends_with(&options.assn_suffix) {
                match describe_association(&table) {
                    Ok(assn) => {
                        schema.associations.push(assn);
                        schema.add_table(table.association());
                    }
                    Err(reason) => {
                        warn!(table = %table.name, %reason, "skipping association table");
                    }
                }
                continue;
            }

            let is_type_table = options
                .enum_suffixes
                .iter()
                .any(|suffix| table.name.ends_with(suffix.as_str()));

            if is_type_table {
                schema.add_table(table.type_table());
            } else {
                schema.add_table(table);
            }
        }

        // Enumeration targets and association sides must survive the skips
        // above.
        let names: Vec<String> = schema.tables.keys().cloned().collect();
        for table in schema.tables.values_mut() {
            for column in &mut table.columns {
                let dangling = column
                    .foreign_key
                    .as_ref()
                    .is_some_and(|fk| !names.contains(&fk.table));
                if dangling {
                    warn!(table = %table.name, column = %column.name, "dropping foreign key into a skipped table");
                    column.foreign_key = None;
                }
            }
        }

        let mut kept = vec![];
        for assn in std::mem::take(&mut schema.associations) {
            let both_sides = names.contains(&assn.a.table) && names.contains(&assn.b.table);
            let same_enum = assn.a.table == assn.b.table && schema.is_type_table(&assn.a.table);
            if both_sides && !same_enum {
                kept.push(assn);
            } else {
                warn!(table = %assn.table, "skipping association table with unusable sides");
                schema.tables.shift_remove(&assn.table);
            }
        }
        schema.associations = kept;

        schema.verify()?;
        debug!(
            tables = schema.tables.len(),
            associations = schema.associations.len(),
            "schema described"
        );
        Ok(schema)
    }
}

fn describe_table(desc: &TableDescription, options: &DescribeOptions) -> Table {
    let pk_columns: Vec<&str> = desc
        .indexes
        .iter()
        .filter(|index| index.primary_key)
        .flat_map(|index| index.columns.iter().map(String::as_str))
        .collect();

    let mut table = Table::new(&desc.name);
    table.supports_fk = desc.supports_fk;
    table.comment = desc.comment.clone();
    table.options = Options::parse(&desc.comment);

    for col in &desc.columns {
        let (ty, sub_type) = map_native_type(options.dialect, &col.native_type).unwrap_or_else(|| {
            warn!(
                table = %desc.name,
                column = %col.name,
                native_type = %col.native_type,
                "unknown column type, treating as string"
            );
            (ColumnType::String, SubType::None)
        });

        let mut column = Column::new(&col.name, ty).sub_type(sub_type);
        column.native_type = col.native_type.clone();
        column.max_length = col.max_length.or_else(|| native_length(&col.native_type));
        column.nullable = col.nullable;
        column.auto_id = col.auto_increment;
        column.primary_key = pk_columns.contains(&col.name.as_str());
        column.default = col.default.as_deref().and_then(|raw| parse_default(raw, ty));
        column.options = Options::parse(&col.comment);

        column.unique = desc.indexes.iter().any(|index| {
            index.unique && index.columns.len() == 1 && index.columns[0] == col.name
        }) || (column.primary_key && pk_columns.len() == 1);

        if let Some(fk) = desc.foreign_keys.iter().find(|fk| fk.column == col.name) {
            column.foreign_key = Some(ForeignKey {
                table: fk.referenced_table.clone(),
                column: fk.referenced_column.clone(),
                on_update: FkAction::from_rule(&fk.on_update),
                on_delete: FkAction::from_rule(&fk.on_delete),
            });
        }

        table.columns.push(column);
    }

    for index in &desc.indexes {
        table.indexes.push(Index {
            name: index.name.clone(),
            unique: index.unique,
            primary_key: index.primary_key,
            columns: index.columns.clone(),
        });
    }

    table
}

fn describe_association(table: &Table) -> core::result::Result<Association, String> {
    let pks: Vec<&Column> = table.primary_keys().collect();
    let [a, b] = pks[..] else {
        return Err(format!("expected 2 primary key columns, found {}", pks.len()));
    };

    let mut sides = vec![];
    for column in [a, b] {
        let Some(fk) = &column.foreign_key else {
            return Err(format!("column `{}` is not a foreign key", column.name));
        };
        if column.nullable {
            return Err(format!("column `{}` is nullable", column.name));
        }
        if fk.on_delete != FkAction::Cascade {
            warn!(
                table = %table.name,
                column = %column.name,
                "association foreign key does not cascade on delete; rows are removed explicitly"
            );
        }
        let mut side = AssociationSide::new(&fk.table, &column.name);
        side.plural = column.options.get("plural").map(str::to_string);
        sides.push(side);
    }

    let b = sides.pop();
    let a = sides.pop();
    match (a, b) {
        (Some(a), Some(b)) => Ok(Association {
            table: table.name.clone(),
            a,
            b,
        }),
        _ => Err("association sides missing".to_string()),
    }
}
