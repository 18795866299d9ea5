//! JSON encoding of records.
//!
//! Columns are keyed by their camel-cased name. A column referencing an
//! enumeration table drops its `_id` suffix and carries the constant's name
//! (`status_type_id = 3` becomes `"statusType": "Completed"`). Joined
//! references nest as objects and collections as arrays. Decoding is the
//! inverse and ignores keys it does not know.

use crate::Row;

use quarry_core::{
    err,
    schema::{Column, Edge, Schema, Table},
    stmt::Value,
    Error, Result,
};

use heck::ToLowerCamelCase;
use serde_json::{Map, Number};
use tracing::trace;

/// Encodes a row and everything joined to it.
pub fn to_value(row: &Row, schema: &Schema) -> Result<serde_json::Value> {
    let table = schema.table(row.table())?;
    let mut map = Map::new();

    for (name, value) in row.columns() {
        let column = table.column(name)?;
        match schema.enumeration_for(column) {
            Some(enumeration) => {
                let encoded = match value {
                    Value::Null => serde_json::Value::Null,
                    value => match enumeration.name_of(value.to_i64()?) {
                        Some(name) => name.into(),
                        None => value_to_json(value),
                    },
                };
                map.insert(enum_key(&column.name), encoded);
            }
            None => {
                map.insert(name.to_lower_camel_case(), value_to_json(value));
            }
        }
    }

    for (edge, referenced) in &row.references {
        let encoded = match referenced {
            Some(referenced) => to_value(referenced, schema)?,
            None => serde_json::Value::Null,
        };
        map.insert(edge.to_lower_camel_case(), encoded);
    }

    for (edge, collection) in &row.collections {
        let single = matches!(
            schema.edge(row.table(), edge),
            Ok(Edge::Reverse(ref reverse)) if !reverse.is_array
        );

        let encoded = if single {
            match collection.rows().first() {
                Some(member) => to_value(member, schema)?,
                None => serde_json::Value::Null,
            }
        } else {
            collection
                .iter()
                .map(|member| to_value(member, schema))
                .collect::<Result<Vec<_>>>()?
                .into()
        };
        map.insert(edge.to_lower_camel_case(), encoded);
    }

    for (name, value) in row.aliases() {
        map.insert(name.to_string(), value_to_json(value));
    }

    Ok(map.into())
}

/// Decodes a row of `table`. Every decoded column is marked dirty; a row
/// whose primary key is present counts as already saved.
pub fn from_value(table: &str, value: &serde_json::Value, schema: &Schema) -> Result<Row> {
    let table = schema.table(table)?;
    let pk = table.primary_key()?;
    let serde_json::Value::Object(map) = value else {
        return Err(err!("expected a JSON object for `{}`", table.name));
    };

    let mut row = Row::new(&table.name, &pk.name);

    for (key, value) in map {
        if let Some(column) = column_for_key(schema, table, key) {
            let decoded = match schema.enumeration_for(column) {
                Some(enumeration) => match value {
                    serde_json::Value::String(name) => match enumeration.id_of(name) {
                        Some(id) => Value::I64(id).coerce(column.ty)?,
                        None => {
                            return Err(Error::type_conversion(
                                Value::String(name.clone()),
                                "enumeration constant",
                            )
                            .context(err!("`{}` has no constant `{name}`", enumeration.table)))
                        }
                    },
                    value => json_to_value(value)?.coerce(column.ty)?,
                },
                None => json_to_value(value)?.coerce(column.ty)?,
            };
            row.set(column.name.clone(), decoded);
            continue;
        }

        let Some(edge) = edge_for_key(schema, &table.name, key)? else {
            trace!(table = %table.name, key, "ignoring unknown JSON key");
            continue;
        };

        match &edge {
            Edge::Forward(forward) => {
                let referenced = match value {
                    serde_json::Value::Null => None,
                    value => Some(from_value(&forward.ref_table, value, schema)?),
                };
                row.set_reference(forward.name.clone(), referenced);
            }
            Edge::Reverse(reverse) => {
                let members = decode_members(&reverse.child_table, value, schema)?;
                row.set_collection(reverse.name.clone(), members);
            }
            Edge::ManyMany(many) => {
                let members = decode_members(&many.other_table, value, schema)?;
                row.set_collection(many.name.clone(), members);
            }
        }
    }

    if row.pk().is_some() {
        row.saved = true;
        row.dirty.shift_remove(&pk.name);
    }
    Ok(row)
}

fn decode_members(table: &str, value: &serde_json::Value, schema: &Schema) -> Result<Vec<Row>> {
    match value {
        serde_json::Value::Null => Ok(vec![]),
        serde_json::Value::Array(members) => members
            .iter()
            .map(|member| from_value(table, member, schema))
            .collect(),
        member => Ok(vec![from_value(table, member, schema)?]),
    }
}

fn enum_key(column: &str) -> String {
    column
        .strip_suffix("_id")
        .unwrap_or(column)
        .to_lower_camel_case()
}

fn column_for_key<'a>(schema: &Schema, table: &'a Table, key: &str) -> Option<&'a Column> {
    table.columns.iter().find(|column| {
        if schema.enumeration_for(column).is_some() {
            enum_key(&column.name) == key || column.name.to_lower_camel_case() == key
        } else {
            column.name.to_lower_camel_case() == key
        }
    })
}

fn edge_for_key(schema: &Schema, table: &str, key: &str) -> Result<Option<Edge>> {
    Ok(schema
        .edges(table)?
        .into_iter()
        .find(|edge| edge.name().to_lower_camel_case() == key))
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(v) => (*v).into(),
        Value::I32(v) => (*v).into(),
        Value::I64(v) => (*v).into(),
        Value::U32(v) => (*v).into(),
        Value::U64(v) => (*v).into(),
        Value::F32(v) => float(f64::from(*v)),
        Value::F64(v) => float(*v),
        Value::String(v) => v.as_str().into(),
        Value::Bytes(v) => v.iter().copied().map(serde_json::Value::from).collect(),
        Value::Time(v) => v.to_rfc3339().into(),
        Value::List(values) => values.iter().map(value_to_json).collect(),
    }
}

fn float(v: f64) -> serde_json::Value {
    Number::from_f64(v)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn json_to_value(value: &serde_json::Value) -> Result<Value> {
    Ok(match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(v) => Value::Bool(*v),
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Value::I64(v)
            } else if let Some(v) = n.as_u64() {
                Value::U64(v)
            } else {
                Value::F64(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(v) => Value::String(v.clone()),
        serde_json::Value::Array(values) => {
            if values.iter().all(|v| v.as_u64().is_some_and(|b| b <= 255)) && !values.is_empty() {
                Value::Bytes(values.iter().filter_map(|v| v.as_u64()).map(|b| b as u8).collect())
            } else {
                Value::List(values.iter().map(json_to_value).collect::<Result<_>>()?)
            }
        }
        serde_json::Value::Object(_) => return Err(err!("nested object where a column value was expected")),
    })
}
