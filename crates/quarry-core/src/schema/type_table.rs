use crate::stmt::Value;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Rows of an enumeration table, ordered by primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeTable {
    pub table: String,
    pub pk: String,
    pub rows: Vec<TypeRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRow {
    pub id: i64,
    pub name: String,

    /// Remaining columns of the row
    #[serde(default)]
    pub fields: IndexMap<String, Value>,
}

impl TypeTable {
    pub fn new(table: impl Into<String>, pk: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            pk: pk.into(),
            rows: vec![],
        }
    }

    pub fn row(mut self, id: i64, name: impl Into<String>) -> Self {
        self.rows.push(TypeRow {
            id,
            name: name.into(),
            fields: IndexMap::new(),
        });
        self
    }

    pub fn name_of(&self, id: i64) -> Option<&str> {
        self.rows.iter().find(|r| r.id == id).map(|r| r.name.as_str())
    }

    /// Reverse lookup by constant name, ignoring case.
    pub fn id_of(&self, name: &str) -> Option<i64> {
        self.rows
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name))
            .map(|r| r.id)
    }
}
