use super::{Column, Index, Options};
use crate::{Error, Result};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name, optionally schema-qualified (`public.person`)
    pub name: String,

    pub columns: Vec<Column>,

    #[serde(default)]
    pub indexes: Vec<Index>,

    /// The storage engine enforces foreign keys. When false, referential
    /// actions are emulated on delete.
    #[serde(default = "default_true")]
    pub supports_fk: bool,

    #[serde(default)]
    pub comment: String,

    #[serde(default)]
    pub options: Options,

    /// Rows are loaded eagerly as enumeration constants
    #[serde(default)]
    pub is_type_table: bool,

    /// Two-column table mediating a many-many relationship
    #[serde(default)]
    pub is_association: bool,
}

fn default_true() -> bool {
    true
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: vec![],
            indexes: vec![],
            supports_fk: true,
            comment: String::new(),
            options: Options::default(),
            is_type_table: false,
            is_association: false,
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn type_table(mut self) -> Self {
        self.is_type_table = true;
        self
    }

    pub fn association(mut self) -> Self {
        self.is_association = true;
        self
    }

    pub fn without_fk_support(mut self) -> Self {
        self.supports_fk = false;
        self
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns.iter().find(|c| c.name == name).ok_or_else(|| {
            Error::invalid_schema(format!("column `{}.{}` not found", self.name, name))
        })
    }

    pub fn primary_keys(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.primary_key)
    }

    /// The single primary-key column. Composite keys are only supported on
    /// association tables.
    pub fn primary_key(&self) -> Result<&Column> {
        let mut pks = self.primary_keys();
        match (pks.next(), pks.next()) {
            (Some(pk), None) => Ok(pk),
            (None, _) => Err(Error::invalid_schema(format!(
                "table `{}` has no primary key",
                self.name
            ))),
            (Some(_), Some(_)) => Err(Error::invalid_schema(format!(
                "table `{}` has a composite primary key",
                self.name
            ))),
        }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
