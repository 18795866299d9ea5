mod association;
pub use association::{Association, AssociationSide};

mod column;
pub use column::{Column, ColumnType, SubType};

pub mod describe;
pub use describe::{
    ColumnDescription, DescribeOptions, Description, Dialect, ForeignKeyDescription,
    IndexDescription, TableDescription,
};

mod edge;
pub use edge::{Edge, ForwardEdge, ManyManyEdge, ReverseEdge};

mod fk;
pub use fk::{FkAction, ForeignKey};

mod index;
pub use index::Index;

mod options;
pub use options::Options;

mod table;
pub use table::Table;

mod type_table;
pub use type_table::{TypeRow, TypeTable};

mod verify;

use crate::{Error, Result};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Pre-computed description of a database: tables, associations, and
/// enumeration tables. Read-only once built and shared behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Regular and enumeration tables, keyed by name
    pub tables: IndexMap<String, Table>,

    /// Many-many association tables
    pub associations: Vec<Association>,

    /// Rows of enumeration tables, keyed by table name
    #[serde(default)]
    pub type_tables: IndexMap<String, TypeTable>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    pub fn table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::invalid_schema(format!("table `{name}` not found")))
    }

    pub fn column(&self, table: &str, column: &str) -> Result<&Column> {
        self.table(table)?.column(column)
    }

    pub fn association(&self, name: &str) -> Result<&Association> {
        self.associations
            .iter()
            .find(|assn| assn.table == name)
            .ok_or_else(|| Error::invalid_schema(format!("association table `{name}` not found")))
    }

    pub fn is_type_table(&self, name: &str) -> bool {
        self.tables.get(name).is_some_and(|t| t.is_type_table)
    }

    pub fn type_table(&self, name: &str) -> Result<&TypeTable> {
        self.type_tables
            .get(name)
            .ok_or_else(|| Error::invalid_schema(format!("enumeration table `{name}` not loaded")))
    }

    /// Returns the enumeration table a column points at, if any.
    pub fn enumeration_for(&self, column: &Column) -> Option<&TypeTable> {
        let fk = column.foreign_key.as_ref()?;
        self.type_tables.get(&fk.table)
    }

    /// Loads a schema serialized with [`Schema::to_json`], e.g. a file
    /// written for offline code generation.
    pub fn from_json(src: &str) -> Result<Schema> {
        let schema: Schema = serde_json::from_str(src)?;
        schema.verify()?;
        Ok(schema)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
