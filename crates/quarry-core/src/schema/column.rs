use super::{FkAction, ForeignKey};
use crate::stmt::Value;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,

    /// Type as reported by the database, e.g. `varchar(50)`
    #[serde(default)]
    pub native_type: String,

    pub ty: ColumnType,

    #[serde(default)]
    pub sub_type: SubType,

    /// Maximum length in characters for string columns
    #[serde(default)]
    pub max_length: Option<u64>,

    #[serde(default)]
    pub nullable: bool,

    /// The database assigns the value on insert
    #[serde(default)]
    pub auto_id: bool,

    #[serde(default)]
    pub primary_key: bool,

    /// Unique on its own, making a reverse reference to it singular
    #[serde(default)]
    pub unique: bool,

    #[serde(default)]
    pub default: Option<Value>,

    #[serde(default)]
    pub foreign_key: Option<ForeignKey>,

    #[serde(default)]
    pub options: super::Options,
}

/// Semantic type tag choosing how values are bound and scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    Bool,
    Int,
    Int64,
    Unsigned,
    Unsigned64,
    Float32,
    Float64,
    String,
    Bytes,
    Time,
}

/// Which part of a time value is meaningful.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubType {
    #[default]
    None,
    Date,
    Time,
    Timestamp,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            native_type: String::new(),
            ty,
            sub_type: SubType::None,
            max_length: None,
            nullable: false,
            auto_id: false,
            primary_key: false,
            unique: false,
            default: None,
            foreign_key: None,
            options: Default::default(),
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_id(mut self) -> Self {
        self.auto_id = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn sub_type(mut self, sub_type: SubType) -> Self {
        self.sub_type = sub_type;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Adds a foreign key with the given delete action; updates cascade.
    pub fn references(mut self, table: &str, column: &str, on_delete: FkAction) -> Self {
        self.foreign_key = Some(ForeignKey {
            table: table.into(),
            column: column.into(),
            on_update: FkAction::Cascade,
            on_delete,
        });
        self
    }

    pub fn is_foreign_key(&self) -> bool {
        self.foreign_key.is_some()
    }

    /// Value written when a referencing row is detached with `SET DEFAULT`.
    pub fn default_or_null(&self) -> Value {
        self.default.clone().unwrap_or(Value::Null)
    }
}

impl ColumnType {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            ColumnType::Int | ColumnType::Int64 | ColumnType::Unsigned | ColumnType::Unsigned64
        )
    }
}
