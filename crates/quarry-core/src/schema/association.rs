use serde::{Deserialize, Serialize};

/// A many-many relationship mediated by a two-column association table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub table: String,
    pub a: AssociationSide,
    pub b: AssociationSide,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationSide {
    /// Table this side points at
    pub table: String,

    /// Column of the association table holding this side's key
    pub column: String,

    /// Custom plural name of the edge leading to this side
    #[serde(default)]
    pub plural: Option<String>,
}

impl AssociationSide {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            plural: None,
        }
    }
}

impl Association {
    /// Returns `(this, other)` as seen from `table`. A self-association
    /// resolves to side `a` first.
    pub fn sides_from(&self, table: &str) -> Option<(&AssociationSide, &AssociationSide)> {
        if self.a.table == table {
            Some((&self.a, &self.b))
        } else if self.b.table == table {
            Some((&self.b, &self.a))
        } else {
            None
        }
    }
}
