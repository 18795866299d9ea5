use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    pub primary_key: bool,
    pub columns: Vec<String>,
}

impl Index {
    /// A unique index over exactly one column.
    pub fn unique_column(&self) -> Option<&str> {
        match &self.columns[..] {
            [column] if self.unique || self.primary_key => Some(column),
            _ => None,
        }
    }
}
