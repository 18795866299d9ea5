use super::{FkAction, Schema};
use crate::{Error, Result};

/// A relationship leaving a table, as reached from a record of that table.
#[derive(Debug, Clone, PartialEq)]
pub enum Edge {
    Forward(ForwardEdge),
    Reverse(ReverseEdge),
    ManyMany(ManyManyEdge),
}

/// The owning table holds a foreign key to `ref_table`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardEdge {
    pub name: String,
    pub column: String,
    pub ref_table: String,
    pub ref_column: String,
    pub ref_pk: String,
}

/// Rows of `child_table` hold a foreign key to the owning table.
#[derive(Debug, Clone, PartialEq)]
pub struct ReverseEdge {
    pub name: String,

    /// Column of the owning table the foreign key references
    pub column: String,

    pub child_table: String,
    pub child_column: String,
    pub child_pk: String,
    pub child_nullable: bool,

    /// False when the foreign key column is unique: at most one child
    pub is_array: bool,

    pub on_delete: FkAction,
}

/// Related through an association table.
#[derive(Debug, Clone, PartialEq)]
pub struct ManyManyEdge {
    pub name: String,
    pub pk: String,
    pub assn_table: String,
    pub this_column: String,
    pub other_column: String,
    pub other_table: String,
    pub other_pk: String,
    pub is_type_table: bool,
}

impl Edge {
    pub fn name(&self) -> &str {
        match self {
            Edge::Forward(e) => &e.name,
            Edge::Reverse(e) => &e.name,
            Edge::ManyMany(e) => &e.name,
        }
    }

    /// The edge yields a list of records rather than at most one.
    pub fn is_collection(&self) -> bool {
        match self {
            Edge::Forward(_) => false,
            Edge::Reverse(e) => e.is_array,
            Edge::ManyMany(_) => true,
        }
    }
}

pub(crate) fn stem(column: &str) -> &str {
    column.strip_suffix("_id").unwrap_or(column)
}

fn plural(word: &str) -> String {
    pluralizer::pluralize(word, 2, false)
}

impl Schema {
    /// All edges leaving `table`, in a stable order: forward references in
    /// column order, then reverse references, then many-many.
    pub fn edges(&self, table: &str) -> Result<Vec<Edge>> {
        let owner = self.table(table)?;
        let owner_pk = owner.primary_key()?.name.clone();
        let mut edges = vec![];

        for column in &owner.columns {
            let Some(fk) = &column.foreign_key else {
                continue;
            };
            if self.is_type_table(&fk.table) {
                continue;
            }
            let ref_pk = self.table(&fk.table)?.primary_key()?.name.clone();
            edges.push(Edge::Forward(ForwardEdge {
                name: column
                    .options
                    .get("name")
                    .map(str::to_string)
                    .unwrap_or_else(|| stem(&column.name).to_string()),
                column: column.name.clone(),
                ref_table: fk.table.clone(),
                ref_column: fk.column.clone(),
                ref_pk,
            }));
        }

        for child in self.tables.values() {
            if child.is_association || child.is_type_table {
                continue;
            }
            for column in &child.columns {
                let Some(fk) = &column.foreign_key else {
                    continue;
                };
                if fk.table != owner.name {
                    continue;
                }

                let is_array = !column.unique;
                let name = match column.options.get("reverse") {
                    Some(name) => name.to_string(),
                    None => {
                        let base = if is_array {
                            plural(&child.name)
                        } else {
                            child.name.clone()
                        };
                        let stem = stem(&column.name);
                        if stem == owner.name {
                            base
                        } else {
                            format!("{base}_as_{stem}")
                        }
                    }
                };

                edges.push(Edge::Reverse(ReverseEdge {
                    name,
                    column: fk.column.clone(),
                    child_table: child.name.clone(),
                    child_column: column.name.clone(),
                    child_pk: child.primary_key()?.name.clone(),
                    child_nullable: column.nullable,
                    is_array,
                    on_delete: fk.on_delete,
                }));
            }
        }

        for assn in &self.associations {
            let Some((this, other)) = assn.sides_from(table) else {
                continue;
            };
            let other_table = self.table(&other.table)?;
            let name = match &other.plural {
                Some(name) => name.clone(),
                None => plural(stem(&other.column)),
            };
            edges.push(Edge::ManyMany(ManyManyEdge {
                name,
                pk: owner_pk.clone(),
                assn_table: assn.table.clone(),
                this_column: this.column.clone(),
                other_column: other.column.clone(),
                other_table: other.table.clone(),
                other_pk: other_table.primary_key()?.name.clone(),
                is_type_table: other_table.is_type_table,
            }));
        }

        Ok(edges)
    }

    pub fn edge(&self, table: &str, name: &str) -> Result<Edge> {
        self.edges(table)?
            .into_iter()
            .find(|edge| edge.name() == name)
            .ok_or_else(|| Error::invalid_schema(format!("table `{table}` has no edge `{name}`")))
    }
}
