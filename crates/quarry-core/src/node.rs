//! Symbolic references to tables, columns, edges, and expressions.
//!
//! Nodes are built by generated accessors (`person().projects().manager()`)
//! and composed freely. Each accessor returns a fresh node whose parent is the
//! receiver, so the parent chain always leads back to a root table node.
//! Nodes compare structurally: two nodes denote the same entity when their
//! kind, names, and parent chain match.

pub mod codec;

mod operator;
pub use operator::Operator;

pub mod ops;

mod sort;
pub use sort::Sort;

use crate::{query::Query, schema::Edge, stmt::Value};

use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Node {
    Table(TableNode),
    Column(ColumnNode),
    Reference(ReferenceNode),
    ReverseReference(ReverseReferenceNode),
    ManyMany(ManyManyNode),
    Operation(OperationNode),
    Value(Value),
    Alias(AliasNode),
    Subquery(SubqueryNode),
}

/// Root of a query: a table addressed directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableNode {
    pub table: String,
    pub pk: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnNode {
    pub parent: Arc<Node>,
    pub column: String,
}

/// Forward foreign key: `parent.column` references `table.ref_column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceNode {
    pub parent: Arc<Node>,
    pub name: String,
    pub column: String,
    pub table: String,
    pub ref_column: String,
    pub pk: String,
}

/// One-to-many from the referenced side: rows of `table` whose
/// `child_column` references `parent.column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReverseReferenceNode {
    pub parent: Arc<Node>,
    pub name: String,
    pub column: String,
    pub table: String,
    pub child_column: String,
    pub pk: String,

    /// False when the foreign key is unique
    pub is_array: bool,
}

/// Rows of `table` related to the parent through `assn_table`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManyManyNode {
    pub parent: Arc<Node>,
    pub name: String,
    pub assn_table: String,
    pub this_column: String,
    pub other_column: String,
    pub table: String,
    pub pk: String,
    pub is_type_table: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationNode {
    pub op: Operator,
    pub operands: Vec<Node>,

    /// Function name for [`Operator::Func`]
    pub func: Option<String>,

    /// `DISTINCT` inside an aggregate or function call
    pub distinct: bool,
}

/// Refers to a projection registered with [`Query::alias`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliasNode {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubqueryNode {
    pub query: Box<Query>,
}

impl Node {
    pub fn table(table: impl Into<String>, pk: impl Into<String>) -> Node {
        Node::Table(TableNode {
            table: table.into(),
            pk: pk.into(),
        })
    }

    pub fn column(&self, column: impl Into<String>) -> Node {
        Node::Column(ColumnNode {
            parent: Arc::new(self.clone()),
            column: column.into(),
        })
    }

    pub fn reference(
        &self,
        name: impl Into<String>,
        column: impl Into<String>,
        table: impl Into<String>,
        ref_column: impl Into<String>,
        pk: impl Into<String>,
    ) -> Node {
        Node::Reference(ReferenceNode {
            parent: Arc::new(self.clone()),
            name: name.into(),
            column: column.into(),
            table: table.into(),
            ref_column: ref_column.into(),
            pk: pk.into(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn reverse(
        &self,
        name: impl Into<String>,
        column: impl Into<String>,
        table: impl Into<String>,
        child_column: impl Into<String>,
        pk: impl Into<String>,
        is_array: bool,
    ) -> Node {
        Node::ReverseReference(ReverseReferenceNode {
            parent: Arc::new(self.clone()),
            name: name.into(),
            column: column.into(),
            table: table.into(),
            child_column: child_column.into(),
            pk: pk.into(),
            is_array,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn many_many(
        &self,
        name: impl Into<String>,
        assn_table: impl Into<String>,
        this_column: impl Into<String>,
        other_column: impl Into<String>,
        table: impl Into<String>,
        pk: impl Into<String>,
        is_type_table: bool,
    ) -> Node {
        Node::ManyMany(ManyManyNode {
            parent: Arc::new(self.clone()),
            name: name.into(),
            assn_table: assn_table.into(),
            this_column: this_column.into(),
            other_column: other_column.into(),
            table: table.into(),
            pk: pk.into(),
            is_type_table,
        })
    }

    /// Follows a schema edge from this table-like node.
    pub fn follow(&self, edge: &Edge) -> Node {
        match edge {
            Edge::Forward(e) => {
                self.reference(&e.name, &e.column, &e.ref_table, &e.ref_column, &e.ref_pk)
            }
            Edge::Reverse(e) => self.reverse(
                &e.name,
                &e.column,
                &e.child_table,
                &e.child_column,
                &e.child_pk,
                e.is_array,
            ),
            Edge::ManyMany(e) => self.many_many(
                &e.name,
                &e.assn_table,
                &e.this_column,
                &e.other_column,
                &e.other_table,
                &e.other_pk,
                e.is_type_table,
            ),
        }
    }

    pub fn parent(&self) -> Option<&Node> {
        match self {
            Node::Column(n) => Some(&n.parent),
            Node::Reference(n) => Some(&n.parent),
            Node::ReverseReference(n) => Some(&n.parent),
            Node::ManyMany(n) => Some(&n.parent),
            _ => None,
        }
    }

    /// Table, forward, reverse and many-many nodes: anything that stands for
    /// rows of a table.
    pub fn is_table_like(&self) -> bool {
        matches!(
            self,
            Node::Table(_) | Node::Reference(_) | Node::ReverseReference(_) | Node::ManyMany(_)
        )
    }

    /// Reverse-array and many-many edges, which fold into lists.
    pub fn is_collection(&self) -> bool {
        match self {
            Node::ReverseReference(n) => n.is_array,
            Node::ManyMany(_) => true,
            _ => false,
        }
    }

    /// Name of the table whose rows this node stands for.
    pub fn table_name(&self) -> Option<&str> {
        match self {
            Node::Table(n) => Some(&n.table),
            Node::Reference(n) => Some(&n.table),
            Node::ReverseReference(n) => Some(&n.table),
            Node::ManyMany(n) => Some(&n.table),
            _ => None,
        }
    }

    pub fn pk_name(&self) -> Option<&str> {
        match self {
            Node::Table(n) => Some(&n.pk),
            Node::Reference(n) => Some(&n.pk),
            Node::ReverseReference(n) => Some(&n.pk),
            Node::ManyMany(n) => Some(&n.pk),
            _ => None,
        }
    }

    /// Edge name used to store joined records on their parent.
    pub fn edge_name(&self) -> Option<&str> {
        match self {
            Node::Reference(n) => Some(&n.name),
            Node::ReverseReference(n) => Some(&n.name),
            Node::ManyMany(n) => Some(&n.name),
            _ => None,
        }
    }

    /// Table-like node at the top of the parent chain.
    pub fn root(&self) -> &Node {
        let mut node = self;
        while let Some(parent) = node.parent() {
            node = parent;
        }
        node
    }

    /// Table-like nodes from the root down to this node (or to its table for
    /// a column).
    pub fn table_chain(&self) -> Vec<&Node> {
        let mut chain = vec![];
        let mut node = Some(self);
        while let Some(n) = node {
            if n.is_table_like() {
                chain.push(n);
            }
            node = n.parent();
        }
        chain.reverse();
        chain
    }

    pub fn as_operation(&self) -> Option<&OperationNode> {
        match self {
            Node::Operation(op) => Some(op),
            _ => None,
        }
    }

    /// Marks an aggregate or function call `DISTINCT`. Other nodes are
    /// returned unchanged.
    pub fn distinct(self) -> Node {
        match self {
            Node::Operation(mut op) => {
                op.distinct = true;
                Node::Operation(op)
            }
            node => node,
        }
    }

    pub fn ascending(self) -> Sort {
        Sort {
            node: self,
            descending: false,
        }
    }

    pub fn descending(self) -> Sort {
        Sort {
            node: self,
            descending: true,
        }
    }

    pub fn subquery(query: Query) -> Node {
        Node::Subquery(SubqueryNode {
            query: Box::new(query),
        })
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Value(value)
    }
}

macro_rules! impl_from_scalar {
    ( $( $ty:ty ),* ) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::Value(Value::from(value))
                }
            }
        )*
    };
}

impl_from_scalar!(
    bool,
    i32,
    i64,
    u32,
    u64,
    f32,
    f64,
    String,
    &str,
    &String,
    chrono::DateTime<chrono::Utc>
);

impl From<&Node> for Node {
    fn from(value: &Node) -> Self {
        value.clone()
    }
}
