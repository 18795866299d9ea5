mod join_tree;
pub use join_tree::{JoinItem, JoinTree};

mod plan;
pub use plan::{ColumnAlias, Plan};

use crate::{
    node::{ops, Node, Sort},
    schema::Schema,
    Result,
};

use serde::{Deserialize, Serialize};

/// Accumulator for one logical query.
///
/// Every method only records what was asked for. Composition errors (a
/// LIMIT with a folded collection join, a column that does not exist) are
/// reported by [`Query::plan`], so a builder may be adjusted and reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    pub root: Node,
    pub joins: Vec<Join>,
    pub selects: Vec<Node>,
    pub filter: Option<Node>,
    pub having: Option<Node>,
    pub group_by: Vec<Node>,
    pub order_by: Vec<Sort>,

    /// Computed projections, exposed on each row under their name
    pub aliases: Vec<(String, Node)>,

    pub distinct: bool,
    pub limit: Option<Limit>,

    /// Collection edges returned as one row per child instead of folded
    pub expansions: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Join {
    pub node: Node,

    /// Extra predicate AND-ed into the ON clause
    pub condition: Option<Node>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Limit {
    pub max: u64,
    pub offset: u64,
}

impl Query {
    pub fn new(root: Node) -> Self {
        Self {
            root,
            joins: vec![],
            selects: vec![],
            filter: None,
            having: None,
            group_by: vec![],
            order_by: vec![],
            aliases: vec![],
            distinct: false,
            limit: None,
            expansions: vec![],
        }
    }

    /// Requests eager materialization of an edge, and implicitly of all its
    /// ancestors.
    pub fn join(&mut self, node: impl Into<Node>) -> &mut Self {
        self.joins.push(Join {
            node: node.into(),
            condition: None,
        });
        self
    }

    pub fn join_on(&mut self, node: impl Into<Node>, condition: impl Into<Node>) -> &mut Self {
        self.joins.push(Join {
            node: node.into(),
            condition: Some(condition.into()),
        });
        self
    }

    pub fn select(&mut self, columns: impl IntoIterator<Item = Node>) -> &mut Self {
        self.selects.extend(columns);
        self
    }

    /// AND-s a predicate into the WHERE clause.
    pub fn filter(&mut self, node: impl Into<Node>) -> &mut Self {
        self.filter = Some(and_into(self.filter.take(), node.into()));
        self
    }

    /// AND-s a predicate into the HAVING clause.
    pub fn having(&mut self, node: impl Into<Node>) -> &mut Self {
        self.having = Some(and_into(self.having.take(), node.into()));
        self
    }

    pub fn group_by(&mut self, nodes: impl IntoIterator<Item = Node>) -> &mut Self {
        self.group_by.extend(nodes);
        self
    }

    pub fn order_by(&mut self, sorts: impl IntoIterator<Item = Sort>) -> &mut Self {
        self.order_by.extend(sorts);
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    pub fn limit(&mut self, max: u64, offset: u64) -> &mut Self {
        self.limit = Some(Limit { max, offset });
        self
    }

    pub fn alias(&mut self, name: impl Into<String>, node: impl Into<Node>) -> &mut Self {
        self.aliases.push((name.into(), node.into()));
        self
    }

    /// The expression registered under `name` with [`Query::alias`].
    pub fn aliased(&self, name: &str) -> Option<&Node> {
        self.aliases
            .iter()
            .find(|(alias, _)| alias == name)
            .map(|(_, node)| node)
    }

    pub fn expand(&mut self, node: impl Into<Node>) -> &mut Self {
        self.expansions.push(node.into());
        self
    }

    /// Builds the join tree and projection for this query.
    pub fn plan(&self, schema: &Schema) -> Result<Plan> {
        Plan::build(self, schema)
    }
}

fn and_into(existing: Option<Node>, node: Node) -> Node {
    match existing {
        None => node,
        Some(Node::Operation(mut op)) if op.op == crate::node::Operator::And => {
            op.operands.push(node);
            Node::Operation(op)
        }
        Some(existing) => ops::and([existing, node]),
    }
}
