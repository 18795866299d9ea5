use super::{JoinTree, Query};
use crate::{
    node::Node,
    schema::{ColumnType, Schema},
    Error, Result,
};

use indexmap::IndexMap;

/// A query with its join tree and projection resolved against the schema.
///
/// The plan fixes the column order of the result set: column aliases in
/// discovery order, followed by the user aliases of the query.
#[derive(Debug, Clone)]
pub struct Plan {
    pub query: Query,
    pub tree: JoinTree,

    /// Projected columns, named `c<n>`
    pub columns: Vec<ColumnAlias>,

    /// Plans of subqueries used as operands, keyed by the subquery
    pub subqueries: Vec<(Query, Plan)>,

    /// GROUP BY is present: only grouped columns and aliases are projected
    pub grouped: bool,

    /// Planned as an operand of another query
    pub nested: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAlias {
    pub alias: String,
    pub item: usize,
    pub column: String,
    pub ty: ColumnType,
}

struct Planner<'a> {
    schema: &'a Schema,
    tree: JoinTree,
    prefix: String,
    subqueries: Vec<(Query, Plan)>,
}

impl Plan {
    pub(crate) fn build(query: &Query, schema: &Schema) -> Result<Plan> {
        Plan::build_with_prefix(query, schema, "", false, &[])
    }

    /// Plans a query whose rows are counted over `nodes` instead of loaded.
    pub fn build_count(query: &Query, schema: &Schema, nodes: &[Node]) -> Result<Plan> {
        Plan::build_with_prefix(query, schema, "", false, nodes)
    }

    fn build_with_prefix(
        query: &Query,
        schema: &Schema,
        prefix: &str,
        nested: bool,
        extra: &[Node],
    ) -> Result<Plan> {
        let root_table = query
            .root
            .table_name()
            .ok_or_else(|| Error::invalid_statement("query root must be a table node"))?;
        schema.table(root_table)?;

        let mut planner = Planner {
            schema,
            tree: JoinTree::new(&query.root, prefix)?,
            prefix: prefix.to_string(),
            subqueries: vec![],
        };

        for join in &query.joins {
            if !join.node.is_table_like() || matches!(join.node, Node::Table(_)) {
                return Err(Error::invalid_statement(
                    "only reference, reverse reference and many-many nodes can be joined",
                ));
            }
            let item = planner.tree.insert(&join.node, true)?;
            if let Some(condition) = &join.condition {
                planner.tree.items[item].condition = Some(condition.clone());
            }
        }

        for node in &query.expansions {
            if !node.is_collection() {
                return Err(Error::invalid_statement(
                    "only reverse reference and many-many nodes can be expanded",
                ));
            }
            let item = planner.tree.insert(node, true)?;
            planner.tree.items[item].expanded = true;
        }

        let mut selected: IndexMap<usize, Vec<String>> = IndexMap::new();
        for node in &query.selects {
            match node {
                Node::Column(column) => {
                    let item = planner.table_item(&column.parent, !nested)?;
                    planner.check_column(item, &column.column)?;
                    let columns = selected.entry(item).or_default();
                    if !columns.contains(&column.column) {
                        columns.push(column.column.clone());
                    }
                }
                node if node.is_table_like() => {
                    planner.tree.insert(node, true)?;
                }
                _ => {
                    return Err(Error::invalid_statement(
                        "only columns can be selected; use an alias for expressions",
                    ))
                }
            }
        }

        // Everything else may add edges to evaluate the clause, but does not
        // materialize them.
        for join in &query.joins {
            if let Some(condition) = &join.condition {
                planner.visit(condition)?;
            }
        }
        if let Some(filter) = &query.filter {
            planner.visit(filter)?;
        }
        if let Some(having) = &query.having {
            planner.visit(having)?;
        }
        for node in &query.group_by {
            planner.visit(node)?;
        }
        for sort in &query.order_by {
            planner.visit(&sort.node)?;
        }
        for (_, node) in &query.aliases {
            planner.visit(node)?;
        }
        for node in extra {
            planner.visit(node)?;
        }

        if query.having.is_some() && query.group_by.is_empty() {
            return Err(Error::invalid_statement("HAVING requires GROUP BY"));
        }

        if query.limit.is_some() {
            if let Some(item) = planner
                .tree
                .items
                .iter()
                .find(|item| item.materialize && item.is_folded_collection())
            {
                return Err(Error::invalid_statement(format!(
                    "LIMIT cannot be combined with the joined collection `{}`; \
                     load the collection in a separate query",
                    item.node.edge_name().unwrap_or_default()
                )));
            }

            // A collection joined only to evaluate a clause repeats its
            // parent. DISTINCT over root columns collapses the repeats again.
            let collapsed = !query.group_by.is_empty()
                || (query.distinct && query.aliases.is_empty());
            if !collapsed {
                if let Some(item) = planner
                    .tree
                    .items
                    .iter()
                    .find(|item| !item.materialize && item.node.is_collection())
                {
                    return Err(Error::invalid_statement(format!(
                        "LIMIT would count the rows repeated by the collection `{}`; \
                         use DISTINCT or filter with a subquery",
                        item.node.edge_name().unwrap_or_default()
                    )));
                }
            }
        }

        let mut plan = Plan {
            query: query.clone(),
            tree: planner.tree,
            columns: vec![],
            subqueries: planner.subqueries,
            grouped: !query.group_by.is_empty(),
            nested,
        };

        if plan.grouped {
            for node in &query.group_by {
                match node {
                    Node::Column(column) => {
                        let item = plan.item_index(&column.parent)?;
                        plan.project(schema, item, &column.column)?;
                    }
                    Node::Reference(reference) => {
                        let item = plan.item_index(&reference.parent)?;
                        plan.project(schema, item, &reference.column)?;
                    }
                    node if node.is_table_like() => {
                        let item = plan.item_index(node)?;
                        let pk = plan.tree.items[item].pk().to_string();
                        plan.project(schema, item, &pk)?;
                    }
                    _ => {}
                }
            }
        } else if nested {
            for (item, columns) in &selected {
                for column in columns {
                    plan.project(schema, *item, column)?;
                }
            }
            if plan.columns.is_empty() && query.aliases.is_empty() {
                let pk = plan.tree.root().pk().to_string();
                plan.project(schema, 0, &pk)?;
            }
        } else {
            for item in plan.tree.depth_first() {
                if !plan.tree.items[item].materialize {
                    continue;
                }

                let pk = plan.tree.items[item].pk().to_string();
                let table = schema.table(plan.tree.items[item].table())?;

                let columns: Vec<String> = if query.selects.is_empty() {
                    table.column_names().map(str::to_string).collect()
                } else {
                    let mut columns = vec![pk.clone()];
                    for column in selected.get(&item).into_iter().flatten() {
                        if *column != pk {
                            columns.push(column.clone());
                        }
                    }
                    columns
                };

                for column in &columns {
                    plan.project(schema, item, column)?;
                }
            }
        }

        if plan.columns.is_empty() && query.aliases.is_empty() {
            return Err(Error::invalid_statement("query projects no columns"));
        }

        Ok(plan)
    }

    fn project(&mut self, schema: &Schema, item: usize, column: &str) -> Result<()> {
        let join_item = &self.tree.items[item];
        if join_item
            .columns
            .iter()
            .any(|&index| self.columns[index].column == column)
        {
            return Ok(());
        }

        let ty = schema.column(join_item.table(), column)?.ty;
        let is_pk = join_item.pk() == column;
        let index = self.columns.len();
        let alias = format!("{}c{}", self.tree_prefix(), index);

        self.columns.push(ColumnAlias {
            alias,
            item,
            column: column.to_string(),
            ty,
        });

        let join_item = &mut self.tree.items[item];
        join_item.columns.push(index);
        if is_pk {
            join_item.pk_column = Some(index);
        }
        Ok(())
    }

    fn tree_prefix(&self) -> &str {
        self.tree
            .root()
            .alias
            .strip_suffix("t0")
            .unwrap_or_default()
    }

    fn item_index(&self, node: &Node) -> Result<usize> {
        self.tree.find(node).ok_or_else(|| {
            Error::invalid_statement(format!(
                "`{}` is not part of the query",
                node.table_name().unwrap_or_default()
            ))
        })
    }

    /// Item of the join tree standing for a table-like node.
    pub fn item_for(&self, node: &Node) -> Result<&super::JoinItem> {
        Ok(&self.tree.items[self.item_index(node)?])
    }

    pub fn subquery(&self, query: &Query) -> Result<&Plan> {
        self.subqueries
            .iter()
            .find(|(q, _)| q == query)
            .map(|(_, plan)| plan)
            .ok_or_else(|| err!("subquery was not planned"))
    }

    /// Expected type of every result column, in projection order. User
    /// aliases are scanned by native type.
    pub fn ret(&self) -> Vec<Option<ColumnType>> {
        self.columns
            .iter()
            .map(|column| Some(column.ty))
            .chain(self.query.aliases.iter().map(|_| None))
            .collect()
    }

    /// Total number of result columns.
    pub fn width(&self) -> usize {
        self.columns.len() + self.query.aliases.len()
    }
}

impl Planner<'_> {
    fn table_item(&mut self, parent: &Node, materialize: bool) -> Result<usize> {
        if !parent.is_table_like() {
            return Err(Error::invalid_statement("column parent is not a table node"));
        }
        self.tree.insert(parent, materialize)
    }

    fn check_column(&self, item: usize, column: &str) -> Result<()> {
        self.schema
            .column(self.tree.items[item].table(), column)
            .map(|_| ())
    }

    fn visit(&mut self, node: &Node) -> Result<()> {
        match node {
            Node::Column(column) => {
                let item = self.table_item(&column.parent, false)?;
                self.check_column(item, &column.column)?;
            }
            // Rendered as the foreign key column of the parent; no join needed.
            Node::Reference(reference) => {
                self.table_item(&reference.parent, false)?;
            }
            Node::Table(_) | Node::ReverseReference(_) | Node::ManyMany(_) => {
                self.tree.insert(node, false)?;
            }
            Node::Operation(op) => {
                for operand in &op.operands {
                    self.visit(operand)?;
                }
            }
            Node::Subquery(sub) => {
                if !self.subqueries.iter().any(|(q, _)| q == &*sub.query) {
                    let prefix = format!("{}s{}", self.prefix, self.subqueries.len());
                    let plan = Plan::build_with_prefix(&sub.query, self.schema, &prefix, true, &[])?;
                    self.subqueries.push(((*sub.query).clone(), plan));
                }
            }
            Node::Value(_) | Node::Alias(_) => {}
        }
        Ok(())
    }
}
