use super::{node::Expr, Comma, Flavor, Formatter, Ident, Params, Qualified, ToSql};

use quarry_core::{
    err,
    node::Node,
    query::Plan,
    stmt::Count,
    Error, Result,
};

/// `SELECT` of a planned query.
pub(super) struct Select<'a>(pub(super) &'a Plan);

/// `FROM` and `JOIN` clauses.
struct FromClause<'a>(&'a Plan);

/// `WHERE` clause, if any.
struct WhereClause<'a>(&'a Plan);

impl ToSql for Select<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let plan = self.0;
        let query = &plan.query;

        fmt!(f, "SELECT ");
        if query.distinct {
            fmt!(f, "DISTINCT ");
        }

        let mut s = "";
        for column in &plan.columns {
            let item = &plan.tree.items[column.item];
            fmt!(f, s Qualified(&item.alias, &column.column) " AS " Ident(&column.alias));
            s = ", ";
        }
        for (name, node) in &query.aliases {
            fmt!(f, s Expr::new(plan, node) " AS " Ident(name));
            s = ", ";
        }

        fmt!(f, FromClause(plan) WhereClause(plan));

        if !query.group_by.is_empty() {
            let nodes = query.group_by.iter().map(|node| Expr::new(plan, node));
            fmt!(f, " GROUP BY " Comma(nodes));
        }

        if let Some(having) = &query.having {
            fmt!(f, " HAVING " Expr::new(plan, having));
        }

        if !query.order_by.is_empty() {
            fmt!(f, " ORDER BY ");
            let mut s = "";
            for sort in &query.order_by {
                let direction = if sort.descending { " DESC" } else { "" };
                match &sort.node {
                    Node::Alias(alias) => fmt!(f, s Ident(&alias.name) direction),
                    node => fmt!(f, s Expr::new(plan, node) direction),
                }
                s = ", ";
            }
        }

        if let Some(limit) = &query.limit {
            match f.serializer.flavor {
                Flavor::Mysql => fmt!(f, " LIMIT " limit.offset ", " limit.max),
                Flavor::Postgresql => fmt!(f, " LIMIT " limit.max " OFFSET " limit.offset),
            }
        }

        Ok(())
    }
}

impl ToSql for FromClause<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let tree = &self.0.tree;
        let root = tree.root();

        fmt!(f, " FROM " Ident(root.table()) " AS " Ident(&root.alias));

        for index in tree.depth_first().into_iter().skip(1) {
            let item = &tree.items[index];
            let Some(parent) = item.parent.map(|parent| &tree.items[parent]) else {
                continue;
            };

            match &item.node {
                Node::Reference(reference) => {
                    fmt!(
                        f,
                        " LEFT JOIN " Ident(&reference.table) " AS " Ident(&item.alias)
                        " ON " Qualified(&parent.alias, &reference.column)
                        " = " Qualified(&item.alias, &reference.ref_column)
                    );
                }
                Node::ReverseReference(reverse) => {
                    fmt!(
                        f,
                        " LEFT JOIN " Ident(&reverse.table) " AS " Ident(&item.alias)
                        " ON " Qualified(&item.alias, &reverse.child_column)
                        " = " Qualified(&parent.alias, &reverse.column)
                    );
                }
                Node::ManyMany(many) => {
                    let Some(assn_alias) = &item.assn_alias else {
                        return Err(err!("many-many join `{}` has no association alias", many.name));
                    };
                    fmt!(
                        f,
                        " LEFT JOIN " Ident(&many.assn_table) " AS " Ident(assn_alias)
                        " ON " Qualified(assn_alias, &many.this_column)
                        " = " Qualified(&parent.alias, parent.pk())
                        " LEFT JOIN " Ident(&many.table) " AS " Ident(&item.alias)
                        " ON " Qualified(&item.alias, &many.pk)
                        " = " Qualified(assn_alias, &many.other_column)
                    );
                }
                _ => return Err(err!("unexpected join item {:?}", item.node)),
            }

            if let Some(condition) = &item.condition {
                fmt!(f, " AND " Expr::new(self.0, condition));
            }
        }
        Ok(())
    }
}

impl ToSql for WhereClause<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        if let Some(filter) = &self.0.query.filter {
            fmt!(f, " WHERE " Expr::new(self.0, filter));
        }
        Ok(())
    }
}

impl ToSql for &Count {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let plan = &*self.plan;

        // Grouped rows are counted as rows of the grouped result.
        if plan.grouped {
            fmt!(f, "SELECT COUNT(*) FROM (" Select(plan) ") AS " Ident("q"));
            return Ok(());
        }

        let distinct = if self.distinct || plan.query.distinct { "DISTINCT " } else { "" };
        let root = plan.tree.root();

        fmt!(f, "SELECT ");
        if self.nodes.is_empty() {
            // Collection joins repeat the root row.
            if plan.tree.items.iter().any(|item| item.node.is_collection()) || !distinct.is_empty() {
                fmt!(f, "COUNT(DISTINCT " Qualified(&root.alias, root.pk()) ")");
            } else {
                fmt!(f, "COUNT(*)");
            }
        } else {
            let nodes = self.nodes.iter().map(|node| Expr::new(plan, node));

            // Root columns are counted once per root row, not once per
            // collection row the filter joined.
            let repeated = distinct.is_empty()
                && plan.tree.items.iter().any(|item| item.node.is_collection())
                && self.nodes.iter().all(|node| {
                    matches!(node, Node::Column(column) if *column.parent == plan.query.root)
                });
            if repeated {
                fmt!(
                    f,
                    "COUNT(" Comma(nodes) ") FROM " Ident(root.table()) " AS " Ident(&root.alias)
                    " WHERE " Qualified(&root.alias, root.pk())
                    " IN (SELECT " Qualified(&root.alias, root.pk()) FromClause(plan) WhereClause(plan) ")"
                );
                return Ok(());
            }

            if self.nodes.len() > 1 && !distinct.is_empty() && f.serializer.flavor == Flavor::Postgresql {
                fmt!(f, "COUNT(DISTINCT (" Comma(nodes) "))");
            } else {
                fmt!(f, "COUNT(" distinct Comma(nodes) ")");
            }
        }

        fmt!(f, FromClause(plan) WhereClause(plan));
        Ok(())
    }
}

/// Deletes the root rows a planned query selects.
pub(super) struct DeleteQuery<'a>(pub(super) &'a Plan);

impl ToSql for DeleteQuery<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let plan = self.0;
        let query = &plan.query;

        if query.limit.is_some() || !query.order_by.is_empty() {
            return Err(Error::invalid_statement(
                "delete queries cannot use LIMIT or ORDER BY",
            ));
        }
        if plan.grouped || query.having.is_some() {
            return Err(Error::invalid_statement("delete queries cannot be grouped"));
        }

        let root = plan.tree.root();

        match f.serializer.flavor {
            Flavor::Mysql => {
                fmt!(f, "DELETE " Ident(&root.alias) FromClause(plan) WhereClause(plan));
            }
            Flavor::Postgresql if plan.tree.table_count() == 1 => {
                fmt!(f, "DELETE FROM " Ident(root.table()) " AS " Ident(&root.alias) WhereClause(plan));
            }
            Flavor::Postgresql => {
                fmt!(
                    f,
                    "DELETE FROM " Ident(root.table()) " WHERE " Ident(root.pk())
                    " IN (SELECT " Qualified(&root.alias, root.pk()) FromClause(plan) WhereClause(plan) ")"
                );
            }
        }
        Ok(())
    }
}
