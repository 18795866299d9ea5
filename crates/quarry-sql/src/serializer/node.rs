use super::{select::Select, Comma, Delimited, Flavor, Formatter, Ident, Params, Qualified, ToSql};

use quarry_core::{
    node::{Node, OperationNode, Operator},
    query::Plan,
    stmt::Value,
    Error, Result,
};

/// A node rendered against the join tree of a plan.
pub(super) struct Expr<'a> {
    pub(super) plan: &'a Plan,
    pub(super) node: &'a Node,
}

impl<'a> Expr<'a> {
    pub(super) fn new(plan: &'a Plan, node: &'a Node) -> Self {
        Expr { plan, node }
    }
}

impl ToSql for Expr<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let plan = self.plan;

        match self.node {
            Node::Column(column) => {
                let item = plan.item_for(&column.parent)?;
                fmt!(f, Qualified(&item.alias, &column.column));
            }
            // The foreign key column on the parent row identifies the target.
            Node::Reference(reference) => {
                let item = plan.item_for(&reference.parent)?;
                fmt!(f, Qualified(&item.alias, &reference.column));
            }
            node @ (Node::Table(_) | Node::ReverseReference(_) | Node::ManyMany(_)) => {
                let item = plan.item_for(node)?;
                fmt!(f, Qualified(&item.alias, item.pk()));
            }
            Node::Value(value) => fmt!(f, value),
            // PostgreSQL resolves output names only in ORDER BY.
            Node::Alias(alias) => match (f.serializer.flavor, plan.query.aliased(&alias.name)) {
                (Flavor::Postgresql, Some(node)) if !matches!(node, Node::Alias(_)) => {
                    fmt!(f, "(" Expr::new(plan, node) ")")
                }
                _ => fmt!(f, Ident(&alias.name)),
            },
            Node::Subquery(sub) => {
                let sub = plan.subquery(&sub.query)?;
                fmt!(f, "(" Select(sub) ")");
            }
            Node::Operation(op) => Operation { plan, op }.to_sql(f)?,
        }
        Ok(())
    }
}

struct Operation<'a> {
    plan: &'a Plan,
    op: &'a OperationNode,
}

impl ToSql for Operation<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        use Operator::*;

        let Operation { plan, op } = self;
        op.op.check_arity(op.operands.len())?;

        let operand = |i: usize| Expr::new(plan, &op.operands[i]);
        let operands = || op.operands.iter().map(|node| Expr::new(plan, node));

        match op.op {
            Equal | NotEqual if op.operands.iter().any(is_null) => {
                let other = if is_null(&op.operands[0]) { 1 } else { 0 };
                let test = if op.op == Equal { " IS NULL" } else { " IS NOT NULL" };
                fmt!(f, operand(other) test);
            }
            Equal | NotEqual | GreaterThan | GreaterOrEqual | LessThan | LessOrEqual => {
                let symbol = match op.op {
                    Equal => " = ",
                    NotEqual => " <> ",
                    GreaterThan => " > ",
                    GreaterOrEqual => " >= ",
                    LessThan => " < ",
                    _ => " <= ",
                };
                fmt!(f, operand(0) symbol operand(1));
            }
            And | Or if op.operands.len() == 1 => fmt!(f, operand(0)),
            And => fmt!(f, "(" Delimited(operands(), " AND ") ")"),
            Or => fmt!(f, "(" Delimited(operands(), " OR ") ")"),
            Xor => match f.serializer.flavor {
                Flavor::Mysql => fmt!(f, "(" operand(0) " XOR " operand(1) ")"),
                Flavor::Postgresql => fmt!(f, "(" operand(0) " <> " operand(1) ")"),
            },
            Not => fmt!(f, "NOT (" operand(0) ")"),
            Like => fmt!(f, operand(0) " LIKE " operand(1)),
            In | NotIn => {
                let keyword = if op.op == In { " IN " } else { " NOT IN " };
                match &op.operands[1] {
                    Node::Value(Value::List(_)) | Node::Subquery(_) => {
                        fmt!(f, operand(0) keyword operand(1))
                    }
                    Node::Value(value) => {
                        fmt!(f, operand(0) keyword "(" value ")")
                    }
                    _ => fmt!(f, operand(0) keyword "(" operand(1) ")"),
                }
            }
            IsNull => fmt!(f, operand(0) " IS NULL"),
            IsNotNull => fmt!(f, operand(0) " IS NOT NULL"),
            Add => fmt!(f, "(" Delimited(operands(), " + ") ")"),
            Subtract => fmt!(f, "(" Delimited(operands(), " - ") ")"),
            Multiply => fmt!(f, "(" Delimited(operands(), " * ") ")"),
            Divide => fmt!(f, "(" Delimited(operands(), " / ") ")"),
            Modulo => fmt!(f, "(" Delimited(operands(), " % ") ")"),
            Round => fmt!(f, "ROUND(" Comma(operands()) ")"),
            Count if op.operands.is_empty() => fmt!(f, "COUNT(*)"),
            Count if op.distinct && op.operands.len() > 1 && f.serializer.flavor == Flavor::Postgresql => {
                fmt!(f, "COUNT(DISTINCT (" Comma(operands()) "))")
            }
            Sum | Min | Max | Avg | Count => {
                let name = match op.op {
                    Sum => "SUM",
                    Min => "MIN",
                    Max => "MAX",
                    Avg => "AVG",
                    _ => "COUNT",
                };
                fmt!(f, name "(" distinct(op) Comma(operands()) ")");
            }
            Func => {
                let Some(name) = &op.func else {
                    return Err(Error::invalid_statement("function call without a name"));
                };
                fmt!(f, name "(" distinct(op) Comma(operands()) ")");
            }
            DateAddSeconds => match f.serializer.flavor {
                Flavor::Mysql => {
                    fmt!(f, "DATE_ADD(" operand(0) ", INTERVAL (" operand(1) ") SECOND)")
                }
                Flavor::Postgresql => {
                    fmt!(f, "(" operand(0) " + make_interval(seconds => " operand(1) "))")
                }
            },
            StartsWith | EndsWith | Contains => {
                let Node::Value(Value::String(fragment)) = &op.operands[1] else {
                    return Err(Error::invalid_statement(format!(
                        "{:?} requires a string pattern",
                        op.op
                    )));
                };
                let pattern = &Value::String(match op.op {
                    StartsWith => format!("{fragment}%"),
                    EndsWith => format!("%{fragment}"),
                    _ => format!("%{fragment}%"),
                });
                fmt!(f, operand(0) " LIKE " pattern);
            }
        }
        Ok(())
    }
}

fn is_null(node: &Node) -> bool {
    matches!(node, Node::Value(Value::Null))
}

fn distinct(op: &OperationNode) -> &'static str {
    if op.distinct {
        "DISTINCT "
    } else {
        ""
    }
}
