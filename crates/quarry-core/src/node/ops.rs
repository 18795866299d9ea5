//! Builders for operation nodes.
//!
//! ```ignore
//! use quarry_core::node::ops::*;
//!
//! and([
//!     equal(person.last_name(), "Wolfe"),
//!     greater_than(project.spent(), 1000),
//! ])
//! ```

use super::{AliasNode, Node, OperationNode, Operator};
use crate::stmt::Value;

fn op(op: Operator, operands: Vec<Node>) -> Node {
    Node::Operation(OperationNode {
        op,
        operands,
        func: None,
        distinct: false,
    })
}

fn binary(o: Operator, lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    op(o, vec![lhs.into(), rhs.into()])
}

fn list(values: impl IntoIterator<Item = impl Into<Value>>) -> Node {
    Node::Value(Value::List(values.into_iter().map(Into::into).collect()))
}

pub fn equal(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    binary(Operator::Equal, lhs, rhs)
}

pub fn not_equal(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    binary(Operator::NotEqual, lhs, rhs)
}

pub fn greater_than(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    binary(Operator::GreaterThan, lhs, rhs)
}

pub fn greater_or_equal(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    binary(Operator::GreaterOrEqual, lhs, rhs)
}

pub fn less_than(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    binary(Operator::LessThan, lhs, rhs)
}

pub fn less_or_equal(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    binary(Operator::LessOrEqual, lhs, rhs)
}

pub fn and(nodes: impl IntoIterator<Item = Node>) -> Node {
    op(Operator::And, nodes.into_iter().collect())
}

pub fn or(nodes: impl IntoIterator<Item = Node>) -> Node {
    op(Operator::Or, nodes.into_iter().collect())
}

pub fn xor(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    binary(Operator::Xor, lhs, rhs)
}

pub fn not(node: impl Into<Node>) -> Node {
    op(Operator::Not, vec![node.into()])
}

pub fn like(node: impl Into<Node>, pattern: impl Into<Node>) -> Node {
    binary(Operator::Like, node, pattern)
}

pub fn is_in(node: impl Into<Node>, values: impl IntoIterator<Item = impl Into<Value>>) -> Node {
    op(Operator::In, vec![node.into(), list(values)])
}

pub fn not_in(node: impl Into<Node>, values: impl IntoIterator<Item = impl Into<Value>>) -> Node {
    op(Operator::NotIn, vec![node.into(), list(values)])
}

/// `node IN (SELECT ...)`
pub fn in_subquery(node: impl Into<Node>, query: crate::Query) -> Node {
    op(Operator::In, vec![node.into(), Node::subquery(query)])
}

pub fn is_null(node: impl Into<Node>) -> Node {
    op(Operator::IsNull, vec![node.into()])
}

pub fn is_not_null(node: impl Into<Node>) -> Node {
    op(Operator::IsNotNull, vec![node.into()])
}

pub fn add(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    binary(Operator::Add, lhs, rhs)
}

pub fn subtract(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    binary(Operator::Subtract, lhs, rhs)
}

pub fn multiply(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    binary(Operator::Multiply, lhs, rhs)
}

pub fn divide(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    binary(Operator::Divide, lhs, rhs)
}

pub fn modulo(lhs: impl Into<Node>, rhs: impl Into<Node>) -> Node {
    binary(Operator::Modulo, lhs, rhs)
}

/// Rounds to `digits` decimal places.
pub fn round(node: impl Into<Node>, digits: i32) -> Node {
    binary(Operator::Round, node, digits)
}

pub fn sum(node: impl Into<Node>) -> Node {
    op(Operator::Sum, vec![node.into()])
}

pub fn min(node: impl Into<Node>) -> Node {
    op(Operator::Min, vec![node.into()])
}

pub fn max(node: impl Into<Node>) -> Node {
    op(Operator::Max, vec![node.into()])
}

pub fn avg(node: impl Into<Node>) -> Node {
    op(Operator::Avg, vec![node.into()])
}

/// `COUNT(nodes)`, or `COUNT(*)` when empty.
pub fn count(nodes: impl IntoIterator<Item = Node>) -> Node {
    op(Operator::Count, nodes.into_iter().collect())
}

/// Calls an arbitrary SQL function.
pub fn func(name: impl Into<String>, operands: impl IntoIterator<Item = Node>) -> Node {
    Node::Operation(OperationNode {
        op: Operator::Func,
        operands: operands.into_iter().collect(),
        func: Some(name.into()),
        distinct: false,
    })
}

pub fn date_add_seconds(node: impl Into<Node>, seconds: impl Into<Node>) -> Node {
    binary(Operator::DateAddSeconds, node, seconds)
}

pub fn starts_with(node: impl Into<Node>, prefix: impl Into<String>) -> Node {
    binary(Operator::StartsWith, node, prefix.into())
}

pub fn ends_with(node: impl Into<Node>, suffix: impl Into<String>) -> Node {
    binary(Operator::EndsWith, node, suffix.into())
}

pub fn contains(node: impl Into<Node>, fragment: impl Into<String>) -> Node {
    binary(Operator::Contains, node, fragment.into())
}

/// Refers to a projection registered with `Query::alias`, e.g. in ORDER BY
/// or HAVING.
pub fn alias(name: impl Into<String>) -> Node {
    Node::Alias(AliasNode { name: name.into() })
}

pub fn value(value: impl Into<Value>) -> Node {
    Node::Value(value.into())
}
