//! Folds the flat rows of a LEFT JOIN expansion into nested records.
//!
//! Parents repeated across result rows are folded into one record. Each
//! folded collection edge collects its children, deduplicated by primary
//! key; forward and unique reverse edges attach a single record. Expanded
//! edges make every child row produce its own root record.

use crate::Row;

use quarry_core::{
    err,
    node::Node,
    query::{JoinItem, Plan},
    stmt::{Value, ValueRecord},
    Result,
};

use std::collections::HashMap;

pub(crate) struct Materializer<'a> {
    plan: &'a Plan,
    rows: Vec<Row>,

    /// Root identity (primary key plus expanded child keys) to position
    roots: HashMap<Vec<Value>, usize>,
}

/// Folds all result rows of `plan`.
pub(crate) fn fold(plan: &Plan, records: Vec<ValueRecord>) -> Result<Vec<Row>> {
    let mut materializer = Materializer::new(plan);
    for record in &records {
        materializer.push(record)?;
    }
    Ok(materializer.finish())
}

impl<'a> Materializer<'a> {
    pub(crate) fn new(plan: &'a Plan) -> Self {
        Materializer {
            plan,
            rows: vec![],
            roots: HashMap::new(),
        }
    }

    pub(crate) fn push(&mut self, record: &ValueRecord) -> Result<()> {
        if record.len() != self.plan.width() {
            return Err(err!(
                "result row has {} columns, expected {}",
                record.len(),
                self.plan.width()
            ));
        }

        let index = match self.identity(0, record)? {
            Some(key) => match self.roots.get(&key) {
                Some(&index) => index,
                None => {
                    let index = self.new_root(record);
                    self.roots.insert(key, index);
                    index
                }
            },
            // Grouped rows carry no key: every row is its own record.
            None => self.new_root(record),
        };

        let plan = self.plan;
        attach_children(plan, 0, &mut self.rows[index], record)
    }

    pub(crate) fn finish(self) -> Vec<Row> {
        self.rows
    }

    fn new_root(&mut self, record: &ValueRecord) -> usize {
        let mut row = new_row(self.plan, 0, record);
        let offset = self.plan.columns.len();
        for (i, (name, _)) in self.plan.query.aliases.iter().enumerate() {
            row.aliases.insert(name.clone(), record[offset + i].clone());
        }
        self.rows.push(row);
        self.rows.len() - 1
    }

    /// Root key: its primary key and the keys of expanded edges reachable
    /// without crossing a folded collection.
    fn identity(&self, item: usize, record: &ValueRecord) -> Result<Option<Vec<Value>>> {
        let Some(pk) = self.plan.tree.items[item].pk_column else {
            return Ok(None);
        };

        if record[pk].is_null() {
            return Err(err!(
                "primary key of `{}` is NULL in a result row",
                self.plan.tree.items[item].table()
            ));
        }

        let mut key = vec![record[pk].clone()];
        self.expanded_keys(item, record, &mut key);
        Ok(Some(key))
    }

    fn expanded_keys(&self, item: usize, record: &ValueRecord, key: &mut Vec<Value>) {
        for &child in &self.plan.tree.items[item].children {
            let child_item = &self.plan.tree.items[child];
            if !child_item.materialize || child_item.is_folded_collection() {
                continue;
            }
            if child_item.expanded {
                key.push(
                    child_item
                        .pk_column
                        .map(|pk| record[pk].clone())
                        .unwrap_or_default(),
                );
            }
            self.expanded_keys(child, record, key);
        }
    }
}

fn new_row(plan: &Plan, item: usize, record: &ValueRecord) -> Row {
    let join_item = &plan.tree.items[item];
    let mut row = Row::loaded(join_item.table(), join_item.pk());
    for &column in &join_item.columns {
        row.set_loaded(&plan.columns[column].column, record[column].clone());
    }
    row
}

/// Walks the children of `item` in join order, attaching what this result
/// row contributes to `row`.
fn attach_children(plan: &Plan, item: usize, row: &mut Row, record: &ValueRecord) -> Result<()> {
    for &child in &plan.tree.items[item].children {
        let child_item = &plan.tree.items[child];
        if !child_item.materialize {
            continue;
        }

        let edge = edge_name(child_item)?;
        let pk = child_item.pk_column.map(|pk| &record[pk]);

        match &child_item.node {
            Node::Reference(_) => {
                let Some(pk) = pk.filter(|pk| !pk.is_null()) else {
                    row.references.entry(edge.to_string()).or_insert(None);
                    continue;
                };

                let slot = row.references.entry(edge.to_string()).or_insert(None);
                if slot.as_ref().and_then(|r| r.pk()) != Some(pk) {
                    *slot = Some(Box::new(new_row(plan, child, record)));
                }
                if let Some(referenced) = slot.as_deref_mut() {
                    attach_children(plan, child, referenced, record)?;
                }
            }
            Node::ReverseReference(_) | Node::ManyMany(_) => {
                let collection = row.collection_entry(edge);
                let Some(pk) = pk.filter(|pk| !pk.is_null()) else {
                    continue;
                };

                let index = match collection.position(pk) {
                    Some(index) => index,
                    None => collection.insert_loaded(new_row(plan, child, record)),
                };
                attach_children(plan, child, collection.row_mut(index), record)?;
            }
            _ => return Err(err!("unexpected join item for `{edge}`")),
        }
    }
    Ok(())
}

fn edge_name(item: &JoinItem) -> Result<&str> {
    item.node
        .edge_name()
        .ok_or_else(|| err!("join item `{}` is not an edge", item.alias))
}
