use super::Row;
use crate::{Context, Db};

use quarry_core::{
    schema::{Edge, FkAction, ReverseEdge},
    stmt::{Delete, Filter, SelectRows, Statement, Update, Value},
    Error, Result,
};

use async_recursion::async_recursion;
use tracing::debug;

impl Row {
    /// Deletes the row. Association rows linking it are removed first; on
    /// tables whose engine does not enforce foreign keys the delete actions
    /// of dependent rows are carried out here. The row is emptied afterwards.
    pub async fn delete(&mut self, db: &Db, cx: &mut Context) -> Result<()> {
        let Some(key) = self.pk().cloned() else {
            return Err(Error::record_not_found(format!(
                "`{}` row was never saved",
                self.table()
            )));
        };

        delete_key(db, cx, self.table(), &key).await?;
        self.invalidate();
        Ok(())
    }
}

/// Deletes one row of `table` by primary key, along with its association
/// rows and, where foreign keys are not enforced, its dependents.
#[async_recursion]
pub(super) async fn delete_key(db: &Db, cx: &mut Context, table: &str, key: &Value) -> Result<()> {
    let schema = db.schema().clone();
    let owner = schema.table(table)?;
    let pk = owner.primary_key()?.name.clone();

    let mut associations = vec![];
    let mut emulated = vec![];
    for edge in schema.edges(table)? {
        match edge {
            Edge::ManyMany(edge) => associations.push(edge),
            Edge::Reverse(edge) => {
                let child = schema.table(&edge.child_table)?;
                if !owner.supports_fk || !child.supports_fk {
                    emulated.push(edge);
                }
            }
            Edge::Forward(_) => {}
        }
    }

    // Check every restricting edge before anything is changed.
    let mut keys = Vec::with_capacity(emulated.len());
    for edge in &emulated {
        let value = if edge.column == pk {
            key.clone()
        } else {
            column_value(db, cx, table, &pk, key, &edge.column).await?
        };
        if edge.on_delete.is_restrict() {
            let dependents = dependents(db, cx, edge, &value).await?;
            if !dependents.is_empty() {
                return Err(Error::integrity(format!(
                    "cannot delete `{table}` {key}: {} `{}` row(s) reference it through `{}`",
                    dependents.len(),
                    edge.child_table,
                    edge.child_column
                )));
            }
        }
        keys.push(value);
    }

    for edge in &associations {
        let stmt = Delete::new(&edge.assn_table, Filter::eq(&edge.this_column, key.clone()));
        db.execute(cx, Statement::Delete(stmt)).await?;
    }

    for (edge, value) in emulated.iter().zip(keys) {
        apply_action(db, cx, edge, &value).await?;
    }

    let stmt = Delete::new(table, Filter::eq(&pk, key.clone()));
    db.execute(cx, Statement::Delete(stmt)).await?;

    debug!(table = %table, %key, "deleted record");
    Ok(())
}

async fn apply_action(db: &Db, cx: &mut Context, edge: &ReverseEdge, value: &Value) -> Result<()> {
    let filter = Filter::eq(&edge.child_column, value.clone());

    match edge.on_delete {
        FkAction::Cascade => {
            for child in dependents(db, cx, edge, value).await? {
                delete_key(db, cx, &edge.child_table, &child).await?;
            }
        }
        FkAction::SetNull => {
            let stmt = Update::new(&edge.child_table, filter).set(&edge.child_column, Value::Null);
            db.execute(cx, Statement::Update(stmt)).await?;
        }
        FkAction::SetDefault => {
            let default = db
                .schema()
                .column(&edge.child_table, &edge.child_column)?
                .default_or_null();
            let stmt = Update::new(&edge.child_table, filter).set(&edge.child_column, default);
            db.execute(cx, Statement::Update(stmt)).await?;
        }
        FkAction::Restrict | FkAction::None => {}
    }
    Ok(())
}

/// Primary keys of the rows that reference `value` through `edge`.
async fn dependents(db: &Db, cx: &mut Context, edge: &ReverseEdge, value: &Value) -> Result<Vec<Value>> {
    let ty = db.schema().column(&edge.child_table, &edge.child_pk)?.ty;
    let stmt = SelectRows::new(
        &edge.child_table,
        vec![edge.child_pk.clone()],
        Filter::eq(&edge.child_column, value.clone()),
    );

    let records = db.query(cx, Statement::SelectRows(stmt), vec![Some(ty)]).await?;
    Ok(records
        .into_iter()
        .filter_map(|record| record.into_vec().into_iter().next())
        .collect())
}

/// Reads a non-key column referenced by a dependent table.
async fn column_value(
    db: &Db,
    cx: &mut Context,
    table: &str,
    pk: &str,
    key: &Value,
    column: &str,
) -> Result<Value> {
    let ty = db.schema().column(table, column)?.ty;
    let stmt = SelectRows::new(table, vec![column.to_string()], Filter::eq(pk, key.clone()));

    let records = db.query(cx, Statement::SelectRows(stmt), vec![Some(ty)]).await?;
    records
        .into_iter()
        .next()
        .and_then(|record| record.into_vec().into_iter().next())
        .ok_or_else(|| Error::record_not_found(format!("`{table}` {key} does not exist")))
}
