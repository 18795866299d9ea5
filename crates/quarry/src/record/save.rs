use super::{delete, Row};
use crate::{Context, Db};

use quarry_core::{
    schema::{Edge, FkAction, ManyManyEdge, ReverseEdge, Table},
    stmt::{Filter, Insert, Statement, Update, Value},
    Error, Result,
};

use async_recursion::async_recursion;
use tracing::debug;

impl Row {
    /// Inserts the row when it was never saved, otherwise updates its dirty
    /// columns. Joined records are saved with it: referenced records first,
    /// then the row, then collection members. A row without changes issues
    /// no SQL.
    pub async fn save(&mut self, db: &Db, cx: &mut Context) -> Result<()> {
        if !self.has_changes() {
            return Ok(());
        }
        save_row(self, db, cx).await
    }
}

#[async_recursion]
async fn save_row(row: &mut Row, db: &Db, cx: &mut Context) -> Result<()> {
    let schema = db.schema().clone();
    let table = schema.table(row.table())?;
    let edges = schema.edges(&table.name)?;

    for edge in &edges {
        if let Edge::Forward(edge) = edge {
            let referenced = match row.references.get_mut(&edge.name) {
                Some(Some(referenced)) => referenced,
                Some(None) => {
                    if row.values.get(&edge.column).is_some_and(|v| !v.is_null()) {
                        row.set(edge.column.clone(), Value::Null);
                    }
                    continue;
                }
                None => continue,
            };
            if referenced.has_changes() {
                save_row(referenced, db, cx).await?;
            }
            let key = referenced.get(&edge.ref_column)?.clone();
            if row.values.get(&edge.column) != Some(&key) {
                row.set(edge.column.clone(), key);
            }
        }
    }

    if !row.saved {
        insert_row(row, table, db, cx).await?;
    } else if !row.dirty.is_empty() {
        update_row(row, table, db, cx).await?;
    }
    row.mark_clean();

    for edge in &edges {
        match edge {
            Edge::Forward(_) => {}
            Edge::Reverse(edge) => save_reverse(row, edge, db, cx).await?,
            Edge::ManyMany(edge) => save_many_many(row, edge, db, cx).await?,
        }
    }
    Ok(())
}

async fn insert_row(row: &mut Row, table: &Table, db: &Db, cx: &mut Context) -> Result<()> {
    let pk = table.primary_key()?;
    let mut stmt = Insert::new(&table.name);

    for column in &row.dirty {
        let value = row.values[column].clone();
        if column == &pk.name && value.is_null() {
            continue;
        }
        let ty = table.column(column)?.ty;
        stmt = stmt.value(column, value.coerce(ty)?);
    }

    let generated = row.pk().is_none();
    if generated && !pk.auto_id {
        return Err(Error::invalid_statement(format!(
            "`{}` needs a primary key value before it can be inserted",
            table.name
        )));
    }

    let returning = generated.then_some((pk.name.as_str(), pk.ty));
    let key = db.insert(cx, stmt, returning).await?;
    if let Some(key) = key {
        row.set_loaded(&pk.name, key.coerce(pk.ty)?);
    }

    debug!(table = %table.name, pk = ?row.pk(), "inserted record");
    Ok(())
}

async fn update_row(row: &mut Row, table: &Table, db: &Db, cx: &mut Context) -> Result<()> {
    let pk = table.primary_key()?;
    if row.dirty.contains(&pk.name) {
        return Err(Error::invalid_statement(format!(
            "primary key of saved `{}` record cannot change",
            table.name
        )));
    }

    let key = row.get(&pk.name)?.clone();
    let mut stmt = Update::new(&table.name, Filter::eq(&pk.name, key));
    for column in &row.dirty {
        let ty = table.column(column)?.ty;
        stmt = stmt.set(column, row.values[column].clone().coerce(ty)?);
    }

    db.execute(cx, Statement::Update(stmt)).await?;
    Ok(())
}

/// Links every member to the parent, saves members with changes, then
/// applies the edge's delete action to members removed since loading.
async fn save_reverse(row: &mut Row, edge: &ReverseEdge, db: &Db, cx: &mut Context) -> Result<()> {
    if !row.collections.contains_key(&edge.name) {
        return Ok(());
    }
    let parent_key = row.get(&edge.column)?.clone();
    let collection = &mut row.collections[&edge.name];

    for child in collection.rows_mut() {
        if child.values.get(&edge.child_column) != Some(&parent_key) {
            child.set(edge.child_column.clone(), parent_key.clone());
        }
        if child.has_changes() {
            save_row(child, db, cx).await?;
        }
    }

    if collection.changed {
        collection.reindex();
        let removed: Vec<Value> = collection
            .loaded
            .iter()
            .filter(|key| collection.position(key).is_none())
            .cloned()
            .collect();

        for key in removed {
            detach(edge, &key, db, cx).await?;
        }
    }

    collection.mark_saved();
    Ok(())
}

/// Applies a reverse edge's delete action to a child no longer in the
/// parent's collection.
async fn detach(edge: &ReverseEdge, key: &Value, db: &Db, cx: &mut Context) -> Result<()> {
    let filter = Filter::eq(&edge.child_pk, key.clone());

    match edge.on_delete {
        FkAction::Cascade => delete::delete_key(db, cx, &edge.child_table, key).await,
        FkAction::SetNull => {
            let stmt = Update::new(&edge.child_table, filter).set(&edge.child_column, Value::Null);
            db.execute(cx, Statement::Update(stmt)).await.map(drop)
        }
        FkAction::SetDefault => {
            let default = db
                .schema()
                .column(&edge.child_table, &edge.child_column)?
                .default_or_null();
            let stmt = Update::new(&edge.child_table, filter).set(&edge.child_column, default);
            db.execute(cx, Statement::Update(stmt)).await.map(drop)
        }
        FkAction::Restrict | FkAction::None => Err(Error::integrity(format!(
            "`{}` {key} was removed from `{}` but its foreign key restricts removal; delete it first",
            edge.child_table, edge.name
        ))),
    }
}

async fn save_many_many(
    row: &mut Row,
    edge: &ManyManyEdge,
    db: &Db,
    cx: &mut Context,
) -> Result<()> {
    if !row.collections.contains_key(&edge.name) {
        return Ok(());
    }
    let key = row.get(&edge.pk)?.clone();
    let collection = &mut row.collections[&edge.name];

    if !edge.is_type_table {
        for member in collection.rows_mut() {
            if member.has_changes() {
                save_row(member, db, cx).await?;
            }
        }
    }

    if collection.changed {
        let members = collection.keys();
        if members.len() != collection.len() {
            return Err(Error::invalid_statement(format!(
                "every member of `{}` needs a primary key",
                edge.name
            )));
        }
        db.associate(
            cx,
            &edge.assn_table,
            &edge.this_column,
            &key,
            &edge.other_column,
            members,
        )
        .await?;
    }

    collection.mark_saved();
    Ok(())
}
