use quarry_core::{err, stmt::Value, Error, Result};

use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

/// Untyped record: the state behind every generated record type.
///
/// A column is *valid* once it holds a value, either loaded or set. Set
/// columns are also *dirty* until the next save. Joined records hang off
/// the row by edge name: forward references in `references`, reverse and
/// many-many edges in `collections`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    table: String,
    pk: String,
    pub(crate) values: IndexMap<String, Value>,
    pub(crate) dirty: IndexSet<String>,
    pub(crate) aliases: IndexMap<String, Value>,
    pub(crate) references: IndexMap<String, Option<Box<Row>>>,
    pub(crate) collections: IndexMap<String, Collection>,

    /// Forward edges pointed elsewhere since the last save
    pub(crate) relinked: IndexSet<String>,

    /// The row exists in the database
    pub(crate) saved: bool,
}

/// Records joined through a reverse or many-many edge, in result order,
/// indexed by primary key.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    rows: Vec<Row>,
    index: HashMap<Value, usize>,

    /// Primary keys present when the collection was loaded or last saved
    pub(crate) loaded: Vec<Value>,

    /// Replaced or extended since it was loaded
    pub(crate) changed: bool,
}

impl Row {
    /// A new, unsaved row.
    pub fn new(table: impl Into<String>, pk: impl Into<String>) -> Row {
        Row {
            table: table.into(),
            pk: pk.into(),
            values: IndexMap::new(),
            dirty: IndexSet::new(),
            aliases: IndexMap::new(),
            references: IndexMap::new(),
            collections: IndexMap::new(),
            relinked: IndexSet::new(),
            saved: false,
        }
    }

    /// A row as read from the database: nothing is dirty.
    pub(crate) fn loaded(table: &str, pk: &str) -> Row {
        let mut row = Row::new(table, pk);
        row.saved = true;
        row
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn pk_column(&self) -> &str {
        &self.pk
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn get(&self, column: &str) -> Result<&Value> {
        self.values.get(column).ok_or_else(|| {
            Error::type_conversion(Value::Null, "loaded column")
                .context(err!("column `{}.{column}` was not loaded", self.table))
        })
    }

    /// The primary key, or `None` before the row was inserted.
    pub fn pk(&self) -> Option<&Value> {
        self.values.get(&self.pk).filter(|value| !value.is_null())
    }

    /// Primary keys are surfaced to callers as text.
    pub fn pk_string(&self) -> Result<String> {
        match self.pk() {
            Some(pk) => pk.to_key_string(),
            None => Err(Error::record_not_found(format!(
                "`{}` row has no primary key; save it first",
                self.table
            ))),
        }
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        self.values.insert(column.clone(), value.into());
        self.dirty.insert(column);
    }

    pub(crate) fn set_loaded(&mut self, column: &str, value: Value) {
        self.values.insert(column.to_string(), value);
    }

    pub fn is_valid(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn is_dirty(&self, column: &str) -> bool {
        self.dirty.contains(column)
    }

    /// Any column of this row or of a joined row is dirty, or a collection
    /// was replaced.
    pub fn has_changes(&self) -> bool {
        !self.saved
            || !self.dirty.is_empty()
            || !self.relinked.is_empty()
            || self.references.values().flatten().any(|row| row.has_changes())
            || self
                .collections
                .values()
                .any(|c| c.changed || c.rows.iter().any(Row::has_changes))
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Computed projection registered with `Query::alias`.
    pub fn alias(&self, name: &str) -> Option<&Value> {
        self.aliases.get(name)
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The record joined through a forward edge. `None` when the edge was not
    /// joined or the foreign key is null.
    pub fn reference(&self, edge: &str) -> Option<&Row> {
        match self.references.get(edge) {
            Some(row) => row.as_deref(),
            None => self.collections.get(edge).and_then(|c| c.rows.first()),
        }
    }

    pub fn reference_mut(&mut self, edge: &str) -> Option<&mut Row> {
        match self.references.get_mut(edge) {
            Some(row) => row.as_deref_mut(),
            None => self.collections.get_mut(edge).and_then(|c| c.rows.first_mut()),
        }
    }

    /// Points a forward edge at `row`. The foreign key column is updated on
    /// save, after `row` itself was saved.
    pub fn set_reference(&mut self, edge: impl Into<String>, row: Option<Row>) {
        let edge = edge.into();
        self.relinked.insert(edge.clone());
        self.references.insert(edge, row.map(Box::new));
    }

    pub fn is_joined(&self, edge: &str) -> bool {
        self.references.contains_key(edge) || self.collections.contains_key(edge)
    }

    pub fn collection(&self, edge: &str) -> Option<&Collection> {
        self.collections.get(edge)
    }

    pub fn collection_mut(&mut self, edge: &str) -> Option<&mut Collection> {
        self.collections.get_mut(edge)
    }

    /// Replaces the records of a reverse or many-many edge. On save, the
    /// difference with the loaded records is applied.
    pub fn set_collection(&mut self, edge: impl Into<String>, rows: Vec<Row>) {
        let edge = edge.into();
        let loaded = self
            .collections
            .get(&edge)
            .map(|c| c.loaded.clone())
            .unwrap_or_default();

        let mut collection = Collection {
            loaded,
            changed: true,
            ..Collection::default()
        };
        for row in rows {
            collection.insert(row);
        }
        self.collections.insert(edge, collection);
    }

    /// Entry used by the materializer: an empty collection when the edge
    /// produced no rows.
    pub(crate) fn collection_entry(&mut self, edge: &str) -> &mut Collection {
        if !self.collections.contains_key(edge) {
            self.collections.insert(edge.to_string(), Collection::default());
        }
        &mut self.collections[edge]
    }

    pub(crate) fn mark_clean(&mut self) {
        self.saved = true;
        self.dirty.clear();
        self.relinked.clear();
    }

    /// Forgets everything but the table: the row no longer exists.
    pub(crate) fn invalidate(&mut self) {
        self.values.clear();
        self.dirty.clear();
        self.aliases.clear();
        self.references.clear();
        self.collections.clear();
        self.relinked.clear();
        self.saved = false;
    }
}

impl Collection {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Row> {
        self.rows.iter_mut()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Looks a record up by primary key.
    pub fn get(&self, pk: &Value) -> Option<&Row> {
        self.index.get(pk).map(|&i| &self.rows[i])
    }

    pub fn get_mut(&mut self, pk: &Value) -> Option<&mut Row> {
        self.index.get(pk).map(|&i| &mut self.rows[i])
    }

    /// Adds a record; it is linked to the parent on save.
    pub fn push(&mut self, row: Row) {
        self.changed = true;
        self.insert(row);
    }

    /// Removes a record by primary key. On save the edge's delete action is
    /// applied to it.
    pub fn remove(&mut self, pk: &Value) -> Option<Row> {
        let index = self.index.remove(pk)?;
        let row = self.rows.remove(index);
        self.reindex();
        self.changed = true;
        Some(row)
    }

    pub(crate) fn position(&self, pk: &Value) -> Option<usize> {
        self.index.get(pk).copied()
    }

    pub(crate) fn row_mut(&mut self, index: usize) -> &mut Row {
        &mut self.rows[index]
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    /// Appends a row and indexes it when it has a key. Returns its position.
    pub(crate) fn insert(&mut self, row: Row) -> usize {
        let index = self.rows.len();
        if let Some(pk) = row.pk() {
            self.index.insert(pk.clone(), index);
        }
        self.rows.push(row);
        index
    }

    /// Appends a row read from the database.
    pub(crate) fn insert_loaded(&mut self, row: Row) -> usize {
        if let Some(pk) = row.pk() {
            self.loaded.push(pk.clone());
        }
        self.insert(row)
    }

    pub(crate) fn reindex(&mut self) {
        self.index = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| row.pk().map(|pk| (pk.clone(), i)))
            .collect();
    }

    /// Primary keys currently held, in order.
    pub(crate) fn keys(&self) -> Vec<Value> {
        self.rows.iter().filter_map(|row| row.pk().cloned()).collect()
    }

    /// Records the current contents as the saved state.
    pub(crate) fn mark_saved(&mut self) {
        self.reindex();
        self.loaded = self.keys();
        self.changed = false;
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.rows == other.rows
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
