use crate::{Config, Db};

use quarry_core::{Error, Result, Schema};

use indexmap::IndexMap;
use std::sync::Arc;

/// Databases attached to a process, keyed by symbolic name.
///
/// Nothing is global: an application builds one registry at startup and
/// passes it where it is needed, and tests build their own.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    dbs: IndexMap<String, Db>,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Builds a [`Db`] for every database in `config`. `schema` supplies the
    /// schema model for each key.
    pub fn from_config(
        config: &Config,
        mut schema: impl FnMut(&str) -> Result<Schema>,
    ) -> Result<Registry> {
        let mut registry = Registry::new();
        for (key, database) in &config.database {
            let db = Db::connect(key.clone(), database, Arc::new(schema(key)?))?;
            registry.insert(db);
        }
        Ok(registry)
    }

    /// Attaches `db` under its key, replacing any database with that key.
    pub fn insert(&mut self, db: Db) -> Option<Db> {
        self.dbs.insert(db.key().to_string(), db)
    }

    pub fn get(&self, key: &str) -> Result<&Db> {
        self.dbs
            .get(key)
            .ok_or_else(|| Error::invalid_config(format!("no database is attached as `{key}`")))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.dbs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.dbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dbs.is_empty()
    }
}
