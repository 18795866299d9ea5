mod connect;

mod exec;

mod transaction;
pub use transaction::TransactionToken;

use crate::{Context, DatabaseConfig};

use quarry_core::{
    driver::{Capability, Driver},
    schema::{DescribeOptions, TypeRow, TypeTable},
    stmt::{Filter, SelectRows, Statement},
    Error, Result, Schema,
};

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// A database attached under a symbolic key: its driver and schema.
///
/// Cloning is cheap. Connections are not held here; each [`Context`] checks
/// one out on first use.
#[derive(Clone)]
pub struct Db {
    key: Arc<str>,
    driver: Arc<dyn Driver>,
    schema: Arc<Schema>,
}

impl Db {
    pub fn new(key: impl Into<String>, driver: impl Driver, schema: impl Into<Arc<Schema>>) -> Db {
        Db {
            key: key.into().into(),
            driver: Arc::new(driver),
            schema: schema.into(),
        }
    }

    /// Builds the driver named by `config`. No connection is opened until
    /// the first statement.
    pub fn connect(
        key: impl Into<String>,
        config: &DatabaseConfig,
        schema: impl Into<Arc<Schema>>,
    ) -> Result<Db> {
        let driver = connect::driver(config)?;
        Ok(Db {
            key: key.into().into(),
            driver,
            schema: schema.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn capability(&self) -> &'static Capability {
        self.driver.capability()
    }

    pub fn driver(&self) -> &dyn Driver {
        &*self.driver
    }

    /// The same database with another schema.
    pub fn with_schema(&self, schema: impl Into<Arc<Schema>>) -> Db {
        Db {
            key: self.key.clone(),
            driver: self.driver.clone(),
            schema: schema.into(),
        }
    }

    /// Reads the database catalogue and builds its schema model, including
    /// the rows of enumeration tables.
    pub async fn describe(&self, cx: &mut Context, options: &DescribeOptions) -> Result<Schema> {
        let description = self.describe_raw(cx).await?;
        let schema = Schema::from_description(&description, options)?;
        schema.verify()?;
        let schema = self.read_type_tables(cx, schema).await?;
        debug!(
            database = %self.key,
            tables = schema.tables.len(),
            associations = schema.associations.len(),
            "described database"
        );
        Ok(schema)
    }

    /// Reloads the rows of every enumeration table into a new handle.
    pub async fn load_type_tables(&self, cx: &mut Context) -> Result<Db> {
        let schema = self.read_type_tables(cx, (*self.schema).clone()).await?;
        Ok(self.with_schema(schema))
    }

    async fn read_type_tables(&self, cx: &mut Context, mut schema: Schema) -> Result<Schema> {
        let type_tables: Vec<_> = schema
            .tables
            .values()
            .filter(|table| table.is_type_table)
            .cloned()
            .collect();

        // Statements are resolved against the schema being built.
        let db = self.with_schema(schema.clone());
        let mut loaded = IndexMap::new();

        for table in type_tables {
            let pk = table.primary_key()?.name.clone();
            let columns: Vec<String> = table.column_names().map(str::to_string).collect();
            let ret = table.columns.iter().map(|c| Some(c.ty)).collect();

            let stmt = SelectRows::new(&table.name, columns.clone(), Filter::new()).order_by(&pk);
            let records = db.query(cx, Statement::SelectRows(stmt), ret).await?;

            let name_column = table
                .columns
                .iter()
                .find(|c| c.name == "name")
                .or_else(|| table.columns.iter().find(|c| !c.primary_key))
                .map(|c| c.name.clone())
                .ok_or_else(|| {
                    Error::invalid_schema(format!(
                        "enumeration table `{}` needs a name column",
                        table.name
                    ))
                })?;

            let mut type_table = TypeTable::new(&table.name, &pk);
            for record in records {
                let mut row = TypeRow {
                    id: 0,
                    name: String::new(),
                    fields: IndexMap::new(),
                };
                for (column, value) in columns.iter().zip(record.into_vec()) {
                    if *column == pk {
                        row.id = value.to_i64()?;
                    } else if *column == name_column {
                        row.name = value.to_key_string().unwrap_or_else(|_| value.to_string());
                    } else {
                        row.fields.insert(column.clone(), value);
                    }
                }
                type_table.rows.push(row);
            }

            loaded.insert(table.name.clone(), type_table);
        }

        schema.type_tables = loaded;
        Ok(schema)
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("key", &self.key)
            .field("driver", &self.driver)
            .field("tables", &self.schema.tables.len())
            .finish()
    }
}
