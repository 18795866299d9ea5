mod describe;

mod value;
pub(crate) use value::Value;

use postgres_types::ToSql;
use quarry_core::{
    async_trait,
    driver::{operation, Capability, Driver, Operation, Response, Session, Tls},
    err,
    schema::{Description, Dialect, Schema},
    stmt::{self, ValueRecord},
    Error, Result,
};
use quarry_sql as sql;
use std::sync::Arc;
use tokio_postgres::{error::SqlState, Client, Config, NoTls};
use tracing::{debug, trace, warn, Level};
use url::Url;

#[derive(Debug, Clone)]
pub struct PostgreSQL {
    config: Config,
    parse_time: bool,
}

impl PostgreSQL {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_session(url, &Session::default())
    }

    pub fn with_session(url: impl Into<String>, session: &Session) -> Result<Self> {
        let url = Url::parse(&url.into())?;

        if url.scheme() != "postgresql" && url.scheme() != "postgres" {
            return Err(Error::invalid_config(format!(
                "connection URL does not have a `postgresql` scheme; url={url}"
            )));
        }

        let host = url.host_str().ok_or_else(|| {
            Error::invalid_config(format!("missing host in connection URL; url={url}"))
        })?;

        let dbname = url.path().trim_start_matches('/');
        if dbname.is_empty() {
            return Err(Error::invalid_config(format!(
                "no database specified - missing path in connection URL; url={url}"
            )));
        }

        if session.tls == Tls::Require {
            return Err(Error::invalid_config(
                "tls = \"require\" is not supported by the postgresql driver",
            ));
        }

        let mut config = Config::new();
        config.host(host);
        config.dbname(dbname);

        if let Some(port) = url.port() {
            config.port(port);
        }

        if !url.username().is_empty() {
            config.user(url.username());
        }

        if let Some(password) = url.password() {
            config.password(password);
        }

        let options = session_options(session)?;
        if !options.is_empty() {
            config.options(&options);
        }

        Ok(Self::with_config(config, session.parse_time))
    }

    pub fn with_config(config: Config, parse_time: bool) -> Self {
        Self { config, parse_time }
    }
}

/// Renders session settings as `-c name=value` startup options.
fn session_options(session: &Session) -> Result<String> {
    let mut options = vec![];

    if let Some(timezone) = &session.timezone {
        options.push(format!("-c TimeZone={}", escape(timezone)));
    }

    for (name, value) in &session.params {
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            return Err(Error::invalid_config(format!(
                "invalid session parameter name `{name}`"
            )));
        }
        options.push(format!("-c {name}={}", escape(value)));
    }

    Ok(options.join(" "))
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace(' ', "\\ ")
}

#[async_trait]
impl Driver for PostgreSQL {
    fn capability(&self) -> &'static Capability {
        &Capability::POSTGRESQL
    }

    async fn connect(&self) -> Result<Box<dyn quarry_core::driver::Connection>> {
        let (client, connection) = self
            .config
            .connect(NoTls)
            .await
            .map_err(Error::driver_operation_failed)?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "postgresql connection error");
            }
        });

        Ok(Box::new(Connection {
            client,
            parse_time: self.parse_time,
        }))
    }
}

#[derive(Debug)]
pub struct Connection {
    client: Client,
    parse_time: bool,
}

impl Connection {
    /// Wraps a connected client. The caller keeps driving its connection
    /// task.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            parse_time: true,
        }
    }

    async fn exec_insert(&mut self, schema: &Schema, op: operation::Insert) -> Result<Response> {
        let returning = op.stmt.returning.is_some();
        let stmt = stmt::Statement::Insert(op.stmt);
        let (sql, params) = serialize(schema, &stmt)?;
        let args = args(&params);

        match op.ret {
            Some(ty) if returning => {
                let row = self
                    .client
                    .query_one(&sql, &args)
                    .await
                    .map_err(|err| classify(err, &sql))?;
                let id = value::from_row(&row, 0, Some(ty), self.parse_time)?;
                Ok(Response::values(vec![ValueRecord::from_vec(vec![id])]))
            }
            Some(_) => Err(err!("insert into `{}` expects a key but returns none", stmt_table(&stmt))),
            None => {
                let count = self
                    .client
                    .execute(&sql, &args)
                    .await
                    .map_err(|err| classify(err, &sql))?;
                Ok(Response::count(count))
            }
        }
    }

    async fn exec_query(&mut self, schema: &Schema, op: operation::QuerySql) -> Result<Response> {
        let (sql, params) = serialize(schema, &op.stmt)?;
        let args = args(&params);

        let Some(ret) = op.ret else {
            let count = self
                .client
                .execute(&sql, &args)
                .await
                .map_err(|err| classify(err, &sql))?;
            return Ok(Response::count(count));
        };

        let rows = self
            .client
            .query(&sql, &args)
            .await
            .map_err(|err| classify(err, &sql))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            if row.len() != ret.len() {
                return Err(err!(
                    "row has {} columns, expected {}; sql={sql}",
                    row.len(),
                    ret.len()
                ));
            }

            let fields = ret
                .iter()
                .enumerate()
                .map(|(i, ty)| value::from_row(row, i, *ty, self.parse_time))
                .collect::<Result<Vec<_>>>()?;
            records.push(ValueRecord::from_vec(fields));
        }

        Ok(Response::values(records))
    }
}

impl From<Client> for Connection {
    fn from(client: Client) -> Self {
        Self::new(client)
    }
}

#[async_trait]
impl quarry_core::driver::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::POSTGRESQL
    }

    async fn exec(&mut self, schema: &Arc<Schema>, op: Operation) -> Result<Response> {
        match op {
            Operation::Transaction(op) => {
                let sql = op.sql(Dialect::Postgresql);
                debug!(sql, "transaction");
                self.client
                    .batch_execute(sql)
                    .await
                    .map_err(|err| classify(err, sql))?;
                Ok(Response::count(0))
            }
            Operation::Insert(op) => self.exec_insert(schema, op).await,
            Operation::QuerySql(op) => self.exec_query(schema, op).await,
        }
    }

    async fn describe(&mut self) -> Result<Description> {
        describe::describe(&self.client).await
    }
}

fn stmt_table(stmt: &stmt::Statement) -> &str {
    match stmt {
        stmt::Statement::Insert(insert) => &insert.table,
        _ => "",
    }
}

fn serialize(schema: &Schema, stmt: &stmt::Statement) -> Result<(String, Vec<Value>)> {
    let mut params: Vec<stmt::Value> = Vec::new();
    let sql = sql::Serializer::postgresql(schema).serialize(stmt, &mut params)?;

    trace!(sql = %sql, params = params.len(), statement = stmt.name(), "executing statement");

    Ok((sql, params.into_iter().map(Value::from).collect()))
}

fn args(params: &[Value]) -> Vec<&(dyn ToSql + Sync)> {
    params
        .iter()
        .map(|param| param as &(dyn ToSql + Sync))
        .collect()
}

/// Maps a server error into the error kinds callers can match on. The SQL
/// text is attached when debug logging is enabled.
fn classify(err: tokio_postgres::Error, sql: &str) -> Error {
    let integrity = match err.code() {
        Some(code) if *code == SqlState::UNIQUE_VIOLATION || *code == SqlState::FOREIGN_KEY_VIOLATION => {
            Some(
                err.as_db_error()
                    .map(|db| db.message().to_string())
                    .unwrap_or_else(|| err.to_string()),
            )
        }
        _ => None,
    };

    let error = match integrity {
        Some(message) => Error::integrity(message),
        None => Error::driver_operation_failed(err),
    };

    if tracing::enabled!(Level::DEBUG) {
        error.context(err!("while executing `{sql}`"))
    } else {
        error
    }
}
