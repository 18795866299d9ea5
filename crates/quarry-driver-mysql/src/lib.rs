mod describe;

mod value;
pub(crate) use value::Value;

use mysql_async::{
    prelude::{Queryable, ToValue},
    Conn, OptsBuilder, Pool, SslOpts,
};
use quarry_core::{
    async_trait,
    driver::{
        operation,
        Capability, Driver, Operation, Response, Session, Tls,
    },
    err,
    schema::{Description, Dialect, Schema},
    stmt::{self, ValueRecord},
    Error, Result,
};
use quarry_sql as sql;
use std::sync::Arc;
use tracing::{debug, trace, Level};
use url::Url;

/// Server error codes reported as integrity violations: duplicate keys and
/// foreign key failures.
const INTEGRITY_CODES: [u16; 5] = [1062, 1216, 1217, 1451, 1452];

#[derive(Debug)]
pub struct MySQL {
    pool: Pool,
    parse_time: bool,
}

impl MySQL {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_session(url, &Session::default())
    }

    pub fn with_session(url: impl Into<String>, session: &Session) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str)?;

        if url.scheme() != "mysql" {
            return Err(Error::invalid_config(format!(
                "connection url does not have a `mysql` scheme; url={url}"
            )));
        }

        if url.host_str().is_none() {
            return Err(Error::invalid_config(format!(
                "missing host in connection URL; url={url}"
            )));
        }

        if url.path().is_empty() || url.path() == "/" {
            return Err(Error::invalid_config(format!(
                "no database specified - missing path in connection URL; url={url}"
            )));
        }

        let opts = mysql_async::Opts::from_url(url.as_ref())
            .map_err(|err| Error::invalid_config(err.to_string()))?;
        let mut opts = OptsBuilder::from_opts(opts)
            .client_found_rows(true)
            .init(init_statements(session)?);

        if session.tls == Tls::Require {
            opts = opts.ssl_opts(Some(SslOpts::default()));
        }

        Ok(Self {
            pool: Pool::new(opts),
            parse_time: session.parse_time,
        })
    }
}

/// Statements run on every new connection to apply the session settings.
fn init_statements(session: &Session) -> Result<Vec<String>> {
    let mut init = vec![];

    if let Some(timezone) = &session.timezone {
        init.push(format!("SET time_zone = '{}'", escape(timezone)));
    }

    for (name, value) in &session.params {
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::invalid_config(format!(
                "invalid session parameter name `{name}`"
            )));
        }
        init.push(format!("SET SESSION {name} = '{}'", escape(value)));
    }

    Ok(init)
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

impl From<Pool> for MySQL {
    fn from(pool: Pool) -> Self {
        Self {
            pool,
            parse_time: true,
        }
    }
}

#[async_trait]
impl Driver for MySQL {
    fn capability(&self) -> &'static Capability {
        &Capability::MYSQL
    }

    async fn connect(&self) -> Result<Box<dyn quarry_core::driver::Connection>> {
        let conn = self
            .pool
            .get_conn()
            .await
            .map_err(Error::driver_operation_failed)?;
        Ok(Box::new(Connection {
            conn,
            parse_time: self.parse_time,
        }))
    }
}

#[derive(Debug)]
pub struct Connection {
    conn: Conn,
    parse_time: bool,
}

impl Connection {
    pub fn new(conn: Conn) -> Self {
        Self {
            conn,
            parse_time: true,
        }
    }

    async fn exec_insert(&mut self, schema: &Schema, op: operation::Insert) -> Result<Response> {
        let ret = op.ret;
        let stmt = stmt::Statement::Insert(op.stmt);
        let (sql, args) = serialize(schema, &stmt)?;

        self.conn
            .exec_drop(&sql, args)
            .await
            .map_err(|err| classify(err, &sql))?;

        let Some(ty) = ret else {
            return Ok(Response::count(self.conn.affected_rows()));
        };

        let id = self
            .conn
            .last_insert_id()
            .ok_or_else(|| err!("LAST_INSERT_ID() returned no value"))?;

        let id = stmt::Value::U64(id).coerce(ty)?;
        Ok(Response::values(vec![ValueRecord::from_vec(vec![id])]))
    }

    async fn exec_query(&mut self, schema: &Schema, op: operation::QuerySql) -> Result<Response> {
        let (sql, args) = serialize(schema, &op.stmt)?;

        let statement = self
            .conn
            .prep(&sql)
            .await
            .map_err(|err| classify(err, &sql))?;

        let Some(ret) = op.ret else {
            self.conn
                .exec_drop(&statement, args)
                .await
                .map_err(|err| classify(err, &sql))?;
            return Ok(Response::count(self.conn.affected_rows()));
        };

        let rows: Vec<mysql_async::Row> = self
            .conn
            .exec(&statement, args)
            .await
            .map_err(|err| classify(err, &sql))?;

        let mut records = Vec::with_capacity(rows.len());
        for mut row in rows {
            if row.len() != ret.len() {
                return Err(err!(
                    "row has {} columns, expected {}; sql={sql}",
                    row.len(),
                    ret.len()
                ));
            }

            let mut fields = Vec::with_capacity(row.len());
            for (i, ty) in ret.iter().enumerate() {
                let raw = row
                    .take::<mysql_async::Value, usize>(i)
                    .unwrap_or(mysql_async::Value::NULL);
                fields.push(Value::from_sql(raw, *ty, self.parse_time)?);
            }
            records.push(ValueRecord::from_vec(fields));
        }

        Ok(Response::values(records))
    }
}

impl From<Conn> for Connection {
    fn from(conn: Conn) -> Self {
        Self::new(conn)
    }
}

#[async_trait]
impl quarry_core::driver::Connection for Connection {
    fn capability(&self) -> &'static Capability {
        &Capability::MYSQL
    }

    async fn exec(&mut self, schema: &Arc<Schema>, op: Operation) -> Result<Response> {
        match op {
            Operation::Transaction(op) => {
                let sql = op.sql(Dialect::Mysql);
                debug!(sql, "transaction");
                self.conn
                    .query_drop(sql)
                    .await
                    .map_err(|err| classify(err, sql))?;
                Ok(Response::count(0))
            }
            Operation::Insert(op) => self.exec_insert(schema, op).await,
            Operation::QuerySql(op) => self.exec_query(schema, op).await,
        }
    }

    async fn describe(&mut self) -> Result<Description> {
        describe::describe(&mut self.conn).await
    }
}

fn serialize(schema: &Schema, stmt: &stmt::Statement) -> Result<(String, Vec<mysql_async::Value>)> {
    let mut params: Vec<stmt::Value> = Vec::new();
    let sql = sql::Serializer::mysql(schema).serialize(stmt, &mut params)?;

    trace!(sql = %sql, params = params.len(), statement = stmt.name(), "executing statement");

    let args = params
        .into_iter()
        .map(|param| Value::from(param).to_value())
        .collect();
    Ok((sql, args))
}

/// Maps a server error into the error kinds callers can match on. The SQL
/// text is attached when debug logging is enabled.
fn classify(err: mysql_async::Error, sql: &str) -> Error {
    let integrity = match &err {
        mysql_async::Error::Server(server) if INTEGRITY_CODES.contains(&server.code) => {
            Some(server.message.clone())
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
