use quarry_core::{
    async_trait,
    driver::{Capability, Connection, Driver, Operation, Response, Rows},
    schema::{Description, Schema},
    stmt::{Value, ValueRecord},
    Error, Result,
};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicI64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

/// What the next operation sent to a [`LoggingDriver`] does.
#[derive(Debug)]
pub enum Script {
    Respond(Response),
    Fail(Error),

    /// Never completes; only cancellation ends the call.
    Stall,
}

/// An in-memory driver that records every operation and replays scripted
/// responses.
///
/// Operations without a scripted response succeed with a neutral result:
/// inserts return the next generated key, queries return no rows, and
/// statements report one affected row.
#[derive(Debug, Clone)]
pub struct LoggingDriver {
    capability: &'static Capability,
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    /// Log of all operations executed through this driver
    ops_log: Arc<Mutex<Vec<DriverOp>>>,

    script: Mutex<VecDeque<Script>>,
    description: Mutex<Option<Description>>,
    next_id: AtomicI64,
    connects: AtomicUsize,
}

#[derive(Debug)]
pub struct DriverOp {
    pub operation: Operation,
    pub response: Response,
}

impl LoggingDriver {
    pub fn new(capability: &'static Capability) -> Self {
        Self {
            capability,
            shared: Arc::new(Shared {
                ops_log: Arc::new(Mutex::new(Vec::new())),
                script: Mutex::new(VecDeque::new()),
                description: Mutex::new(None),
                next_id: AtomicI64::new(1),
                connects: AtomicUsize::new(0),
            }),
        }
    }

    pub fn mysql() -> Self {
        Self::new(&Capability::MYSQL)
    }

    pub fn postgresql() -> Self {
        Self::new(&Capability::POSTGRESQL)
    }

    /// Get a handle to access the operations log
    pub fn ops_log_handle(&self) -> Arc<Mutex<Vec<DriverOp>>> {
        self.shared.ops_log.clone()
    }

    pub fn push(&self, script: Script) {
        self.shared.script.lock().unwrap().push_back(script);
    }

    /// Queues a result set for the next operation.
    pub fn push_rows(&self, rows: Vec<Vec<Value>>) {
        let records = rows.into_iter().map(ValueRecord::from_vec).collect();
        self.push(Script::Respond(Response::values(records)));
    }

    /// Queues an affected-row count for the next operation.
    pub fn push_count(&self, count: u64) {
        self.push(Script::Respond(Response::count(count)));
    }

    pub fn push_error(&self, error: Error) {
        self.push(Script::Fail(error));
    }

    pub fn stall(&self) {
        self.push(Script::Stall);
    }

    /// Keys handed out to unscripted inserts start at `id`.
    pub fn set_next_id(&self, id: i64) {
        self.shared.next_id.store(id, Ordering::SeqCst);
    }

    pub fn set_description(&self, description: Description) {
        *self.shared.description.lock().unwrap() = Some(description);
    }

    /// Number of connections opened so far.
    pub fn connects(&self) -> usize {
        self.shared.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Driver for LoggingDriver {
    fn capability(&self) -> &'static Capability {
        self.capability
    }

    async fn connect(&self) -> Result<Box<dyn Connection>> {
        self.shared.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(LoggingConnection {
            capability: self.capability,
            shared: self.shared.clone(),
        }))
    }
}

#[derive(Debug)]
pub struct LoggingConnection {
    capability: &'static Capability,
    shared: Arc<Shared>,
}

#[async_trait]
impl Connection for LoggingConnection {
    fn capability(&self) -> &'static Capability {
        self.capability
    }

    async fn exec(&mut self, _schema: &Arc<Schema>, operation: Operation) -> Result<Response> {
        let script = self.shared.script.lock().unwrap().pop_front();

        let response = match script {
            Some(Script::Respond(response)) => response,
            Some(Script::Fail(error)) => {
                self.log(operation, Response::count(0));
                return Err(error);
            }
            Some(Script::Stall) => {
                self.log(operation, Response::count(0));
                return std::future::pending().await;
            }
            None => self.default_response(&operation),
        };

        self.log(operation, duplicate_response(&response));
        Ok(response)
    }

    async fn describe(&mut self) -> Result<Description> {
        self.shared
            .description
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::invalid_schema("no description scripted"))
    }
}

impl LoggingConnection {
    fn log(&self, operation: Operation, response: Response) {
        self.shared
            .ops_log
            .lock()
            .expect("Failed to acquire ops log lock")
            .push(DriverOp { operation, response });
    }

    fn default_response(&self, operation: &Operation) -> Response {
        match operation {
            Operation::Insert(insert) if insert.ret.is_some() => {
                let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
                Response::values(vec![ValueRecord::from_vec(vec![Value::I64(id)])])
            }
            Operation::QuerySql(query) if query.ret.is_some() => Response::values(vec![]),
            Operation::Transaction(_) => Response::count(0),
            _ => Response::count(1),
        }
    }
}

fn duplicate_response(response: &Response) -> Response {
    match &response.rows {
        Rows::Count(count) => Response::count(*count),
        Rows::Values(records) => Response::values(records.clone()),
    }
}
