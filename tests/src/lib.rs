mod exec_log;
pub use exec_log::ExecLog;

pub mod goradd;

pub mod live;

pub mod logging_driver;
pub use logging_driver::{LoggingDriver, Script};

use quarry::{Context, Db, Schema};
use std::sync::{Arc, Once};

/// A database backed by a [`LoggingDriver`], with a fresh context.
pub struct DbTest {
    pub db: Db,
    pub driver: LoggingDriver,
    pub cx: Context,
}

impl DbTest {
    /// The sample schema on a scripted MySQL driver.
    pub fn mysql() -> DbTest {
        DbTest::new(LoggingDriver::mysql(), goradd::schema())
    }

    /// The sample schema on a scripted PostgreSQL driver.
    pub fn postgresql() -> DbTest {
        DbTest::new(LoggingDriver::postgresql(), goradd::schema())
    }

    pub fn new(driver: LoggingDriver, schema: Schema) -> DbTest {
        init_tracing();
        let db = Db::new("goradd", driver.clone(), Arc::new(schema));
        DbTest {
            db,
            driver,
            cx: Context::new(),
        }
    }

    pub fn log(&self) -> ExecLog {
        ExecLog::new(
            self.driver.ops_log_handle(),
            self.db.schema().clone(),
            self.db.capability().dialect,
        )
    }
}

/// Installs a subscriber honouring `RUST_LOG` once per test binary.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
