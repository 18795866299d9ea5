//! Connections to a live sample database, for tests marked `#[ignore]`.
//!
//! The database must hold the goradd sample data. Point the tests at it with
//! `QUARRY_TEST_MYSQL_URL` or `QUARRY_TEST_POSTGRESQL_URL`, for example
//! `mysql://root@127.0.0.1:3306/goradd_unit?timezone=UTC`.

use crate::goradd;
use quarry::{DatabaseConfig, Db, Result};

pub const MYSQL_URL: &str = "QUARRY_TEST_MYSQL_URL";
pub const POSTGRESQL_URL: &str = "QUARRY_TEST_POSTGRESQL_URL";

/// The sample database named by the environment variable `var`, or `None`
/// when it is unset.
pub fn database(var: &str) -> Result<Option<Db>> {
    let Ok(url) = std::env::var(var) else {
        return Ok(None);
    };

    crate::init_tracing();
    let config = DatabaseConfig::from_url(&url)?;
    Db::connect("goradd", &config, goradd::schema()).map(Some)
}

/// Every configured sample database.
pub fn databases() -> Result<Vec<Db>> {
    let mut dbs = vec![];
    for var in [MYSQL_URL, POSTGRESQL_URL] {
        dbs.extend(database(var)?);
    }
    Ok(dbs)
}
