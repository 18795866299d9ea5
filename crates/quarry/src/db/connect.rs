use crate::{DatabaseConfig, DriverKind};

use quarry_core::{driver::Driver, Result};

use std::sync::Arc;

pub(super) fn driver(config: &DatabaseConfig) -> Result<Arc<dyn Driver>> {
    match config.driver {
        DriverKind::Mysql => connect_mysql(config),
        DriverKind::Postgresql => connect_postgresql(config),
    }
}

#[cfg(feature = "mysql")]
fn connect_mysql(config: &DatabaseConfig) -> Result<Arc<dyn Driver>> {
    let driver = quarry_driver_mysql::MySQL::with_session(config.url()?, &config.session())?;
    Ok(Arc::new(driver))
}

#[cfg(not(feature = "mysql"))]
fn connect_mysql(_config: &DatabaseConfig) -> Result<Arc<dyn Driver>> {
    Err(quarry_core::Error::invalid_config("`mysql` feature not enabled"))
}

#[cfg(feature = "postgresql")]
fn connect_postgresql(config: &DatabaseConfig) -> Result<Arc<dyn Driver>> {
    let driver =
        quarry_driver_postgresql::PostgreSQL::with_session(config.url()?, &config.session())?;
    Ok(Arc::new(driver))
}

#[cfg(not(feature = "postgresql"))]
fn connect_postgresql(_config: &DatabaseConfig) -> Result<Arc<dyn Driver>> {
    Err(quarry_core::Error::invalid_config(
        "`postgresql` feature not enabled",
    ))
}
