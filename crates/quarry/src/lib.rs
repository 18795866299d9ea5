pub mod config;
pub use config::{Config, DatabaseConfig, DriverKind};

mod context;
pub use context::{CancelHandle, Context};

pub mod db;
pub use db::{Db, TransactionToken};

pub mod json;

mod materialize;

mod query;
pub use query::Query;

pub mod record;
pub use record::{Collection, Record, Row};

mod registry;
pub use registry::Registry;

mod type_table;
pub use type_table::TypeTableEnum;

pub use quarry_core::{
    bail, err,
    node::{self, ops, Node},
    schema::{self, Schema},
    stmt::Value,
    Error, Result,
};

#[doc(hidden)]
pub mod codegen_support {
    pub use crate::{Collection, Db, Error, Node, Query, Record, Result, Row, Value};
    pub use quarry_core::{
        schema::{TypeRow, TypeTable},
        stmt::ValueRecord,
    };
    pub use std::{fmt, str::FromStr};
}
