#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::{Comma, Delimited};

mod flavor;
use flavor::Flavor;

mod ident;
use ident::{Ident, Qualified};

mod params;
pub use params::{Params, Placeholder};

// Fragment serializers
mod node;
mod select;
mod statement;
mod value;

use quarry_core::{
    driver::operation::Transaction,
    schema::{Dialect, Schema},
    stmt::Statement,
    Result,
};

/// Serialize a statement to a SQL string
#[derive(Debug)]
pub struct Serializer<'a> {
    /// Schema against which the statement is to be serialized
    schema: &'a Schema,

    /// The database flavor handles the differences between SQL dialects.
    flavor: Flavor,
}

struct Formatter<'a, T> {
    /// Handle to the serializer
    serializer: &'a Serializer<'a>,

    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameters
    params: &'a mut T,
}

impl Serializer<'_> {
    /// Renders `stmt`, pushing its arguments onto `params` in placeholder
    /// order. Composition errors, such as an `IN` over an empty list, are
    /// reported here.
    pub fn serialize(&self, stmt: &Statement, params: &mut impl Params) -> Result<String> {
        let mut ret = String::new();

        let mut fmt = Formatter {
            serializer: self,
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt)?;

        ret.push(';');
        Ok(ret)
    }

    /// Serialize a transaction control operation to a SQL string.
    pub fn serialize_transaction(&self, op: Transaction) -> String {
        op.sql(self.dialect()).to_string()
    }

    pub fn dialect(&self) -> Dialect {
        match self.flavor {
            Flavor::Mysql => Dialect::Mysql,
            Flavor::Postgresql => Dialect::Postgresql,
        }
    }
}
