use super::{Comma, Formatter, Params, ToSql};

use quarry_core::{stmt::Value, Error, Result};

impl ToSql for &Value {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        match self {
            Value::Null => fmt!(f, "NULL"),
            Value::List(values) => {
                if values.is_empty() {
                    return Err(Error::invalid_statement("IN requires at least one value"));
                }
                fmt!(f, "(" Comma(values) ")");
            }
            value => {
                let placeholder = f.params.push(value);
                fmt!(f, placeholder);
            }
        }
        Ok(())
    }
}
