use super::{Flavor, Formatter, Params, ToSql};

use quarry_core::Result;

/// A quoted identifier.
///
/// MySQL quotes the whole name in backticks. PostgreSQL quotes each
/// `.`-separated part, so schema-qualified table names stay qualified.
pub(super) struct Ident<S>(pub(super) S);

impl<S: AsRef<str>> ToSql for Ident<S> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) -> Result<()> {
        let name = self.0.as_ref();
        match f.serializer.flavor {
            Flavor::Mysql => {
                f.dst.push('`');
                f.dst.push_str(&name.replace('`', "``"));
                f.dst.push('`');
            }
            Flavor::Postgresql => {
                for (i, part) in name.split('.').enumerate() {
                    if i > 0 {
                        f.dst.push('.');
                    }
                    f.dst.push('"');
                    f.dst.push_str(&part.replace('"', "\"\""));
                    f.dst.push('"');
                }
            }
        }
        Ok(())
    }
}

/// `alias.column`
pub(super) struct Qualified<'a>(pub(super) &'a str, pub(super) &'a str);

impl ToSql for Qualified<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) -> Result<()> {
        fmt!(f, Ident(self.0) "." Ident(self.1));
        Ok(())
    }
}
