use super::Schema;
use crate::{Error, Result};

impl Schema {
    /// Checks the structural invariants of the schema model.
    pub fn verify(&self) -> Result<()> {
        for table in self.tables.values() {
            let pk_count = table.primary_keys().count();
            if pk_count == 0 {
                return Err(Error::invalid_schema(format!(
                    "table `{}` has no primary key",
                    table.name
                )));
            }
            if pk_count > 1 && !table.is_association {
                return Err(Error::invalid_schema(format!(
                    "table `{}` has a composite primary key; only association tables may",
                    table.name
                )));
            }

            for column in &table.columns {
                let Some(fk) = &column.foreign_key else {
                    continue;
                };
                let target = self.tables.get(&fk.table).ok_or_else(|| {
                    Error::invalid_schema(format!(
                        "foreign key `{}.{}` references missing table `{}`",
                        table.name, column.name, fk.table
                    ))
                })?;
                if target.column(&fk.column).is_err() {
                    return Err(Error::invalid_schema(format!(
                        "foreign key `{}.{}` references missing column `{}.{}`",
                        table.name, column.name, fk.table, fk.column
                    )));
                }
            }
        }

        for assn in &self.associations {
            let table = self.table(&assn.table)?;
            let pks: Vec<_> = table.primary_keys().collect();
            if pks.len() != 2 {
                return Err(Error::invalid_schema(format!(
                    "association table `{}` must have exactly two primary key columns",
                    assn.table
                )));
            }
            for pk in pks {
                if pk.nullable || pk.foreign_key.is_none() {
                    return Err(Error::invalid_schema(format!(
                        "association column `{}.{}` must be a non-null foreign key",
                        assn.table, pk.name
                    )));
                }
            }
            if assn.a.table == assn.b.table && self.is_type_table(&assn.a.table) {
                return Err(Error::invalid_schema(format!(
                    "association table `{}` references enumeration `{}` twice",
                    assn.table, assn.a.table
                )));
            }
        }

        Ok(())
    }
}
