use super::{select::{DeleteQuery, Select}, Comma, Delimited, Flavor, Formatter, Ident, Params, ToSql};

use quarry_core::{
    stmt::{self, Filter, Statement, Value},
    Error, Result,
};

impl ToSql for &Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        match self {
            Statement::Select(plan) => Select(plan).to_sql(f),
            Statement::Count(count) => count.to_sql(f),
            Statement::DeleteQuery(plan) => DeleteQuery(plan).to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
            Statement::Update(stmt) => stmt.to_sql(f),
            Statement::Delete(stmt) => stmt.to_sql(f),
            Statement::SelectRows(stmt) => stmt.to_sql(f),
        }
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        f.serializer.schema.table(&self.table)?;
        let table = Ident(&self.table);

        if self.columns.is_empty() {
            match f.serializer.flavor {
                Flavor::Mysql => fmt!(f, "INSERT INTO " table " () VALUES ()"),
                Flavor::Postgresql => fmt!(f, "INSERT INTO " table " DEFAULT VALUES"),
            }
        } else {
            let columns = Comma(self.columns.iter().map(Ident));
            let values = Comma(&self.values);
            fmt!(f, "INSERT INTO " table " (" columns ") VALUES (" values ")");
        }

        if let (Flavor::Postgresql, Some(returning)) = (f.serializer.flavor, &self.returning) {
            fmt!(f, " RETURNING " Ident(returning));
        }
        Ok(())
    }
}

impl ToSql for &stmt::Update {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        if self.assignments.is_empty() {
            return Err(Error::invalid_statement(format!(
                "update of `{}` sets no columns",
                self.table
            )));
        }

        let assignments = Comma(self.assignments.iter().map(Assignment));
        let filter = &self.filter;
        fmt!(f, "UPDATE " Ident(&self.table) " SET " assignments filter);
        Ok(())
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let filter = &self.filter;
        fmt!(f, "DELETE FROM " Ident(&self.table) filter);
        Ok(())
    }
}

impl ToSql for &stmt::SelectRows {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let columns = Comma(self.columns.iter().map(Ident));
        let filter = &self.filter;
        fmt!(f, "SELECT " columns " FROM " Ident(&self.table) filter);

        if !self.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(self.order_by.iter().map(Ident)));
        }
        Ok(())
    }
}

/// `column = value` in a SET list
struct Assignment<'a>(&'a (String, Value));

impl ToSql for Assignment<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let (column, value) = self.0;
        fmt!(f, Ident(column) " = " value);
        Ok(())
    }
}

/// One column predicate of a filter
struct Condition<'a>(&'a (String, Value));

impl ToSql for Condition<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        let (column, value) = self.0;
        match value {
            Value::Null => fmt!(f, Ident(column) " IS NULL"),
            Value::List(_) => fmt!(f, Ident(column) " IN " value),
            _ => fmt!(f, Ident(column) " = " value),
        }
        Ok(())
    }
}

/// ` WHERE ...`, or nothing for an empty filter
impl ToSql for &Filter {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) -> Result<()> {
        if !self.is_empty() {
            let conditions = self.conditions.iter().map(Condition);
            fmt!(f, " WHERE " Delimited(conditions, " AND "));
        }
        Ok(())
    }
}
