use crate::schema::Dialect;

#[derive(Debug)]
pub struct Capability {
    pub dialect: Dialect,

    /// INSERT can return generated keys with `RETURNING`. When false the
    /// driver reads the last insert id of the connection.
    pub insert_returning: bool,

    /// Multi-table `DELETE t0 FROM ... JOIN ...` is supported. When false,
    /// joined deletes go through a primary-key subquery.
    pub delete_with_join: bool,
}

impl Capability {
    /// MySQL capabilities
    pub const MYSQL: Self = Self {
        dialect: Dialect::Mysql,
        insert_returning: false,
        delete_with_join: true,
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        dialect: Dialect::Postgresql,
        insert_returning: true,
        delete_with_join: false,
    };
}
