use super::Serializer;

use quarry_core::schema::{Dialect, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Flavor {
    Mysql,
    Postgresql,
}

impl<'a> Serializer<'a> {
    pub fn mysql(schema: &'a Schema) -> Serializer<'a> {
        Serializer {
            schema,
            flavor: Flavor::Mysql,
        }
    }

    pub fn postgresql(schema: &'a Schema) -> Serializer<'a> {
        Serializer {
            schema,
            flavor: Flavor::Postgresql,
        }
    }

    pub fn for_dialect(schema: &'a Schema, dialect: Dialect) -> Serializer<'a> {
        match dialect {
            Dialect::Mysql => Serializer::mysql(schema),
            Dialect::Postgresql => Serializer::postgresql(schema),
        }
    }
}
