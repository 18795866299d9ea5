use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use postgres_types::{accepts, private::BytesMut, to_sql_checked, IsNull, ToSql, Type};
use quarry_core::{
    schema::ColumnType,
    stmt::{self, Value as CoreValue},
    Error, Result,
};
use rust_decimal::Decimal;
use std::str::FromStr;
use tokio_postgres::Row;

type BoxError = Box<dyn std::error::Error + Sync + Send>;

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        match &self.0 {
            stmt::Value::Null => Ok(IsNull::Yes),
            stmt::Value::Bool(value) => value.to_sql(ty, out),
            stmt::Value::I32(value) => integer_to_sql(i64::from(*value), ty, out),
            stmt::Value::I64(value) => integer_to_sql(*value, ty, out),
            stmt::Value::U32(value) => integer_to_sql(i64::from(*value), ty, out),
            stmt::Value::U64(value) => match *ty {
                Type::NUMERIC => Decimal::from(*value).to_sql(ty, out),
                _ => integer_to_sql(i64::try_from(*value)?, ty, out),
            },
            stmt::Value::F32(value) => float_to_sql(f64::from(*value), ty, out),
            stmt::Value::F64(value) => float_to_sql(*value, ty, out),
            stmt::Value::String(value) => match *ty {
                Type::NUMERIC => Decimal::from_str(value)?.to_sql(ty, out),
                Type::INT2 | Type::INT4 | Type::INT8 => integer_to_sql(value.trim().parse()?, ty, out),
                Type::FLOAT4 | Type::FLOAT8 => float_to_sql(value.trim().parse()?, ty, out),
                Type::TIMESTAMPTZ | Type::TIMESTAMP | Type::DATE | Type::TIME => {
                    let time = self.0.to_time().map_err(|err| err.to_string())?;
                    time_to_sql(time, ty, out)
                }
                _ => value.to_sql(ty, out),
            },
            stmt::Value::Bytes(value) => value.to_sql(ty, out),
            stmt::Value::Time(value) => time_to_sql(*value, ty, out),
            stmt::Value::List(_) => Err("list values cannot be bound as a single argument".into()),
        }
    }

    accepts!(
        BOOL,
        INT2,
        INT4,
        INT8,
        FLOAT4,
        FLOAT8,
        NUMERIC,
        TEXT,
        VARCHAR,
        BPCHAR,
        NAME,
        UNKNOWN,
        BYTEA,
        TIMESTAMP,
        TIMESTAMPTZ,
        DATE,
        TIME
    );
    to_sql_checked!();
}

fn integer_to_sql(value: i64, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::FLOAT8 => (value as f64).to_sql(ty, out),
        Type::NUMERIC => Decimal::from(value).to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            value.to_string().to_sql(ty, out)
        }
        _ => value.to_sql(ty, out),
    }
}

fn float_to_sql(value: f64, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
    match *ty {
        Type::FLOAT4 => (value as f32).to_sql(ty, out),
        Type::NUMERIC => Decimal::try_from(value)?.to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
            value.to_string().to_sql(ty, out)
        }
        _ => value.to_sql(ty, out),
    }
}

fn time_to_sql(
    value: DateTime<Utc>,
    ty: &Type,
    out: &mut BytesMut,
) -> std::result::Result<IsNull, BoxError> {
    match *ty {
        Type::TIMESTAMP => value.naive_utc().to_sql(ty, out),
        Type::DATE => value.date_naive().to_sql(ty, out),
        Type::TIME => value.time().to_sql(ty, out),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::UNKNOWN => {
            value.to_rfc3339().to_sql(ty, out)
        }
        _ => value.to_sql(ty, out),
    }
}

/// Reads cell `index` of `row` into the representation of `ty`. Cells of
/// computed columns (`ty` is `None`) keep their natural type.
pub(crate) fn from_row(
    row: &Row,
    index: usize,
    ty: Option<ColumnType>,
    parse_time: bool,
) -> Result<CoreValue> {
    fn get<'a, T>(row: &'a Row, index: usize) -> Result<Option<T>>
    where
        T: tokio_postgres::types::FromSql<'a>,
    {
        row.try_get::<usize, Option<T>>(index)
            .map_err(Error::driver_operation_failed)
    }

    let column_type = row.columns()[index].type_().clone();

    let value = match column_type {
        Type::BOOL => get::<bool>(row, index)?.map(CoreValue::Bool),
        Type::INT2 => get::<i16>(row, index)?.map(|v| CoreValue::I32(v.into())),
        Type::INT4 => get::<i32>(row, index)?.map(CoreValue::I32),
        Type::INT8 => get::<i64>(row, index)?.map(CoreValue::I64),
        Type::OID => get::<u32>(row, index)?.map(CoreValue::U32),
        Type::FLOAT4 => get::<f32>(row, index)?.map(CoreValue::F32),
        Type::FLOAT8 => get::<f64>(row, index)?.map(CoreValue::F64),
        Type::NUMERIC => get::<Decimal>(row, index)?.map(|v| CoreValue::String(v.to_string())),
        Type::BYTEA => get::<Vec<u8>>(row, index)?.map(CoreValue::Bytes),
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, index)?.map(|v| time(v, parse_time)),
        Type::TIMESTAMP => {
            get::<NaiveDateTime>(row, index)?.map(|v| time(v.and_utc(), parse_time))
        }
        Type::DATE => get::<NaiveDate>(row, index)?.map(|v| {
            if parse_time {
                CoreValue::Time(v.and_time(NaiveTime::MIN).and_utc())
            } else {
                CoreValue::String(v.to_string())
            }
        }),
        Type::TIME => get::<NaiveTime>(row, index)?.map(|v| {
            if parse_time {
                CoreValue::Time(NaiveDate::default().and_time(v).and_utc())
            } else {
                CoreValue::String(v.to_string())
            }
        }),
        _ => get::<String>(row, index)?.map(CoreValue::String),
    }
    .unwrap_or(CoreValue::Null);

    match ty {
        Some(ColumnType::Time) if !parse_time => Ok(value),
        Some(ty) => value.coerce(ty),
        None => Ok(value),
    }
}

fn time(value: DateTime<Utc>, parse_time: bool) -> CoreValue {
    if parse_time {
        CoreValue::Time(value)
    } else {
        CoreValue::String(value.naive_utc().to_string())
    }
}
