use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use mysql_async::prelude::ToValue;
use quarry_core::{
    schema::ColumnType,
    stmt::Value as CoreValue,
    Result,
};

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl ToValue for Value {
    fn to_value(&self) -> mysql_async::Value {
        match &self.0 {
            CoreValue::Null => mysql_async::Value::NULL,
            CoreValue::Bool(value) => value.to_value(),
            CoreValue::I32(value) => value.to_value(),
            CoreValue::I64(value) => value.to_value(),
            CoreValue::U32(value) => value.to_value(),
            CoreValue::U64(value) => value.to_value(),
            CoreValue::F32(value) => value.to_value(),
            CoreValue::F64(value) => value.to_value(),
            CoreValue::String(value) => value.to_value(),
            CoreValue::Bytes(value) => value.to_value(),
            CoreValue::Time(value) => value.naive_utc().to_value(),
            // Lists are expanded into one placeholder per item by the
            // serializer; a list reaching the driver is bound as text.
            CoreValue::List(_) => self.0.to_string().to_value(),
        }
    }
}

impl Value {
    /// Converts a result cell into the representation of `ty`. Cells of
    /// computed columns (`ty` is `None`) keep their natural type.
    pub(crate) fn from_sql(
        raw: mysql_async::Value,
        ty: Option<ColumnType>,
        parse_time: bool,
    ) -> Result<CoreValue> {
        let value = match raw {
            mysql_async::Value::NULL => CoreValue::Null,
            mysql_async::Value::Int(v) => CoreValue::I64(v),
            mysql_async::Value::UInt(v) => CoreValue::U64(v),
            mysql_async::Value::Float(v) => CoreValue::F32(v),
            mysql_async::Value::Double(v) => CoreValue::F64(v),
            mysql_async::Value::Bytes(bytes) if ty == Some(ColumnType::Bytes) => {
                CoreValue::Bytes(bytes)
            }
            mysql_async::Value::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(s) => CoreValue::String(s),
                Err(err) => CoreValue::Bytes(err.into_bytes()),
            },
            mysql_async::Value::Date(year, month, day, hour, minute, second, micros) => {
                match NaiveDate::from_ymd_opt(year.into(), month.into(), day.into()).and_then(
                    |date| date.and_hms_micro_opt(hour.into(), minute.into(), second.into(), micros),
                ) {
                    Some(time) if parse_time => CoreValue::Time(time.and_utc()),
                    Some(time) => CoreValue::String(format_datetime(time)),
                    // Zero dates
                    None => CoreValue::Null,
                }
            }
            mysql_async::Value::Time(negative, days, hours, minutes, seconds, micros) => {
                let delta = TimeDelta::days(days.into())
                    + TimeDelta::hours(hours.into())
                    + TimeDelta::minutes(minutes.into())
                    + TimeDelta::seconds(seconds.into())
                    + TimeDelta::microseconds(micros.into());
                let epoch = NaiveDateTime::default();
                let time = if negative { epoch - delta } else { epoch + delta };

                if parse_time {
                    CoreValue::Time(time.and_utc())
                } else {
                    CoreValue::String(time.format("%H:%M:%S").to_string())
                }
            }
        };

        match ty {
            Some(ColumnType::Time) if !parse_time => Ok(value),
            Some(ty) => value.coerce(ty),
            None => Ok(value),
        }
    }
}

fn format_datetime(time: NaiveDateTime) -> String {
    if time.hour() == 0 && time.minute() == 0 && time.second() == 0 && time.nanosecond() == 0 {
        format!("{:04}-{:02}-{:02}", time.year(), time.month(), time.day())
    } else {
        time.format("%Y-%m-%d %H:%M:%S%.f").to_string()
    }
}
