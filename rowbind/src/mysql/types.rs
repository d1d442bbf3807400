//! Value and parameter conversion for MySQL

use crate::error::{Error, Result};
use crate::statement::Parameter;
use crate::value::Value;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql_async::{Params, Value as MySqlValue};

/// Convert a statement's parameters into mysql_async params.
///
/// All-positional parameters bind in order to `?` placeholders; named ones
/// bind to `:name` placeholders with any `@`/`:` sigil stripped. Mixing the
/// two is rejected.
pub fn to_mysql_params(parameters: &[Parameter]) -> Result<Params> {
    if parameters.is_empty() {
        return Ok(Params::Empty);
    }

    let positional = parameters.iter().filter(|p| p.is_positional()).count();
    if positional == parameters.len() {
        let values = parameters.iter().map(|p| to_mysql_value(p.value())).collect();
        return Ok(Params::Positional(values));
    }
    if positional > 0 {
        return Err(Error::Parameter(format!(
            "cannot mix {} positional and {} named parameters",
            positional,
            parameters.len() - positional
        )));
    }

    let mut named: Vec<(String, MySqlValue)> = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        let name = parameter.bare_name();
        if name.is_empty() {
            return Err(Error::Parameter(format!(
                "parameter name `{}` has no identifier",
                parameter.name()
            )));
        }
        if named.iter().any(|(existing, _)| existing == name) {
            return Err(Error::Parameter(format!("duplicate parameter `{}`", name)));
        }
        named.push((name.to_string(), to_mysql_value(parameter.value())));
    }
    Ok(Params::from(named))
}

/// Convert a rowbind Value to a mysql_async Value
pub fn to_mysql_value(value: &Value) -> MySqlValue {
    match value {
        Value::Null => MySqlValue::NULL,
        Value::Bool(v) => MySqlValue::from(*v),
        Value::I8(v) => MySqlValue::from(*v),
        Value::I16(v) => MySqlValue::from(*v),
        Value::I32(v) => MySqlValue::from(*v),
        Value::I64(v) => MySqlValue::from(*v),
        Value::U8(v) => MySqlValue::from(*v),
        Value::U16(v) => MySqlValue::from(*v),
        Value::U32(v) => MySqlValue::from(*v),
        Value::U64(v) => MySqlValue::from(*v),
        Value::F32(v) => MySqlValue::from(*v),
        Value::F64(v) => MySqlValue::from(*v),
        Value::String(v) => MySqlValue::from(v.as_str()),
        Value::Bytes(v) => MySqlValue::from(v.as_slice()),
        Value::Date(v) => {
            MySqlValue::Date(v.year() as u16, v.month() as u8, v.day() as u8, 0, 0, 0, 0)
        }
        Value::DateTime(v) => MySqlValue::Date(
            v.year() as u16,
            v.month() as u8,
            v.day() as u8,
            v.hour() as u8,
            v.minute() as u8,
            v.second() as u8,
            v.and_utc().timestamp_subsec_micros(),
        ),
        Value::Time(v) => MySqlValue::Time(
            false,
            0,
            v.hour() as u8,
            v.minute() as u8,
            v.second() as u8,
            v.nanosecond() / 1000,
        ),
        // Sent as text; the server casts to the column type
        Value::Decimal(v) => MySqlValue::from(v.to_string()),
        Value::Json(v) => MySqlValue::from(v.to_string()),
    }
}

fn date_text(year: u16, month: u8, day: u8) -> String {
    format!("{:04}-{:02}-{:02}", year, month, day)
}

fn time_text(hours: u32, minutes: u8, seconds: u8, micros: u32) -> String {
    if micros == 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}.{:06}", hours, minutes, seconds, micros)
    }
}

/// Convert a mysql_async Value to a rowbind Value
///
/// Text arrives as bytes and is kept as a string when it is valid UTF-8.
/// A DATETIME at exact midnight is indistinguishable from a DATE and comes
/// back as `Value::Date`; `FromValue` promotes it where a datetime is wanted.
///
/// Temporal values chrono cannot represent (zero dates, TIME outside
/// `00:00:00..24:00:00`) come back as `Value::String` in the server's text
/// form, so every legal column value converts.
pub fn from_mysql_value(value: MySqlValue) -> Value {
    match value {
        MySqlValue::NULL => Value::Null,
        MySqlValue::Bytes(v) => match String::from_utf8(v) {
            Ok(s) => Value::String(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        MySqlValue::Int(v) => Value::I64(v),
        MySqlValue::UInt(v) => Value::U64(v),
        MySqlValue::Float(v) => Value::F32(v),
        MySqlValue::Double(v) => Value::F64(v),
        MySqlValue::Date(year, month, day, hour, minute, second, micros) => {
            let date = NaiveDate::from_ymd_opt(year.into(), month.into(), day.into());
            let time =
                NaiveTime::from_hms_micro_opt(hour.into(), minute.into(), second.into(), micros);
            match (date, time) {
                (Some(date), Some(_)) if (hour, minute, second, micros) == (0, 0, 0, 0) => {
                    Value::Date(date)
                }
                (Some(date), Some(time)) => Value::DateTime(NaiveDateTime::new(date, time)),
                _ if (hour, minute, second, micros) == (0, 0, 0, 0) => {
                    Value::String(date_text(year, month, day))
                }
                _ => Value::String(format!(
                    "{} {}",
                    date_text(year, month, day),
                    time_text(hour.into(), minute, second, micros)
                )),
            }
        }
        MySqlValue::Time(is_neg, days, hours, minutes, seconds, micros) => {
            let time = if is_neg || days > 0 {
                None
            } else {
                NaiveTime::from_hms_micro_opt(hours.into(), minutes.into(), seconds.into(), micros)
            };
            match time {
                Some(time) => Value::Time(time),
                None => Value::String(format!(
                    "{}{}",
                    if is_neg { "-" } else { "" },
                    time_text(days * 24 + u32::from(hours), minutes, seconds, micros)
                )),
            }
        }
    }
}
