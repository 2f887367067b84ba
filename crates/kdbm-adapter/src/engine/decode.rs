//! Column decoding into JSON values.

use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Number, Value};

/// Conversion of a decoded column value into JSON.
pub(crate) trait ToJson {
    fn to_json(self) -> Value;
}

macro_rules! plain_to_json {
    ($($ty:ty),+) => {
        $(impl ToJson for $ty {
            fn to_json(self) -> Value {
                Value::from(self)
            }
        })+
    };
}

plain_to_json!(i8, i16, i32, i64, u8, u16, u32, u64, bool, String);

impl ToJson for f32 {
    fn to_json(self) -> Value {
        f64::from(self).to_json()
    }
}

impl ToJson for f64 {
    fn to_json(self) -> Value {
        Number::from_f64(self).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl ToJson for BigDecimal {
    fn to_json(self) -> Value {
        let text = self.to_string();
        match serde_json::from_str::<Number>(&text) {
            Ok(n) => Value::Number(n),
            Err(_) => Value::String(text),
        }
    }
}

impl ToJson for Vec<u8> {
    fn to_json(self) -> Value {
        Value::String(String::from_utf8_lossy(&self).into_owned())
    }
}

impl ToJson for Value {
    fn to_json(self) -> Value {
        self
    }
}

impl ToJson for uuid::Uuid {
    fn to_json(self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToJson for NaiveDate {
    fn to_json(self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToJson for NaiveTime {
    fn to_json(self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToJson for NaiveDateTime {
    fn to_json(self) -> Value {
        Value::String(self.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    }
}

impl ToJson for DateTime<Utc> {
    fn to_json(self) -> Value {
        Value::String(self.to_rfc3339())
    }
}

/// Decode every column of a sqlx row into a [`Row`](crate::row::Row).
///
/// Each column is tried against the listed Rust types in order; the first
/// type the driver accepts wins. SQL NULL becomes JSON null, and a column no
/// listed type can decode becomes null with a debug log.
macro_rules! decode_row {
    ($row:expr; $($ty:ty),+ $(,)?) => {{
        use sqlx::{Column as _, Row as _, ValueRef as _};
        use $crate::engine::decode::ToJson as _;

        let row = $row;
        let mut out = $crate::row::Row::with_capacity(row.columns().len());
        for column in row.columns() {
            let idx = column.ordinal();
            let is_null = row
                .try_get_raw(idx)
                .map(|raw| raw.is_null())
                .unwrap_or(true);

            let mut value: Option<serde_json::Value> = None;
            if is_null {
                value = Some(serde_json::Value::Null);
            }
            $(
                if value.is_none() {
                    if let Ok(v) = row.try_get::<$ty, _>(idx) {
                        value = Some(v.to_json());
                    }
                }
            )+

            let value = value.unwrap_or_else(|| {
                tracing::debug!(
                    column = %column.name(),
                    type_name = %sqlx::TypeInfo::name(sqlx::Column::type_info(column)),
                    "column type not decodable, returning null"
                );
                serde_json::Value::Null
            });
            out.insert(column.name().to_string(), value);
        }
        out
    }};
}

pub(crate) use decode_row;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decimal_becomes_number() {
        let d: BigDecimal = "1234.50".parse().expect("valid decimal");
        assert_eq!(d.to_json(), json!(1234.5));
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        assert_eq!(f64::NAN.to_json(), Value::Null);
        assert_eq!(2.5f32.to_json(), json!(2.5));
    }

    #[test]
    fn test_bytes_become_lossy_text() {
        assert_eq!(b"abc".to_vec().to_json(), json!("abc"));
    }

    #[test]
    fn test_timestamp_format() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(12, 30, 0))
            .expect("valid timestamp");
        assert_eq!(ts.to_json(), json!("2024-03-01T12:30:00"));
    }
}
