use std::fmt::Display;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serializer};
use serde_json::Value;

pub mod bigquery_client;
pub mod bigquery_dataset_client;
pub mod bigquery_job_client;
pub mod bigquery_project_client;
pub mod bigquery_table_client;
pub mod bigquery_tabledata_client;
pub mod dataset;
pub mod error;
pub mod job;
pub mod project;
pub mod table;
pub mod tabledata;
pub mod update;

/// BigQuery encodes int64 values as JSON strings. Accepts strings, numbers and null.
fn from_str_option<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: FromStr,
    T::Err: Display,
    D: Deserializer<'de>,
{
    let s: Result<Value, _> = Deserialize::deserialize(deserializer);
    match s {
        Ok(Value::String(s)) => T::from_str(&s).map_err(de::Error::custom).map(Some),
        Ok(Value::Number(num)) => T::from_str(&num.to_string()).map_err(de::Error::custom).map(Some),
        Ok(Value::Null) => Ok(None),
        Ok(_) => Err(de::Error::custom("Incorrect type")),
        Err(_) => Ok(None),
    }
}

pub fn from_str<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: FromStr,
    T::Err: Display,
    D: de::Deserializer<'de>,
{
    let s: Value = Deserialize::deserialize(deserializer)?;
    match s {
        Value::String(s) => T::from_str(&s).map_err(de::Error::custom),
        Value::Number(num) => T::from_str(&num.to_string()).map_err(de::Error::custom),
        _ => Err(de::Error::custom("Incorrect type")),
    }
}

/// Writes int64 values back in their string form. Pair with `skip_serializing_if = "Option::is_none"`.
fn to_str_option<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    match value {
        Some(v) => serializer.collect_str(v),
        None => serializer.serialize_none(),
    }
}

/// Timestamps BigQuery reports as milliseconds since the epoch, usually in string form.
pub(crate) mod epoch_millis_option {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use time::OffsetDateTime;

    pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(&(v.unix_timestamp_nanos() / 1_000_000)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(s)) => match s.parse::<i64>() {
                Ok(v) => v as f64,
                Err(_) => s.parse::<f64>().map_err(de::Error::custom)?,
            },
            Some(Value::Number(n)) => n.as_f64().ok_or_else(|| de::Error::custom("invalid timestamp"))?,
            Some(_) => return Err(de::Error::custom("Incorrect type")),
        };
        if !millis.is_finite() || millis < i64::MIN as f64 || millis >= i64::MAX as f64 {
            return Err(de::Error::custom(format!("timestamp out of range: {millis}")));
        }
        let nanos = (millis as i64 as i128)
            .checked_mul(1_000_000)
            .ok_or_else(|| de::Error::custom("timestamp out of range"))?;
        OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map(Some)
            .map_err(de::Error::custom)
    }
}
