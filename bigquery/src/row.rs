//! Row values for streaming inserts.
//!
//! [`encode_row`] turns a positional row into the JSON object `tabledata.insertAll` expects, and
//! [`row_from_mapping`] projects a name-keyed mapping onto schema order first.

use std::collections::{BTreeMap, HashMap};

use base64::prelude::*;
use bigdecimal::BigDecimal;
use serde_json::{Map, Number, Value as Json};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::schema::{FieldMode, FieldType, SchemaField};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("row has {actual} values but the schema has {expected} fields")]
    SchemaMismatch { expected: usize, actual: usize },
    #[error("missing required field: {0}")]
    MissingRequiredField(String),
    #[error("unknown field mode {mode} for field {field}")]
    UnknownFieldMode { field: String, mode: String },
    #[error("invalid value for field {field} of type {field_type}")]
    InvalidValue { field: String, field_type: String },
    #[error("table has no schema")]
    TableHasNoSchema,
}

/// A single cell of a row.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    /// Sent as-is whatever the column type.
    String(String),
    Bytes(Vec<u8>),
    Timestamp(OffsetDateTime),
    Date(Date),
    Time(Time),
    Datetime(PrimitiveDateTime),
    Numeric(BigDecimal),
    /// Elements of a REPEATED field.
    Repeated(Vec<Value>),
    /// Children of a RECORD field, by name.
    Record(BTreeMap<String, Value>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(v: OffsetDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Date> for Value {
    fn from(v: Date) -> Self {
        Value::Date(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(v: BigDecimal) -> Self {
        Value::Numeric(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Encodes `row` positionally against `schema`.
pub fn encode_row(schema: &[SchemaField], row: &[Value]) -> Result<Map<String, Json>, Error> {
    if schema.len() != row.len() {
        return Err(Error::SchemaMismatch {
            expected: schema.len(),
            actual: row.len(),
        });
    }
    let mut record = Map::with_capacity(schema.len());
    for (field, value) in schema.iter().zip(row) {
        record.insert(field.name().to_string(), encode_field(field, value)?);
    }
    Ok(record)
}

/// Orders the values of `mapping` by `schema`.
///
/// Absent REPEATED fields become an empty list and absent NULLABLE fields become null.
pub fn row_from_mapping(schema: &[SchemaField], mapping: &HashMap<String, Value>) -> Result<Vec<Value>, Error> {
    schema
        .iter()
        .map(|field| {
            let value = mapping.get(field.name()).cloned();
            match field.mode() {
                FieldMode::Required => value.ok_or_else(|| Error::MissingRequiredField(field.name().to_string())),
                FieldMode::Repeated => Ok(value.unwrap_or(Value::Repeated(vec![]))),
                FieldMode::Nullable => Ok(value.unwrap_or(Value::Null)),
                FieldMode::Unknown(mode) => Err(Error::UnknownFieldMode {
                    field: field.name().to_string(),
                    mode: mode.clone(),
                }),
            }
        })
        .collect()
}

fn encode_field(field: &SchemaField, value: &Value) -> Result<Json, Error> {
    match (field.mode(), value) {
        (FieldMode::Repeated, Value::Repeated(values)) => values
            .iter()
            .map(|v| encode_single(field, v))
            .collect::<Result<Vec<_>, _>>()
            .map(Json::Array),
        _ => encode_single(field, value),
    }
}

fn encode_record(fields: &[SchemaField], values: &BTreeMap<String, Value>) -> Result<Map<String, Json>, Error> {
    let mut record = Map::with_capacity(fields.len());
    for field in fields {
        let value = match values.get(field.name()) {
            Some(v) => encode_field(field, v)?,
            None => Json::Null,
        };
        record.insert(field.name().to_string(), value);
    }
    Ok(record)
}

fn encode_single(field: &SchemaField, value: &Value) -> Result<Json, Error> {
    let invalid = || Error::InvalidValue {
        field: field.name().to_string(),
        field_type: field.field_type().to_string(),
    };
    let encoded = match (field.field_type(), value) {
        (_, Value::Null) => Json::Null,
        (_, Value::String(v)) => Json::String(v.clone()),
        (FieldType::Integer | FieldType::Int64, Value::Int64(v)) => Json::from(*v),
        (FieldType::Float | FieldType::Float64, Value::Int64(v)) => Json::from(*v),
        (FieldType::Float | FieldType::Float64, Value::Float64(v)) => {
            Number::from_f64(*v).map(Json::Number).ok_or_else(invalid)?
        }
        (FieldType::Boolean | FieldType::Bool, Value::Bool(v)) => Json::Bool(*v),
        (FieldType::Bytes, Value::Bytes(v)) => Json::String(BASE64_STANDARD.encode(v)),
        (FieldType::Timestamp, Value::Timestamp(v)) => Json::String(v.format(&Rfc3339).map_err(|_| invalid())?),
        (FieldType::Date, Value::Date(v)) => Json::String(
            v.format(format_description!("[year]-[month]-[day]"))
                .map_err(|_| invalid())?,
        ),
        (FieldType::Time, Value::Time(v)) => Json::String(
            v.format(format_description!("[hour]:[minute]:[second].[subsecond digits:6]"))
                .map_err(|_| invalid())?,
        ),
        (FieldType::Datetime, Value::Datetime(v)) => Json::String(
            v.format(format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]"
            ))
            .map_err(|_| invalid())?,
        ),
        (FieldType::Numeric | FieldType::Bignumeric, Value::Numeric(v)) => Json::String(v.to_string()),
        (FieldType::Record | FieldType::Struct, Value::Record(values)) => {
            Json::Object(encode_record(field.fields(), values)?)
        }
        _ => return Err(invalid()),
    };
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;
    use time::macros::{date, datetime, time};

    use super::*;

    fn field(name: &str, field_type: FieldType, mode: FieldMode) -> SchemaField {
        SchemaField::new(name, field_type).with_mode(mode)
    }

    #[test]
    fn test_encode_bytes() {
        let schema = vec![field("blob", FieldType::Bytes, FieldMode::Nullable)];
        let row = encode_row(&schema, &[Value::Bytes(b"q".to_vec())]).unwrap();
        assert_eq!(Json::Object(row), json!({"blob": "cQ=="}));
    }

    #[test]
    fn test_encode_scalars() {
        let schema = vec![
            field("i", FieldType::Integer, FieldMode::Required),
            field("f", FieldType::Float64, FieldMode::Nullable),
            field("b", FieldType::Boolean, FieldMode::Nullable),
            field("ts", FieldType::Timestamp, FieldMode::Nullable),
            field("d", FieldType::Date, FieldMode::Nullable),
            field("t", FieldType::Time, FieldMode::Nullable),
            field("dt", FieldType::Datetime, FieldMode::Nullable),
            field("n", FieldType::Numeric, FieldMode::Nullable),
            field("s", FieldType::Integer, FieldMode::Nullable),
            field("null", FieldType::Geography, FieldMode::Nullable),
        ];
        let row = vec![
            Value::Int64(7),
            Value::Float64(1.5),
            Value::Bool(true),
            Value::Timestamp(datetime!(2024-01-02 03:04:05 UTC)),
            Value::Date(date!(2024 - 01 - 02)),
            Value::Time(time!(03:04:05)),
            Value::Datetime(datetime!(2024-01-02 03:04:05)),
            Value::Numeric(BigDecimal::from_str("12.5").unwrap()),
            Value::from("42"),
            Value::Null,
        ];
        let encoded = encode_row(&schema, &row).unwrap();
        assert_eq!(
            Json::Object(encoded),
            json!({
                "i": 7,
                "f": 1.5,
                "b": true,
                "ts": "2024-01-02T03:04:05Z",
                "d": "2024-01-02",
                "t": "03:04:05.000000",
                "dt": "2024-01-02T03:04:05.000000",
                "n": "12.5",
                "s": "42",
                "null": null
            })
        );
    }

    #[test]
    fn test_encode_record_and_repeated() {
        let schema = vec![
            field("tags", FieldType::String, FieldMode::Repeated),
            SchemaField::record(
                "owner",
                vec![
                    field("name", FieldType::String, FieldMode::Required),
                    field("keys", FieldType::Bytes, FieldMode::Repeated),
                ],
            ),
        ];
        let owner = BTreeMap::from([(
            "keys".to_string(),
            Value::Repeated(vec![Value::Bytes(b"q".to_vec()), Value::Bytes(vec![])]),
        )]);
        let row = vec![
            Value::Repeated(vec![Value::from("a"), Value::from("b")]),
            Value::Record(owner),
        ];
        let encoded = encode_row(&schema, &row).unwrap();
        assert_eq!(
            Json::Object(encoded),
            json!({"tags": ["a", "b"], "owner": {"name": null, "keys": ["cQ==", ""]}})
        );
    }

    #[test]
    fn test_encode_errors() {
        let schema = vec![field("i", FieldType::Integer, FieldMode::Nullable)];
        assert_eq!(
            encode_row(&schema, &[]).unwrap_err(),
            Error::SchemaMismatch { expected: 1, actual: 0 }
        );
        assert_eq!(
            encode_row(&schema, &[Value::Bool(true)]).unwrap_err(),
            Error::InvalidValue {
                field: "i".to_string(),
                field_type: "INTEGER".to_string()
            }
        );
        let schema = vec![field("f", FieldType::Float, FieldMode::Nullable)];
        assert!(matches!(
            encode_row(&schema, &[Value::Float64(f64::NAN)]),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_row_from_mapping() {
        let schema = vec![
            field("a", FieldType::Integer, FieldMode::Required),
            field("b", FieldType::Integer, FieldMode::Repeated),
            field("c", FieldType::Integer, FieldMode::Nullable),
        ];
        let mapping = HashMap::from([("a".to_string(), Value::Int64(1))]);
        assert_eq!(
            row_from_mapping(&schema, &mapping).unwrap(),
            vec![Value::Int64(1), Value::Repeated(vec![]), Value::Null]
        );

        let mapping = HashMap::from([("c".to_string(), Value::Int64(3))]);
        assert_eq!(
            row_from_mapping(&schema, &mapping).unwrap_err(),
            Error::MissingRequiredField("a".to_string())
        );
    }

    #[test]
    fn test_row_from_mapping_unknown_mode() {
        let schema = vec![field("a", FieldType::Integer, FieldMode::Unknown("BOGUS".to_string()))];
        let mapping = HashMap::from([("a".to_string(), Value::Int64(1))]);
        assert_eq!(
            row_from_mapping(&schema, &mapping).unwrap_err(),
            Error::UnknownFieldMode {
                field: "a".to_string(),
                mode: "BOGUS".to_string()
            }
        );
    }
}
