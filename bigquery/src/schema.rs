//! Table schemas and their wire form.
//!
//! A schema is an ordered list of [`SchemaField`]s; RECORD fields nest further fields. The wire form is
//! `{"fields": [{"name", "type", "mode", "description"?, "fields"?}, ...]}`.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    String,
    Bytes,
    Integer,
    Int64,
    Float,
    Float64,
    Numeric,
    Bignumeric,
    Boolean,
    Bool,
    Timestamp,
    Date,
    Time,
    Datetime,
    Geography,
    Json,
    Interval,
    Record,
    Struct,
    /// A type this crate does not know yet. Kept verbatim so it is written back unchanged.
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::String => "STRING",
            FieldType::Bytes => "BYTES",
            FieldType::Integer => "INTEGER",
            FieldType::Int64 => "INT64",
            FieldType::Float => "FLOAT",
            FieldType::Float64 => "FLOAT64",
            FieldType::Numeric => "NUMERIC",
            FieldType::Bignumeric => "BIGNUMERIC",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Bool => "BOOL",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::Datetime => "DATETIME",
            FieldType::Geography => "GEOGRAPHY",
            FieldType::Json => "JSON",
            FieldType::Interval => "INTERVAL",
            FieldType::Record => "RECORD",
            FieldType::Struct => "STRUCT",
            FieldType::Other(v) => v.as_str(),
        }
    }

    /// RECORD and its alias STRUCT carry child fields.
    pub fn is_record(&self) -> bool {
        matches!(self, FieldType::Record | FieldType::Struct)
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "STRING" => FieldType::String,
            "BYTES" => FieldType::Bytes,
            "INTEGER" => FieldType::Integer,
            "INT64" => FieldType::Int64,
            "FLOAT" => FieldType::Float,
            "FLOAT64" => FieldType::Float64,
            "NUMERIC" => FieldType::Numeric,
            "BIGNUMERIC" => FieldType::Bignumeric,
            "BOOLEAN" => FieldType::Boolean,
            "BOOL" => FieldType::Bool,
            "TIMESTAMP" => FieldType::Timestamp,
            "DATE" => FieldType::Date,
            "TIME" => FieldType::Time,
            "DATETIME" => FieldType::Datetime,
            "GEOGRAPHY" => FieldType::Geography,
            "JSON" => FieldType::Json,
            "INTERVAL" => FieldType::Interval,
            "RECORD" => FieldType::Record,
            "STRUCT" => FieldType::Struct,
            _ => FieldType::Other(value),
        }
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        match value {
            FieldType::Other(v) => v,
            v => v.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum FieldMode {
    #[default]
    Nullable,
    Required,
    Repeated,
    /// An unrecognized mode read from the wire. Row projection rejects it.
    Unknown(String),
}

impl FieldMode {
    pub fn as_str(&self) -> &str {
        match self {
            FieldMode::Nullable => "NULLABLE",
            FieldMode::Required => "REQUIRED",
            FieldMode::Repeated => "REPEATED",
            FieldMode::Unknown(v) => v.as_str(),
        }
    }
}

impl From<String> for FieldMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "NULLABLE" => FieldMode::Nullable,
            "REQUIRED" => FieldMode::Required,
            "REPEATED" => FieldMode::Repeated,
            _ => FieldMode::Unknown(value),
        }
    }
}

impl From<FieldMode> for String {
    fn from(value: FieldMode) -> Self {
        match value {
            FieldMode::Unknown(v) => v,
            v => v.as_str().to_string(),
        }
    }
}

impl fmt::Display for FieldMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes a single column, or a nested column of a RECORD.
///
/// Values are immutable: the `with_*` methods return a new field.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct SchemaField {
    name: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    #[serde(default)]
    mode: FieldMode,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    fields: Vec<SchemaField>,
}

impl SchemaField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            mode: FieldMode::Nullable,
            description: None,
            fields: vec![],
        }
    }

    /// A RECORD field holding `fields`.
    pub fn record(name: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self::new(name, FieldType::Record).with_fields(fields)
    }

    pub fn with_mode(self, mode: FieldMode) -> Self {
        Self { mode, ..self }
    }

    pub fn with_description(self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self
        }
    }

    pub fn with_fields(self, fields: Vec<SchemaField>) -> Self {
        Self { fields, ..self }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn mode(&self) -> &FieldMode {
        &self.mode
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn is_nullable(&self) -> bool {
        self.mode == FieldMode::Nullable
    }

    /// API representation of this field, keys in `name, type, mode, description, fields` order.
    pub fn to_api_repr(&self) -> Value {
        let mut info = Map::new();
        info.insert("name".to_string(), Value::String(self.name.clone()));
        info.insert("type".to_string(), Value::String(self.field_type.as_str().to_string()));
        info.insert("mode".to_string(), Value::String(self.mode.as_str().to_string()));
        if let Some(description) = &self.description {
            info.insert("description".to_string(), Value::String(description.clone()));
        }
        if self.field_type.is_record() || !self.fields.is_empty() {
            info.insert(
                "fields".to_string(),
                Value::Array(self.fields.iter().map(SchemaField::to_api_repr).collect()),
            );
        }
        Value::Object(info)
    }
}

impl Serialize for SchemaField {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_api_repr().serialize(serializer)
    }
}

/// Parses the `fields` of a schema resource.
///
/// A value without a `fields` key means "no schema" and yields an empty list.
pub fn decode(info: &Value) -> Result<Vec<SchemaField>, serde_json::Error> {
    match info.get("fields") {
        None | Some(Value::Null) => Ok(vec![]),
        Some(fields) => Vec::<SchemaField>::deserialize(fields),
    }
}

/// Builds the schema resource `{"fields": [...]}` for `fields`.
pub fn encode(fields: &[SchemaField]) -> Value {
    let mut info = Map::new();
    info.insert(
        "fields".to_string(),
        Value::Array(fields.iter().map(SchemaField::to_api_repr).collect()),
    );
    Value::Object(info)
}

/// `#[serde(with)]` adapter for a `schema` property stored as `Vec<SchemaField>`.
pub(crate) mod table_schema {
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    use super::SchemaField;

    pub fn serialize<S>(fields: &[SchemaField], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        super::encode(fields).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<SchemaField>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            Some(info) => super::decode(&info).map_err(de::Error::custom),
            None => Ok(vec![]),
        }
    }
}

/// `#[serde(with)]` adapter for an optional schema, where absent and empty differ.
pub(crate) mod option_table_schema {
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    use super::SchemaField;

    pub fn serialize<S>(fields: &Option<Vec<SchemaField>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        fields.as_deref().map(super::encode).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<SchemaField>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            Some(info) => super::decode(&info).map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}
