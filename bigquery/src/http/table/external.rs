use crate::schema::SchemaField;

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct CsvOptions {
    /// Optional. The separator character for fields in a CSV file.
    /// BigQuery also supports the escape sequence "\t" to specify a tab separator.
    /// The default value is comma (",", U+002C).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_delimiter: Option<String>,
    /// Optional. The number of rows at the top of a CSV file that BigQuery will skip when reading the data.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(serialize_with = "crate::http::to_str_option", skip_serializing_if = "Option::is_none")]
    pub skip_leading_rows: Option<i64>,
    /// Optional. The value that is used to quote data sections in a CSV file.
    /// The default value is a double-quote (").
    /// If your data does not contain quoted sections, set the property value to an empty string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    /// Optional. Indicates if BigQuery should allow quoted data sections that contain newline characters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_quoted_newlines: Option<bool>,
    /// Optional. Indicates if BigQuery should accept rows that are missing trailing optional columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_jagged_rows: Option<bool>,
    /// Optional. The character encoding of the data.
    /// The supported values are UTF-8, ISO-8859-1, UTF-16BE, UTF-16LE, UTF-32BE, and UTF-32LE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoogleSheetsOptions {
    /// Optional. The number of rows at the top of a sheet that BigQuery will skip when reading the data.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(serialize_with = "crate::http::to_str_option", skip_serializing_if = "Option::is_none")]
    pub skip_leading_rows: Option<i64>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct BigtableOptions {
    /// Optional. Column families to expose in the table schema along with their types.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub column_families: Vec<BigtableColumnFamily>,
    /// Optional. If true, the column families that are not specified in columnFamilies are not exposed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_unspecified_column_families: Option<bool>,
    /// Optional. If true, the rowkey column families will be read and converted to string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_rowkey_as_string: Option<bool>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct BigtableColumnFamily {
    /// Identifier of the column family.
    pub family_id: String,
    /// Optional. The type to convert the value in cells of this column family.
    /// BYTES STRING INTEGER FLOAT BOOLEAN. Default type is BYTES.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    /// Optional. The encoding of the values when the type is not STRING. TEXT or BINARY.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    /// Optional. Columns that should be exposed as individual fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<BigtableColumn>,
    /// Optional. If set, only the latest version of value are exposed for all columns in this column family.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_read_latest: Option<bool>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct BigtableColumn {
    /// Qualifier of the column, as raw bytes. Sent base64 encoded.
    #[serde(default, with = "base64_option", skip_serializing_if = "Option::is_none")]
    pub qualifier_encoded: Option<Vec<u8>>,
    /// Qualifier of the column when it is a valid UTF-8 string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier_string: Option<String>,
    /// Optional. Field name used in queries when the qualifier is not a valid BigQuery field identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    /// Optional. The type to convert the value in cells of this column.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_read_latest: Option<bool>,
}

/// Describes data stored outside of BigQuery and queried through a table or a query job.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExternalDataConfiguration {
    /// The fully-qualified URIs that point to your data in Google Cloud.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_uris: Vec<String>,
    /// The data format, e.g. CSV, GOOGLE_SHEETS, NEWLINE_DELIMITED_JSON, AVRO, DATASTORE_BACKUP or BIGTABLE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_format: Option<String>,
    /// Optional. The maximum number of bad records that BigQuery can ignore when reading data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bad_records: Option<i32>,
    /// Try to detect schema and format options automatically.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autodetect: Option<bool>,
    /// Optional. Indicates if BigQuery should allow extra values that are not represented in the table schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_unknown_values: Option<bool>,
    /// Optional. The compression type of the data source. GZIP or NONE.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression: Option<String>,
    /// Optional. The schema of the data. `None` when not given, which differs from an empty schema.
    #[serde(default, with = "crate::schema::option_table_schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<Vec<SchemaField>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_options: Option<CsvOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_sheets_options: Option<GoogleSheetsOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bigtable_options: Option<BigtableOptions>,
}

mod base64_option {
    use base64::prelude::*;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.serialize_str(&BASE64_STANDARD.encode(v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(v) => BASE64_STANDARD.decode(v).map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}
