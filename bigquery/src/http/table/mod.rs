pub mod delete;
pub mod external;
pub mod get;
pub mod insert;
pub mod list;
pub mod patch;

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::Value;
use time::OffsetDateTime;

use crate::http::dataset::DatasetReference;
use crate::http::error::Error;
use crate::http::table::external::ExternalDataConfiguration;
use crate::http::update::{Updatable, UpdatableField};
use crate::row;
use crate::schema::{self, SchemaField};

#[derive(Clone, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    /// Required. The ID of the project containing this table.
    pub project_id: String,
    /// Required. The ID of the dataset containing this table.
    pub dataset_id: String,
    /// Required. The ID of the table.
    /// The ID must contain only letters (a-z, A-Z), numbers (0-9), or underscores (_).
    /// The maximum length is 1,024 characters. Certain operations allow suffixing of the table ID with a partition decorator, such as sample_table$20190123.
    pub table_id: String,
}

impl TableReference {
    pub fn new(project_id: impl Into<String>, dataset_id: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
            table_id: table_id.into(),
        }
    }

    /// The dataset containing this table.
    pub fn dataset(&self) -> DatasetReference {
        DatasetReference::new(self.project_id.as_str(), self.dataset_id.as_str())
    }

    /// URL path for the table's APIs.
    pub fn path(&self) -> String {
        format!(
            "/projects/{}/datasets/{}/tables/{}",
            self.project_id, self.dataset_id, self.table_id
        )
    }
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimePartitionType {
    Hour,
    #[default]
    Day,
    Month,
    Year,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimePartitioning {
    /// Required. The supported types are DAY, HOUR, MONTH, and YEAR,
    /// which will generate one partition per day, hour, month, and year, respectively.
    #[serde(rename = "type")]
    pub partition_type: TimePartitionType,
    /// Optional. Number of milliseconds for which to keep the storage for a partition.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(serialize_with = "crate::http::to_str_option", skip_serializing_if = "Option::is_none")]
    pub expiration_ms: Option<i64>,
    /// Optional. If not set, the table is partitioned by pseudo column '_PARTITIONTIME';
    /// if set, the table is partitioned by this field.
    /// The field must be a top-level TIMESTAMP or DATE field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ViewDefinition {
    /// Required. A query that BigQuery executes when the view is referenced.
    pub query: String,
    /// Queries and views that reference this view must use the same flag value.
    /// The service treats an absent value as true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_legacy_sql: Option<bool>,
}

/// A BigQuery table, view or external table.
///
/// Fetching a table always yields a complete new value; nothing of a previous read is kept.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Output only. The type of resource ID.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Output only. A hash of this resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Output only. An opaque ID uniquely identifying the table, in the form `project:dataset.table`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Output only. A URL that can be used to access this resource again.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Required. Reference describing the ID of this table.
    #[serde(default)]
    pub table_reference: TableReference,
    /// Optional. A descriptive name for this table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    /// Optional. A user-friendly description of this table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The labels associated with this table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
    /// Optional. Describes the schema of this table. Empty when the table has no schema.
    #[serde(default, with = "crate::schema::table_schema", skip_serializing_if = "Vec::is_empty")]
    pub schema: Vec<SchemaField>,
    /// If specified, configures time-based partitioning for this table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_partitioning: Option<TimePartitioning>,
    /// Output only. The size of this table in logical bytes, excluding any data in the streaming buffer.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(serialize_with = "crate::http::to_str_option", skip_serializing_if = "Option::is_none")]
    pub num_bytes: Option<i64>,
    /// Output only. The number of rows of data in this table, excluding any data in the streaming buffer.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(serialize_with = "crate::http::to_str_option", skip_serializing_if = "Option::is_none")]
    pub num_rows: Option<u64>,
    /// Output only. The time when this table was created.
    #[serde(default, with = "crate::http::epoch_millis_option", skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<OffsetDateTime>,
    /// Optional. The time when this table expires. Expired tables are deleted and their storage reclaimed.
    #[serde(default, with = "crate::http::epoch_millis_option", skip_serializing_if = "Option::is_none")]
    pub expiration_time: Option<OffsetDateTime>,
    /// Output only. The time when this table was last modified.
    #[serde(default, with = "crate::http::epoch_millis_option", skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<OffsetDateTime>,
    /// Output only. Describes the table type: TABLE, VIEW, EXTERNAL, MATERIALIZED_VIEW or SNAPSHOT.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub table_type: Option<String>,
    /// Optional. The view definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<ViewDefinition>,
    /// Optional. Describes the data format, location, and other properties of a table stored outside of BigQuery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_data_configuration: Option<ExternalDataConfiguration>,
    /// Output only. The geographic location where the table resides.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Table {
    pub fn new(table_reference: TableReference) -> Self {
        Self {
            table_reference,
            ..Default::default()
        }
    }

    /// Parses a table resource returned by the API.
    pub fn from_resource(resource: Value) -> Result<Self, Error> {
        if resource.pointer("/tableReference/tableId").is_none() {
            return Err(Error::MissingIdentity("tableReference.tableId"));
        }
        Ok(serde_json::from_value(resource)?)
    }

    pub fn path(&self) -> String {
        self.table_reference.path()
    }

    pub fn created(&self) -> Option<OffsetDateTime> {
        self.creation_time
    }

    pub fn modified(&self) -> Option<OffsetDateTime> {
        self.last_modified_time
    }

    pub fn expires(&self) -> Option<OffsetDateTime> {
        self.expiration_time
    }

    pub fn set_expires(&mut self, expires: Option<OffsetDateTime>) {
        self.expiration_time = expires;
    }

    pub fn partitioning_type(&self) -> Option<&TimePartitionType> {
        self.time_partitioning.as_ref().map(|p| &p.partition_type)
    }

    /// Partitions the table by `partition_type`, or removes partitioning when `None`.
    pub fn set_partitioning_type(&mut self, partition_type: Option<TimePartitionType>) {
        match partition_type {
            Some(partition_type) => {
                self.time_partitioning.get_or_insert_with(Default::default).partition_type = partition_type
            }
            None => self.time_partitioning = None,
        }
    }

    pub fn partition_expiration(&self) -> Option<i64> {
        self.time_partitioning.as_ref().and_then(|p| p.expiration_ms)
    }

    /// Sets the partition expiration in milliseconds. A table without partitioning becomes DAY partitioned.
    pub fn set_partition_expiration(&mut self, expiration_ms: Option<i64>) -> Result<(), Error> {
        if matches!(expiration_ms, Some(v) if v <= 0) {
            return Err(Error::Validation("partition expiration must be a positive number of milliseconds".to_string()));
        }
        match expiration_ms {
            Some(v) => self.time_partitioning.get_or_insert_with(Default::default).expiration_ms = Some(v),
            None => {
                if let Some(partitioning) = self.time_partitioning.as_mut() {
                    partitioning.expiration_ms = None
                }
            }
        }
        Ok(())
    }

    pub fn view_query(&self) -> Option<&str> {
        self.view.as_ref().map(|v| v.query.as_str())
    }

    /// Makes the table a view of `query`, or removes the view definition when `None`.
    pub fn set_view_query(&mut self, query: Option<String>) {
        match query {
            Some(query) => self.view.get_or_insert_with(Default::default).query = query,
            None => self.view = None,
        }
    }

    pub fn view_use_legacy_sql(&self) -> Option<bool> {
        self.view.as_ref().and_then(|v| v.use_legacy_sql)
    }

    pub fn set_view_use_legacy_sql(&mut self, use_legacy_sql: bool) {
        self.view.get_or_insert_with(Default::default).use_legacy_sql = Some(use_legacy_sql);
    }

    /// Orders the values of `mapping` by the table schema.
    pub fn row_from_mapping(&self, mapping: &HashMap<String, row::Value>) -> Result<Vec<row::Value>, row::Error> {
        if self.schema.is_empty() {
            return Err(row::Error::TableHasNoSchema);
        }
        row::row_from_mapping(&self.schema, mapping)
    }
}

/// Table properties that can be changed with [`BigqueryTableClient::update`](crate::http::bigquery_table_client::BigqueryTableClient::update).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TableField {
    Description,
    FriendlyName,
    Expires,
    Location,
    Labels,
    TimePartitioning,
    View,
    Schema,
    ExternalDataConfiguration,
}

impl UpdatableField for TableField {
    const RESOURCE: &'static str = "table";
    const ALL: &'static [Self] = &[
        TableField::Description,
        TableField::FriendlyName,
        TableField::Expires,
        TableField::Location,
        TableField::Labels,
        TableField::TimePartitioning,
        TableField::View,
        TableField::Schema,
        TableField::ExternalDataConfiguration,
    ];

    fn name(&self) -> &'static str {
        match self {
            TableField::Description => "description",
            TableField::FriendlyName => "friendly_name",
            TableField::Expires => "expires",
            TableField::Location => "location",
            TableField::Labels => "labels",
            TableField::TimePartitioning => "time_partitioning",
            TableField::View => "view",
            TableField::Schema => "schema",
            TableField::ExternalDataConfiguration => "external_data_configuration",
        }
    }

    fn wire_name(&self) -> &'static str {
        match self {
            TableField::Description => "description",
            TableField::FriendlyName => "friendlyName",
            TableField::Expires => "expirationTime",
            TableField::Location => "location",
            TableField::Labels => "labels",
            TableField::TimePartitioning => "timePartitioning",
            TableField::View => "view",
            TableField::Schema => "schema",
            TableField::ExternalDataConfiguration => "externalDataConfiguration",
        }
    }
}

impl FromStr for TableField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Updatable for Table {
    type Field = TableField;

    fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    fn field_value(&self, field: TableField) -> Result<Value, Error> {
        let value = match field {
            TableField::Description => Value::from(self.description.clone()),
            TableField::FriendlyName => Value::from(self.friendly_name.clone()),
            TableField::Expires => Value::from(
                self.expiration_time
                    .map(|t| (t.unix_timestamp_nanos() / 1_000_000).to_string()),
            ),
            TableField::Location => Value::from(self.location.clone()),
            TableField::Labels => serde_json::to_value(&self.labels)?,
            TableField::TimePartitioning => serde_json::to_value(&self.time_partitioning)?,
            TableField::View => serde_json::to_value(&self.view)?,
            TableField::Schema if self.schema.is_empty() => Value::Null,
            TableField::Schema => schema::encode(&self.schema),
            TableField::ExternalDataConfiguration => serde_json::to_value(&self.external_data_configuration)?,
        };
        Ok(value)
    }
}
