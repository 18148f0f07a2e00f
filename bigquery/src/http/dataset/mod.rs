pub mod delete;
pub mod get;
pub mod insert;
pub mod list;
pub mod patch;

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::http::error::Error;
use crate::http::table::TableReference;
use crate::http::update::{Updatable, UpdatableField};

#[derive(Clone, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct DatasetReference {
    /// The ID of the project containing this dataset.
    #[serde(default)]
    pub project_id: String,
    /// Required. A unique ID for this dataset, without the project name.
    /// The ID must contain only letters (a-z, A-Z), numbers (0-9), or underscores (_).
    /// The maximum length is 1,024 characters.
    pub dataset_id: String,
}

impl DatasetReference {
    pub fn new(project_id: impl Into<String>, dataset_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            dataset_id: dataset_id.into(),
        }
    }

    /// URL path for the dataset's APIs.
    pub fn path(&self) -> String {
        format!("/projects/{}/datasets/{}", self.project_id, self.dataset_id)
    }

    /// A reference to a table in this dataset.
    pub fn table(&self, table_id: impl Into<String>) -> TableReference {
        TableReference::new(self.project_id.as_str(), self.dataset_id.as_str(), table_id)
    }
}

/// The entity an [`AccessEntry`] grants a role to.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AccessEntity {
    /// An email address of a user, e.g. `fred@example.com`.
    UserByEmail(String),
    /// An email address of a Google Group.
    GroupByEmail(String),
    /// A domain, e.g. `example.com`.
    Domain(String),
    /// `projectOwners`, `projectReaders`, `projectWriters` or `allAuthenticatedUsers`.
    SpecialGroup(String),
    /// A view from a different dataset, granted read access to this dataset.
    View(TableReference),
}

impl AccessEntity {
    pub fn entity_type(&self) -> &'static str {
        match self {
            AccessEntity::UserByEmail(_) => "userByEmail",
            AccessEntity::GroupByEmail(_) => "groupByEmail",
            AccessEntity::Domain(_) => "domain",
            AccessEntity::SpecialGroup(_) => "specialGroup",
            AccessEntity::View(_) => "view",
        }
    }

    fn from_entry(entity_type: &str, entity_id: Value) -> Result<Self, Error> {
        let id = |v: Value| match v {
            Value::String(s) => Ok(s),
            v => Err(Error::Validation(format!("entity id of {entity_type} must be a string: {v}"))),
        };
        match entity_type {
            "userByEmail" => Ok(AccessEntity::UserByEmail(id(entity_id)?)),
            "groupByEmail" => Ok(AccessEntity::GroupByEmail(id(entity_id)?)),
            "domain" => Ok(AccessEntity::Domain(id(entity_id)?)),
            "specialGroup" => Ok(AccessEntity::SpecialGroup(id(entity_id)?)),
            "view" => Ok(AccessEntity::View(serde_json::from_value(entity_id)?)),
            other => Err(Error::Validation(format!(
                "entity type {other} not among: userByEmail, groupByEmail, domain, specialGroup, view"
            ))),
        }
    }

    fn entity_id(&self) -> Value {
        match self {
            AccessEntity::UserByEmail(v)
            | AccessEntity::GroupByEmail(v)
            | AccessEntity::Domain(v)
            | AccessEntity::SpecialGroup(v) => Value::String(v.clone()),
            AccessEntity::View(table) => {
                let mut reference = Map::new();
                reference.insert("projectId".to_string(), Value::String(table.project_id.clone()));
                reference.insert("datasetId".to_string(), Value::String(table.dataset_id.clone()));
                reference.insert("tableId".to_string(), Value::String(table.table_id.clone()));
                Value::Object(reference)
            }
        }
    }
}

/// Grant of an access role to an entity.
///
/// A view never has a role, since views are always read-only. Every other entity has one, e.g. `OWNER`,
/// `WRITER` or `READER`.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct AccessEntry {
    role: Option<String>,
    entity: AccessEntity,
}

impl AccessEntry {
    pub fn new(role: Option<String>, entity: AccessEntity) -> Result<Self, Error> {
        match (&entity, &role) {
            (AccessEntity::View(_), Some(role)) => {
                return Err(Error::Validation(format!("role must be unset for a view, got {role}")))
            }
            (AccessEntity::View(_), None) => {}
            (entity, None) => {
                return Err(Error::Validation(format!(
                    "role must be set for entity type {}",
                    entity.entity_type()
                )))
            }
            (_, Some(_)) => {}
        }
        Ok(Self { role, entity })
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn entity(&self) -> &AccessEntity {
        &self.entity
    }

    pub fn entity_type(&self) -> &'static str {
        self.entity.entity_type()
    }
}

impl TryFrom<Map<String, Value>> for AccessEntry {
    type Error = Error;

    fn try_from(mut entry: Map<String, Value>) -> Result<Self, Self::Error> {
        let role = match entry.remove("role") {
            None | Some(Value::Null) => None,
            Some(Value::String(role)) => Some(role),
            Some(v) => return Err(Error::Validation(format!("role must be a string: {v}"))),
        };
        if entry.len() != 1 {
            let keys: Vec<&String> = entry.keys().collect();
            return Err(Error::Validation(format!(
                "access entry must have exactly one entity, got {keys:?}"
            )));
        }
        let (entity_type, entity_id) = match entry.into_iter().next() {
            Some(kv) => kv,
            None => return Err(Error::Validation("access entry has no entity".to_string())),
        };
        AccessEntry::new(role, AccessEntity::from_entry(&entity_type, entity_id)?)
    }
}

impl From<AccessEntry> for Map<String, Value> {
    fn from(entry: AccessEntry) -> Self {
        let mut info = Map::new();
        info.insert(entry.entity.entity_type().to_string(), entry.entity.entity_id());
        if let Some(role) = entry.role {
            info.insert("role".to_string(), Value::String(role));
        }
        info
    }
}

/// A BigQuery dataset, the container of tables and views.
///
/// Fetching a dataset always yields a complete new value; nothing of a previous read is kept.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Output only. The resource type.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Output only. A hash of the resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Output only. The fully-qualified unique name of the dataset in the format projectId:datasetId.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Output only. A URL that can be used to access the resource again.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Required. A reference that identifies the dataset.
    #[serde(default)]
    pub dataset_reference: DatasetReference,
    /// Optional. A descriptive name for the dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    /// Optional. A user-friendly description of the dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional. The default lifetime of all tables in the dataset, in milliseconds.
    /// The minimum lifetime value is 3600000 milliseconds (one hour).
    /// Once this property is set, all newly-created tables in the dataset will have an expirationTime property
    /// set to the creation time plus the value in this property.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_table_expiration_ms: Option<i64>,
    /// The labels associated with this dataset.
    /// Example: { "name": "wrench", "mass": "1.3kg", "count": "3" }.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
    /// Optional. An array of objects that define dataset access for one or more entities.
    /// If unspecified at dataset creation time, BigQuery adds default dataset access for the project
    /// readers, writers and owners and the dataset creator.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub access: Vec<AccessEntry>,
    /// Output only. The time when this dataset was created.
    #[serde(default, with = "crate::http::epoch_millis_option", skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<OffsetDateTime>,
    /// Output only. The date when this dataset was last modified.
    #[serde(default, with = "crate::http::epoch_millis_option", skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<OffsetDateTime>,
    /// The geographic location where the dataset should reside.
    /// See https://cloud.google.com/bigquery/docs/locations for supported locations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Dataset {
    pub fn new(dataset_reference: DatasetReference) -> Self {
        Self {
            dataset_reference,
            ..Default::default()
        }
    }

    /// Parses a dataset resource returned by the API.
    pub fn from_resource(resource: Value) -> Result<Self, Error> {
        if resource.pointer("/datasetReference/datasetId").is_none() {
            return Err(Error::MissingIdentity("datasetReference.datasetId"));
        }
        Ok(serde_json::from_value(resource)?)
    }

    pub fn path(&self) -> String {
        self.dataset_reference.path()
    }

    pub fn table(&self, table_id: impl Into<String>) -> TableReference {
        self.dataset_reference.table(table_id)
    }

    pub fn created(&self) -> Option<OffsetDateTime> {
        self.creation_time
    }

    pub fn modified(&self) -> Option<OffsetDateTime> {
        self.last_modified_time
    }
}

/// Dataset properties that can be changed with [`BigqueryDatasetClient::update`](crate::http::bigquery_dataset_client::BigqueryDatasetClient::update).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DatasetField {
    FriendlyName,
    Description,
    DefaultTableExpirationMs,
    Location,
    Labels,
    AccessEntries,
}

impl UpdatableField for DatasetField {
    const RESOURCE: &'static str = "dataset";
    const ALL: &'static [Self] = &[
        DatasetField::FriendlyName,
        DatasetField::Description,
        DatasetField::DefaultTableExpirationMs,
        DatasetField::Location,
        DatasetField::Labels,
        DatasetField::AccessEntries,
    ];

    fn name(&self) -> &'static str {
        match self {
            DatasetField::FriendlyName => "friendly_name",
            DatasetField::Description => "description",
            DatasetField::DefaultTableExpirationMs => "default_table_expiration_ms",
            DatasetField::Location => "location",
            DatasetField::Labels => "labels",
            DatasetField::AccessEntries => "access_entries",
        }
    }

    fn wire_name(&self) -> &'static str {
        match self {
            DatasetField::FriendlyName => "friendlyName",
            DatasetField::Description => "description",
            DatasetField::DefaultTableExpirationMs => "defaultTableExpirationMs",
            DatasetField::Location => "location",
            DatasetField::Labels => "labels",
            DatasetField::AccessEntries => "access",
        }
    }
}

impl FromStr for DatasetField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Updatable for Dataset {
    type Field = DatasetField;

    fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    fn field_value(&self, field: DatasetField) -> Result<Value, Error> {
        let value = match field {
            DatasetField::FriendlyName => Value::from(self.friendly_name.clone()),
            DatasetField::Description => Value::from(self.description.clone()),
            DatasetField::DefaultTableExpirationMs => Value::from(self.default_table_expiration_ms),
            DatasetField::Location => Value::from(self.location.clone()),
            DatasetField::Labels => serde_json::to_value(&self.labels)?,
            DatasetField::AccessEntries => serde_json::to_value(&self.access)?,
        };
        Ok(value)
    }
}
