//! Partial updates (PATCH) of datasets and tables.
//!
//! Only the listed fields are sent. A listed field without a value is sent as `null`, which removes it on
//! the server side. An optional `If-Match` precondition makes the update fail with
//! [`Error::PreconditionFailed`] when the resource changed since it was read.

use std::str::FromStr;

use serde_json::{Map, Value};

use crate::http::bigquery_client::ApiRequest;
use crate::http::error::Error;

/// Converts a snake_case property name to its camelCase wire name.
///
/// Every word after the first is capitalized (ASCII only), e.g. `default_table_expiration_ms` becomes
/// `defaultTableExpirationMs`.
pub fn snake_to_camel(name: &str) -> String {
    let mut words = name.split('_');
    let mut camel = words.next().unwrap_or_default().to_string();
    for word in words {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            camel.push(first.to_ascii_uppercase());
            camel.push_str(&chars.as_str().to_ascii_lowercase());
        }
    }
    camel
}

/// The set of properties of a resource that can be changed by a partial update.
pub trait UpdatableField: Copy + FromStr<Err = Error> + 'static {
    /// Resource name used in error messages.
    const RESOURCE: &'static str;
    /// Every updatable field, in declaration order.
    const ALL: &'static [Self];

    /// The snake_case property name.
    fn name(&self) -> &'static str;

    /// The key sent on the wire.
    fn wire_name(&self) -> &'static str;

    /// Looks a field up by its snake_case name.
    fn parse(name: &str) -> Result<Self, Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == name)
            .ok_or_else(|| Error::UnknownField {
                resource: Self::RESOURCE,
                field: name.to_string(),
            })
    }
}

/// A resource that can be partially updated.
pub trait Updatable {
    type Field: UpdatableField;

    /// The concurrency token read with the resource, if any.
    fn etag(&self) -> Option<&str>;

    /// Current wire value of `field`. `Value::Null` when unset.
    fn field_value(&self, field: Self::Field) -> Result<Value, Error>;
}

/// Condition attached to a partial update.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum Precondition {
    /// Unconditional update.
    #[default]
    None,
    /// Apply only when the resource still carries this etag.
    IfMatch(String),
}

impl Precondition {
    /// `IfMatch` when an etag is known, `None` otherwise.
    pub fn from_etag(etag: Option<&str>) -> Self {
        match etag {
            Some(etag) => Precondition::IfMatch(etag.to_string()),
            None => Precondition::None,
        }
    }

    /// `IfMatch` with the etag `resource` was read with, `None` when it has none.
    pub fn from_resource<R: Updatable>(resource: &R) -> Self {
        Self::from_etag(resource.etag())
    }

    fn headers(&self) -> Vec<(String, String)> {
        match self {
            Precondition::IfMatch(etag) => vec![("If-Match".to_string(), etag.clone())],
            Precondition::None => vec![],
        }
    }
}

/// Body and headers of a PATCH request.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct PartialUpdate {
    pub body: Map<String, Value>,
    pub headers: Vec<(String, String)>,
}

impl PartialUpdate {
    /// PATCH request against `path` carrying this update.
    pub fn into_request(self, path: impl Into<String>) -> ApiRequest {
        let mut request = ApiRequest::patch(path).json(Value::Object(self.body));
        request.headers = self.headers;
        request
    }
}

/// Builds the update of `changed` fields of `resource`.
pub fn build<R: Updatable>(
    resource: &R,
    changed: &[R::Field],
    precondition: &Precondition,
) -> Result<PartialUpdate, Error> {
    let mut body = Map::new();
    for field in changed {
        body.insert(field.wire_name().to_string(), resource.field_value(*field)?);
    }
    Ok(PartialUpdate {
        body,
        headers: precondition.headers(),
    })
}

/// Builds an update from snake_case keyed values.
///
/// Every name in `changed` must be a key of `values`; nothing is built otherwise.
pub fn build_from_values(
    values: &Map<String, Value>,
    changed: &[&str],
    precondition: &Precondition,
) -> Result<PartialUpdate, Error> {
    let mut body = Map::new();
    for name in changed {
        let value = values.get(*name).ok_or_else(|| Error::UnknownField {
            resource: "resource",
            field: name.to_string(),
        })?;
        body.insert(snake_to_camel(name), value.clone());
    }
    Ok(PartialUpdate {
        body,
        headers: precondition.headers(),
    })
}
