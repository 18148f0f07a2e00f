use serde::Serialize;
use serde_json::{Map, Value};

use crate::http::bigquery_client::ApiRequest;
use crate::http::error::Error;
use crate::http::table::{Table, TableReference};
use crate::row;

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Row<T: Serialize> {
    /// [Optional] A unique ID for each row. BigQuery uses this
    /// property to detect duplicate insertion requests on a best-effort basis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insert_id: Option<String>,

    /// [Required] A JSON object that contains a row of data. The
    /// object's properties and values must match the destination table's schema.
    pub json: T,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InsertAllRequest<T: Serialize> {
    /// Optional. Insert all valid rows of a request, even if invalid rows exist.
    /// The default value is false, which causes the entire request to fail if any invalid rows exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_invalid_rows: Option<bool>,
    /// Optional. Accept rows that contain values that do not match the schema.
    /// The unknown values are ignored. Default is false, which treats unknown values as errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_unknown_values: Option<bool>,
    /// Optional. If specified, treats the destination table as a base template, and inserts the rows into an instance table named "{destination}{templateSuffix}". BigQuery will manage creation of the instance table, using the schema of the base template table.
    /// See https://cloud.google.com/bigquery/streaming-data-into-bigquery#template-tables for considerations when working with templates tables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_suffix: Option<String>,
    /// Data to insert
    pub rows: Vec<Row<T>>,
}

impl<T: Serialize> Default for InsertAllRequest<T> {
    fn default() -> Self {
        Self {
            skip_invalid_rows: None,
            ignore_unknown_values: None,
            template_suffix: None,
            rows: vec![],
        }
    }
}

/// Options of [`BigqueryTabledataClient::insert_rows`](crate::http::bigquery_tabledata_client::BigqueryTabledataClient::insert_rows).
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct InsertRowsOptions {
    /// One unique ID per row, used for best-effort de-duplication. Must match the number of rows.
    pub row_ids: Option<Vec<String>>,
    pub skip_invalid_rows: Option<bool>,
    pub ignore_unknown_values: Option<bool>,
    pub template_suffix: Option<String>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(rename_all = "camelCase", default)]
pub struct ErrorMessage {
    /// A short error code that summarizes the error.
    pub reason: String,
    /// Specifies where the error occurred, if present.
    pub location: String,
    /// Debugging information. This property is internal to Google and should not be used.
    pub debug_info: String,
    /// A human-readable description of the error.
    pub message: String,
}

/// Errors of a single rejected row.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InsertError {
    /// Position of the row in the request.
    #[serde(deserialize_with = "crate::http::from_str")]
    pub index: usize,
    #[serde(default)]
    pub errors: Vec<ErrorMessage>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InsertAllResponse {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub insert_errors: Vec<InsertError>,
}

/// Encodes `rows` against the schema of `table`.
pub fn rows_request(
    table: &Table,
    rows: &[Vec<row::Value>],
    options: &InsertRowsOptions,
) -> Result<InsertAllRequest<Map<String, Value>>, Error> {
    if table.schema.is_empty() {
        return Err(row::Error::TableHasNoSchema.into());
    }
    if let Some(row_ids) = &options.row_ids {
        if row_ids.len() != rows.len() {
            return Err(Error::Validation(format!(
                "{} row ids given for {} rows",
                row_ids.len(),
                rows.len()
            )));
        }
    }
    let rows = rows
        .iter()
        .enumerate()
        .map(|(index, values)| -> Result<Row<Map<String, Value>>, Error> {
            Ok(Row {
                insert_id: options.row_ids.as_ref().and_then(|ids| ids.get(index).cloned()),
                json: row::encode_row(&table.schema, values)?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(InsertAllRequest {
        skip_invalid_rows: options.skip_invalid_rows,
        ignore_unknown_values: options.ignore_unknown_values,
        template_suffix: options.template_suffix.clone(),
        rows,
    })
}

pub fn build<T: Serialize>(table: &TableReference, data: &InsertAllRequest<T>) -> Result<ApiRequest, Error> {
    Ok(ApiRequest::post(format!("{}/insertAll", table.path())).json(serde_json::to_value(data)?))
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::http::error::Error;
    use crate::http::table::{Table, TableReference};
    use crate::http::tabledata::insert_all::{build, rows_request, InsertAllResponse, InsertRowsOptions};
    use crate::row;
    use crate::schema::{FieldMode, FieldType, SchemaField};

    fn table() -> Table {
        let mut table = Table::new(TableReference::new("p", "d", "t"));
        table.schema = vec![
            SchemaField::new("full_name", FieldType::String).with_mode(FieldMode::Required),
            SchemaField::new("avatar", FieldType::Bytes),
        ];
        table
    }

    #[test]
    fn test_rows_request() {
        let rows = vec![
            vec![row::Value::from("Phred"), row::Value::Bytes(b"q".to_vec())],
            vec![row::Value::from("Bharney"), row::Value::Null],
        ];
        let options = InsertRowsOptions {
            row_ids: Some(vec!["a".to_string(), "b".to_string()]),
            skip_invalid_rows: Some(true),
            template_suffix: Some("_20240101".to_string()),
            ..Default::default()
        };
        let request = build(&table().table_reference, &rows_request(&table(), &rows, &options).unwrap()).unwrap();
        assert_eq!(request.path, "/projects/p/datasets/d/tables/t/insertAll");
        assert_eq!(
            request.body.unwrap(),
            json!({
                "skipInvalidRows": true,
                "templateSuffix": "_20240101",
                "rows": [
                    {"insertId": "a", "json": {"full_name": "Phred", "avatar": "cQ=="}},
                    {"insertId": "b", "json": {"full_name": "Bharney", "avatar": null}}
                ]
            })
        );

        let request = rows_request(&table(), &rows, &InsertRowsOptions::default()).unwrap();
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["rows"][0], json!({"json": {"full_name": "Phred", "avatar": "cQ=="}}));
        assert!(body.get("ignoreUnknownValues").is_none());
    }

    #[test]
    fn test_rows_request_errors() {
        let rows = vec![vec![row::Value::from("Phred"), row::Value::Null]];
        let err = rows_request(&Table::new(TableReference::new("p", "d", "t")), &rows, &Default::default()).unwrap_err();
        assert!(matches!(err, Error::Row(row::Error::TableHasNoSchema)));

        let options = InsertRowsOptions {
            row_ids: Some(vec![]),
            ..Default::default()
        };
        assert!(matches!(rows_request(&table(), &rows, &options), Err(Error::Validation(_))));

        let err = rows_request(&table(), &[vec![row::Value::Null]], &Default::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Row(row::Error::SchemaMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_response() {
        let response: InsertAllResponse = serde_json::from_value(json!({
            "kind": "bigquery#tableDataInsertAllResponse",
            "insertErrors": [
                {"index": 1, "errors": [{"reason": "invalid", "message": "bad row"}]}
            ]
        }))
        .unwrap();
        assert_eq!(response.insert_errors.len(), 1);
        assert_eq!(response.insert_errors[0].index, 1);
        assert_eq!(response.insert_errors[0].errors[0].reason, "invalid");

        let response: InsertAllResponse = serde_json::from_value(Value::Object(Default::default())).unwrap();
        assert!(response.insert_errors.is_empty());
    }
}
