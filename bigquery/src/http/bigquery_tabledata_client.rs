use std::sync::Arc;

use serde::Serialize;

use crate::http::bigquery_client::{send, Transport};
use crate::http::error::Error;
use crate::http::table::{Table, TableReference};
use crate::http::tabledata;
use crate::http::tabledata::insert_all::{InsertAllRequest, InsertAllResponse, InsertError, InsertRowsOptions};
use crate::row;

#[derive(Clone, Debug)]
pub struct BigqueryTabledataClient {
    inner: Arc<dyn Transport>,
}

impl BigqueryTabledataClient {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self { inner }
    }

    /// Streams pre-encoded rows into a table.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn insert_all<T: Serialize>(
        &self,
        table: &TableReference,
        data: &InsertAllRequest<T>,
    ) -> Result<InsertAllResponse, Error> {
        let request = tabledata::insert_all::build(table, data)?;
        send(self.inner.as_ref(), request).await
    }

    /// Encodes `rows` with the schema of `table` and streams them into it.
    ///
    /// Every value of a row lines up with the top level field at the same position. Returns the errors of
    /// the rejected rows, which is empty when every row was accepted.
    #[cfg_attr(feature = "trace", tracing::instrument(skip_all))]
    pub async fn insert_rows(
        &self,
        table: &Table,
        rows: &[Vec<row::Value>],
        options: &InsertRowsOptions,
    ) -> Result<Vec<InsertError>, Error> {
        let data = tabledata::insert_all::rows_request(table, rows, options)?;
        let response = self.insert_all(&table.table_reference, &data).await?;
        if !response.insert_errors.is_empty() {
            tracing::debug!(rejected = response.insert_errors.len(), "insertAll rejected rows");
        }
        Ok(response.insert_errors)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use reqwest::Method;
    use serde_json::json;

    use crate::http::bigquery_client::test::RecordingTransport;
    use crate::http::bigquery_tabledata_client::BigqueryTabledataClient;
    use crate::http::error::Error;
    use crate::http::table::{Table, TableReference};
    use crate::http::tabledata::insert_all::{InsertAllRequest, InsertRowsOptions, Row};
    use crate::row::{self, Value};
    use crate::schema::{FieldMode, FieldType, SchemaField};

    fn table() -> Table {
        let mut table = Table::new(TableReference::new("p", "d", "t"));
        table.schema = vec![
            SchemaField::new("full_name", FieldType::String).with_mode(FieldMode::Required),
            SchemaField::new("payload", FieldType::Bytes),
        ];
        table
    }

    #[tokio::test]
    async fn test_insert_rows() {
        let transport = RecordingTransport::new();
        transport.reply(json!({
            "kind": "bigquery#tableDataInsertAllResponse",
            "insertErrors": [{"index": 1, "errors": [{"reason": "invalid", "message": "no such field"}]}]
        }));
        let client = BigqueryTabledataClient::new(transport.clone());

        let rows = vec![
            vec![Value::from("alice"), Value::from(b"q".to_vec())],
            vec![Value::from("bob"), Value::Null],
        ];
        let options = InsertRowsOptions {
            row_ids: Some(vec!["1".to_string(), "2".to_string()]),
            skip_invalid_rows: Some(true),
            ..Default::default()
        };
        let errors = client.insert_rows(&table(), &rows, &options).await.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].index, 1);
        assert_eq!(errors[0].errors[0].reason, "invalid");

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/projects/p/datasets/d/tables/t/insertAll");
        assert_eq!(
            request.body,
            Some(json!({
                "skipInvalidRows": true,
                "rows": [
                    {"insertId": "1", "json": {"full_name": "alice", "payload": "cQ=="}},
                    {"insertId": "2", "json": {"full_name": "bob", "payload": null}}
                ]
            }))
        );
    }

    #[tokio::test]
    async fn test_insert_rows_from_mapping() {
        let transport = RecordingTransport::new();
        transport.reply(json!({"kind": "bigquery#tableDataInsertAllResponse"}));
        let client = BigqueryTabledataClient::new(transport.clone());

        let table = table();
        let mapping = HashMap::from([
            ("full_name".to_string(), Value::from("carol")),
            ("payload".to_string(), Value::Bytes(b"q".to_vec())),
        ]);
        let values = table.row_from_mapping(&mapping).unwrap();
        let errors = client
            .insert_rows(&table, &[values], &InsertRowsOptions::default())
            .await
            .unwrap();
        assert!(errors.is_empty());
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({"rows": [{"json": {"full_name": "carol", "payload": "cQ=="}}]}))
        );
    }

    #[tokio::test]
    async fn test_insert_rows_rejected_locally() {
        let transport = RecordingTransport::new();
        let client = BigqueryTabledataClient::new(transport.clone());

        let no_schema = Table::new(TableReference::new("p", "d", "t"));
        let err = client
            .insert_rows(&no_schema, &[vec![Value::from("x")]], &InsertRowsOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Row(row::Error::TableHasNoSchema)), "{err:?}");

        let options = InsertRowsOptions {
            row_ids: Some(vec!["1".to_string()]),
            ..Default::default()
        };
        let rows = vec![vec![Value::from("a"), Value::Null], vec![Value::from("b"), Value::Null]];
        let err = client.insert_rows(&table(), &rows, &options).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{err:?}");

        assert!(transport.requests().is_empty());
    }

    #[derive(serde::Serialize)]
    struct Person {
        full_name: &'static str,
    }

    #[tokio::test]
    async fn test_insert_all() {
        let transport = RecordingTransport::new();
        transport.reply(json!({}));
        let client = BigqueryTabledataClient::new(transport.clone());

        let data = InsertAllRequest {
            template_suffix: Some("_20240101".to_string()),
            rows: vec![Row {
                insert_id: None,
                json: Person { full_name: "dave" },
            }],
            ..Default::default()
        };
        let response = client.insert_all(&TableReference::new("p", "d", "t"), &data).await.unwrap();
        assert!(response.insert_errors.is_empty());
        assert_eq!(
            transport.requests()[0].body,
            Some(json!({"templateSuffix": "_20240101", "rows": [{"json": {"full_name": "dave"}}]}))
        );
    }
}
