#![allow(clippy::result_large_err)]
//! # gcloud-bigquery-resources
//!
//! Typed bindings of the BigQuery REST resources: projects, datasets, tables, streaming inserts and jobs.
//!
//! ## Quick Start
//!
//! ### CreateClient
//!
//! `with_auth()` reads the credentials from a file specified in the environment variable `GOOGLE_APPLICATION_CREDENTIALS`, `GOOGLE_APPLICATION_CREDENTIALS_JSON` or
//! from a metadata server.
//!
//! ```rust
//! use gcloud_bigquery_resources::client::{ClientConfig, Client};
//!
//! async fn run() {
//!     let config = ClientConfig::default().with_auth().await.unwrap();
//!     let client = Client::new(config);
//! }
//! ```
//!
//! Any other HTTP stack can be used by implementing [`Transport`](crate::http::bigquery_client::Transport)
//! and passing it to [`Client::with_transport`](crate::client::Client::with_transport).
//!
//! ### Datasets and tables
//!
//! ```rust
//! use gcloud_bigquery_resources::client::Client;
//! use gcloud_bigquery_resources::http::dataset::{Dataset, DatasetField, DatasetReference};
//! use gcloud_bigquery_resources::http::table::Table;
//! use gcloud_bigquery_resources::http::update::Precondition;
//! use gcloud_bigquery_resources::schema::{FieldMode, FieldType, SchemaField};
//!
//! async fn run(client: &Client) {
//!     let reference = DatasetReference::new("project", "dataset");
//!     let mut dataset = client.dataset().create(&Dataset::new(reference.clone())).await.unwrap();
//!
//!     // Only the listed fields are sent. The update fails if someone else changed the dataset meanwhile.
//!     dataset.friendly_name = Some("Sales".to_string());
//!     let precondition = Precondition::from_resource(&dataset);
//!     client.dataset().update(&dataset, &[DatasetField::FriendlyName], &precondition).await.unwrap();
//!
//!     let mut table = Table::new(reference.table("orders"));
//!     table.schema = vec![
//!         SchemaField::new("id", FieldType::String).with_mode(FieldMode::Required),
//!         SchemaField::new("amount", FieldType::Numeric),
//!     ];
//!     client.table().create(&table).await.unwrap();
//! }
//! ```
//!
//! ### Insert rows
//!
//! ```rust
//! use gcloud_bigquery_resources::client::Client;
//! use gcloud_bigquery_resources::http::table::Table;
//! use gcloud_bigquery_resources::http::tabledata::insert_all::InsertRowsOptions;
//! use gcloud_bigquery_resources::row::Value;
//!
//! async fn run(client: &Client, table: &Table) {
//!     let rows = vec![vec![Value::from("order-1"), Value::Null]];
//!     let errors = client.tabledata().insert_rows(table, &rows, &InsertRowsOptions::default()).await.unwrap();
//!     for error in errors {
//!         println!("row {} rejected: {:?}", error.index, error.errors);
//!     }
//! }
//! ```
//!
//! ### Jobs
//!
//! ```rust
//! use gcloud_bigquery_resources::client::Client;
//! use gcloud_bigquery_resources::http::job::get_query_results::GetQueryResultsRequest;
//! use gcloud_bigquery_resources::http::job::JobConfigurationQuery;
//!
//! async fn run(client: &Client) {
//!     let config = JobConfigurationQuery {
//!         query: "SELECT 1".to_string(),
//!         ..Default::default()
//!     };
//!     let job = client.job().query("project", None, config).await.unwrap();
//!     let status = client.job().get_query_results(&job.job_reference, Some(10_000)).await.unwrap();
//!     if status.job_complete {
//!         let mut rows = client.job().query_results(&job.job_reference, &GetQueryResultsRequest::default());
//!         while let Some(row) = rows.next().await.unwrap() {
//!             println!("{:?}", row.f);
//!         }
//!     }
//! }
//! ```
pub mod client;
pub mod http;
pub mod iterator;
pub mod row;
pub mod schema;
