use crate::http::bigquery_client::ApiRequest;
use crate::http::job::{ErrorProto, JobReference};
use crate::schema::SchemaField;

/// A cell value of a query result row, in the `f`/`v` form returned by the API.
#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    String(String),
    Array(Vec<Cell>),
    Struct(Tuple),
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug)]
pub struct Cell {
    pub v: CellValue,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug)]
pub struct Tuple {
    pub f: Vec<Cell>,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct GetQueryResultsRequest {
    /// Maximum number of results to read. `Some(0)` fetches only the job status and schema.
    pub max_results: Option<usize>,
    /// Page token, returned by a previous call, to request the next page of results.
    pub page_token: Option<String>,
    /// Optional: Specifies the maximum amount of time, in milliseconds,
    /// that the client is willing to wait for the query to complete.
    /// If the query has not yet completed, jobComplete is false.
    pub timeout_ms: Option<u64>,
}

#[derive(Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct QueryResults {
    /// The resource type.
    #[serde(default)]
    pub kind: String,
    /// Reference to the Job that was created to run the query.
    #[serde(default)]
    pub job_reference: JobReference,
    /// Whether the query has completed or not.
    /// If rows or totalRows are present, this will always be true.
    #[serde(default)]
    pub job_complete: bool,
    /// The schema of the results. Present only when the query completes successfully.
    #[serde(default, with = "crate::schema::table_schema", skip_serializing_if = "Vec::is_empty")]
    pub schema: Vec<SchemaField>,
    /// The total number of rows in the complete query result set.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(serialize_with = "crate::http::to_str_option", skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
    /// A token used for paging results.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    /// Rows of this page.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<Tuple>,
    /// The total number of bytes processed for this query.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(serialize_with = "crate::http::to_str_option", skip_serializing_if = "Option::is_none")]
    pub total_bytes_processed: Option<i64>,
    /// Whether the query result was fetched from the query cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,
    /// The number of rows affected by a DML statement.
    #[serde(default, deserialize_with = "crate::http::from_str_option")]
    #[serde(serialize_with = "crate::http::to_str_option", skip_serializing_if = "Option::is_none")]
    pub num_dml_affected_rows: Option<i64>,
    /// The first errors or warnings encountered during the running of the job.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorProto>,
}

pub fn build(job: &JobReference, req: &GetQueryResultsRequest) -> ApiRequest {
    ApiRequest::get(format!("/projects/{}/queries/{}", job.project_id, job.job_id))
        .query_opt("maxResults", req.max_results)
        .query_opt("pageToken", req.page_token.as_ref())
        .query_opt("timeoutMs", req.timeout_ms)
        .query_opt("location", job.location.as_ref())
}
