use crate::http::bigquery_client::ApiRequest;
use crate::http::dataset::DatasetReference;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ListTablesRequest {
    /// Maximum number of tables to return across all pages.
    pub max_results: Option<usize>,
    /// Page token, returned by a previous call, to request the next page of results.
    pub page_token: Option<String>,
}

pub fn build(dataset: &DatasetReference) -> ApiRequest {
    ApiRequest::get(format!("{}/tables", dataset.path()))
}
