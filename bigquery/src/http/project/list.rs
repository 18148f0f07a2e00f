use crate::http::bigquery_client::ApiRequest;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ListProjectsRequest {
    /// Maximum number of projects to return across all pages.
    pub max_results: Option<usize>,
    /// Page token, returned by a previous call, to request the next page of results.
    pub page_token: Option<String>,
}

pub fn build() -> ApiRequest {
    ApiRequest::get("/projects")
}
