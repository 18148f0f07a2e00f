use crate::http::bigquery_client::ApiRequest;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ListDatasetsRequest {
    /// Maximum number of datasets to return across all pages.
    pub max_results: Option<usize>,
    /// Page token, returned by a previous call, to request the next page of results.
    pub page_token: Option<String>,
    /// Whether to list all datasets, including hidden ones.
    pub all: bool,
    /// An expression for filtering the results of the request by label.
    /// The syntax is "labels.<name>[:<value>]".
    /// Multiple filters can be ANDed together by connecting with a space.
    pub filter: Option<String>,
}

pub fn build(project_id: &str, req: &ListDatasetsRequest) -> ApiRequest {
    let request = ApiRequest::get(format!("/projects/{project_id}/datasets")).query_opt("filter", req.filter.as_ref());
    if req.all {
        request.query("all", true)
    } else {
        request
    }
}
