use crate::http::bigquery_client::ApiRequest;
use crate::http::job::JobState;

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct ListJobsRequest {
    /// Maximum number of jobs to return across all pages.
    pub max_results: Option<usize>,
    /// Page token, returned by a previous call, to request the next page of results.
    pub page_token: Option<String>,
    /// Whether to display jobs owned by all users in the project. Default False.
    pub all_users: bool,
    /// Filter for job state.
    pub state_filter: Option<JobState>,
}

pub fn build(project_id: &str, req: &ListJobsRequest) -> ApiRequest {
    let request = ApiRequest::get(format!("/projects/{project_id}/jobs"))
        .query("projection", "full")
        .query_opt("stateFilter", req.state_filter.as_ref().map(JobState::as_filter));
    if req.all_users {
        request.query("allUsers", true)
    } else {
        request
    }
}
