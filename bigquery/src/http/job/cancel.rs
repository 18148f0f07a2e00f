use serde_json::Value;

use crate::http::bigquery_client::ApiRequest;
use crate::http::job::JobReference;

#[derive(Clone, PartialEq, serde::Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CancelJobResponse {
    /// The resource type of the response.
    #[serde(default)]
    pub kind: String,
    /// The final state of the job, parsed with [`Job::from_resource`](crate::http::job::Job::from_resource).
    pub job: Value,
}

pub fn build(job: &JobReference) -> ApiRequest {
    ApiRequest::post(format!("{}/cancel", job.path())).query_opt("location", job.location.as_ref())
}
