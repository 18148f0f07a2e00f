use crate::http::bigquery_client::ApiRequest;
use crate::http::job::JobReference;

pub fn build(job: &JobReference) -> ApiRequest {
    ApiRequest::get(job.path())
        .query("projection", "full")
        .query_opt("location", job.location.as_ref())
}
