use crate::http::bigquery_client::ApiRequest;
use crate::http::error::Error;
use crate::http::job::Job;

pub fn build(job: &Job) -> Result<ApiRequest, Error> {
    let path = format!("/projects/{}/jobs", job.job_reference.project_id);
    Ok(ApiRequest::post(path).json(serde_json::to_value(job)?))
}
