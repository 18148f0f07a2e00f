use crate::http::bigquery_client::ApiRequest;
use crate::http::dataset::Dataset;
use crate::http::error::Error;

pub fn build(dataset: &Dataset) -> Result<ApiRequest, Error> {
    let path = format!("/projects/{}/datasets", dataset.dataset_reference.project_id);
    Ok(ApiRequest::post(path).json(serde_json::to_value(dataset)?))
}
